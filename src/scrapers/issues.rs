//! Issue link extraction from the archive's yearly index pages.
//!
//! For every year in `[current - span, current]` the index page is fetched,
//! its raw text scanned with the configured link pattern, and every match not
//! rejected by the exclusion rule is handed to the collector.
//!
//! # Ordering
//!
//! Years are visited in ascending order and one page is fully processed
//! before the next request goes out, so the collector sees entries grouped by
//! year (ascending) and, within a page, in left-to-right text order.
//!
//! # Failures
//!
//! A page that cannot be fetched yields no entries for its year and the scan
//! continues. Nothing about a single year can fail the run.

use crate::collector::Collector;
use crate::config::{Exclusion, ExtractorConfig, YearRange};
use crate::error::{Error, FetchError};
use crate::fetch::{HttpFetcher, PageFetcher, TransportConfig};
use crate::models::IssueEntry;
use crate::utils::truncate_for_log;
use chrono::{Datelike, Local};
use regex::Regex;
use tracing::{debug, info, instrument, warn};

/// Scan `body` for issue links.
///
/// Matches are non-overlapping and taken left to right. Group 1 is the link,
/// group 2 the label; labels rejected by `exclude` are dropped.
pub fn extract_entries(pattern: &Regex, exclude: &Exclusion, body: &str) -> Vec<IssueEntry> {
    pattern
        .captures_iter(body)
        .filter_map(|caps| {
            let url = caps.get(1)?.as_str();
            let label = caps.get(2)?.as_str();
            if exclude.matches(label) {
                debug!(%url, %label, "Excluded entry");
                return None;
            }
            Some(IssueEntry::new(url, label))
        })
        .collect()
}

/// Scan the years ending at the current local year.
///
/// Entries go to `collector`; the return value is the range that was scanned.
pub async fn run<F, C>(
    config: &ExtractorConfig,
    fetcher: &F,
    collector: &mut C,
) -> Result<YearRange, Error>
where
    F: PageFetcher,
    C: Collector,
{
    run_for_year(config, Local::now().year(), fetcher, collector).await
}

/// Scan the years ending at `current_year`.
#[instrument(level = "info", skip(config, fetcher, collector))]
pub async fn run_for_year<F, C>(
    config: &ExtractorConfig,
    current_year: i32,
    fetcher: &F,
    collector: &mut C,
) -> Result<YearRange, Error>
where
    F: PageFetcher,
    C: Collector,
{
    let range = config.year_range(current_year);
    let mut total = 0usize;
    let mut failed_years = 0usize;

    for year in range.years() {
        let url = config.url_for_year(year);
        collector.debug(&format!("checking {url}"));

        let body = match fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                failed_years += 1;
                log_fetch_failure(year, &url, &e);
                collector.debug(&format!("no issues for {year}: {e}"));
                continue;
            }
        };

        let entries = extract_entries(config.link_pattern(), config.exclude(), &body);
        if entries.is_empty() {
            debug!(year, %url, preview = %truncate_for_log(&body, 200), "Page had no issue links");
        }
        for entry in &entries {
            collector.add_url_and_name(&entry.url, &entry.label);
            collector.debug(&format!("found {} {}", entry.url, entry.label));
        }
        info!(year, count = entries.len(), "Collected issue links");
        total += entries.len();
    }

    info!(
        first_year = range.first,
        last_year = range.last,
        total,
        failed_years,
        "Issue scan complete"
    );
    Ok(range)
}

fn log_fetch_failure(year: i32, url: &str, e: &FetchError) {
    match e {
        FetchError::Status(status) => debug!(year, %url, %status, "Skipping year"),
        FetchError::Transport(err) => warn!(year, %url, error = %err, "Skipping year"),
    }
}

/// Build an HTTP fetcher and scan the current years with it.
///
/// # Errors
///
/// [`Error::TransportUnavailable`] when the HTTP client cannot be built; in
/// that case no year is requested.
pub async fn fetch_issue_links<C: Collector>(
    config: &ExtractorConfig,
    transport: &TransportConfig,
    collector: &mut C,
) -> Result<YearRange, Error> {
    let fetcher = HttpFetcher::new(transport)?;
    run(config, &fetcher, collector).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteLayout;
    use reqwest::StatusCode;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE_2015: &str = r#"<ul>
<li><a href="/issues/2015/jan/13/">January 13, 2015</a></li>
<li><a href="/issues/2015/jan/27/">Volume LXII</a></li>
<li><a href="/issues/2015/feb/5/">February 5, 2015</a></li>
</ul>"#;

    /// Serves canned pages and records every URL requested.
    #[derive(Default)]
    struct FakeFetcher {
        pages: HashMap<String, Result<String, StatusCode>>,
        requested: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), Ok(body.to_string()));
            self
        }

        fn status(mut self, url: &str, status: StatusCode) -> Self {
            self.pages.insert(url.to_string(), Err(status));
            self
        }
    }

    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.requested.borrow_mut().push(url.to_string());
            match self.pages.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(FetchError::Status(*status)),
                None => Err(FetchError::Status(StatusCode::NOT_FOUND)),
            }
        }
    }

    fn config() -> ExtractorConfig {
        ExtractorConfig::for_layout(SiteLayout::Current)
    }

    fn issues_url(year: i32) -> String {
        format!("https://www.nybooks.com/issues/{year}/")
    }

    #[test]
    fn test_extract_example_page() {
        let config = config();
        let body = r#"... href="/issues/2015/jan/13/">January 13, 2015</a> ... href="/issues/2015/jan/27/">Volume LXII</a> ..."#;

        let entries = extract_entries(config.link_pattern(), config.exclude(), body);
        assert_eq!(
            entries,
            vec![IssueEntry::new("/issues/2015/jan/13/", "January 13, 2015")]
        );
    }

    #[test]
    fn test_extract_keeps_page_order() {
        let config = config();
        let entries = extract_entries(config.link_pattern(), config.exclude(), PAGE_2015);

        assert_eq!(
            entries,
            vec![
                IssueEntry::new("/issues/2015/jan/13/", "January 13, 2015"),
                IssueEntry::new("/issues/2015/feb/5/", "February 5, 2015"),
            ]
        );
    }

    #[test]
    fn test_extract_is_deterministic() {
        let config = config();
        let first = extract_entries(config.link_pattern(), config.exclude(), PAGE_2015);
        let second = extract_entries(config.link_pattern(), config.exclude(), PAGE_2015);
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_is_case_insensitive_and_ignores_other_links() {
        let config = config();
        let body = r#"<A HREF="/issues/2016/Mar/10/">March 10, 2016</A>
<a href="/articles/2016/03/10/essay/">An essay</a>
<a href="/issues/2016/mar/24">missing slash</a>"#;

        let entries = extract_entries(config.link_pattern(), config.exclude(), body);
        assert_eq!(
            entries,
            vec![IssueEntry::new("/issues/2016/Mar/10/", "March 10, 2016")]
        );
    }

    #[test]
    fn test_extract_rejects_non_ascii_digits() {
        let config = config();
        let body = "<a href=\"/issues/\u{662}\u{660}\u{661}\u{665}/jan/13/\">Arabic digits</a>\n\
                    <a href=\"/issues/2015/jan/\u{661}\u{663}/\">Mixed digits</a>";

        let entries = extract_entries(config.link_pattern(), config.exclude(), body);
        assert!(entries.is_empty(), "{entries:?}");

        let legacy = ExtractorConfig::for_layout(SiteLayout::Legacy);
        let body = "<a href='/contents/\u{662}\u{660}\u{660}\u{668}1218'>December 18, 2008</a>";
        assert!(extract_entries(legacy.link_pattern(), legacy.exclude(), body).is_empty());
    }

    #[test]
    fn test_extract_no_matches() {
        let config = config();
        let entries = extract_entries(config.link_pattern(), config.exclude(), "<html></html>");
        assert!(entries.is_empty());
    }

    #[test]
    fn test_extract_legacy_layout() {
        let config = ExtractorConfig::for_layout(SiteLayout::Legacy);
        let body = r#"<option value='/'>Select</option>
<a href='/contents/20081218'>December 18, 2008</a>
<a href="/contents/20090115">January 15, 2009</a>"#;

        let entries = extract_entries(config.link_pattern(), config.exclude(), body);
        assert_eq!(
            entries,
            vec![
                IssueEntry::new("/contents/20081218", "December 18, 2008"),
                IssueEntry::new("/contents/20090115", "January 15, 2009"),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_requests_each_year_once_ascending() {
        let fetcher = FakeFetcher::default();
        let mut sink: Vec<IssueEntry> = Vec::new();

        let range = run_for_year(&config(), 2015, &fetcher, &mut sink).await.unwrap();

        assert_eq!(range, YearRange { first: 2010, last: 2015 });
        let expected: Vec<String> = (2010..=2015).map(issues_url).collect();
        assert_eq!(*fetcher.requested.borrow(), expected);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_run_orders_entries_by_year_then_page() {
        let fetcher = FakeFetcher::default()
            .page(
                &issues_url(2014),
                r#"<a href="/issues/2014/nov/20/">November 20, 2014</a><a href="/issues/2014/dec/18/">December 18, 2014</a>"#,
            )
            .page(&issues_url(2015), PAGE_2015);
        let mut sink: Vec<IssueEntry> = Vec::new();

        run_for_year(&config(), 2015, &fetcher, &mut sink).await.unwrap();

        let labels: Vec<&str> = sink.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "November 20, 2014",
                "December 18, 2014",
                "January 13, 2015",
                "February 5, 2015",
            ]
        );
    }

    #[tokio::test]
    async fn test_run_isolates_failed_year() {
        let fetcher = FakeFetcher::default()
            .page(
                &issues_url(2013),
                r#"<a href="/issues/2013/jan/10/">January 10, 2013</a>"#,
            )
            .status(&issues_url(2014), StatusCode::INTERNAL_SERVER_ERROR)
            .page(
                &issues_url(2015),
                r#"<a href="/issues/2015/jan/13/">January 13, 2015</a>"#,
            );
        let mut sink: Vec<IssueEntry> = Vec::new();

        let config = ExtractorConfig::new(
            "https://www.nybooks.com/issues/{year}/",
            SiteLayout::Current.link_pattern().as_str(),
            Exclusion::LeadingChar('V'),
            2,
        )
        .unwrap();
        run_for_year(&config, 2015, &fetcher, &mut sink).await.unwrap();

        assert_eq!(
            sink,
            vec![
                IssueEntry::new("/issues/2013/jan/10/", "January 10, 2013"),
                IssueEntry::new("/issues/2015/jan/13/", "January 13, 2015"),
            ]
        );
        assert_eq!(fetcher.requested.borrow().len(), 3);
    }

    #[tokio::test]
    async fn test_run_uses_custom_exclusion() {
        let fetcher = FakeFetcher::default().page(&issues_url(2015), PAGE_2015);
        let mut sink: Vec<IssueEntry> = Vec::new();
        let config = ExtractorConfig::new(
            "https://www.nybooks.com/issues/{year}/",
            SiteLayout::Current.link_pattern().as_str(),
            Exclusion::Prefix("February".into()),
            1,
        )
        .unwrap();

        run_for_year(&config, 2015, &fetcher, &mut sink).await.unwrap();

        let labels: Vec<&str> = sink.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["January 13, 2015", "Volume LXII"]);
    }

    #[tokio::test]
    async fn test_unusable_transport_fails_before_any_year() {
        let transport = TransportConfig {
            proxy: Some(crate::fetch::ProxyConfig {
                kind: crate::fetch::ProxyKind::Socks5,
                host: "not a host".to_string(),
                port: None,
                username: None,
                password: None,
            }),
            ..Default::default()
        };
        let mut sink: Vec<IssueEntry> = Vec::new();

        let err = fetch_issue_links(&config(), &transport, &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TransportUnavailable(_)));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_run_over_http_skips_missing_years() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/issues/2014/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="/issues/2014/dec/18/">December 18, 2014</a>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/issues/2015/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE_2015))
            .mount(&server)
            .await;
        // anything else falls through to wiremock's 404

        let config = ExtractorConfig::new(
            format!("{}/issues/{{year}}/", server.uri()),
            SiteLayout::Current.link_pattern().as_str(),
            Exclusion::LeadingChar('V'),
            5,
        )
        .unwrap();
        let fetcher = HttpFetcher::new(&TransportConfig::default()).unwrap();
        let mut sink: Vec<IssueEntry> = Vec::new();

        run_for_year(&config, 2015, &fetcher, &mut sink).await.unwrap();

        assert_eq!(
            sink,
            vec![
                IssueEntry::new("/issues/2014/dec/18/", "December 18, 2014"),
                IssueEntry::new("/issues/2015/jan/13/", "January 13, 2015"),
                IssueEntry::new("/issues/2015/feb/5/", "February 5, 2015"),
            ]
        );
        assert_eq!(server.received_requests().await.unwrap().len(), 6);
    }
}
