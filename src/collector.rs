//! Sinks that receive discovered issue links.
//!
//! The extractor never owns its results: it reports each accepted link to a
//! [`Collector`] handed in by the caller.

use crate::models::IssueEntry;
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

/// Receiver of `(url, name)` pairs, in discovery order.
pub trait Collector {
    fn add_url_and_name(&mut self, url: &str, name: &str);

    /// Diagnostic hook. Does nothing unless the collector cares.
    fn debug(&mut self, _message: &str) {}
}

impl Collector for Vec<IssueEntry> {
    fn add_url_and_name(&mut self, url: &str, name: &str) {
        self.push(IssueEntry::new(url, name));
    }
}

/// In-memory collector for one site.
///
/// Links that are already absolute are stored as given; anything else is
/// joined onto the site root, so `/issues/2015/jan/13/` becomes
/// `https://www.nybooks.com/issues/2015/jan/13/`.
#[derive(Debug, Clone)]
pub struct LinkCollector {
    site: Url,
    entries: Vec<IssueEntry>,
}

impl LinkCollector {
    pub fn new(site: Url) -> Self {
        Self {
            site,
            entries: Vec::new(),
        }
    }

    pub fn site(&self) -> &Url {
        &self.site
    }

    /// Entries in the order they were added.
    pub fn entries(&self) -> &[IssueEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<IssueEntry> {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything collected so far, e.g. before scanning again.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Names keyed by URL. A URL seen twice keeps its last name.
    pub fn names_for_urls(&self) -> BTreeMap<&str, &str> {
        self.entries
            .iter()
            .map(|e| (e.url.as_str(), e.label.as_str()))
            .collect()
    }

    /// `(url, name)` pairs in descending URL order. With year-first URLs this
    /// puts later years first; within a year, month names sort alphabetically.
    pub fn by_url_descending(&self) -> Vec<(&str, &str)> {
        self.names_for_urls().into_iter().rev().collect()
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        match self.site.join(url) {
            Ok(resolved) => resolved.to_string(),
            Err(e) => {
                debug!(%url, error = %e, "Could not resolve link against site; keeping it as is");
                url.to_string()
            }
        }
    }
}

impl Collector for LinkCollector {
    fn add_url_and_name(&mut self, url: &str, name: &str) {
        let url = self.resolve(url);
        self.entries.push(IssueEntry::new(url, name));
    }

    fn debug(&mut self, message: &str) {
        debug!(target: "issue_links::collector", "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nybooks() -> LinkCollector {
        LinkCollector::new(Url::parse("https://www.nybooks.com").unwrap())
    }

    #[test]
    fn test_relative_links_are_joined_onto_site() {
        let mut collector = nybooks();
        collector.add_url_and_name("/issues/2015/jan/13/", "January 13, 2015");

        assert_eq!(
            collector.entries(),
            &[IssueEntry::new(
                "https://www.nybooks.com/issues/2015/jan/13/",
                "January 13, 2015"
            )]
        );
    }

    #[test]
    fn test_absolute_links_are_kept() {
        let mut collector = nybooks();
        collector.add_url_and_name("http://mirror.example.com/issues/2015/jan/13/", "January 13, 2015");

        assert_eq!(
            collector.entries()[0].url,
            "http://mirror.example.com/issues/2015/jan/13/"
        );
    }

    #[test]
    fn test_by_url_descending() {
        let mut collector = nybooks();
        collector.add_url_and_name("/issues/2014/dec/18/", "December 18, 2014");
        collector.add_url_and_name("/issues/2015/jan/08/", "January 8, 2015");
        collector.add_url_and_name("/issues/2015/feb/05/", "February 5, 2015");

        let names: Vec<&str> = collector.by_url_descending().into_iter().map(|(_, n)| n).collect();
        assert_eq!(
            names,
            vec!["January 8, 2015", "February 5, 2015", "December 18, 2014"]
        );
    }

    #[test]
    fn test_names_for_urls_keeps_last_name() {
        let mut collector = nybooks();
        collector.add_url_and_name("/issues/2015/jan/13/", "Jan 13");
        collector.add_url_and_name("/issues/2015/jan/13/", "January 13, 2015");

        let map = collector.names_for_urls();
        assert_eq!(map.len(), 1);
        assert_eq!(
            map["https://www.nybooks.com/issues/2015/jan/13/"],
            "January 13, 2015"
        );
        // the ordered view keeps both deliveries
        assert_eq!(collector.entries().len(), 2);
    }

    #[test]
    fn test_clear_allows_reuse() {
        let mut collector = nybooks();
        collector.add_url_and_name("/issues/2014/dec/18/", "December 18, 2014");
        collector.clear();
        assert!(collector.is_empty());
        assert!(collector.names_for_urls().is_empty());

        collector.add_url_and_name("/issues/2015/jan/13/", "January 13, 2015");
        assert_eq!(
            collector.entries(),
            &[IssueEntry::new(
                "https://www.nybooks.com/issues/2015/jan/13/",
                "January 13, 2015"
            )]
        );
    }

    #[test]
    fn test_vec_collector_keeps_raw_urls() {
        let mut sink: Vec<IssueEntry> = Vec::new();
        sink.add_url_and_name("/issues/2015/jan/13/", "January 13, 2015");
        sink.debug("ignored");
        assert_eq!(sink, vec![IssueEntry::new("/issues/2015/jan/13/", "January 13, 2015")]);
    }
}
