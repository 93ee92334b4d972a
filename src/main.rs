//! # issue_links
//!
//! Collects the list of periodical issues published on an archive site by
//! scanning its yearly index pages, for use by a link-browsing front end.
//!
//! ## Usage
//!
//! ```sh
//! issue_links -y 5 -j ./json
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: CLI flags over an optional YAML file over a site layout preset
//! 2. **Scanning**: one GET per year, oldest year first, strictly one at a time
//! 3. **Extraction**: regex scan of each page, exclusion rule applied to labels
//! 4. **Output**: issue listing on stdout, optional JSON file

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

use issue_links::cli::Cli;
use issue_links::collector::LinkCollector;
use issue_links::config::{FileConfig, Settings};
use issue_links::models::IssueList;
use issue_links::outputs::{json, listing};
use issue_links::scrapers;
use issue_links::utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("issue_links starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.layout, ?args.years, "Parsed CLI arguments");

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&args, file).inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "JSON output directory is not writable");
            return Err(e);
        }
    }

    let mut collector = LinkCollector::new(Url::parse(&settings.site)?);
    let range = scrapers::issues::fetch_issue_links(
        &settings.extractor,
        &settings.transport,
        &mut collector,
    )
    .await
    .inspect_err(|e| error!(error = %e, "Cannot fetch issue links"))?;

    if collector.is_empty() {
        warn!(
            first_year = range.first,
            last_year = range.last,
            "No issues available"
        );
    } else {
        println!("{}", listing::render(&collector));
    }

    if let Some(dir) = &args.json_output_dir {
        let list = IssueList {
            site: collector.site().to_string(),
            fetched_date: Local::now().date_naive().to_string(),
            first_year: range.first,
            last_year: range.last,
            issues: collector.into_entries(),
        };
        match json::write_issue_list(&list, dir).await {
            Ok(path) => info!(path = %path.display(), "Wrote issue list"),
            Err(e) => error!(error = %e, "Failed to write JSON"),
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    Ok(())
}
