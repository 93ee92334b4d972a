//! Periodical issue link collection for archive sites.
//!
//! The entry point is [`scrapers::issues::run`]: give it an
//! [`ExtractorConfig`](config::ExtractorConfig), a
//! [`PageFetcher`](fetch::PageFetcher) and a [`Collector`](collector::Collector)
//! and it reports every issue it finds on the yearly index pages.
//!
//! ```ignore
//! let config = ExtractorConfig::for_layout(SiteLayout::Current);
//! let fetcher = HttpFetcher::new(&TransportConfig::default())?;
//! let mut issues: Vec<IssueEntry> = Vec::new();
//! scrapers::issues::run(&config, &fetcher, &mut issues).await?;
//! ```

pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod outputs;
pub mod scrapers;
pub mod utils;
