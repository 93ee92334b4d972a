//! Error types for configuration, transport and output.
//!
//! Two layers exist:
//! - [`Error`]: conditions that fail a whole run (or the shell around it).
//! - [`FetchError`]: a single year's page could not be fetched. The extractor
//!   absorbs these and moves on to the next year.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that abort a run before (or instead of) scanning any year.
#[derive(Debug, Error)]
pub enum Error {
    /// No HTTP client could be constructed at all.
    #[error("no usable HTTP transport: {0}")]
    TransportUnavailable(#[source] reqwest::Error),

    #[error("year span must be at least 1, got {0}")]
    InvalidYearSpan(u32),

    /// The base URL template has no `{year}` placeholder.
    #[error("base URL template {0:?} has no {{year}} placeholder")]
    InvalidTemplate(String),

    #[error("invalid link pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The link pattern must capture exactly the URL and the label.
    #[error("link pattern must have exactly 2 capture groups, found {found}")]
    CaptureGroups { found: usize },

    #[error("invalid site URL {site:?}: {source}")]
    Site {
        site: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to read config file {path}: {source}")]
    ConfigFile {
        path: String,
        #[source]
        source: ConfigFileError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Why a YAML config file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// A single page fetch failed. Never fatal to a run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("server answered {0}")]
    Status(StatusCode),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
