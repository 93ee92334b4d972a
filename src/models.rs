//! Data models for discovered issues and the list handed to outputs.
//!
//! - [`IssueEntry`]: one issue link as found on an archive index page
//! - [`IssueList`]: everything one run found, ready for JSON serialization

use serde::{Deserialize, Serialize};

/// One periodical issue, as linked from a yearly index page.
///
/// `url` is whatever the page linked to (usually a site-relative path such as
/// `/issues/2015/jan/13/`); `label` is the anchor text, e.g. `January 13, 2015`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IssueEntry {
    pub url: String,
    pub label: String,
}

impl IssueEntry {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
        }
    }
}

/// The issues found by a single run.
///
/// Serialized as the JSON output file. Issue URLs in here are absolute.
#[derive(Debug, Deserialize, Serialize)]
pub struct IssueList {
    /// Site root the issue URLs were resolved against.
    pub site: String,
    /// Local date of the run in `YYYY-MM-DD` format.
    pub fetched_date: String,
    /// First year scanned (inclusive).
    pub first_year: i32,
    /// Last year scanned (inclusive).
    pub last_year: i32,
    /// Issues in discovery order: years ascending, then page order.
    pub issues: Vec<IssueEntry>,
}
