//! Output generation for the collected issue list.
//!
//! - [`listing`]: text lines for the terminal
//! - [`json`]: the [`IssueList`](crate::models::IssueList) document on disk

pub mod json;
pub mod listing;
