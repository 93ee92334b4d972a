//! JSON output of the issue list.
//!
//! One file per run date:
//! ```text
//! json_output_dir/
//! └── issues_2015-02-01.json
//! ```
//! A second run on the same day overwrites the file.

use crate::error::Error;
use crate::models::IssueList;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Write `list` to `{json_output_dir}/issues_{fetched_date}.json`.
///
/// Creates the directory if it does not exist and returns the written path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_issue_list(list: &IssueList, json_output_dir: &str) -> Result<PathBuf, Error> {
    let json = serde_json::to_string_pretty(list)?;

    fs::create_dir_all(json_output_dir).await?;
    let path = PathBuf::from(json_output_dir).join(format!("issues_{}.json", list.fetched_date));

    info!(path = %path.display(), count = list.issues.len(), "Writing JSON");
    fs::write(&path, json).await?;
    Ok(path)
}
