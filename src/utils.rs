//! Small helpers for logging and the file system.

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Strings longer than `max` bytes are cut at the nearest character boundary
/// at or below `max`, with `"…(+N bytes)"` appended.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
