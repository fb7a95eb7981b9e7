//! Audit log: one semicolon-delimited line per copy attempt.
//!
//! Lines are appended to a user-chosen file (see `log_file` in
//! `~/.fanout/config.yaml`); the parent directory is created on first use.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use fanout_core::{CopyOutcome, SyncRecord};

use crate::error::{io_err, SyncError};

/// Render records as audit lines. Dry-run records are skipped.
pub fn render(records: &[SyncRecord]) -> String {
    records
        .iter()
        .filter(|r| !matches!(r.outcome, CopyOutcome::WouldCopy))
        .map(|r| format!("{r}\n"))
        .collect()
}

/// Append `records` to the log at `path`. Returns the number of lines written.
pub fn append_at(path: &Path, records: &[SyncRecord]) -> Result<usize, SyncError> {
    let text = render(records);
    if text.is_empty() {
        return Ok(0);
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_err(path, e))?;
    file.write_all(text.as_bytes()).map_err(|e| io_err(path, e))?;
    file.flush().map_err(|e| io_err(path, e))?;

    let lines = text.lines().count();
    tracing::debug!("appended {lines} audit record(s) to {}", path.display());
    Ok(lines)
}
