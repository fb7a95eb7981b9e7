//! Per-target copy.
//!
//! ## `copy_to_target`
//!
//! 1. Map the source directory onto the target (same rule as the conflict check).
//! 2. Dry run → `WouldCopy`, nothing touched.
//! 3. Create the destination directory if absent; creation errors are ignored.
//! 4. Directory still absent → `DestinationMissing`, no copy, no record.
//! 5. Copy content, then stamp the source mtime onto the destination.
//! 6. Record `Success` or `Fail` with the I/O error detail.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use filetime::{set_file_mtime, FileTime};

use fanout_core::{CopyFailure, CopyOutcome, SourceFile, SyncRecord, TargetHost};

use crate::share::ShareLayout;
use crate::SyncError;

/// What happened for one (file, target) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyAttempt {
    /// The destination directory was absent and could not be created.
    DestinationMissing { host: TargetHost, directory: PathBuf },
    /// A copy was attempted (or would have been, in a dry run).
    Attempted(SyncRecord),
}

/// Copy `source` to its mapped location on `host`.
///
/// Only a mapping failure is an `Err`; I/O failures become
/// [`CopyOutcome::Fail`] records so the caller can move on to the next target.
pub fn copy_to_target(
    source: &SourceFile,
    host: &TargetHost,
    layout: &ShareLayout,
    started_at: DateTime<Local>,
    dry_run: bool,
) -> Result<CopyAttempt, SyncError> {
    let directory = layout.destination_dir(&source.dir, host)?;
    let destination = directory.join(&source.name);
    let record = |outcome: CopyOutcome| {
        CopyAttempt::Attempted(SyncRecord {
            timestamp: started_at,
            outcome,
            source: source.path.clone(),
            destination: destination.clone(),
        })
    };

    if dry_run {
        tracing::info!("[dry-run] would copy: {}", destination.display());
        return Ok(record(CopyOutcome::WouldCopy));
    }

    if !ensure_dir(&directory) {
        tracing::error!(
            host = %host,
            "destination directory not found: {}",
            directory.display()
        );
        return Ok(CopyAttempt::DestinationMissing {
            host: host.clone(),
            directory,
        });
    }

    match copy_file(source, &destination) {
        Ok(()) => {
            tracing::info!("copied: {}", destination.display());
            Ok(record(CopyOutcome::Success))
        }
        Err(err) => {
            tracing::error!("copy to {} failed: {err}", destination.display());
            Ok(record(CopyOutcome::Fail(CopyFailure::from(&err))))
        }
    }
}

/// Create `dir` if needed. Returns whether it exists afterwards.
fn ensure_dir(dir: &Path) -> bool {
    if dir.is_dir() {
        return true;
    }
    if let Err(err) = std::fs::create_dir_all(dir) {
        tracing::debug!("could not create {}: {err}", dir.display());
    }
    dir.is_dir()
}

/// Copy content and carry the source mtime over, so a re-run sees `Same`.
fn copy_file(source: &SourceFile, destination: &Path) -> std::io::Result<()> {
    std::fs::copy(&source.path, destination)?;
    set_file_mtime(destination, FileTime::from_system_time(source.modified))
}
