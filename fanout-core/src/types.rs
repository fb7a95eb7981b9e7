//! Domain types for fanout runs.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// `yyyy-MM-dd HH:mm`, used for audit records.
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// `yyyy-MM-dd HH:mm:ss`, used for operator-facing listings and warnings.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A remote machine name, reachable through a network share.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetHost(pub String);

impl TargetHost {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match against the local machine name.
    ///
    /// An empty local name never matches.
    pub fn is_local(&self, local_host: &str) -> bool {
        let local = local_host.trim();
        if local.is_empty() {
            return false;
        }
        self.0.to_lowercase().contains(&local.to_lowercase())
    }
}

impl fmt::Display for TargetHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TargetHost {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TargetHost {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Source files
// ---------------------------------------------------------------------------

/// A local file selected for distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path to the file.
    pub path: PathBuf,
    pub dir: PathBuf,
    pub name: String,
    pub modified: SystemTime,
}

impl SourceFile {
    /// Read metadata for `path`. The path should already be absolute.
    pub fn read(path: &Path) -> io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("path has no file name: {}", path.display()),
                )
            })?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self {
            path: path.to_path_buf(),
            dir,
            name,
            modified: meta.modified()?,
        })
    }

    pub fn modified_local(&self) -> DateTime<Local> {
        DateTime::<Local>::from(self.modified)
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

// ---------------------------------------------------------------------------
// Copy outcomes and audit records
// ---------------------------------------------------------------------------

/// Structured detail for a failed copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyFailure {
    pub kind: io::ErrorKind,
    pub message: String,
}

impl From<&io::Error> for CopyFailure {
    fn from(err: &io::Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<io::Error> for CopyFailure {
    fn from(err: io::Error) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for CopyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

/// Result of a single (file, target) copy attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Success,
    /// Dry run: the copy would have been attempted.
    WouldCopy,
    Fail(CopyFailure),
}

impl CopyOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CopyOutcome::Success => "Success",
            CopyOutcome::WouldCopy => "DryRun",
            CopyOutcome::Fail(_) => "Fail",
        }
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, CopyOutcome::Fail(_))
    }
}

/// One audit record per copy attempt.
///
/// Renders as `<yyyy-MM-dd HH:mm>;<outcome>;<source>;<destination>;<error>;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRecord {
    pub timestamp: DateTime<Local>,
    pub outcome: CopyOutcome,
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl SyncRecord {
    pub fn error_text(&self) -> &str {
        match &self.outcome {
            CopyOutcome::Fail(failure) => failure.message.as_str(),
            _ => "",
        }
    }
}

impl fmt::Display for SyncRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{};{};",
            self.timestamp.format(RECORD_TIME_FORMAT),
            self.outcome.label(),
            self.source.display(),
            self.destination.display(),
            self.error_text(),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
