//! Error types for fanout-sync.

use std::path::PathBuf;

use thiserror::Error;

use fanout_core::LayoutKind;

/// All errors that halt a fanout run.
///
/// Per-target copy failures are not errors; they are recorded as
/// [`fanout_core::CopyOutcome::Fail`] and the run continues.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source pattern is not a valid glob.
    #[error("invalid source pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// No pattern resolved to an existing file.
    #[error("no source files found matching: {patterns}")]
    NoSourceFiles { patterns: String },

    /// Every target was empty or matched the local host.
    #[error("no targets in scope (local host '{local_host}' excluded)")]
    NoTargets { local_host: String },

    /// A target name that cannot form a path segment (empty, `.`, `..`, or
    /// containing a path separator).
    #[error("invalid target host name '{host}'")]
    InvalidHost { host: String },

    /// A plan built by hand with no files or no targets.
    #[error("nothing to do: plan has {files} file(s) and {hosts} target(s)")]
    EmptyPlan { files: usize, hosts: usize },

    /// The source directory cannot be expressed in the chosen layout.
    #[error("cannot map {path} to a {layout} destination")]
    UnmappablePath { path: PathBuf, layout: LayoutKind },

    /// The layout cannot be used on this platform.
    #[error("{0} layout is not supported on this platform")]
    UnsupportedLayout(LayoutKind),

    /// Reading the operator's answer failed (closed stdin, etc.).
    #[error("operator prompt failed: {0}")]
    Prompt(#[source] std::io::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
