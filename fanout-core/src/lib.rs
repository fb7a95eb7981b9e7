//! fanout core library: domain types, config persistence, errors.
//!
//! - [`types`]: newtypes, source files, copy outcomes, audit records
//! - [`error`]: [`ConfigError`]
//! - [`config`]: load / save `~/.fanout/config.yaml`

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, LayoutKind};
pub use error::ConfigError;
pub use types::{CopyFailure, CopyOutcome, SourceFile, SyncRecord, TargetHost};
