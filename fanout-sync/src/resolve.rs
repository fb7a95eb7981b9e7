//! Source pattern expansion and target scoping.

use std::collections::BTreeSet;
use std::path::PathBuf;

use glob::MatchOptions;

use fanout_core::{SourceFile, TargetHost};

use crate::error::{io_err, SyncError};
use crate::share;

/// Resolved inputs for a run: files sorted by name, targets sorted by host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub files: Vec<SourceFile>,
    pub hosts: Vec<TargetHost>,
}

impl Plan {
    /// Target names joined for display.
    pub fn host_list(&self) -> String {
        self.hosts
            .iter()
            .map(TargetHost::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Resolve patterns and hosts into a [`Plan`].
///
/// Fails with [`SyncError::NoSourceFiles`], [`SyncError::InvalidHost`] or
/// [`SyncError::NoTargets`] before anything is shown to the operator.
pub fn plan<S: AsRef<str>>(
    patterns: &[S],
    hosts: &[TargetHost],
    local_host: &str,
) -> Result<Plan, SyncError> {
    let files = resolve_sources(patterns)?;
    let hosts = resolve_targets(hosts, local_host);
    if let Some(bad) = hosts.iter().find(|h| !share::is_plain_host(h.as_str())) {
        return Err(SyncError::InvalidHost {
            host: bad.to_string(),
        });
    }
    if hosts.is_empty() {
        return Err(SyncError::NoTargets {
            local_host: local_host.to_string(),
        });
    }
    Ok(Plan { files, hosts })
}

/// Expand glob patterns into existing regular files.
///
/// Patterns that match nothing are dropped silently; directories are
/// skipped. Results are absolute, de-duplicated, and sorted by file name.
pub fn resolve_sources<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<SourceFile>, SyncError> {
    let options = MatchOptions {
        case_sensitive: !cfg!(windows),
        ..MatchOptions::new()
    };

    let mut seen = BTreeSet::<PathBuf>::new();
    let mut files = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let entries = glob::glob_with(pattern, options).map_err(|source| SyncError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(err) => {
                    tracing::debug!("skipping unreadable match for {pattern}: {err}");
                    continue;
                }
            };
            let path = std::path::absolute(&path).map_err(|e| io_err(&path, e))?;
            if !seen.insert(path.clone()) {
                continue;
            }
            match SourceFile::read(&path) {
                Ok(file) => files.push(file),
                Err(err) => tracing::debug!("skipping {}: {err}", path.display()),
            }
        }
    }

    if files.is_empty() {
        return Err(SyncError::NoSourceFiles {
            patterns: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
    Ok(files)
}

/// Build the target scope: drop blanks and the local host, sort, de-duplicate.
///
/// Both the local-host match and de-duplication are case-insensitive.
pub fn resolve_targets(hosts: &[TargetHost], local_host: &str) -> Vec<TargetHost> {
    let mut scope: Vec<TargetHost> = hosts
        .iter()
        .map(|h| TargetHost::from(h.as_str().trim()))
        .filter(|h| !h.as_str().is_empty())
        .filter(|h| {
            let local = h.is_local(local_host);
            if local {
                tracing::debug!("excluding local host {h}");
            }
            !local
        })
        .collect();
    scope.sort_by(|a, b| {
        a.0.to_lowercase()
            .cmp(&b.0.to_lowercase())
            .then_with(|| a.0.cmp(&b.0))
    });
    scope.dedup_by(|a, b| a.0.eq_ignore_ascii_case(&b.0));
    scope
}
