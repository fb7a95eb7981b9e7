//! Timestamp comparison between a source file and its destinations.
//!
//! State per target:
//! 1. `Missing` (no file at the destination, or it cannot be inspected)
//! 2. `Newer` (destination modified strictly after the source, a conflict)
//! 3. `Same`
//! 4. `Older`
//!
//! The check is informational: it never skips a copy on its own.

use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use fanout_core::{SourceFile, TargetHost};

use crate::resolve::Plan;
use crate::share::ShareLayout;
use crate::SyncError;

/// How a destination file compares to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictState {
    Missing,
    Older,
    Same,
    Newer,
}

impl ConflictState {
    pub fn label(self) -> &'static str {
        match self {
            ConflictState::Missing => "MISSING",
            ConflictState::Older => "OLDER",
            ConflictState::Same => "SAME",
            ConflictState::Newer => "NEWER",
        }
    }
}

/// Result of comparing one source file against one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCheck {
    pub host: TargetHost,
    pub destination: PathBuf,
    pub destination_modified: Option<SystemTime>,
    pub state: ConflictState,
}

impl TargetCheck {
    pub fn is_conflict(&self) -> bool {
        self.state == ConflictState::Newer
    }

    pub fn destination_modified_local(&self) -> Option<DateTime<Local>> {
        self.destination_modified.map(DateTime::<Local>::from)
    }
}

/// Compare modification times. Only a strictly newer destination conflicts.
pub fn classify(source: SystemTime, destination: Option<SystemTime>) -> ConflictState {
    match destination {
        None => ConflictState::Missing,
        Some(dest) if dest > source => ConflictState::Newer,
        Some(dest) if dest == source => ConflictState::Same,
        Some(_) => ConflictState::Older,
    }
}

/// Check `source` against every host in scope.
///
/// A destination that cannot be inspected (unreachable share, permission
/// denied) counts as missing; the copy phase reports the real failure.
pub fn check_targets(
    source: &SourceFile,
    hosts: &[TargetHost],
    layout: &ShareLayout,
) -> Result<Vec<TargetCheck>, SyncError> {
    let mut checks = Vec::with_capacity(hosts.len());
    for host in hosts {
        let destination = layout.destination_file(source, host)?;
        let destination_modified = match std::fs::metadata(&destination) {
            Ok(meta) if meta.is_file() => meta.modified().ok(),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!("no destination at {}: {err}", destination.display());
                None
            }
        };
        let state = classify(source.modified, destination_modified);
        if state == ConflictState::Newer {
            tracing::warn!(
                host = %host,
                destination = %destination.display(),
                "destination is newer than {}",
                source.path.display()
            );
        }
        checks.push(TargetCheck {
            host: host.clone(),
            destination,
            destination_modified,
            state,
        });
    }
    Ok(checks)
}

/// Run [`check_targets`] for every file in the plan. Never writes.
pub fn check_plan(
    plan: &Plan,
    layout: &ShareLayout,
) -> Result<Vec<(SourceFile, Vec<TargetCheck>)>, SyncError> {
    layout.ensure_supported()?;
    let mut results = Vec::with_capacity(plan.files.len());
    for file in &plan.files {
        let checks = check_targets(file, &plan.hosts, layout)?;
        results.push((file.clone(), checks));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    use filetime::{set_file_mtime, FileTime};
    use fanout_core::LayoutKind;
    use tempfile::TempDir;

    struct Fixture {
        _src: TempDir,
        mounts: TempDir,
        source: SourceFile,
        layout: ShareLayout,
    }

    fn fixture() -> Fixture {
        let src = TempDir::new().expect("src");
        let mounts = TempDir::new().expect("mounts");
        let path = src.path().join("app.config");
        fs::write(&path, "v1").expect("write source");
        set_file_mtime(&path, FileTime::from_unix_time(1_700_000_000, 0)).expect("mtime");
        let source = SourceFile::read(&path).expect("read");
        let layout = ShareLayout::new(LayoutKind::NetMount, mounts.path());
        Fixture {
            _src: src,
            mounts,
            source,
            layout,
        }
    }

    fn place(fx: &Fixture, host: &str, unix_secs: i64) -> PathBuf {
        let dest = fx
            .layout
            .destination_file(&fx.source, &TargetHost::from(host))
            .expect("map");
        fs::create_dir_all(dest.parent().unwrap()).expect("mkdir");
        fs::write(&dest, "remote").expect("write dest");
        set_file_mtime(&dest, FileTime::from_unix_time(unix_secs, 0)).expect("mtime");
        dest
    }

    #[test]
    fn classify_orders_by_mtime() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let later = t + Duration::from_secs(1);
        let earlier = t - Duration::from_secs(1);
        assert_eq!(classify(t, None), ConflictState::Missing);
        assert_eq!(classify(t, Some(later)), ConflictState::Newer);
        assert_eq!(classify(t, Some(t)), ConflictState::Same);
        assert_eq!(classify(t, Some(earlier)), ConflictState::Older);
    }

    #[test]
    fn sub_second_newer_destination_still_conflicts() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let later = t + Duration::from_millis(1);
        assert_eq!(classify(t, Some(later)), ConflictState::Newer);
    }

    #[cfg(unix)]
    #[test]
    fn check_reports_each_host_state() {
        let fx = fixture();
        place(&fx, "web01", 1_800_000_000);
        place(&fx, "web02", 1_600_000_000);
        place(&fx, "web03", 1_700_000_000);

        let hosts: Vec<TargetHost> = ["web01", "web02", "web03", "web04"]
            .into_iter()
            .map(TargetHost::from)
            .collect();
        let checks = check_targets(&fx.source, &hosts, &fx.layout).expect("check");
        let states: Vec<_> = checks.iter().map(|c| c.state).collect();
        assert_eq!(
            states,
            vec![
                ConflictState::Newer,
                ConflictState::Older,
                ConflictState::Same,
                ConflictState::Missing
            ]
        );
        assert_eq!(checks.iter().filter(|c| c.is_conflict()).count(), 1);
        assert!(checks[0].destination.starts_with(fx.mounts.path().join("web01")));
        assert!(checks[3].destination_modified.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn directory_at_destination_counts_as_missing() {
        let fx = fixture();
        let dest = fx
            .layout
            .destination_file(&fx.source, &TargetHost::from("web01"))
            .expect("map");
        fs::create_dir_all(&dest).expect("mkdir");

        let checks =
            check_targets(&fx.source, &[TargetHost::from("web01")], &fx.layout).expect("check");
        assert_eq!(checks[0].state, ConflictState::Missing);
    }

    #[cfg(unix)]
    #[test]
    fn check_plan_never_creates_destinations() {
        let fx = fixture();
        let plan = Plan {
            files: vec![fx.source.clone()],
            hosts: vec![TargetHost::from("web01")],
        };
        let results = check_plan(&plan, &fx.layout).expect("check");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1[0].state, ConflictState::Missing);
        assert!(!fx.mounts.path().join("web01").exists());
    }

    #[test]
    fn labels_are_uppercase() {
        assert_eq!(ConflictState::Newer.label(), "NEWER");
        assert_eq!(ConflictState::Missing.label(), "MISSING");
    }
}
