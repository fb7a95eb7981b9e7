//! Sync orchestration shared by `fanout push` and tests.
//!
//! ```text
//! plan ─▶ confirm ─▶ for each file:
//!                      re-check source ─▶ conflict check ─▶ [overwrite gate] ─▶ copy per target
//! ```
//!
//! Answering "no" at either gate halts the run, and so does any error once
//! the first file is under way. Everything done before that point stays in
//! the returned [`SyncReport`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use fanout_core::{SourceFile, SyncRecord, TargetHost};

use crate::conflict::{self, TargetCheck};
use crate::copy::{self, CopyAttempt};
use crate::resolve::Plan;
use crate::share::ShareLayout;
use crate::SyncError;

// ---------------------------------------------------------------------------
// Operator capability
// ---------------------------------------------------------------------------

/// Something the orchestrator tells the operator while it runs.
#[derive(Debug, Clone, Copy)]
pub enum SyncEvent<'a> {
    /// Resolved plan, shown before the first prompt.
    Planned(&'a Plan),
    /// A destination is newer than the source.
    Conflict {
        source: &'a SourceFile,
        check: &'a TargetCheck,
    },
    /// A copy finished (or would have, in a dry run).
    Copied(&'a SyncRecord),
    /// A copy failed; the run continues with the next target.
    CopyFailed(&'a SyncRecord),
    /// The destination directory was absent and could not be created.
    DestinationMissing {
        source: &'a SourceFile,
        host: &'a TargetHost,
        directory: &'a Path,
    },
    /// The run stopped early.
    Halted(&'a Halt),
}

/// The interactive side of a run: yes/no answers and progress display.
pub trait Operator {
    /// Ask a yes/no question. `Ok(false)` halts the run.
    fn confirm(&mut self, question: &str) -> io::Result<bool>;

    fn report(&mut self, _event: SyncEvent<'_>) {}
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Which prompt the operator declined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptStage {
    Start,
    Overwrite { file: PathBuf, conflicts: usize },
}

/// Why a run stopped before processing every file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    Declined(PromptStage),
    SourceVanished { path: PathBuf },
    /// An error after copying had started; the report keeps what was done.
    Failed { reason: String },
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Halt::Declined(PromptStage::Start) => write!(f, "run cancelled by operator"),
            Halt::Declined(PromptStage::Overwrite { file, conflicts }) => write!(
                f,
                "overwrite of {} declined ({conflicts} newer target copies kept)",
                file.display()
            ),
            Halt::SourceVanished { path } => {
                write!(f, "source file disappeared: {}", path.display())
            }
            Halt::Failed { reason } => write!(f, "run aborted: {reason}"),
        }
    }
}

/// Outcome of processing one source file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub source: SourceFile,
    pub checks: Vec<TargetCheck>,
    pub records: Vec<SyncRecord>,
    pub missing_destinations: Vec<(TargetHost, PathBuf)>,
}

impl FileReport {
    fn new(source: SourceFile) -> Self {
        Self {
            source,
            checks: Vec::new(),
            records: Vec::new(),
            missing_destinations: Vec::new(),
        }
    }

    pub fn conflict_count(&self) -> usize {
        self.checks.iter().filter(|c| c.is_conflict()).count()
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub started_at: DateTime<Local>,
    pub dry_run: bool,
    pub files: Vec<FileReport>,
    pub halt: Option<Halt>,
}

impl SyncReport {
    pub fn records(&self) -> impl Iterator<Item = &SyncRecord> {
        self.files.iter().flat_map(|f| f.records.iter())
    }

    /// Flattened records in processing order, for the audit log.
    pub fn all_records(&self) -> Vec<SyncRecord> {
        self.records().cloned().collect()
    }

    pub fn success_count(&self) -> usize {
        self.records().filter(|r| !r.outcome.is_fail()).count()
    }

    pub fn fail_count(&self) -> usize {
        self.records().filter(|r| r.outcome.is_fail()).count()
    }

    pub fn missing_count(&self) -> usize {
        self.files.iter().map(|f| f.missing_destinations.len()).sum()
    }

    pub fn conflict_count(&self) -> usize {
        self.files.iter().map(FileReport::conflict_count).sum()
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Options for [`run`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Report what would be copied; no prompts, no directories, no copies.
    pub dry_run: bool,
}

/// Run the sync for a resolved plan.
///
/// Files are processed one at a time, targets one at a time. Copy failures
/// and missing destinations only affect their own (file, target) pair.
pub fn run(
    plan: &Plan,
    layout: &ShareLayout,
    operator: &mut dyn Operator,
    options: SyncOptions,
) -> Result<SyncReport, SyncError> {
    layout.ensure_supported()?;
    if plan.files.is_empty() || plan.hosts.is_empty() {
        return Err(SyncError::EmptyPlan {
            files: plan.files.len(),
            hosts: plan.hosts.len(),
        });
    }

    let mut report = SyncReport {
        started_at: Local::now(),
        dry_run: options.dry_run,
        files: Vec::with_capacity(plan.files.len()),
        halt: None,
    };

    operator.report(SyncEvent::Planned(plan));
    if !options.dry_run {
        let question = format!(
            "Copy {} file(s) to {} target(s)?",
            plan.files.len(),
            plan.hosts.len()
        );
        if !confirm(operator, &question)? {
            return Ok(halt(report, operator, Halt::Declined(PromptStage::Start)));
        }
    }

    for source in &plan.files {
        if !source.exists() {
            tracing::error!("source file disappeared: {}", source.path.display());
            let reason = Halt::SourceVanished {
                path: source.path.clone(),
            };
            return Ok(halt(report, operator, reason));
        }

        let mut file_report = FileReport::new(source.clone());
        let step = sync_file(
            source,
            plan,
            layout,
            operator,
            options,
            report.started_at,
            &mut file_report,
        );
        report.files.push(file_report);
        match step {
            Ok(None) => {}
            Ok(Some(reason)) => return Ok(halt(report, operator, reason)),
            Err(err) => {
                tracing::error!("run aborted at {}: {err}", source.path.display());
                let reason = Halt::Failed {
                    reason: err.to_string(),
                };
                return Ok(halt(report, operator, reason));
            }
        }
    }

    Ok(report)
}

/// Conflict check, overwrite gate and copies for one file.
///
/// Records land in `file_report` as they happen, so an error part-way
/// through still leaves the earlier copies in the report.
fn sync_file(
    source: &SourceFile,
    plan: &Plan,
    layout: &ShareLayout,
    operator: &mut dyn Operator,
    options: SyncOptions,
    started_at: DateTime<Local>,
    file_report: &mut FileReport,
) -> Result<Option<Halt>, SyncError> {
    file_report.checks = conflict::check_targets(source, &plan.hosts, layout)?;
    for check in file_report.checks.iter().filter(|c| c.is_conflict()) {
        operator.report(SyncEvent::Conflict { source, check });
    }

    let conflicts = file_report.conflict_count();
    if conflicts > 0 && !options.dry_run {
        let question = format!(
            "{conflicts} target(s) hold a newer copy of {}. Overwrite newer files with older ones?",
            source.name
        );
        if !confirm(operator, &question)? {
            return Ok(Some(Halt::Declined(PromptStage::Overwrite {
                file: source.path.clone(),
                conflicts,
            })));
        }
    }

    for host in &plan.hosts {
        match copy::copy_to_target(source, host, layout, started_at, options.dry_run)? {
            CopyAttempt::DestinationMissing { host, directory } => {
                operator.report(SyncEvent::DestinationMissing {
                    source,
                    host: &host,
                    directory: &directory,
                });
                file_report.missing_destinations.push((host, directory));
            }
            CopyAttempt::Attempted(record) => {
                if record.outcome.is_fail() {
                    operator.report(SyncEvent::CopyFailed(&record));
                } else {
                    operator.report(SyncEvent::Copied(&record));
                }
                file_report.records.push(record);
            }
        }
    }
    Ok(None)
}

fn confirm(operator: &mut dyn Operator, question: &str) -> Result<bool, SyncError> {
    operator.confirm(question).map_err(SyncError::Prompt)
}

fn halt(mut report: SyncReport, operator: &mut dyn Operator, reason: Halt) -> SyncReport {
    tracing::warn!("run halted: {reason}");
    operator.report(SyncEvent::Halted(&reason));
    report.halt = Some(reason);
    report
}
