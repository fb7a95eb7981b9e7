//! `fanout push`: copy files to every target host.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use fanout_core::{types::DISPLAY_TIME_FORMAT, CopyOutcome, SyncRecord};
use fanout_sync::{audit, prompt, Operator, Plan, SyncEvent, SyncOptions, SyncReport};

use super::TargetArgs;

/// Arguments for `fanout push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Show the plan and conflicts without prompting or copying anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Answer "Y" to every prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Append one line per copy attempt to this file (overrides `log_file`).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl PushArgs {
    pub fn run(self) -> Result<()> {
        let resolved = self.target.resolve()?;
        let log_file = self
            .log_file
            .clone()
            .or_else(|| resolved.config.log_file.clone());

        let mut operator = ConsoleOperator {
            assume_yes: self.yes,
        };
        let options = SyncOptions {
            dry_run: self.dry_run,
        };
        let report = fanout_sync::run(&resolved.plan, &resolved.layout, &mut operator, options)
            .context("push failed")?;

        if let Some(path) = log_file.filter(|_| !self.dry_run) {
            audit::append_at(&path, &report.all_records())
                .with_context(|| format!("failed to append audit log {}", path.display()))?;
        }

        print_summary(&report);
        if let Some(halt) = &report.halt {
            bail!("{halt}");
        }
        let incomplete = report.fail_count() + report.missing_count();
        if incomplete > 0 {
            bail!("{incomplete} copy attempt(s) did not complete");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Console operator
// ---------------------------------------------------------------------------

struct ConsoleOperator {
    assume_yes: bool,
}

impl Operator for ConsoleOperator {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        if self.assume_yes {
            println!("{question} [Y/N] Y");
            return Ok(true);
        }
        let stdin = io::stdin();
        prompt::ask_yes_no(&mut stdin.lock(), &mut io::stdout(), question)
    }

    fn report(&mut self, event: SyncEvent<'_>) {
        match event {
            SyncEvent::Planned(plan) => print_plan(plan),
            SyncEvent::Conflict { source, check } => {
                let remote_time = check
                    .destination_modified_local()
                    .map(|t| t.format(DISPLAY_TIME_FORMAT).to_string())
                    .unwrap_or_default();
                let line = format!(
                    "⚠ {}: {} ({remote_time}) is newer than {} ({})",
                    check.host,
                    check.destination.display(),
                    source.name,
                    source.modified_local().format(DISPLAY_TIME_FORMAT),
                );
                println!("{}", line.yellow());
            }
            SyncEvent::Copied(record) => print_copied(record),
            SyncEvent::CopyFailed(record) => println!(
                "  {} {}: {}",
                "✗".red().bold(),
                record.destination.display(),
                record.error_text().red()
            ),
            SyncEvent::DestinationMissing {
                host, directory, ..
            } => println!(
                "  {} {host}: destination not found: {}",
                "✗".red().bold(),
                directory.display()
            ),
            SyncEvent::Halted(halt) => println!("{}", format!("Halted: {halt}").yellow().bold()),
        }
    }
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "modified")]
    modified: String,
    #[tabled(rename = "file")]
    name: String,
    #[tabled(rename = "directory")]
    directory: String,
}

fn print_plan(plan: &Plan) {
    let rows: Vec<PlanRow> = plan
        .files
        .iter()
        .map(|file| PlanRow {
            modified: file.modified_local().format(DISPLAY_TIME_FORMAT).to_string(),
            name: file.name.clone(),
            directory: file.dir.display().to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!(
        "Files ({}) | Targets ({}): {}",
        plan.files.len(),
        plan.hosts.len(),
        plan.host_list()
    );
}

fn print_copied(record: &SyncRecord) {
    match record.outcome {
        CopyOutcome::WouldCopy => {
            println!("  [dry-run] ~  {}", record.destination.display())
        }
        _ => println!("  {} {}", "✓".green().bold(), record.destination.display()),
    }
}

fn print_summary(report: &SyncReport) {
    if report.dry_run {
        println!(
            "[dry-run] {} copy(ies) planned, {} conflict(s), nothing written",
            report.success_count(),
            report.conflict_count()
        );
        return;
    }

    let line = format!(
        "{} copied, {} failed, {} destination(s) missing",
        report.success_count(),
        report.fail_count(),
        report.missing_count()
    );
    if report.fail_count() + report.missing_count() > 0 || report.halt.is_some() {
        println!("{}", line.red());
    } else {
        println!("{} {}", "✓".green().bold(), line.green());
    }
}
