//! `fanout check`: compare sources against remote copies without writing.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use fanout_core::{types::DISPLAY_TIME_FORMAT, SourceFile};
use fanout_sync::{conflict, ConflictState, TargetCheck};

use super::TargetArgs;

/// Arguments for `fanout check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let resolved = self.target.resolve()?;
        let results =
            conflict::check_plan(&resolved.plan, &resolved.layout).context("conflict check failed")?;

        if self.json {
            print_json(&results, resolved.plan.hosts.len())?;
            return Ok(());
        }

        print_table(&results, resolved.plan.hosts.len());
        Ok(())
    }
}

#[derive(Serialize)]
struct CheckReportJson {
    summary: CheckSummaryJson,
    checks: Vec<TargetCheckJson>,
}

#[derive(Serialize)]
struct CheckSummaryJson {
    files: usize,
    targets: usize,
    conflicts: usize,
}

#[derive(Serialize)]
struct TargetCheckJson {
    source: String,
    host: String,
    destination: String,
    state: String,
    source_modified: String,
    destination_modified: Option<String>,
}

#[derive(Tabled)]
struct CheckTableRow {
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "host")]
    host: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "remote modified")]
    remote_modified: String,
    #[tabled(rename = "destination")]
    destination: String,
}

fn conflict_total(results: &[(SourceFile, Vec<TargetCheck>)]) -> usize {
    results
        .iter()
        .flat_map(|(_, checks)| checks.iter())
        .filter(|c| c.is_conflict())
        .count()
}

fn print_json(results: &[(SourceFile, Vec<TargetCheck>)], targets: usize) -> Result<()> {
    let payload = CheckReportJson {
        summary: CheckSummaryJson {
            files: results.len(),
            targets,
            conflicts: conflict_total(results),
        },
        checks: results
            .iter()
            .flat_map(|(source, checks)| {
                checks.iter().map(move |check| TargetCheckJson {
                    source: source.path.display().to_string(),
                    host: check.host.to_string(),
                    destination: check.destination.display().to_string(),
                    state: check.state.label().to_lowercase(),
                    source_modified: source.modified_local().to_rfc3339(),
                    destination_modified: check.destination_modified_local().map(|t| t.to_rfc3339()),
                })
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize check JSON")?
    );
    Ok(())
}

fn print_table(results: &[(SourceFile, Vec<TargetCheck>)], targets: usize) {
    let conflicts = conflict_total(results);
    println!(
        "fanout v{} | {} files | {} targets | {} conflicts",
        env!("CARGO_PKG_VERSION"),
        results.len(),
        targets,
        conflicts,
    );

    let rows: Vec<CheckTableRow> = results
        .iter()
        .flat_map(|(source, checks)| {
            checks.iter().map(move |check| CheckTableRow {
                file: source.name.clone(),
                host: check.host.to_string(),
                state: state_label(check.state),
                remote_modified: check
                    .destination_modified_local()
                    .map(|t| t.format(DISPLAY_TIME_FORMAT).to_string())
                    .unwrap_or_else(|| "-".to_string()),
                destination: check.destination.display().to_string(),
            })
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if conflicts > 0 {
        println!(
            "{}",
            format!("{conflicts} target copy(ies) are newer than the source; push will ask before overwriting.")
                .yellow()
        );
    }
}

fn state_label(state: ConflictState) -> String {
    let label = state.label();
    match state {
        ConflictState::Newer => label.yellow().bold().to_string(),
        ConflictState::Older => label.to_string(),
        ConflictState::Same => label.green().to_string(),
        ConflictState::Missing => label.bright_black().to_string(),
    }
}
