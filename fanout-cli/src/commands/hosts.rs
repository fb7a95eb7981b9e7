//! `fanout hosts list|add|remove`

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use fanout_core::{config, TargetHost};
use fanout_sync::share;

/// Manage the host list in `~/.fanout/config.yaml`.
#[derive(Subcommand, Debug)]
pub enum HostsCommand {
    /// List configured hosts.
    List,

    /// Add hosts to the list.
    Add(HostNames),

    /// Remove hosts from the list.
    Remove(HostNames),
}

#[derive(Args, Debug)]
pub struct HostNames {
    /// Host names, space or comma separated.
    #[arg(required = true, value_name = "HOST", value_delimiter = ',')]
    pub names: Vec<String>,
}

pub fn run(cmd: HostsCommand) -> Result<()> {
    match cmd {
        HostsCommand::List => list(),
        HostsCommand::Add(args) => add(args),
        HostsCommand::Remove(args) => remove(args),
    }
}

fn list() -> Result<()> {
    let config = config::load().context("failed to load config")?;
    if config.hosts.is_empty() {
        println!("No hosts configured.");
        println!("Run: fanout hosts add <name>...");
        return Ok(());
    }
    for host in &config.hosts {
        println!("  {host}");
    }
    Ok(())
}

fn add(args: HostNames) -> Result<()> {
    if let Some(bad) = args
        .names
        .iter()
        .map(|n| n.trim())
        .find(|n| !n.is_empty() && !share::is_plain_host(n))
    {
        bail!("invalid host name '{bad}'");
    }
    let mut config = config::load().context("failed to load config")?;
    let added = config.add_hosts(&args.names);
    if added.is_empty() {
        println!("All hosts already configured.");
        return Ok(());
    }
    config::save(&config).context("failed to save config")?;
    println!("✓ Added {}", join(&added));
    Ok(())
}

fn remove(args: HostNames) -> Result<()> {
    let mut config = config::load().context("failed to load config")?;
    let removed = config.remove_hosts(&args.names);
    if removed.is_empty() {
        println!("No matching hosts configured.");
        return Ok(());
    }
    config::save(&config).context("failed to save config")?;
    println!("✓ Removed {}", join(&removed));
    Ok(())
}

fn join(hosts: &[TargetHost]) -> String {
    hosts
        .iter()
        .map(TargetHost::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
