//! fanout: push local files to the same path on a set of remote hosts.
//!
//! # Usage
//!
//! ```text
//! fanout push <PATTERN>... [--to web01,web02] [--local-host <name>]
//!             [--layout admin-share|net-mount] [--mount-root <dir>]
//!             [--dry-run] [--yes] [--log-file <path>]
//! fanout check <PATTERN>... [--to ...] [--json]
//! fanout hosts list|add <name>...|remove <name>...
//! ```

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{check::CheckArgs, hosts::HostsCommand, push::PushArgs};
use fanout_core::LayoutKind;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "fanout",
    version,
    about = "Copy files to the same location on many hosts, warning before overwriting newer copies",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy matching files to every target host.
    Push(PushArgs),

    /// Compare matching files against their remote copies without writing.
    Check(CheckArgs),

    /// Manage the configured host list.
    Hosts {
        #[command(subcommand)]
        command: HostsCommand,
    },
}

// ---------------------------------------------------------------------------
// Shared LayoutKind argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `LayoutKind` from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct LayoutArg(pub LayoutKind);

impl FromStr for LayoutArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin-share" => Ok(Self(LayoutKind::AdminShare)),
            "net-mount" => Ok(Self(LayoutKind::NetMount)),
            other => Err(format!(
                "unknown layout '{other}'; expected: admin-share, net-mount"
            )),
        }
    }
}

impl fmt::Display for LayoutArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<LayoutArg> for LayoutKind {
    fn from(l: LayoutArg) -> Self {
        l.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Push(args) => args.run(),
        Commands::Check(args) => args.run(),
        Commands::Hosts { command } => commands::hosts::run(command),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
