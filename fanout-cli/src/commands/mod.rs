//! Subcommands, plus the target flags shared by `push` and `check`.

pub mod check;
pub mod hosts;
pub mod push;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use fanout_core::{config, Config, LayoutKind, TargetHost};
use fanout_sync::{Plan, ShareLayout};

use crate::LayoutArg;

/// Source patterns and target selection.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Source files; wildcards are expanded (quote them to keep the shell out).
    #[arg(required = true, value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Target hosts, comma separated or repeated. Defaults to the configured list.
    #[arg(long = "to", value_name = "HOST", value_delimiter = ',')]
    pub to: Vec<String>,

    /// Name of this machine. It is never a target.
    #[arg(long, value_name = "NAME")]
    pub local_host: Option<String>,

    /// admin-share | net-mount. Defaults to admin-share on Windows.
    #[arg(long, value_name = "LAYOUT")]
    pub layout: Option<LayoutArg>,

    /// Root of the per-host mounts for the net-mount layout (default /net).
    #[arg(long, value_name = "DIR")]
    pub mount_root: Option<PathBuf>,
}

/// Everything a run needs once flags and config are merged.
pub struct Resolved {
    pub config: Config,
    pub plan: Plan,
    pub layout: ShareLayout,
}

impl TargetArgs {
    /// Merge flags over `~/.fanout/config.yaml` and resolve the plan.
    pub fn resolve(&self) -> Result<Resolved> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config = config::load_at(&home).with_context(|| {
            format!(
                "failed to load {}",
                config::config_path_at(&home).display()
            )
        })?;

        let local_host = local_host(self.local_host.as_deref(), &config)?;
        let kind: LayoutKind = self
            .layout
            .map(Into::into)
            .unwrap_or_else(|| config.layout_or_default());
        let root = self
            .mount_root
            .clone()
            .unwrap_or_else(|| config.mount_root_or_default());
        let layout = ShareLayout::new(kind, root);
        layout.ensure_supported()?;

        let hosts: Vec<TargetHost> = if self.to.is_empty() {
            config.hosts.clone()
        } else {
            self.to.iter().map(|h| TargetHost::from(h.as_str())).collect()
        };
        tracing::debug!(local_host = %local_host, layout = %kind, "resolving plan");
        let plan = fanout_sync::plan(&self.patterns, &hosts, &local_host)?;

        Ok(Resolved {
            config,
            plan,
            layout,
        })
    }
}

/// First non-blank of: flag, config, `COMPUTERNAME`, `HOSTNAME`, `/etc/hostname`.
fn local_host(flag: Option<&str>, config: &Config) -> Result<String> {
    first_name([
        flag.map(str::to_string),
        config.local_host.clone(),
        std::env::var("COMPUTERNAME").ok(),
        std::env::var("HOSTNAME").ok(),
        std::fs::read_to_string("/etc/hostname").ok(),
    ])
    .context("could not determine the local host name; pass --local-host or set local_host in the config")
}

fn first_name<I: IntoIterator<Item = Option<String>>>(candidates: I) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
}
