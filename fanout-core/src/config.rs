//! Per-user YAML config.
//!
//! # Storage layout
//!
//! ```text
//! ~/.fanout/
//!   config.yaml   (mode 0600; directory mode 0700)
//! ```
//!
//! # API pattern
//!
//! Every function touching disk has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::TargetHost;

// ---------------------------------------------------------------------------
// 1. Schema
// ---------------------------------------------------------------------------

/// How a source directory is addressed on a target host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    /// `\\<host>\C$\...` administrative shares (Windows).
    AdminShare,
    /// `<mount_root>/<host>/...` automounted host trees.
    NetMount,
}

impl LayoutKind {
    /// Platform default: admin shares on Windows, net mounts elsewhere.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            LayoutKind::AdminShare
        } else {
            LayoutKind::NetMount
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutKind::AdminShare => write!(f, "admin-share"),
            LayoutKind::NetMount => write!(f, "net-mount"),
        }
    }
}

/// Default automount root for [`LayoutKind::NetMount`].
pub const DEFAULT_MOUNT_ROOT: &str = "/net";

/// Contents of `~/.fanout/config.yaml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Known hosts; used when a command is given no explicit targets.
    pub hosts: Vec<TargetHost>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount_root: Option<PathBuf>,
    /// Audit log; records are appended after each non-dry run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Add hosts not already present (case-insensitive). Returns the added names.
    pub fn add_hosts<I, S>(&mut self, names: I) -> Vec<TargetHost>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || self.has_host(name) {
                continue;
            }
            let host = TargetHost::from(name);
            self.hosts.push(host.clone());
            added.push(host);
        }
        self.hosts
            .sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));
        added
    }

    /// Remove hosts by name (case-insensitive). Returns the removed names.
    pub fn remove_hosts<I, S>(&mut self, names: I) -> Vec<TargetHost>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_lowercase())
            .collect();
        let mut removed = Vec::new();
        self.hosts.retain(|host| {
            if wanted.contains(&host.0.to_lowercase()) {
                removed.push(host.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn has_host(&self, name: &str) -> bool {
        self.hosts.iter().any(|h| h.0.eq_ignore_ascii_case(name))
    }

    pub fn layout_or_default(&self) -> LayoutKind {
        self.layout.unwrap_or_else(LayoutKind::platform_default)
    }

    pub fn mount_root_or_default(&self) -> PathBuf {
        self.mount_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MOUNT_ROOT))
    }
}

// ---------------------------------------------------------------------------
// 2. Paths
// ---------------------------------------------------------------------------

/// `<home>/.fanout/`: pure, no I/O.
pub fn config_dir_at(home: &Path) -> PathBuf {
    home.join(".fanout")
}

/// `<home>/.fanout/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    config_dir_at(home).join("config.yaml")
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load `<home>/.fanout/config.yaml`.
///
/// A missing file yields [`Config::default`]; malformed YAML yields
/// `ConfigError::Parse` with the file path.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 4. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `<home>/.fanout/config.yaml`.
///
/// Write flow: serialize → `config.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<(), ConfigError> {
    let dir = config_dir_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = config_path_at(home);
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    save_at(&home()?, config)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
