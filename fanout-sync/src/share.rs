//! Destination path mapping.
//!
//! One function per layout, used by both the conflict check and the copy
//! phase so the two can never disagree about where a file lands.
//!
//! ## Admin share
//!
//! | source directory        | destination on `web01`        |
//! |-------------------------|-------------------------------|
//! | `C:\apps\tool`          | `\\web01\C$\apps\tool`        |
//! | `\\build01\drop\tool`   | `\\web01\drop\tool`           |
//!
//! ## Net mount
//!
//! `/srv/app` on `web01` with root `/net` → `/net/web01/srv/app`.

use std::path::{Component, Path, PathBuf, Prefix};

use fanout_core::{LayoutKind, SourceFile, TargetHost};

use crate::SyncError;

const SEP: char = '\\';
const UNC_PREFIX: &str = r"\\";

/// Where destination files live for a given target host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareLayout {
    AdminShare,
    NetMount { root: PathBuf },
}

impl ShareLayout {
    pub fn new(kind: LayoutKind, mount_root: impl Into<PathBuf>) -> Self {
        match kind {
            LayoutKind::AdminShare => ShareLayout::AdminShare,
            LayoutKind::NetMount => ShareLayout::NetMount {
                root: mount_root.into(),
            },
        }
    }

    pub fn kind(&self) -> LayoutKind {
        match self {
            ShareLayout::AdminShare => LayoutKind::AdminShare,
            ShareLayout::NetMount { .. } => LayoutKind::NetMount,
        }
    }

    /// Admin share paths only resolve through the Windows redirector.
    pub fn ensure_supported(&self) -> Result<(), SyncError> {
        match self {
            ShareLayout::AdminShare if !cfg!(windows) => {
                Err(SyncError::UnsupportedLayout(LayoutKind::AdminShare))
            }
            _ => Ok(()),
        }
    }

    /// Destination directory for `source_dir` on `host`.
    pub fn destination_dir(
        &self,
        source_dir: &Path,
        host: &TargetHost,
    ) -> Result<PathBuf, SyncError> {
        let mapped = match self {
            ShareLayout::AdminShare => source_dir
                .to_str()
                .and_then(|dir| admin_share_dir(dir, host.as_str()))
                .map(PathBuf::from),
            ShareLayout::NetMount { root } => net_mount_dir(root, source_dir, host.as_str()),
        };
        mapped.ok_or_else(|| SyncError::UnmappablePath {
            path: source_dir.to_path_buf(),
            layout: self.kind(),
        })
    }

    /// Destination file path for `source` on `host`.
    pub fn destination_file(
        &self,
        source: &SourceFile,
        host: &TargetHost,
    ) -> Result<PathBuf, SyncError> {
        let dir = self.destination_dir(&source.dir, host)?;
        Ok(dir.join(&source.name))
    }
}

/// Map a source directory to its administrative-share path on `host`.
///
/// - `\\origin\share\sub` → `\\host\share\sub` (everything after the origin
///   host is kept verbatim)
/// - `X:\sub` → `\\host\X$\sub`
///
/// Forward slashes are accepted and normalised. Returns `None` for any other
/// shape, or for a host name that would break the path.
pub fn admin_share_dir(source_dir: &str, host: &str) -> Option<String> {
    if !is_plain_host(host) {
        return None;
    }
    let normalized = source_dir.replace('/', "\\");

    if let Some(rest) = normalized.strip_prefix(UNC_PREFIX) {
        let (origin, tail) = match rest.split_once(SEP) {
            Some((origin, tail)) => (origin, tail.trim_end_matches(SEP)),
            None => (rest, ""),
        };
        if origin.is_empty() {
            return None;
        }
        if tail.is_empty() {
            return Some(format!(r"\\{host}"));
        }
        return Some(format!(r"\\{host}\{tail}"));
    }

    let mut chars = normalized.chars();
    let drive = chars.next()?;
    if !drive.is_ascii_alphabetic() || chars.next() != Some(':') {
        return None;
    }
    let sub = chars.as_str().trim_matches(SEP);
    if sub.is_empty() {
        return Some(format!(r"\\{host}\{drive}$"));
    }
    Some(format!(r"\\{host}\{drive}$\{sub}"))
}

/// Map an absolute source directory under `root/<host>/`.
///
/// Drive letters become a leading `C` segment and UNC sources keep their
/// share name, so `C:\apps` → `<root>/<host>/C/apps`.
pub fn net_mount_dir(root: &Path, source_dir: &Path, host: &str) -> Option<PathBuf> {
    if !is_plain_host(host) || !source_dir.is_absolute() {
        return None;
    }
    let mut out = root.join(host);
    for component in source_dir.components() {
        match component {
            Component::Prefix(prefix) => match prefix.kind() {
                Prefix::Disk(letter) | Prefix::VerbatimDisk(letter) => {
                    out.push((letter as char).to_string());
                }
                Prefix::UNC(_, share) | Prefix::VerbatimUNC(_, share) => out.push(share),
                _ => return None,
            },
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir => return None,
            Component::Normal(segment) => out.push(segment),
        }
    }
    Some(out)
}

/// Whether `host` can be used as a single path segment in a destination.
pub fn is_plain_host(host: &str) -> bool {
    !host.is_empty()
        && host != "."
        && host != ".."
        && !host.contains(['/', '\\'])
}
