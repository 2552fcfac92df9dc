//! Capability-based filesystem helpers for feed snapshots and history files.
#![forbid(unsafe_code)]

use std::io::{self, Read};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Read a whole file, such as a saved feed snapshot, into memory.
pub fn read_file(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let mut file = fs_utf8::File::open_ambient(path, ambient_authority())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Create every missing directory above `path`.
///
/// Paths without a parent, or whose parent is the filesystem root, need no
/// work.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }
    let (anchor, below) = split_anchor(parent)?;
    if below.as_str().is_empty() {
        return Ok(());
    }
    anchor.create_dir_all(below)
}

/// Split `path` into an opened anchor directory and the path beneath it.
///
/// Absolute paths are anchored at their root (and drive prefix on Windows);
/// relative paths at the working directory. cap-std refuses to follow paths
/// that leave the anchor, so only the part below it is returned.
fn split_anchor(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, &Utf8Path)> {
    let root: Utf8PathBuf = path
        .components()
        .take_while(|component| {
            matches!(component, Utf8Component::Prefix(_) | Utf8Component::RootDir)
        })
        .collect();
    let (anchor, below) = if root.as_str().is_empty() {
        (Utf8PathBuf::from("."), path)
    } else {
        let below = path
            .strip_prefix(&root)
            .map_err(|_| io::Error::other(format!("cannot strip root from {path}")))?;
        (root, below)
    };
    let dir = fs_utf8::Dir::open_ambient_dir(&anchor, ambient_authority())?;
    Ok((dir, below))
}
