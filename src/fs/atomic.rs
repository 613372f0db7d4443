//! Atomic file replacement.
//!
//! A save must never leave the configuration file half written, so every
//! write goes through the same sequence:
//! 1. Write content to `.{filename}.tmp` in the target's directory
//! 2. Sync the temporary file to disk
//! 3. Give it the target's permissions, if the target exists
//! 4. Rename it over the target
//!
//! Source and destination live in the same directory, so the rename stays on
//! one filesystem and is atomic on POSIX. On crash, the temporary file may be
//! left behind; the target is either the old or the new content.

use crate::error::{ConfigError, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Atomically replace `path` with `content`.
///
/// # Returns
///
/// * `Ok(())` - The target now holds exactly `content`
/// * `Err(ConfigError::Write)` - Temp file creation, sync or rename failed;
///   the target is untouched
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let write_error = |source: io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    let temp_path = temp_path_for(path).map_err(write_error)?;

    if let Err(e) = write_and_sync(&temp_path, content) {
        let _ = fs::remove_file(&temp_path);
        return Err(write_error(e));
    }

    // The replacement keeps the target's mode, e.g. 0600 for credentials.
    if let Ok(meta) = fs::metadata(path)
        && let Err(e) = fs::set_permissions(&temp_path, meta.permissions())
    {
        let _ = fs::remove_file(&temp_path);
        return Err(write_error(e));
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(write_error(e));
    }

    sync_parent(path);
    Ok(())
}

/// Atomically replace `path` with a string.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

fn temp_path_for(target: &Path) -> io::Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid file path"))?;

    Ok(parent.join(format!(".{}.tmp", filename)))
}

fn write_and_sync(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content)?;
    file.sync_all()
}

/// Persist the directory entry after the rename. Best effort.
#[cfg(unix)]
fn sync_parent(target: &Path) {
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_parent(_target: &Path) {}
