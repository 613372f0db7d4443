//! Save with a diff-checked backup.
//!
//! Every save first copies the current file to `<path>.<YYYY-MM-DD_HH-MM-SS>`,
//! then replaces the file, then compares the two. When the save removed at
//! most [`RETENTION_THRESHOLD`] of the old lines the backup is deleted;
//! otherwise it is kept next to the file so a large accidental change can be
//! undone by hand.

mod diff;

pub use diff::LineDiff;

use crate::error::{ConfigError, Result};
use crate::fs::atomic_write_file;
use chrono::{Local, NaiveDateTime};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Largest fraction of removed lines for which the backup is discarded.
pub const RETENTION_THRESHOLD: f64 = 0.05;

/// `strftime` format of the backup suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Outcome of [`save_with_backup`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub original_lines: usize,
    pub removed_lines: usize,
    /// The retained backup, if the change was large enough to keep one.
    pub backup: Option<PathBuf>,
}

impl SaveReport {
    pub fn change_ratio(&self) -> f64 {
        LineDiff {
            original_lines: self.original_lines,
            removed_lines: self.removed_lines,
        }
        .change_ratio()
    }
}

/// Suffix for a backup taken at `time`.
pub fn timestamp_label(time: NaiveDateTime) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Backup file name for `path` at `time`.
///
/// A numeric suffix is added if a backup from the same second already
/// exists, so a retained backup is never overwritten.
pub fn backup_path(path: &Path, time: NaiveDateTime) -> PathBuf {
    let mut base = OsString::from(path.as_os_str());
    base.push(".");
    base.push(timestamp_label(time));
    let base = PathBuf::from(base);

    let mut candidate = base.clone();
    let mut n = 0;
    while candidate.exists() {
        n += 1;
        let mut name = OsString::from(base.as_os_str());
        name.push(format!(".{}", n));
        candidate = PathBuf::from(name);
    }
    candidate
}

/// Replace `path` with `content`, keeping a backup when the change is large.
///
/// # Errors
///
/// * `BackupSourceMissing` - `path` does not exist; nothing is written
/// * `Backup` - the copy (or the cleanup of a discarded backup) failed
/// * `Write` - replacing `path` failed; the backup is left in place
pub fn save_with_backup(path: &Path, content: &str) -> Result<SaveReport> {
    save_at(path, content, Local::now().naive_local())
}

pub(crate) fn save_at(path: &Path, content: &str, time: NaiveDateTime) -> Result<SaveReport> {
    let backup = backup_path(path, time);

    fs::copy(path, &backup).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigError::BackupSourceMissing {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Backup {
            path: backup.clone(),
            source,
        },
    })?;
    debug!(backup = %backup.display(), "created backup");

    atomic_write_file(path, content)?;

    let original = fs::read(&backup).map_err(|source| ConfigError::Backup {
        path: backup.clone(),
        source,
    })?;
    let original = String::from_utf8_lossy(&original);
    let changes = LineDiff::between(&original, content);
    debug!(
        original_lines = changes.original_lines,
        removed_lines = changes.removed_lines,
        "compared backup with saved file"
    );
    trace!("{}", diff::unified(&original, content));

    let retained = if changes.change_ratio() <= RETENTION_THRESHOLD {
        fs::remove_file(&backup).map_err(|source| ConfigError::Backup {
            path: backup.clone(),
            source,
        })?;
        None
    } else {
        warn!(
            path = %path.display(),
            backup = %backup.display(),
            removed_lines = changes.removed_lines,
            original_lines = changes.original_lines,
            "save changed a large part of the file; keeping backup"
        );
        Some(backup)
    };

    info!(path = %path.display(), "saved configuration");
    Ok(SaveReport {
        original_lines: changes.original_lines,
        removed_lines: changes.removed_lines,
        backup: retained,
    })
}
