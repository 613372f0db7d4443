//! Line diff accounting between a backup and the file that replaced it.

use similar::{ChangeTag, TextDiff};

/// How much of the old file a save removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineDiff {
    /// Lines in the old file.
    pub original_lines: usize,
    /// Old lines that do not survive into the new file. Insertions are not
    /// counted.
    pub removed_lines: usize,
}

impl LineDiff {
    pub fn between(old: &str, new: &str) -> Self {
        let diff = TextDiff::from_lines(old, new);
        let removed_lines = diff
            .iter_all_changes()
            .filter(|change| change.tag() == ChangeTag::Delete)
            .count();

        Self {
            original_lines: old.lines().count(),
            removed_lines,
        }
    }

    /// `removed_lines / original_lines`, or 0 for an empty original.
    pub fn change_ratio(&self) -> f64 {
        if self.original_lines == 0 {
            0.0
        } else {
            self.removed_lines as f64 / self.original_lines as f64
        }
    }
}

/// Unified diff of `old` against `new`, for logging.
pub(crate) fn unified(old: &str, new: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header("backup", "saved")
        .to_string()
}
