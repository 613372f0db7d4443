//! Config struct definition and the consumer interface.

use crate::document::Document;
use crate::error::BoxError;
use std::path::{Path, PathBuf};

/// The bridge configuration: a document plus the file it lives in.
///
/// The document is the flattened result of loading the file, i.e. every
/// `!include` has already been replaced by the content it referred to.
#[derive(Debug, Clone)]
pub struct Config {
    pub(super) path: PathBuf,
    pub(super) document: Document,
    /// Backup retained by the most recent save.
    pub(super) backup: Option<PathBuf>,
}

impl Config {
    /// Wrap an already built document; nothing is read from `path`.
    pub fn with_document<P: AsRef<Path>>(path: P, document: Document) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            document,
            backup: None,
        }
    }

    /// File the configuration is loaded from and saved to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Backup kept by the last save, if that save changed enough of the file
    /// to keep one.
    pub fn backup(&self) -> Option<&Path> {
        self.backup.as_deref()
    }
}

/// A subsystem that reads its settings from the configuration.
pub trait ConfigConsumer {
    fn load_config(&mut self, config: &Config) -> Result<(), BoxError>;
}
