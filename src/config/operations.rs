//! Config loading, saving, and lookup operations.

use super::model::{Config, ConfigConsumer};
use crate::backup::{self, SaveReport};
use crate::devices::{self, DeviceType};
use crate::error::{ConfigError, Result};
use crate::include;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

impl Config {
    /// Load the configuration file at `path`.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - The file and everything it includes were parsed
    /// * `Err(ConfigError)` - Read, parse or include failure
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let document = include::load(path)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(Self::with_document(path, document))
    }

    /// Replace the current document with the file at `path`.
    ///
    /// On error the current document and path are left as they were.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let document = include::load(path)?;

        self.path = path.to_path_buf();
        self.document = document;
        info!(path = %path.display(), "loaded configuration");
        Ok(())
    }

    /// Load the current path again, discarding in-memory changes.
    pub fn reload(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.load(path)
    }

    /// Write the document back to its file.
    ///
    /// The previous file is backed up first; the backup is kept only when
    /// the save removed more than 5% of its lines. Included files are not
    /// touched: their content is saved into this file.
    pub fn save(&mut self) -> Result<SaveReport> {
        let content = self.document.to_yaml();
        let report = backup::save_with_backup(&self.path, &content)?;
        self.backup = report.backup.clone();
        Ok(report)
    }

    /// Look up a device type by name, ignoring case.
    pub fn find(&self, name: &str) -> Result<&'static DeviceType> {
        devices::find(name)
    }

    /// Hand the configuration to the MQTT layer, then to the modem.
    ///
    /// The modem reads state the MQTT layer sets up, so the order is fixed.
    pub fn apply<M, D>(&self, mqtt: &mut M, modem: &mut D) -> Result<()>
    where
        M: ConfigConsumer + ?Sized,
        D: ConfigConsumer + ?Sized,
    {
        mqtt.load_config(self)
            .map_err(|source| ConfigError::Apply {
                target: "mqtt",
                source,
            })?;
        modem
            .load_config(self)
            .map_err(|source| ConfigError::Apply {
                target: "modem",
                source,
            })?;
        Ok(())
    }

    /// Deserialize the top-level section `key`; `None` if it is absent.
    pub fn section<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(node) = self.document.get(key) else {
            return Ok(None);
        };
        node.to_value()
            .and_then(serde_yaml::from_value)
            .map(Some)
            .map_err(|source| ConfigError::Value {
                key: key.to_string(),
                source,
            })
    }
}
