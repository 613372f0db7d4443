//! Configuration document manager for an Insteon home-automation bridge.
//!
//! The bridge reads one YAML file that may pull in others through a custom
//! `!include` tag:
//!
//! ```yaml
//! insteon: !include insteon.yaml
//! devices: !include [lights.yaml, remotes.yaml]
//! ```
//!
//! [`Config`] loads such a file into a single flattened [`Document`] that
//! keeps comments, quoting and anchors, lets the host edit it, and saves it
//! back with a backup that is only kept when the save changed a large part
//! of the file.

pub mod backup;
pub mod config;
pub mod devices;
pub mod document;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod include;

#[cfg(test)]
mod test_support;

pub use backup::SaveReport;
pub use config::{Config, ConfigConsumer};
pub use document::Document;
pub use error::{ConfigError, Result};
