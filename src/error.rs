//! Error types for insteon-config.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Every variant names the file it concerns so the message can be acted on
//! without a backtrace.

use crate::exit_codes;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by configuration consumers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The root configuration file could not be read.
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document is not valid YAML (or breaks a loader rule such as
    /// duplicate keys or multiple documents).
    #[error("failed to parse '{}' at line {line}, column {column}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// A file referenced by `!include` is missing or unreadable.
    #[error("failed to read include file '{}': {source}", path.display())]
    IncludeNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An `!include` tag was attached to something other than a path or a
    /// list of paths.
    #[error(
        "unrecognized node type in !include statement in '{}' at line {line}: expected a file path or a list of file paths, found {found}",
        path.display()
    )]
    MalformedDirective {
        path: PathBuf,
        line: usize,
        found: &'static str,
    },

    /// A file transitively includes itself.
    #[error("include cycle detected: '{}' is already being loaded", path.display())]
    IncludeCycle { path: PathBuf },

    /// A file listed in a sequence include did not contain a sequence.
    #[error("include file '{}' must contain a list when included from a list of files", path.display())]
    IncludeNotSequence { path: PathBuf },

    /// Save was attempted but there is no existing file to back up.
    #[error("cannot save '{}': the file does not exist, so no backup can be taken", path.display())]
    BackupSourceMissing { path: PathBuf },

    /// Copying the pre-save file to its backup failed.
    #[error("failed to create backup '{}': {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the configuration file failed.
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A device type name is not in the registry.
    #[error("unknown device name '{name}'. Valid names are {valid}.")]
    UnknownDeviceType { name: String, valid: String },

    /// A section of the document could not be converted to the requested type.
    #[error("invalid value for '{key}': {source}")]
    Value {
        key: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A configuration consumer rejected the configuration.
    #[error("failed to apply configuration to {target}: {source}")]
    Apply {
        target: &'static str,
        #[source]
        source: BoxError,
    },
}

impl ConfigError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::UnknownDeviceType { .. } | ConfigError::Apply { .. } => {
                exit_codes::USER_ERROR
            }
            ConfigError::Parse { .. }
            | ConfigError::MalformedDirective { .. }
            | ConfigError::IncludeCycle { .. }
            | ConfigError::IncludeNotSequence { .. }
            | ConfigError::Value { .. } => exit_codes::INVALID_CONFIG,
            ConfigError::Read { .. }
            | ConfigError::IncludeNotFound { .. }
            | ConfigError::BackupSourceMissing { .. }
            | ConfigError::Backup { .. }
            | ConfigError::Write { .. } => exit_codes::IO_FAILURE,
        }
    }
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_device_type_has_user_error_exit_code() {
        let err = ConfigError::UnknownDeviceType {
            name: "foo".to_string(),
            valid: "dimmer".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn malformed_directive_has_invalid_config_exit_code() {
        let err = ConfigError::MalformedDirective {
            path: PathBuf::from("config.yaml"),
            line: 3,
            found: "mapping",
        };
        assert_eq!(err.exit_code(), exit_codes::INVALID_CONFIG);
    }

    #[test]
    fn include_not_found_has_io_failure_exit_code() {
        let err = ConfigError::IncludeNotFound {
            path: PathBuf::from("missing.yaml"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.exit_code(), exit_codes::IO_FAILURE);
    }

    #[test]
    fn backup_source_missing_has_io_failure_exit_code() {
        let err = ConfigError::BackupSourceMissing {
            path: PathBuf::from("config.yaml"),
        };
        assert_eq!(err.exit_code(), exit_codes::IO_FAILURE);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = ConfigError::UnknownDeviceType {
            name: "toaster".to_string(),
            valid: "dimmer, switch".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown device name 'toaster'. Valid names are dimmer, switch."
        );

        let err = ConfigError::MalformedDirective {
            path: PathBuf::from("config.yaml"),
            line: 7,
            found: "mapping",
        };
        assert!(err.to_string().contains("!include"));
        assert!(err.to_string().contains("line 7"));
        assert!(err.to_string().contains("mapping"));
    }
}
