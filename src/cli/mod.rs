//! CLI argument parsing for insteon-config.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Maintenance tool for the Insteon bridge configuration file.
///
/// Loads the configuration the way the bridge does (resolving `!include`
/// directives) so it can be checked, inspected, or re-saved.
#[derive(Parser, Debug)]
#[command(name = "insteon-config")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log debug details (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for insteon-config.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a configuration file and report whether it is valid.
    ///
    /// Every included file is loaded too, so a missing or malformed include
    /// is reported here.
    Check(PathArgs),

    /// Print the configuration with all includes resolved.
    Show(ShowArgs),

    /// Load and re-save a configuration file.
    ///
    /// Includes are written into the file itself. A backup is kept when the
    /// save changes more than 5% of the file.
    Save(PathArgs),

    /// Look up a device type by name.
    Find(FindArgs),
}

/// A configuration file argument.
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Path to the configuration file.
    pub path: PathBuf,
}

/// Arguments for the `show` command.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Path to the configuration file.
    pub path: PathBuf,

    /// Print JSON instead of YAML.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `find` command.
#[derive(Args, Debug)]
pub struct FindArgs {
    /// Device type name (case-insensitive), e.g. `dimmer`.
    pub name: String,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_check() {
        let cli = Cli::try_parse_from(["insteon-config", "check", "config.yaml"]).unwrap();
        match cli.command {
            Command::Check(args) => assert_eq!(args.path, PathBuf::from("config.yaml")),
            other => panic!("Expected Check command, got {other:?}"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_show_json() {
        let cli = Cli::try_parse_from(["insteon-config", "show", "c.yaml", "--json"]).unwrap();
        match cli.command {
            Command::Show(args) => assert!(args.json),
            other => panic!("Expected Show command, got {other:?}"),
        }
    }

    #[test]
    fn parse_verbose_after_subcommand() {
        let cli = Cli::try_parse_from(["insteon-config", "save", "c.yaml", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Save(_)));
    }

    #[test]
    fn parse_find() {
        let cli = Cli::try_parse_from(["insteon-config", "find", "DIMMER"]).unwrap();
        match cli.command {
            Command::Find(args) => assert_eq!(args.name, "DIMMER"),
            other => panic!("Expected Find command, got {other:?}"),
        }
    }

    #[test]
    fn missing_path_is_rejected() {
        assert!(Cli::try_parse_from(["insteon-config", "check"]).is_err());
    }
}
