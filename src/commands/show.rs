//! Implementation of the `insteon-config show` command.
//!
//! Prints the configuration as the bridge sees it: every include resolved
//! into one document.

use crate::cli::ShowArgs;
use anyhow::{Context, Result};
use insteon_config::Config;

/// Execute the `insteon-config show` command.
///
/// YAML output keeps comments and anchors; JSON output is the plain data,
/// with aliases and merge keys expanded.
pub fn cmd_show(args: ShowArgs) -> Result<()> {
    let config = Config::open(&args.path)?;

    if args.json {
        let value = config
            .document()
            .to_value()
            .with_context(|| format!("'{}' has a merge key that cannot be expanded", config.path().display()))?;
        let json = serde_json::to_string_pretty(&value).with_context(|| {
            format!(
                "'{}' cannot be shown as JSON (JSON objects need string keys)",
                config.path().display()
            )
        })?;
        println!("{}", json);
    } else {
        print!("{}", config.document());
    }
    Ok(())
}
