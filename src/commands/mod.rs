//! Command implementations for insteon-config.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod show;

use crate::cli::{Command, FindArgs, PathArgs};
use anyhow::Result;
use insteon_config::Config;
use insteon_config::devices;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Check(args) => cmd_check(args),
        Command::Show(args) => show::cmd_show(args),
        Command::Save(args) => cmd_save(args),
        Command::Find(args) => cmd_find(args),
    }
}

fn cmd_check(args: PathArgs) -> Result<()> {
    let config = Config::open(&args.path)?;
    let entries = config
        .document()
        .root()
        .and_then(|root| root.as_mapping())
        .map_or(0, |m| m.len());

    println!(
        "{}: OK ({} top-level entries)",
        config.path().display(),
        entries
    );
    Ok(())
}

fn cmd_save(args: PathArgs) -> Result<()> {
    let mut config = Config::open(&args.path)?;
    let report = config.save()?;

    println!("Saved {}", config.path().display());
    println!(
        "  Removed lines: {} of {} ({:.1}%)",
        report.removed_lines,
        report.original_lines,
        report.change_ratio() * 100.0
    );
    match &report.backup {
        Some(backup) => println!("  Backup kept:   {}", backup.display()),
        None => println!("  Backup kept:   none"),
    }
    Ok(())
}

fn cmd_find(args: FindArgs) -> Result<()> {
    let device = devices::find(&args.name)?;

    println!("Name:       {}", device.name);
    println!("Device:     {}", device.kind);
    if device.args.is_empty() {
        println!("Arguments:  none");
    } else {
        let rendered: Vec<String> = device
            .args
            .iter()
            .map(|a| format!("{}={}", a.name, a.value))
            .collect();
        println!("Arguments:  {}", rendered.join(", "));
    }
    Ok(())
}
