//! Reportforge — inspect and refactor Power BI PBIR report definitions.
//!
//! # Usage
//!
//! ```text
//! reportforge info [--json]
//! reportforge page list|create|delete ...
//! reportforge visual list|create|chart|layout|bind|set-title|relabel|delete ...
//! reportforge rename <table> <old> <new>
//! reportforge audit <name> [--json]
//! ```
//!
//! Every command auto-detects the open `.pbip` project from the working
//! directory; pass `--report <path>` to target a tree explicitly.

mod commands;

use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    info::InfoArgs,
    page::PageCommand,
    refactor::{AuditArgs, RenameArgs},
    visual::VisualCommand,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "reportforge",
    version,
    about = "Inspect and refactor Power BI PBIR report definitions",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the detected project and its pages.
    Info(InfoArgs),

    /// Manage report pages.
    Page {
        #[command(subcommand)]
        command: PageCommand,
    },

    /// Manage visuals on a page.
    Visual {
        #[command(subcommand)]
        command: VisualCommand,
    },

    /// Rename a table field in every visual that references it.
    Rename(RenameArgs),

    /// List the visuals that reference a column or measure name.
    Audit(AuditArgs),
}

// ---------------------------------------------------------------------------
// Shared field argument — `Table.Name` pairs from the command line
// ---------------------------------------------------------------------------

/// A `Table.Name` pair; whether it names a column or a measure depends on
/// the flag it was passed to.
#[derive(Debug, Clone)]
pub struct FieldArg {
    pub table: String,
    pub name: String,
}

impl FromStr for FieldArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((table, name)) if !table.is_empty() && !name.is_empty() => Ok(Self {
                table: table.to_owned(),
                name: name.to_owned(),
            }),
            _ => Err(format!("expected Table.Name, got '{s}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Info(args) => args.run(),
        Commands::Page { command } => commands::page::run(command),
        Commands::Visual { command } => commands::visual::run(command),
        Commands::Rename(args) => args.run(),
        Commands::Audit(args) => args.run(),
    }
}
