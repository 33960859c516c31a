//! `reportforge rename` and `reportforge audit` — cross-document refactoring.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use reportforge_refactor::{audit_usage, rename_field};

use super::open_session;

/// Arguments for `reportforge rename`.
#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Table owning the field.
    pub table: String,

    /// Current column or measure name.
    pub old: String,

    /// New name.
    pub new: String,

    /// Report definition root (skips auto-detection).
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl RenameArgs {
    pub fn run(self) -> Result<()> {
        let session = open_session(self.report)?;
        let report = rename_field(&session, &self.table, &self.old, &self.new)
            .with_context(|| {
                format!("failed to rename {}[{}]", self.table, self.old)
            })?;
        println!(
            "{} Renamed {}[{}] to {}[{}] in {} visual(s)",
            "✓".green(),
            self.table,
            self.old,
            self.table,
            self.new,
            report.visuals_changed
        );
        if report.documents_skipped > 0 {
            println!(
                "{}",
                format!("! Skipped {} unreadable document(s)", report.documents_skipped).yellow()
            );
        }
        Ok(())
    }
}

/// Arguments for `reportforge audit`.
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Column or measure name to look for (matched across all tables).
    pub name: String,

    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl AuditArgs {
    pub fn run(self) -> Result<()> {
        let session = open_session(self.report)?;
        let report = audit_usage(&session, &self.name)
            .with_context(|| format!("failed to audit usage of '{}'", self.name))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report)
                    .context("failed to serialize audit JSON")?
            );
            return Ok(());
        }

        if report.hits.is_empty() {
            println!("'{}' is not referenced by any visual.", self.name);
        } else {
            println!("'{}' is referenced by {} visual(s):", self.name, report.hits.len());
            for hit in &report.hits {
                println!("  {} | {}", hit.page, hit.visual);
            }
        }
        if report.documents_skipped > 0 {
            println!(
                "{}",
                format!("! Skipped {} unreadable document(s)", report.documents_skipped).yellow()
            );
        }
        Ok(())
    }
}
