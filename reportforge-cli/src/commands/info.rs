//! `reportforge info` — detection status and page overview.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use reportforge_core::{pages, visuals};

use super::open_session;

/// Arguments for `reportforge info`.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Report definition root (skips auto-detection).
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct InfoJson {
    report_path: String,
    total_pages: usize,
    pages: Vec<PageInfoJson>,
}

#[derive(Serialize)]
struct PageInfoJson {
    id: String,
    display_name: String,
    visuals: usize,
}

#[derive(Tabled)]
struct PageRow {
    #[tabled(rename = "page")]
    name: String,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "visuals")]
    visuals: usize,
}

impl InfoArgs {
    pub fn run(self) -> Result<()> {
        let session = open_session(self.report)?;
        let pages = pages::list_pages(&session).context("failed to list pages")?;

        let mut rows = Vec::with_capacity(pages.len());
        for page in &pages {
            let count = visuals::list_visuals(&session, &page.id)
                .with_context(|| format!("failed to list visuals on '{}'", page.display_name))?
                .len();
            rows.push((page, count));
        }

        if self.json {
            let payload = InfoJson {
                report_path: session.root().display().to_string(),
                total_pages: pages.len(),
                pages: rows
                    .iter()
                    .map(|(page, count)| PageInfoJson {
                        id: page.id.to_string(),
                        display_name: page.display_name.clone(),
                        visuals: *count,
                    })
                    .collect(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize info JSON")?
            );
            return Ok(());
        }

        println!(
            "{} {}",
            "Report:".bold(),
            session.root().display().to_string().cyan()
        );
        if rows.is_empty() {
            println!("No pages yet. Run: reportforge page create <name>");
            return Ok(());
        }
        let table_rows: Vec<PageRow> = rows
            .into_iter()
            .map(|(page, count)| PageRow {
                name: page.display_name.clone(),
                id: page.id.to_string(),
                visuals: count,
            })
            .collect();
        let mut table = Table::new(table_rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
