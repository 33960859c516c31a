//! `reportforge page list|create|delete`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use reportforge_core::pages;

use super::open_session;

/// Manage report pages.
#[derive(Subcommand, Debug)]
pub enum PageCommand {
    /// List pages in their persisted order.
    List(ListArgs),

    /// Create a blank page and append it to the page order.
    Create(CreateArgs),

    /// Delete a page by display name (first match wins on duplicates).
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Report definition root (skips auto-detection).
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Display name of the new page.
    pub name: String,

    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Display name of the page to delete.
    pub name: String,

    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn run(cmd: PageCommand) -> Result<()> {
    match cmd {
        PageCommand::List(args) => list(args),
        PageCommand::Create(args) => create(args),
        PageCommand::Delete(args) => delete(args),
    }
}

fn list(args: ListArgs) -> Result<()> {
    let session = open_session(args.report)?;
    let pages = pages::list_pages(&session).context("failed to list pages")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&pages).context("failed to serialize page list")?
        );
        return Ok(());
    }

    if pages.is_empty() {
        println!("No pages yet. Run: reportforge page create <name>");
        return Ok(());
    }
    for (index, page) in pages.iter().enumerate() {
        println!("{:>3}. {} ({})", index + 1, page.display_name, page.id);
    }
    Ok(())
}

fn create(args: CreateArgs) -> Result<()> {
    let session = open_session(args.report)?;
    let page = pages::create_page(&session, &args.name)
        .with_context(|| format!("failed to create page '{}'", args.name))?;
    println!("{} Created page '{}' ({})", "✓".green(), page.display_name, page.id);
    Ok(())
}

fn delete(args: DeleteArgs) -> Result<()> {
    let session = open_session(args.report)?;
    let page = pages::resolve_by_name(&session, &args.name)?;
    pages::delete_page(&session, &page.id)
        .with_context(|| format!("failed to delete page '{}'", args.name))?;
    println!("{} Deleted page '{}'", "✓".green(), args.name);
    Ok(())
}
