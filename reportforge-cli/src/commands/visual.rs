//! `reportforge visual ...` — create, lay out, bind, and delete visuals.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use reportforge_core::{
    pages,
    types::{BindingSlot, FieldRef, PageId, VisualId, VisualKind},
    visuals,
    visuals::{LayoutPatch, VisualSelector},
    ReportSession,
};
use reportforge_refactor::rename_display_fields;

use super::super::FieldArg;
use super::open_session;

/// Manage visuals on a page. Titles are weak keys: when several visuals
/// share one, the first in enumeration order is targeted.
#[derive(Subcommand, Debug)]
pub enum VisualCommand {
    /// List visuals on a page.
    List(ListArgs),

    /// Create a blank visual from the catalogue.
    Create(CreateArgs),

    /// Create a clustered bar chart with category and value already bound.
    Chart(ChartArgs),

    /// Move or resize a visual; only the supplied fields change.
    Layout(LayoutArgs),

    /// Bind a column or measure to a query slot.
    Bind(BindArgs),

    /// Change a visual's title.
    SetTitle(SetTitleArgs),

    /// Relabel bound fields (axis labels) without touching the model.
    Relabel(RelabelArgs),

    /// Delete a visual by title or id (id wins when both are given).
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page display name.
    pub page: String,

    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Page display name.
    pub page: String,

    /// Title of the new visual.
    pub title: String,

    /// Visual kind: card | textbox | bar-chart.
    #[arg(long, short = 'k', default_value = "card")]
    pub kind: VisualKind,

    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ChartArgs {
    /// Page display name.
    pub page: String,

    /// Title of the new chart.
    pub title: String,

    /// Category column as Table.Column.
    #[arg(long)]
    pub category: FieldArg,

    /// Value measure as Table.Measure.
    #[arg(long)]
    pub value: FieldArg,

    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Page display name.
    pub page: String,

    /// Title of the visual to move or resize.
    pub title: String,

    #[arg(long)]
    pub x: Option<f64>,

    #[arg(long)]
    pub y: Option<f64>,

    #[arg(long)]
    pub width: Option<f64>,

    #[arg(long)]
    pub height: Option<f64>,

    #[arg(long)]
    pub z: Option<f64>,

    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BindArgs {
    /// Page display name.
    pub page: String,

    /// Title of the visual to bind.
    pub title: String,

    /// Measure to bind, as Table.Measure.
    #[arg(long, conflicts_with = "column")]
    pub measure: Option<FieldArg>,

    /// Column to bind, as Table.Column.
    #[arg(long)]
    pub column: Option<FieldArg>,

    /// Query slot: category | values | y.
    #[arg(long, default_value = "values")]
    pub slot: BindingSlot,

    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SetTitleArgs {
    /// Page display name.
    pub page: String,

    /// Current title.
    pub title: String,

    /// New title.
    pub new_title: String,

    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RelabelArgs {
    /// Page display name.
    pub page: String,

    /// Title of the visual to relabel.
    pub title: String,

    /// `from=to` label replacement; repeatable.
    #[arg(long = "map", value_name = "FROM=TO", required = true)]
    pub mappings: Vec<String>,

    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Page display name.
    pub page: String,

    /// Title of the visual to delete.
    #[arg(long)]
    pub title: Option<String>,

    /// Id of the visual to delete; takes precedence over --title.
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn run(cmd: VisualCommand) -> Result<()> {
    match cmd {
        VisualCommand::List(args) => list(args),
        VisualCommand::Create(args) => create(args),
        VisualCommand::Chart(args) => chart(args),
        VisualCommand::Layout(args) => layout(args),
        VisualCommand::Bind(args) => bind(args),
        VisualCommand::SetTitle(args) => set_title(args),
        VisualCommand::Relabel(args) => relabel(args),
        VisualCommand::Delete(args) => delete(args),
    }
}

fn resolve_page(session: &ReportSession, name: &str) -> Result<PageId> {
    Ok(pages::resolve_by_name(session, name)?.id)
}

#[derive(Tabled)]
struct VisualRow {
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "type")]
    visual_type: String,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "x")]
    x: f64,
    #[tabled(rename = "y")]
    y: f64,
    #[tabled(rename = "w")]
    width: f64,
    #[tabled(rename = "h")]
    height: f64,
}

fn list(args: ListArgs) -> Result<()> {
    let session = open_session(args.report)?;
    let page = resolve_page(&session, &args.page)?;
    let visuals = visuals::list_visuals(&session, &page)
        .with_context(|| format!("failed to list visuals on '{}'", args.page))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&visuals).context("failed to serialize visual list")?
        );
        return Ok(());
    }

    if visuals.is_empty() {
        println!("No visuals on '{}'.", args.page);
        return Ok(());
    }
    let rows: Vec<VisualRow> = visuals
        .into_iter()
        .map(|v| VisualRow {
            title: v.title,
            visual_type: v.visual_type,
            id: v.id.to_string(),
            x: v.position.x,
            y: v.position.y,
            width: v.position.width,
            height: v.position.height,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn create(args: CreateArgs) -> Result<()> {
    let session = open_session(args.report)?;
    let page = resolve_page(&session, &args.page)?;
    let visual = visuals::create_visual(&session, &page, args.kind, &args.title)
        .with_context(|| format!("failed to create visual '{}'", args.title))?;
    println!(
        "{} Created {} '{}' on '{}' ({})",
        "✓".green(),
        args.kind,
        visual.title,
        args.page,
        visual.id
    );
    Ok(())
}

fn chart(args: ChartArgs) -> Result<()> {
    let session = open_session(args.report)?;
    let page = resolve_page(&session, &args.page)?;
    let category = FieldRef::column(args.category.table, args.category.name);
    let value = FieldRef::measure(args.value.table, args.value.name);
    let visual = visuals::create_chart(&session, &page, &args.title, &category, &value)
        .with_context(|| format!("failed to create chart '{}'", args.title))?;
    println!(
        "{} Created chart '{}' on '{}' ({} by {})",
        "✓".green(),
        visual.title,
        args.page,
        value,
        category
    );
    Ok(())
}

fn layout(args: LayoutArgs) -> Result<()> {
    let session = open_session(args.report)?;
    let page = resolve_page(&session, &args.page)?;
    let patch = LayoutPatch {
        x: args.x,
        y: args.y,
        width: args.width,
        height: args.height,
        z: args.z,
    };
    if patch == LayoutPatch::default() {
        bail!("nothing to change — pass at least one of --x --y --width --height --z");
    }
    visuals::update_layout(&session, &page, &args.title, &patch)
        .with_context(|| format!("failed to update layout of '{}'", args.title))?;
    println!("{} Updated layout of '{}'", "✓".green(), args.title);
    Ok(())
}

fn bind(args: BindArgs) -> Result<()> {
    let session = open_session(args.report)?;
    let page = resolve_page(&session, &args.page)?;
    let field = match (args.measure, args.column) {
        (Some(m), None) => FieldRef::measure(m.table, m.name),
        (None, Some(c)) => FieldRef::column(c.table, c.name),
        _ => bail!("pass exactly one of --measure or --column"),
    };
    visuals::bind_field(&session, &page, &args.title, &field, args.slot)
        .with_context(|| format!("failed to bind {field} to '{}'", args.title))?;
    println!("{} Bound {} to '{}'", "✓".green(), field, args.title);
    Ok(())
}

fn set_title(args: SetTitleArgs) -> Result<()> {
    let session = open_session(args.report)?;
    let page = resolve_page(&session, &args.page)?;
    visuals::set_title(&session, &page, &args.title, &args.new_title)
        .with_context(|| format!("failed to retitle '{}'", args.title))?;
    println!("{} Renamed visual '{}' to '{}'", "✓".green(), args.title, args.new_title);
    Ok(())
}

fn relabel(args: RelabelArgs) -> Result<()> {
    let session = open_session(args.report)?;
    let page = resolve_page(&session, &args.page)?;
    let mut mapping = BTreeMap::new();
    for entry in &args.mappings {
        let Some((from, to)) = entry.split_once('=') else {
            bail!("invalid --map '{entry}'; expected FROM=TO");
        };
        mapping.insert(from.to_owned(), to.to_owned());
    }
    let renamed = rename_display_fields(&session, &page, &args.title, &mapping)
        .with_context(|| format!("failed to relabel fields on '{}'", args.title))?;
    println!("{} Relabeled {renamed} field(s) on '{}'", "✓".green(), args.title);
    Ok(())
}

fn delete(args: DeleteArgs) -> Result<()> {
    let session = open_session(args.report)?;
    let page = resolve_page(&session, &args.page)?;
    let Some(selector) = VisualSelector::from_parts(args.id.map(VisualId::from), args.title.clone())
    else {
        bail!("pass --title or --id to pick the visual");
    };
    visuals::delete_visual(&session, &page, &selector)
        .with_context(|| format!("failed to delete visual on '{}'", args.page))?;
    println!("{} Deleted visual on '{}'", "✓".green(), args.page);
    Ok(())
}
