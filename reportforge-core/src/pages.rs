//! Page registry — the persisted page order plus the page folders.
//!
//! `pages.json` holds `{"pageOrder": [...]}`; the folders under
//! `definition/pages/` are the ground truth. The two can drift when the tree
//! is hand-edited or the designer saves mid-operation, so every listing
//! reconciles them:
//!
//! - order entries whose folder exists are kept, in order;
//! - folders missing from the order are appended at the end (sorted by id);
//! - dangling order entries are dropped.

use std::collections::HashSet;

use serde_json::{json, Value};

use crate::error::DocumentError;
use crate::repo::write_json_atomic;
use crate::session::ReportSession;
use crate::types::{PageId, PageSummary};

const PAGE_SCHEMA: &str =
    "https://developer.microsoft.com/json-schemas/fabric/item/report/definition/page/2.0.0/schema.json";

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// The persisted order list, tolerating an absent or corrupt `pages.json`.
fn read_order(session: &ReportSession) -> Vec<String> {
    let path = session.page_order_path();
    let Ok(contents) = std::fs::read_to_string(&path) else {
        return vec![];
    };
    let Ok(doc) = serde_json::from_str::<Value>(&contents) else {
        tracing::warn!("ignoring unreadable page order at {}", path.display());
        return vec![];
    };
    doc.get("pageOrder")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// All pages in merged order, with display names read defensively — a page
/// whose `page.json` is unreadable is listed under its id.
pub fn list_pages(session: &ReportSession) -> Result<Vec<PageSummary>, DocumentError> {
    let repo = session.page_repo();
    let found = repo.list()?;
    let found_set: HashSet<&str> = found.iter().map(String::as_str).collect();

    let mut ids: Vec<String> = Vec::with_capacity(found.len());
    let mut seen = HashSet::new();
    for id in read_order(session) {
        if found_set.contains(id.as_str()) && seen.insert(id.clone()) {
            ids.push(id);
        }
    }
    for id in found {
        if !seen.contains(&id) {
            ids.push(id);
        }
    }

    let mut pages = Vec::with_capacity(ids.len());
    for id in ids {
        let display_name = match repo.load(&id) {
            Ok(doc) => doc
                .get("displayName")
                .and_then(Value::as_str)
                .unwrap_or(&id)
                .to_owned(),
            Err(_) => id.clone(),
        };
        pages.push(PageSummary {
            id: PageId(id),
            display_name,
        });
    }
    Ok(pages)
}

/// First page whose display name equals `name`; duplicates resolve to the
/// first in merged order, silently.
pub fn resolve_by_name(
    session: &ReportSession,
    name: &str,
) -> Result<PageSummary, DocumentError> {
    list_pages(session)?
        .into_iter()
        .find(|p| p.display_name == name)
        .ok_or_else(|| DocumentError::PageNotFound {
            name: name.to_owned(),
        })
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Create a blank 1280×720 page and append it to the page order.
pub fn create_page(session: &ReportSession, name: &str) -> Result<PageSummary, DocumentError> {
    let id = PageId::allocate();

    append_to_order(session, &id)?;

    let doc = json!({
        "$schema": PAGE_SCHEMA,
        "name": id.0,
        "displayName": name,
        "width": 1280,
        "height": 720,
        "displayOption": "FitToPage",
    });
    session.page_repo().store(&id.0, &doc)?;
    tracing::info!("created page '{name}' ({id})");

    Ok(PageSummary {
        id,
        display_name: name.to_owned(),
    })
}

/// Append `id` to `pageOrder`, creating `pages.json` when absent. Unknown
/// fields of an existing index are preserved; an unparseable index is
/// replaced by a fresh one (there is nothing recoverable to keep).
fn append_to_order(session: &ReportSession, id: &PageId) -> Result<(), DocumentError> {
    let path = session.page_order_path();
    let mut index: Value = match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|_| json!({})),
        Err(_) => json!({}),
    };
    if !index.is_object() {
        index = json!({});
    }
    if !index.get("pageOrder").map(Value::is_array).unwrap_or(false) {
        index["pageOrder"] = json!([]);
    }
    if let Some(order) = index.get_mut("pageOrder").and_then(Value::as_array_mut) {
        order.push(Value::String(id.0.clone()));
    }

    write_json_atomic(&path, &index)
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Remove `id` from the page order (no-op when absent) and recursively
/// delete its folder. Idempotent.
pub fn delete_page(session: &ReportSession, id: &PageId) -> Result<(), DocumentError> {
    let path = session.page_order_path();
    if let Ok(contents) = std::fs::read_to_string(&path) {
        if let Ok(mut index) = serde_json::from_str::<Value>(&contents) {
            let removed = index
                .get_mut("pageOrder")
                .and_then(Value::as_array_mut)
                .map(|order| {
                    let before = order.len();
                    order.retain(|v| v.as_str() != Some(id.0.as_str()));
                    order.len() != before
                })
                .unwrap_or(false);
            if removed {
                write_json_atomic(&path, &index)?;
            }
        }
    }

    session.page_repo().delete(&id.0)?;
    tracing::info!("deleted page {id}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
