//! Visual store — per-page visual documents.
//!
//! Visuals expose no stable human-facing key: the folder id is the primary
//! identity, and the title is a weak lookup key — mutable, not guaranteed
//! unique, resolved first-match-in-enumeration-order on every call. Lookups
//! never cache across calls because the designer may rewrite the tree at any
//! time.
//!
//! Display metadata is parsed defensively: one malformed document degrades
//! to a placeholder entry instead of aborting a listing.

use serde_json::{json, Map, Value};

use crate::error::DocumentError;
use crate::session::ReportSession;
use crate::types::{
    BindingSlot, FieldRef, PageId, Position, VisualId, VisualKind, VisualSummary,
};

const VISUAL_SCHEMA: &str =
    "https://developer.microsoft.com/json-schemas/fabric/item/report/definition/visualContainer/2.4.0/schema.json";

// ---------------------------------------------------------------------------
// Title expression helpers
// ---------------------------------------------------------------------------

/// Read the title literal out of a visual document, if present.
///
/// The designer stores titles as a quoted literal expression under
/// `visual.objects.general[0].properties.title.expr.Literal.Value`.
pub fn title_of(doc: &Value) -> Option<String> {
    let literal = doc
        .get("visual")?
        .get("objects")?
        .get("general")?
        .get(0)?
        .get("properties")?
        .get("title")?
        .get("expr")?
        .get("Literal")?
        .get("Value")?
        .as_str()?;
    Some(literal.trim_matches('\'').to_owned())
}

/// `{"expr": {"Literal": {"Value": "'<title>'"}}}`
fn title_expr(title: &str) -> Value {
    json!({"expr": {"Literal": {"Value": format!("'{title}'")}}})
}

/// `{"general": [{"properties": {"title": ...}}]}`
fn title_objects(title: &str) -> Value {
    json!({"general": [{"properties": {"title": title_expr(title)}}]})
}

/// The canonical projection node for one bound field.
fn projection(field: &FieldRef) -> Value {
    json!({
        "field": {
            (field.kind.as_str()): {
                "Expression": {"SourceRef": {"Entity": field.entity}},
                "Property": field.property,
            }
        },
        "queryRef": field.query_ref(),
        "nativeQueryRef": field.property,
        "displayName": field.property,
    })
}

// ---------------------------------------------------------------------------
// List / resolve
// ---------------------------------------------------------------------------

fn summarize(id: &str, doc: &Value) -> VisualSummary {
    let visual = doc.get("visual");
    VisualSummary {
        id: VisualId::from(id),
        title: title_of(doc).unwrap_or_else(|| "Untitled".to_owned()),
        visual_type: visual
            .and_then(|v| v.get("visualType"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_owned(),
        position: doc
            .get("position")
            .cloned()
            .and_then(|p| serde_json::from_value::<Position>(p).ok())
            .unwrap_or_default(),
    }
}

/// Placeholder for a document that failed to parse: the id stands in for
/// the title so the visual stays visible and addressable by id.
fn fallback_summary(id: &str) -> VisualSummary {
    VisualSummary {
        id: VisualId::from(id),
        title: id.to_owned(),
        visual_type: "unknown".to_owned(),
        position: Position::default(),
    }
}

/// All visuals on a page, in enumeration (sorted-id) order.
pub fn list_visuals(
    session: &ReportSession,
    page: &PageId,
) -> Result<Vec<VisualSummary>, DocumentError> {
    let repo = session.visual_repo(page);
    let mut out = Vec::new();
    for id in repo.list()? {
        match repo.load(&id) {
            Ok(doc) => out.push(summarize(&id, &doc)),
            Err(_) => out.push(fallback_summary(&id)),
        }
    }
    Ok(out)
}

/// First visual whose title matches exactly, with its parsed document.
/// Malformed documents are skipped, consistent with [`list_visuals`].
fn find_by_title(
    session: &ReportSession,
    page: &PageId,
    title: &str,
) -> Result<(VisualId, Value), DocumentError> {
    let repo = session.visual_repo(page);
    for id in repo.list()? {
        let Ok(doc) = repo.load(&id) else { continue };
        if title_of(&doc).as_deref() == Some(title) {
            return Ok((VisualId(id), doc));
        }
    }
    Err(DocumentError::VisualNotFound {
        page: page.to_string(),
        title: title.to_owned(),
    })
}

/// Resolve a visual by its weak title key.
///
/// Re-parses every document on the page each call; when several visuals
/// share the title, the first in enumeration order wins.
pub fn resolve_by_title(
    session: &ReportSession,
    page: &PageId,
    title: &str,
) -> Result<VisualSummary, DocumentError> {
    let (id, doc) = find_by_title(session, page, title)?;
    Ok(summarize(&id.0, &doc))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

fn require_page(session: &ReportSession, page: &PageId) -> Result<(), DocumentError> {
    if session.page_repo().exists(&page.0) {
        Ok(())
    } else {
        Err(DocumentError::PageNotFound {
            name: page.to_string(),
        })
    }
}

/// Canonical blank document for each catalogue kind.
fn template(kind: VisualKind, id: &VisualId, title: &str) -> Value {
    match kind {
        VisualKind::Textbox => json!({
            "$schema": VISUAL_SCHEMA,
            "name": id.0,
            "position": {"x": 100, "y": 100, "width": 300, "height": 100},
            "visual": {
                "visualType": kind.visual_type(),
                "objects": title_objects(title),
                "drillFilterOtherVisuals": true,
            },
        }),
        VisualKind::Card => json!({
            "$schema": VISUAL_SCHEMA,
            "name": id.0,
            "position": {"x": 50, "y": 50, "z": 0, "width": 300, "height": 300, "tabOrder": 1000},
            "visual": {
                "visualType": kind.visual_type(),
                "objects": title_objects(title),
                "drillFilterOtherVisuals": true,
            },
        }),
        VisualKind::BarChart => json!({
            "$schema": VISUAL_SCHEMA,
            "name": id.0,
            "position": {"x": 50, "y": 200, "z": 0, "width": 400, "height": 300, "tabOrder": 2000},
            "visual": {
                "visualType": kind.visual_type(),
                "objects": title_objects(title),
                "drillFilterOtherVisuals": true,
            },
        }),
    }
}

/// Create a visual of the given catalogue kind on a page.
pub fn create_visual(
    session: &ReportSession,
    page: &PageId,
    kind: VisualKind,
    title: &str,
) -> Result<VisualSummary, DocumentError> {
    require_page(session, page)?;
    let id = VisualId::allocate();
    let doc = template(kind, &id, title);
    session.visual_repo(page).store(&id.0, &doc)?;
    tracing::info!("created {kind} '{title}' on page {page}");
    Ok(summarize(&id.0, &doc))
}

/// Create a clustered bar chart with a category column and a value measure
/// already bound, including the default descending sort on the value.
pub fn create_chart(
    session: &ReportSession,
    page: &PageId,
    title: &str,
    category: &FieldRef,
    value: &FieldRef,
) -> Result<VisualSummary, DocumentError> {
    require_page(session, page)?;
    let id = VisualId::allocate();
    let mut doc = template(VisualKind::BarChart, &id, title);
    doc["visual"]["query"] = json!({
        "queryState": {
            (BindingSlot::Category.as_str()): {"projections": [projection(category)]},
            (BindingSlot::Y.as_str()): {"projections": [projection(value)]},
        },
        "sortDefinition": {
            "sort": [{
                "field": {
                    (value.kind.as_str()): {
                        "Expression": {"SourceRef": {"Entity": value.entity}},
                        "Property": value.property,
                    }
                },
                "direction": "Descending",
            }],
            "isDefaultSort": true,
        },
    });
    session.visual_repo(page).store(&id.0, &doc)?;
    tracing::info!("created chart '{title}' on page {page}");
    Ok(summarize(&id.0, &doc))
}

// ---------------------------------------------------------------------------
// Mutate
// ---------------------------------------------------------------------------

/// Partial layout update; `None` fields keep their current value and
/// unrelated position fields (e.g. `tabOrder`) are untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub z: Option<f64>,
}

/// Navigate to an object field, inserting `{}` along the way.
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Value {
    let slot = map.entry(key.to_owned()).or_insert_with(|| json!({}));
    if !slot.is_object() {
        *slot = json!({});
    }
    slot
}

/// Apply a partial layout update to the visual with the given title.
pub fn update_layout(
    session: &ReportSession,
    page: &PageId,
    title: &str,
    patch: &LayoutPatch,
) -> Result<(), DocumentError> {
    let (id, mut doc) = find_by_title(session, page, title)?;
    let Some(root) = doc.as_object_mut() else {
        return Ok(());
    };
    let position = object_entry(root, "position");
    let fields = [
        ("x", patch.x),
        ("y", patch.y),
        ("width", patch.width),
        ("height", patch.height),
        ("z", patch.z),
    ];
    for (key, value) in fields {
        if let Some(v) = value {
            position[key] = json!(v);
        }
    }
    session.visual_repo(page).store(&id.0, &doc)
}

/// Replace or insert the projection for one query slot, preserving whatever
/// is bound in the other slots.
pub fn bind_field(
    session: &ReportSession,
    page: &PageId,
    title: &str,
    field: &FieldRef,
    slot: BindingSlot,
) -> Result<(), DocumentError> {
    let (id, mut doc) = find_by_title(session, page, title)?;
    let Some(root) = doc.as_object_mut() else {
        return Ok(());
    };
    let visual = object_entry(root, "visual");
    if let Some(visual) = visual.as_object_mut() {
        let query = object_entry(visual, "query");
        if let Some(query) = query.as_object_mut() {
            let state = object_entry(query, "queryState");
            state[slot.as_str()] = json!({"projections": [projection(field)]});
        }
    }
    session.visual_repo(page).store(&id.0, &doc)?;
    tracing::info!("bound {field} to '{title}' ({slot:?})");
    Ok(())
}

/// Rewrite the title literal of a visual, creating the objects scaffold when
/// the document carries none.
pub fn set_title(
    session: &ReportSession,
    page: &PageId,
    title: &str,
    new_title: &str,
) -> Result<(), DocumentError> {
    let (id, mut doc) = find_by_title(session, page, title)?;
    let Some(root) = doc.as_object_mut() else {
        return Ok(());
    };
    let visual = object_entry(root, "visual");
    if let Some(visual) = visual.as_object_mut() {
        let objects = object_entry(visual, "objects");
        let needs_scaffold = objects
            .get("general")
            .and_then(Value::as_array)
            .map(Vec::is_empty)
            .unwrap_or(true);
        if needs_scaffold {
            objects["general"] = json!([{"properties": {}}]);
        }
        if let Some(properties) = objects
            .get_mut("general")
            .and_then(Value::as_array_mut)
            .and_then(|g| g.first_mut())
            .and_then(|e| e.as_object_mut())
        {
            let props = object_entry(properties, "properties");
            props["title"] = title_expr(new_title);
        }
    }
    session.visual_repo(page).store(&id.0, &doc)
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// How to pick the visual to delete. Built via [`VisualSelector::from_parts`],
/// which gives the id precedence when both are supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualSelector {
    ById(VisualId),
    ByTitle(String),
}

impl VisualSelector {
    pub fn from_parts(id: Option<VisualId>, title: Option<String>) -> Option<Self> {
        match (id, title) {
            (Some(id), _) => Some(VisualSelector::ById(id)),
            (None, Some(title)) => Some(VisualSelector::ByTitle(title)),
            (None, None) => None,
        }
    }
}

/// Delete one visual. Deleting an id that is already absent succeeds;
/// deleting by an unknown title is `VisualNotFound`.
pub fn delete_visual(
    session: &ReportSession,
    page: &PageId,
    selector: &VisualSelector,
) -> Result<(), DocumentError> {
    let id = match selector {
        VisualSelector::ById(id) => id.clone(),
        VisualSelector::ByTitle(title) => find_by_title(session, page, title)?.0,
    };
    session.visual_repo(page).delete(&id.0)?;
    tracing::info!("deleted visual {id} on page {page}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
