//! Rename propagation and usage audit across every visual document.
//!
//! Both operations are batch walks with per-document fault isolation: a
//! visual that fails to parse is skipped and counted, never fatal. Mutations
//! are one load-mutate-store transaction per document with no cross-document
//! rollback — a failure partway through a rename leaves already-written
//! documents changed, which is the documented (non-atomic) behavior of this
//! format.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use reportforge_core::{
    pages,
    session::ReportSession,
    types::PageId,
    visuals, DocumentError,
};

use crate::walk::{as_field_node, as_projection_node, visit_objects, visit_objects_mut};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Outcome of a cross-document rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameReport {
    /// Distinct visual documents rewritten (a visual with several matching
    /// references counts once).
    pub visuals_changed: usize,
    /// Documents that failed to parse and were excluded from the walk.
    pub documents_skipped: usize,
}

/// One visual that references the audited object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageHit {
    pub page: String,
    pub visual: String,
}

/// Outcome of a usage audit. An empty `hits` means "unused".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub hits: Vec<UsageHit>,
    pub documents_skipped: usize,
}

// ---------------------------------------------------------------------------
// Rename
// ---------------------------------------------------------------------------

/// Rename `table[old]` to `table[new]` in every visual on every page.
///
/// The match is structural: a `Property` is rewritten only when its
/// enclosing `Expression.SourceRef.Entity` equals `table`, so a same-named
/// field on another table is never touched. String-embedded spellings
/// (`queryRef`, `nativeQueryRef`, `displayName`) are deliberately left
/// alone. Idempotent: repeating a completed rename reports zero changes.
pub fn rename_field(
    session: &ReportSession,
    table: &str,
    old: &str,
    new: &str,
) -> Result<RenameReport, DocumentError> {
    let mut report = RenameReport {
        visuals_changed: 0,
        documents_skipped: 0,
    };

    for page in pages::list_pages(session)? {
        let repo = session.visual_repo(&page.id);
        for id in repo.list()? {
            let mut doc = match repo.load(&id) {
                Ok(doc) => doc,
                Err(DocumentError::Malformed { path, .. }) => {
                    tracing::warn!("skipping malformed visual at {}", path.display());
                    report.documents_skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let mut changed = false;
            if let Some(visual) = doc.get_mut("visual") {
                visit_objects_mut(visual, &mut |map| {
                    let matches = as_field_node(map)
                        .map(|f| f.property == old && f.entity == Some(table))
                        .unwrap_or(false);
                    if matches {
                        map.insert("Property".to_owned(), json!(new));
                        changed = true;
                    }
                });
            }

            if changed {
                repo.store(&id, &doc)?;
                report.visuals_changed += 1;
            }
        }
    }

    tracing::info!(
        "renamed {table}[{old}] -> {table}[{new}] in {} visuals",
        report.visuals_changed
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// List every visual referencing a column or measure named `object_name`.
///
/// The match is name-only: a field of the same name on a different table is
/// also reported. Hits come back in page-then-visual enumeration order.
pub fn audit_usage(
    session: &ReportSession,
    object_name: &str,
) -> Result<AuditReport, DocumentError> {
    let mut report = AuditReport {
        hits: Vec::new(),
        documents_skipped: 0,
    };

    for page in pages::list_pages(session)? {
        let repo = session.visual_repo(&page.id);
        for id in repo.list()? {
            let doc = match repo.load(&id) {
                Ok(doc) => doc,
                Err(DocumentError::Malformed { path, .. }) => {
                    tracing::warn!("skipping malformed visual at {}", path.display());
                    report.documents_skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let mut found = false;
            if let Some(visual) = doc.get("visual") {
                visit_objects(visual, &mut |map| {
                    if !found {
                        found = as_field_node(map)
                            .map(|f| f.property == object_name)
                            .unwrap_or(false);
                    }
                });
            }

            if found {
                report.hits.push(UsageHit {
                    page: page.display_name.clone(),
                    visual: visuals::title_of(&doc).unwrap_or_else(|| "Untitled".to_owned()),
                });
            }
        }
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Display-name remapping
// ---------------------------------------------------------------------------

/// Remap `displayName` labels on one visual's projections.
///
/// A projection is remapped when its `nativeQueryRef` — or, failing that,
/// its current `displayName` — appears as a key in `mapping`. Returns the
/// number of projections rewritten.
pub fn rename_display_fields(
    session: &ReportSession,
    page: &PageId,
    title: &str,
    mapping: &BTreeMap<String, String>,
) -> Result<usize, DocumentError> {
    let found = visuals::resolve_by_title(session, page, title)?;
    let repo = session.visual_repo(page);
    let mut doc = repo.load(&found.id.0)?;

    let mut renamed = 0usize;
    if let Some(query) = doc.get_mut("visual").and_then(|v| v.get_mut("query")) {
        visit_objects_mut(query, &mut |map| {
            let Some(node) = as_projection_node(map) else {
                return;
            };
            let replacement = mapping
                .get(node.native_query_ref)
                .or_else(|| mapping.get(node.display_name));
            if let Some(label) = replacement {
                map.insert("displayName".to_owned(), json!(label));
                renamed += 1;
            }
        });
    }

    if renamed > 0 {
        repo.store(&found.id.0, &doc)?;
    }
    Ok(renamed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use reportforge_core::types::{BindingSlot, FieldRef, VisualKind};
    use tempfile::TempDir;

    fn make_report() -> (TempDir, ReportSession) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("definition").join("pages")).unwrap();
        let session = ReportSession::open(dir.path()).unwrap();
        (dir, session)
    }

    fn bind(session: &ReportSession, page: &PageId, title: &str, field: FieldRef) {
        visuals::create_visual(session, page, VisualKind::Card, title).unwrap();
        visuals::bind_field(session, page, title, &field, BindingSlot::Values).unwrap();
    }

    #[test]
    fn rename_is_scoped_to_the_owning_table() {
        let (_dir, session) = make_report();
        let page = pages::create_page(&session, "P").unwrap().id;
        bind(&session, &page, "SalesCard", FieldRef::measure("Sales", "Amount"));
        bind(&session, &page, "CostCard", FieldRef::measure("Costs", "Amount"));

        let report = rename_field(&session, "Sales", "Amount", "Net").unwrap();
        assert_eq!(report.visuals_changed, 1);
        assert_eq!(report.documents_skipped, 0);

        // The Costs measure of the same name is untouched.
        assert!(audit_usage(&session, "Amount")
            .unwrap()
            .hits
            .iter()
            .any(|h| h.visual == "CostCard"));
        assert_eq!(audit_usage(&session, "Net").unwrap().hits.len(), 1);
    }

    #[test]
    fn rename_counts_documents_not_references() {
        let (_dir, session) = make_report();
        let page = pages::create_page(&session, "P").unwrap().id;
        // A chart holds the same measure in the Y slot and in sortDefinition,
        // so one document carries several matching references.
        visuals::create_chart(
            &session,
            &page,
            "Chart",
            &FieldRef::column("Geo", "Region"),
            &FieldRef::measure("Sales", "Amount"),
        )
        .unwrap();

        let report = rename_field(&session, "Sales", "Amount", "Net").unwrap();
        assert_eq!(report.visuals_changed, 1);

        // Every structural reference in the document moved together.
        let id = visuals::resolve_by_title(&session, &page, "Chart").unwrap().id;
        let doc = session.visual_repo(&page).load(&id.0).unwrap();
        let sort_field = &doc["visual"]["query"]["sortDefinition"]["sort"][0]["field"];
        assert_eq!(sort_field["Measure"]["Property"], "Net");
    }

    #[test]
    fn rename_is_idempotent() {
        let (_dir, session) = make_report();
        let page = pages::create_page(&session, "P").unwrap().id;
        bind(&session, &page, "Card", FieldRef::measure("Sales", "Amount"));

        assert_eq!(rename_field(&session, "Sales", "Amount", "Net").unwrap().visuals_changed, 1);
        assert_eq!(rename_field(&session, "Sales", "Amount", "Net").unwrap().visuals_changed, 0);
    }

    #[test]
    fn rename_leaves_embedded_strings_alone() {
        let (_dir, session) = make_report();
        let page = pages::create_page(&session, "P").unwrap().id;
        bind(&session, &page, "Card", FieldRef::measure("Sales", "Amount"));

        rename_field(&session, "Sales", "Amount", "Net").unwrap();

        let id = visuals::resolve_by_title(&session, &page, "Card").unwrap().id;
        let doc = session.visual_repo(&page).load(&id.0).unwrap();
        let proj = &doc["visual"]["query"]["queryState"]["Values"]["projections"][0];
        assert_eq!(proj["field"]["Measure"]["Property"], "Net");
        assert_eq!(proj["queryRef"], "Sales.Amount");
        assert_eq!(proj["nativeQueryRef"], "Amount");
        assert_eq!(proj["displayName"], "Amount");
    }

    #[test]
    fn malformed_documents_are_counted_not_fatal() {
        let (_dir, session) = make_report();
        let page = pages::create_page(&session, "P").unwrap().id;
        bind(&session, &page, "Good", FieldRef::measure("Sales", "Amount"));
        let bad = session.visual_repo(&page).doc_path("zz-broken");
        std::fs::create_dir_all(bad.parent().unwrap()).unwrap();
        std::fs::write(&bad, "{nope").unwrap();

        let rename = rename_field(&session, "Sales", "Amount", "Net").unwrap();
        assert_eq!(rename.visuals_changed, 1);
        assert_eq!(rename.documents_skipped, 1);

        let audit = audit_usage(&session, "Net").unwrap();
        assert_eq!(audit.hits.len(), 1);
        assert_eq!(audit.documents_skipped, 1);
    }

    #[test]
    fn audit_matches_by_name_across_tables() {
        let (_dir, session) = make_report();
        let page = pages::create_page(&session, "P").unwrap().id;
        bind(&session, &page, "SalesCard", FieldRef::measure("Sales", "Amount"));
        bind(&session, &page, "CostCard", FieldRef::measure("Costs", "Amount"));
        bind(&session, &page, "QtyCard", FieldRef::measure("Sales", "Qty"));

        let report = audit_usage(&session, "Amount").unwrap();
        let visuals: Vec<&str> = report.hits.iter().map(|h| h.visual.as_str()).collect();
        assert_eq!(visuals.len(), 2);
        assert!(visuals.contains(&"SalesCard"));
        assert!(visuals.contains(&"CostCard"));
    }

    #[test]
    fn audit_unused_name_is_empty() {
        let (_dir, session) = make_report();
        let page = pages::create_page(&session, "P").unwrap().id;
        bind(&session, &page, "Card", FieldRef::measure("Sales", "Amount"));
        assert!(audit_usage(&session, "Ghost").unwrap().hits.is_empty());
    }

    #[test]
    fn audit_orders_hits_by_page_then_visual() {
        let (_dir, session) = make_report();
        let first = pages::create_page(&session, "First").unwrap().id;
        let second = pages::create_page(&session, "Second").unwrap().id;
        bind(&session, &second, "OnSecond", FieldRef::measure("Sales", "Amount"));
        bind(&session, &first, "OnFirst", FieldRef::measure("Sales", "Amount"));

        let report = audit_usage(&session, "Amount").unwrap();
        let pages_in_order: Vec<&str> = report
            .hits
            .iter()
            .map(|h| h.page.as_str())
            .collect::<Vec<_>>();
        assert_eq!(pages_in_order, vec!["First", "Second"]);
    }

    #[test]
    fn display_rename_prefers_native_query_ref() {
        let (_dir, session) = make_report();
        let page = pages::create_page(&session, "P").unwrap().id;
        bind(&session, &page, "Card", FieldRef::measure("Sales", "Amount"));

        let mut mapping = BTreeMap::new();
        mapping.insert("Amount".to_owned(), "Net Amount".to_owned());
        let renamed = rename_display_fields(&session, &page, "Card", &mapping).unwrap();
        assert_eq!(renamed, 1);

        let id = visuals::resolve_by_title(&session, &page, "Card").unwrap().id;
        let doc = session.visual_repo(&page).load(&id.0).unwrap();
        let proj = &doc["visual"]["query"]["queryState"]["Values"]["projections"][0];
        assert_eq!(proj["displayName"], "Net Amount");
        assert_eq!(proj["nativeQueryRef"], "Amount", "native ref must not move");
    }
}
