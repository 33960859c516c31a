//! Cross-crate properties of rename and audit: round trips, idempotence,
//! and the full create → bind → rename → audit flow.

use std::path::PathBuf;

use reportforge_core::{
    pages,
    session::ReportSession,
    types::{BindingSlot, FieldRef, VisualKind},
    visuals,
};
use reportforge_refactor::{audit_usage, rename_field};
use tempfile::TempDir;

fn make_report() -> (TempDir, ReportSession) {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("definition").join("pages")).unwrap();
    let session = ReportSession::open(dir.path()).unwrap();
    (dir, session)
}

fn visual_files(session: &ReportSession) -> Vec<(PathBuf, String)> {
    let mut out = Vec::new();
    for page in pages::list_pages(session).unwrap() {
        let repo = session.visual_repo(&page.id);
        for id in repo.list().unwrap() {
            let path = repo.doc_path(&id);
            out.push((path.clone(), std::fs::read_to_string(path).unwrap()));
        }
    }
    out
}

#[test]
fn rename_round_trip_restores_documents() {
    let (_dir, session) = make_report();
    let page = pages::create_page(&session, "Overview").unwrap().id;
    visuals::create_chart(
        &session,
        &page,
        "Chart",
        &FieldRef::column("Products", "Category"),
        &FieldRef::measure("Sales", "Amount"),
    )
    .unwrap();
    visuals::create_visual(&session, &page, VisualKind::Card, "Card").unwrap();
    visuals::bind_field(
        &session,
        &page,
        "Card",
        &FieldRef::measure("Sales", "Amount"),
        BindingSlot::Values,
    )
    .unwrap();

    let before = visual_files(&session);

    let forward = rename_field(&session, "Sales", "Amount", "Net").unwrap();
    assert_eq!(forward.visuals_changed, 2);
    let back = rename_field(&session, "Sales", "Net", "Amount").unwrap();
    assert_eq!(back.visuals_changed, 2);

    assert_eq!(visual_files(&session), before, "round trip must restore the tree");
}

#[test]
fn repeated_rename_reports_zero_and_leaves_bytes_untouched() {
    let (_dir, session) = make_report();
    let page = pages::create_page(&session, "P").unwrap().id;
    visuals::create_visual(&session, &page, VisualKind::Card, "Card").unwrap();
    visuals::bind_field(
        &session,
        &page,
        "Card",
        &FieldRef::measure("Sales", "Amount"),
        BindingSlot::Values,
    )
    .unwrap();

    let first = rename_field(&session, "Sales", "Amount", "Net").unwrap();
    assert_eq!(first.visuals_changed, 1);
    let after_first = visual_files(&session);

    let second = rename_field(&session, "Sales", "Amount", "Net").unwrap();
    assert_eq!(second.visuals_changed, 0, "second rename must be a no-op");
    assert_eq!(visual_files(&session), after_first, "no-op must not rewrite files");
}

#[test]
fn audit_distinguishes_fields_on_the_same_table() {
    let (_dir, session) = make_report();
    let page = pages::create_page(&session, "P").unwrap().id;
    visuals::create_visual(&session, &page, VisualKind::Card, "AmountCard").unwrap();
    visuals::bind_field(
        &session,
        &page,
        "AmountCard",
        &FieldRef::measure("Sales", "Amount"),
        BindingSlot::Values,
    )
    .unwrap();
    visuals::create_visual(&session, &page, VisualKind::Card, "QtyCard").unwrap();
    visuals::bind_field(
        &session,
        &page,
        "QtyCard",
        &FieldRef::measure("Sales", "Qty"),
        BindingSlot::Values,
    )
    .unwrap();

    let report = audit_usage(&session, "Amount").unwrap();
    assert_eq!(report.hits.len(), 1);
    assert_eq!(report.hits[0].visual, "AmountCard");
}

#[test]
fn end_to_end_create_bind_rename_audit() {
    let (_dir, session) = make_report();

    pages::create_page(&session, "Overview").unwrap();
    let page = pages::resolve_by_name(&session, "Overview").unwrap().id;
    visuals::create_visual(&session, &page, VisualKind::Card, "Revenue").unwrap();
    visuals::bind_field(
        &session,
        &page,
        "Revenue",
        &FieldRef::measure("Sales", "TotalRevenue"),
        BindingSlot::Values,
    )
    .unwrap();

    let listed = visuals::list_visuals(&session, &page).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Revenue");
    assert_eq!(listed[0].visual_type, "card");

    let renamed = rename_field(&session, "Sales", "TotalRevenue", "Revenue$").unwrap();
    assert_eq!(renamed.visuals_changed, 1);

    let audit = audit_usage(&session, "Revenue$").unwrap();
    assert_eq!(audit.hits.len(), 1);
    assert_eq!(audit.hits[0].page, "Overview");
    assert_eq!(audit.hits[0].visual, "Revenue");

    assert!(audit_usage(&session, "TotalRevenue").unwrap().hits.is_empty());
}

#[test]
fn malformed_neighbor_does_not_block_results() {
    let (_dir, session) = make_report();
    let page = pages::create_page(&session, "P").unwrap().id;
    visuals::create_visual(&session, &page, VisualKind::Card, "Card").unwrap();
    visuals::bind_field(
        &session,
        &page,
        "Card",
        &FieldRef::measure("Sales", "Amount"),
        BindingSlot::Values,
    )
    .unwrap();

    let bad = session.visual_repo(&page).doc_path("00-vandalized");
    std::fs::create_dir_all(bad.parent().unwrap()).unwrap();
    std::fs::write(&bad, "]]]").unwrap();

    let listed = visuals::list_visuals(&session, &page).unwrap();
    assert_eq!(listed.len(), 2, "listing keeps the placeholder entry");

    let audit = audit_usage(&session, "Amount").unwrap();
    assert_eq!(audit.hits.len(), 1);
    assert_eq!(audit.documents_skipped, 1);
}
