//! # reportforge-refactor
//!
//! Cross-document refactoring over a report definition tree: structural
//! field renames and reverse-usage audits.
//!
//! Call [`rename_field`] to rewrite every reference to `Table[old]` across
//! all pages, or [`audit_usage`] to list the visuals that reference a
//! column or measure name.

pub mod engine;
pub mod walk;

pub use engine::{
    audit_usage, rename_display_fields, rename_field, AuditReport, RenameReport, UsageHit,
};
