//! Reportforge core library — domain types, document repository, page and
//! visual stores.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs
//! - [`error`] — [`DocumentError`]
//! - [`session`] — [`ReportSession`], the explicit report-root context
//! - [`repo`] — [`DocRepo`], the uniform file-backed document repository
//! - [`pages`] — page registry: list / create / delete / resolve
//! - [`visuals`] — visual store: list / create / layout / bind / delete
//! - [`model`] — boundary contract for the analytical-model binding

pub mod error;
pub mod model;
pub mod pages;
pub mod repo;
pub mod session;
pub mod types;
pub mod visuals;

pub use error::DocumentError;
pub use session::ReportSession;
pub use types::{
    BindingSlot, FieldKind, FieldRef, PageId, PageSummary, Position, VisualId, VisualKind,
    VisualSummary,
};
