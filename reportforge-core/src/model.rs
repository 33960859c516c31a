//! Boundary contract for the analytical-model binding.
//!
//! The semantic model behind a report (tables, columns, measures) lives in a
//! separate engine that this workspace never talks to directly. When a
//! binding is available, callers may use it to validate names before a
//! rename or to preview data — none of the document-model operations require
//! it.

use thiserror::Error;

/// Kind of model object to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelObjectKind {
    Table,
    Column,
    Measure,
}

/// A tabular query result. Implementations cap the row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Errors a binding implementation may surface.
#[derive(Debug, Error)]
pub enum BindingError {
    /// No live model session is reachable.
    #[error("analytical model is not available")]
    Unavailable,

    /// The backing engine rejected the request.
    #[error("model backend error: {0}")]
    Backend(String),
}

/// Contract for the (external) analytical-model collaborator.
pub trait ModelBinding {
    fn list_objects(&self, kind: ModelObjectKind) -> Result<Vec<String>, BindingError>;

    fn run_query(&self, text: &str) -> Result<QueryRows, BindingError>;

    fn create_measure(&self, table: &str, name: &str, expression: &str)
        -> Result<(), BindingError>;

    fn update_measure(&self, table: &str, name: &str, expression: &str)
        -> Result<(), BindingError>;

    fn delete_measure(&self, table: &str, name: &str) -> Result<(), BindingError>;

    fn create_relationship(
        &self,
        from_table: &str,
        from_column: &str,
        to_table: &str,
        to_column: &str,
    ) -> Result<(), BindingError>;

    fn delete_relationship(
        &self,
        from_table: &str,
        from_column: &str,
        to_table: &str,
        to_column: &str,
    ) -> Result<(), BindingError>;
}
