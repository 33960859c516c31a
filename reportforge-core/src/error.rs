//! Error types for reportforge-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from document-model operations.
///
/// Variants distinguish "nothing matched" (`PageNotFound`, `VisualNotFound`)
/// from "storage broke" (`Io`, `Malformed`) so callers can react differently.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The directory is not a report root (`definition/pages` missing).
    #[error("no report definition found at {path} — open the .pbip project or pass --report")]
    RootNotFound { path: PathBuf },

    /// No page with the given display name exists in the merged page order.
    #[error("page '{name}' not found")]
    PageNotFound { name: String },

    /// No visual on the page carries the given title.
    #[error("visual '{title}' not found on page '{page}'")]
    VisualNotFound { page: String, title: String },

    /// JSON parse failure on a single document. Batch walks recover from
    /// this locally; single-document operations surface it.
    #[error("malformed document at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (store path).
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`DocumentError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DocumentError {
    DocumentError::Io {
        path: path.into(),
        source,
    }
}
