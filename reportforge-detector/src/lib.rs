//! Report-root discovery for `reportforge-detector`.
//!
//! A PBIR project on disk looks like:
//!
//! ```text
//! MyReport.pbip
//! MyReport.Report/
//!   definition/
//!     pages/
//! MyReport.SemanticModel/
//! ```
//!
//! [`ProjectScan`] finds the `.Report` directory by indicator files: it
//! looks for a `*.pbip` manifest with a sibling `<name>.Report` folder that
//! contains `definition/pages`, or a directory that is itself such a
//! `.Report` root. The scan starts at a given directory and walks up a
//! bounded number of parents.
//!
//! [`RootLocator`] is the seam callers program against; tests and embedders
//! can substitute their own discovery (e.g. one backed by live-session
//! inspection).

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from root discovery.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no .pbip project found at or above '{path}'")]
    NotFound { path: PathBuf },
}

/// Contract: locate the report definition root of the active project.
pub trait RootLocator {
    fn locate(&self) -> Result<PathBuf, DetectError>;
}

/// Indicator-file scan starting at a directory.
#[derive(Debug, Clone)]
pub struct ProjectScan {
    start: PathBuf,
    max_ascent: usize,
}

impl ProjectScan {
    /// Scan `start` and up to three parent directories.
    pub fn new(start: impl Into<PathBuf>) -> Self {
        Self {
            start: start.into(),
            max_ascent: 3,
        }
    }

    pub fn with_max_ascent(mut self, max_ascent: usize) -> Self {
        self.max_ascent = max_ascent;
        self
    }
}

impl RootLocator for ProjectScan {
    fn locate(&self) -> Result<PathBuf, DetectError> {
        let mut dir = self.start.as_path();
        for _ in 0..=self.max_ascent {
            if let Some(root) = find_report_root(dir)? {
                tracing::debug!("detected report root at {}", root.display());
                return Ok(root);
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
        Err(DetectError::NotFound {
            path: self.start.clone(),
        })
    }
}

/// Check whether `path` is itself a report definition root.
fn is_report_root(path: &Path) -> bool {
    path.join("definition").join("pages").is_dir()
}

/// Scan a single directory for a project.
///
/// Priority order: the directory itself being a `.Report` root, then the
/// first `*.pbip` manifest (sorted by name) whose sibling `.Report` folder
/// qualifies.
pub fn find_report_root(dir: &Path) -> Result<Option<PathBuf>, DetectError> {
    if is_report_root(dir) {
        return Ok(Some(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut manifests: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "pbip").unwrap_or(false))
        .collect();
    manifests.sort();

    for manifest in manifests {
        let report_dir = manifest.with_extension("Report");
        if is_report_root(&report_dir) {
            return Ok(Some(report_dir));
        }
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
