//! Explicit report-root context.
//!
//! Every operation in this workspace takes a [`ReportSession`] instead of
//! consulting process-wide state. The session is cheap to construct and holds
//! nothing but the validated root path — documents are always re-read from
//! disk per call, because the tree may be concurrently edited by the
//! interactive designer.

use std::path::{Path, PathBuf};

use crate::error::DocumentError;
use crate::repo::DocRepo;
use crate::types::PageId;

/// A validated handle on one `.Report` directory.
#[derive(Debug, Clone)]
pub struct ReportSession {
    root: PathBuf,
}

impl ReportSession {
    /// Open the report at `root`.
    ///
    /// Returns [`DocumentError::RootNotFound`] unless `root/definition/pages`
    /// exists — that directory is the marker every PBIR project carries.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let root = root.into();
        if !root.join("definition").join("pages").is_dir() {
            return Err(DocumentError::RootNotFound { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/definition/pages/`
    pub fn pages_dir(&self) -> PathBuf {
        self.root.join("definition").join("pages")
    }

    /// `<root>/definition/pages/pages.json` — the persisted page order.
    pub fn page_order_path(&self) -> PathBuf {
        self.pages_dir().join("pages.json")
    }

    /// Repository of page documents (`<pages_dir>/<pageId>/page.json`).
    pub fn page_repo(&self) -> DocRepo {
        DocRepo::new(self.pages_dir(), "page.json")
    }

    /// Repository of visual documents for one page
    /// (`<pages_dir>/<pageId>/visuals/<visualId>/visual.json`).
    pub fn visual_repo(&self, page: &PageId) -> DocRepo {
        DocRepo::new(self.pages_dir().join(&page.0).join("visuals"), "visual.json")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
