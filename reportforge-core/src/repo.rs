//! Uniform file-backed document repository.
//!
//! The report definition is a directory-as-database: one JSON file per node,
//! in a folder named after the node's id. [`DocRepo`] is the single
//! abstraction over that layout, reused by the page registry
//! (`<pages>/<id>/page.json`) and the visual store
//! (`<page>/visuals/<id>/visual.json`).
//!
//! Writes always rewrite the whole document through a `.tmp` sibling plus
//! rename, never patching bytes in place — the tree is shared with the
//! interactive designer and last-writer-wins at file granularity is the only
//! consistency this format offers. Documents are kept as [`serde_json::Value`]
//! so unknown fields survive a load/store round trip verbatim.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{io_err, DocumentError};

/// A directory of `<id>/<doc_name>` JSON documents.
#[derive(Debug, Clone)]
pub struct DocRepo {
    dir: PathBuf,
    doc_name: &'static str,
}

impl DocRepo {
    pub fn new(dir: PathBuf, doc_name: &'static str) -> Self {
        Self { dir, doc_name }
    }

    /// `<dir>/<id>/<doc_name>` — pure, no I/O.
    pub fn doc_path(&self, id: &str) -> PathBuf {
        self.dir.join(id).join(self.doc_name)
    }

    /// Ids of all subfolders that contain a document file, sorted.
    ///
    /// A missing repository directory is an empty repository, not an error
    /// (pages with no visuals have no `visuals/` folder at all).
    pub fn list(&self) -> Result<Vec<String>, DocumentError> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let mut ids: Vec<String> = std::fs::read_dir(&self.dir)
            .map_err(|e| io_err(&self.dir, e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|id| self.doc_path(id).is_file())
            .collect();
        ids.sort();
        Ok(ids)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.doc_path(id).is_file()
    }

    /// Load one document, fresh from disk.
    ///
    /// Returns [`DocumentError::Malformed`] on a parse failure; batch callers
    /// are expected to recover from that variant locally.
    pub fn load(&self, id: &str) -> Result<Value, DocumentError> {
        let path = self.doc_path(id);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        serde_json::from_str(&contents).map_err(|e| DocumentError::Malformed { path, source: e })
    }

    /// Atomically rewrite one whole document.
    pub fn store(&self, id: &str, doc: &Value) -> Result<(), DocumentError> {
        let path = self.doc_path(id);
        write_json_atomic(&path, doc)
    }

    /// Recursively delete the node's folder. Idempotent: deleting an absent
    /// id succeeds.
    pub fn delete(&self, id: &str) -> Result<(), DocumentError> {
        let folder = self.dir.join(id);
        if !folder.exists() {
            return Ok(());
        }
        std::fs::remove_dir_all(&folder).map_err(|e| io_err(&folder, e))?;
        tracing::debug!("deleted {}", folder.display());
        Ok(())
    }
}

/// Serialize → `.tmp` sibling → rename. The `.tmp` lives next to the target
/// so the rename never crosses filesystems.
pub fn write_json_atomic(path: &Path, doc: &Value) -> Result<(), DocumentError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    let rendered = serde_json::to_string_pretty(doc)?;
    std::fs::write(&tmp, rendered).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    tracing::debug!("wrote {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn repo(dir: &TempDir) -> DocRepo {
        DocRepo::new(dir.path().join("nodes"), "node.json")
    }

    #[test]
    fn store_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        let doc = json!({"name": "a1", "custom": {"kept": true}});
        repo.store("a1", &doc).unwrap();
        assert_eq!(repo.load("a1").unwrap(), doc);
    }

    #[test]
    fn store_cleans_up_tmp() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        repo.store("a1", &json!({})).unwrap();
        let tmp = PathBuf::from(format!("{}.tmp", repo.doc_path("a1").display()));
        assert!(!tmp.exists(), ".tmp must be gone after a successful store");
    }

    #[test]
    fn list_is_sorted_and_skips_folders_without_document() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        repo.store("bbb", &json!({})).unwrap();
        repo.store("aaa", &json!({})).unwrap();
        std::fs::create_dir_all(dir.path().join("nodes").join("empty")).unwrap();
        assert_eq!(repo.list().unwrap(), vec!["aaa", "bbb"]);
    }

    #[test]
    fn list_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(repo(&dir).list().unwrap().is_empty());
    }

    #[test]
    fn load_garbage_is_malformed() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        let path = repo.doc_path("bad");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        let err = repo.load("bad").unwrap_err();
        assert!(matches!(err, DocumentError::Malformed { .. }));
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        repo.store("gone", &json!({})).unwrap();
        repo.delete("gone").unwrap();
        assert!(!repo.exists("gone"));
        repo.delete("gone").unwrap();
    }

    #[test]
    fn unknown_fields_survive_rewrite() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        let doc = json!({"known": 1, "$schema": "x", "vendorExtension": [1, 2, 3]});
        repo.store("n", &doc).unwrap();
        let mut loaded = repo.load("n").unwrap();
        loaded["known"] = json!(2);
        repo.store("n", &loaded).unwrap();
        let back = repo.load("n").unwrap();
        assert_eq!(back["$schema"], "x");
        assert_eq!(back["vendorExtension"], json!([1, 2, 3]));
    }
}
