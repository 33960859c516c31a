//! Subcommand implementations.

pub mod info;
pub mod page;
pub mod refactor;
pub mod visual;

use std::path::PathBuf;

use anyhow::{Context, Result};
use reportforge_core::ReportSession;
use reportforge_detector::{ProjectScan, RootLocator};

/// Open the session for a command: explicit `--report` path when given,
/// otherwise indicator-file detection starting at the working directory.
pub fn open_session(report: Option<PathBuf>) -> Result<ReportSession> {
    let root = match report {
        Some(path) => path,
        None => {
            let cwd = std::env::current_dir().context("could not determine working directory")?;
            ProjectScan::new(cwd)
                .locate()
                .context("no .pbip project detected — open one or pass --report <path>")?
        }
    };
    ReportSession::open(root).context("failed to open report definition")
}
