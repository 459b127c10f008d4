//! Directory scanning for supported document files.

use std::path::Path;

use tracing::debug;

use crate::document::FileType;
use crate::error::{RagError, Result};

/// List the supported document files (PDF/DOCX) directly inside `dir`.
///
/// Returns file names, not paths, sorted for deterministic processing
/// order. Subdirectories are not descended into. An empty directory yields
/// an empty list; a missing directory is an error.
///
/// # Errors
///
/// Returns [`RagError::DirectoryNotFound`] if `dir` does not exist.
pub fn scan_documents(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(RagError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            debug!(path = %entry.path().display(), "skipping non-UTF-8 file name");
            continue;
        };
        if FileType::from_file_name(&name).is_some() {
            files.push(name);
        }
    }
    files.sort();

    debug!(dir = %dir.display(), count = files.len(), "scanned document directory");
    Ok(files)
}
