//! File discovery for finding eligible images in the input directory.

use std::path::{Path, PathBuf};

use crate::error::BatchError;

/// Extensions eligible for processing, matched case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// List eligible image files directly inside `dir` (non-recursive).
///
/// Results are sorted by path so reporting order is deterministic;
/// nothing downstream depends on the order for correctness.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::InputDirMissing(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|e| BatchError::InputDirUnreadable {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BatchError::InputDirUnreadable {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if path.is_file() && is_supported(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Check if a file has a supported extension (case-insensitive).
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.iter().any(|fmt| *fmt == ext_lower)
        })
        .unwrap_or(false)
}
