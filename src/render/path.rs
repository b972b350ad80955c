//! Output path helpers.

use std::path::{Path, PathBuf};

/// Lowercased extension of `path`, if it has one.
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// `path` with its extension replaced (or added) by `ext`.
pub fn set_extension(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}
