//! Example image index.
//!
//! Scans a directory of labeled sign images once and builds a lookup from
//! normalized label to file path. Filenames are either `<index>_<Label>.<ext>`
//! or `<Label>.<ext>`; the index prefix and the extension are stripped.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub type ExampleIndex = HashMap<String, PathBuf>;

/// Normalize a label or token for index lookup: trim, lowercase, remove
/// spaces, hyphens and underscores.
pub fn normalize_label(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect()
}

/// Build the example index for a directory.
///
/// A missing directory is a configuration issue, not an error: it is
/// logged and an empty index is returned. When two files normalize to the
/// same label, the later one in sorted order wins.
pub fn load(dir: &str) -> ExampleIndex {
    let mut index = ExampleIndex::new();
    let path = Path::new(dir);
    if !path.is_dir() {
        log::warn!("Example directory not found: {}", dir);
        return index;
    }
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Can't read example directory {}: {}", dir, e);
            return index;
        }
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_example_image(p))
        .collect();
    files.sort();
    for file in files {
        if let Some(key) = label_from_filename(&file) {
            if !key.is_empty() {
                index.insert(key, file);
            }
        }
    }
    index
}

/// Only jpg/jpeg/png files are indexed.
fn is_example_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg" | "png"),
        None => false,
    }
}

/// Extract the normalized label from a filename, stripping a leading
/// `<index>_` segment when present.
fn label_from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let label = match stem.split_once('_') {
        Some((_, rest)) => rest,
        None => stem,
    };
    Some(normalize_label(label))
}
