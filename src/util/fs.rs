//! Filesystem helpers for the driver.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Names of the regular files directly inside a directory, sorted.
///
/// Sorting keeps downstream behavior independent of readdir order.
pub fn regular_file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    names.sort();
    Ok(names)
}
