//! Catalogs PRISM rasters already on disk.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::{
    error::Result,
    filename::{self, FileMetadata},
};

const RASTER_EXTENSION: &str = ".bil";

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub metadata: FileMetadata,
    pub file_name: String,
    pub full_path: PathBuf,
}

/// Metadata for every raster in `path`, or anywhere beneath it when
/// `recursive` is set, ordered by path. Unparsable names are included.
pub fn scan(path: &Path, recursive: bool) -> Result<Vec<CatalogEntry>> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut entries = Vec::new();

    for entry in WalkDir::new(path).min_depth(1).max_depth(max_depth) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if !is_raster(&file_name) {
            continue;
        }

        entries.push(CatalogEntry {
            metadata: filename::decode(&file_name),
            file_name,
            full_path: entry.into_path(),
        });
    }
    entries.sort_by(|a, b| a.full_path.cmp(&b.full_path));

    debug!(path = %path.display(), rasters = entries.len(), "catalog scanned");

    Ok(entries)
}

fn is_raster(file_name: &str) -> bool {
    file_name.len() > RASTER_EXTENSION.len()
        && file_name.ends_with(RASTER_EXTENSION)
        && !file_name.chars().any(char::is_whitespace)
}

// -- Tests -------------------------------------------------------------------
