//! Fetches archives over HTTP and unpacks them.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use futures::StreamExt;
use reqwest::RequestBuilder;
use tracing::debug;
use zip::ZipArchive;

use crate::error::{PrismError, Result};

/// Streams the response body of `request` into `file_path`.
pub async fn fetch_to_file(request: RequestBuilder, file_path: &Path) -> Result<u64> {
    let response = request.send().await?.error_for_status()?;

    let mut file = File::create(file_path)?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
    }
    file.flush()?;

    debug!(path = %file_path.display(), bytes = downloaded, "archive written");

    Ok(downloaded)
}

/// Unpacks every entry of the zip archive into `working_dir`.
pub fn extract_zip(archive_path: &Path, working_dir: &Path) -> Result<Vec<PathBuf>> {
    let archive_error = |e: zip::result::ZipError| PrismError::Archive {
        path: archive_path.to_path_buf(),
        reason: e.to_string(),
    };

    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(archive_error)?;

    let extracted: Vec<PathBuf> = archive
        .file_names()
        .map(|name| working_dir.join(name))
        .collect();
    archive.extract(working_dir).map_err(archive_error)?;

    debug!(
        archive = %archive_path.display(),
        files = extracted.len(),
        "archive extracted"
    );

    Ok(extracted)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::{write::SimpleFileOptions, ZipWriter};

    /// Zip archive holding the given files, as PRISM ships them.
    pub(crate) fn zip_fixture(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in files {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(contents).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn should_extract_all_entries() {
        let dir = TempDir::new().unwrap();
        let archive_path = dir.path().join("PRISM_tmean_stable_4kmD2_20170101_bil.zip");
        std::fs::write(
            &archive_path,
            zip_fixture(&[
                ("PRISM_tmean_stable_4kmD2_20170101_bil.bil", b"raster"),
                ("PRISM_tmean_stable_4kmD2_20170101_bil.hdr", b"header"),
            ]),
        )
        .unwrap();

        let extracted = extract_zip(&archive_path, dir.path()).unwrap();

        assert_eq!(extracted.len(), 2);
        let bil = dir.path().join("PRISM_tmean_stable_4kmD2_20170101_bil.bil");
        assert!(extracted.contains(&bil));
        assert_eq!(std::fs::read(bil).unwrap(), b"raster");
    }

    #[test]
    fn should_report_corrupt_archive() {
        let dir = TempDir::new().unwrap();
        let archive_path = dir.path().join("broken.zip");
        std::fs::write(&archive_path, b"not a zip").unwrap();

        let result = extract_zip(&archive_path, dir.path());

        assert!(matches!(result, Err(PrismError::Archive { path, .. }) if path == archive_path));
    }
}
