//! Image extraction from the converter's intermediate zip archive

use crate::error::{PanelpackError, Result};
use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Extensions treated as page images (compared case-insensitively)
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];

/// Whether an archive entry name looks like an image
pub fn is_image_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Sequential output filename for the `index`-th image (1-based)
pub fn numbered_name(index: usize, original: &str) -> String {
    match Path::new(original).extension() {
        Some(ext) => format!("{:04}.{}", index, ext.to_string_lossy()),
        None => format!("{:04}", index),
    }
}

/// Image entries of an archive as `(name, index)`, sorted by name
fn image_entries<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<(String, usize)>> {
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let file = archive.by_index_raw(i)?;
        if !file.is_dir() && is_image_name(file.name()) {
            entries.push((file.name().to_string(), i));
        }
    }
    entries.sort();
    Ok(entries)
}

/// Extract every image entry of a zip into `output_dir` as `0001.<ext>`,
/// `0002.<ext>`, ... in name order.
///
/// Returns the written paths in order. Nothing is written if the archive holds
/// no images.
pub fn extract_images<R: Read + Seek>(reader: R, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut archive = open_archive(reader)?;
    let entries = image_entries(&mut archive)?;

    if entries.is_empty() {
        return Err(PanelpackError::NoImages);
    }

    fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(entries.len());
    for (position, (name, index)) in entries.iter().enumerate() {
        let mut entry = archive.by_index(*index)?;
        let dest = output_dir.join(numbered_name(position + 1, name));

        let mut out = File::create(&dest)?;
        io::copy(&mut entry, &mut out)?;

        tracing::debug!("Extracted {} -> {:?}", name, dest);
        written.push(dest);
    }

    Ok(written)
}

fn open_archive<R: Read + Seek>(reader: R) -> Result<ZipArchive<R>> {
    ZipArchive::new(reader).map_err(|e| PanelpackError::InvalidArchive(e.to_string()))
}
