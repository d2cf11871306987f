//! ZIP packaging of processed outputs for download.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use anyhow::{Context, Result};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Zips every regular file directly inside `dir` (no recursion — output
/// folders are flat) into an in-memory archive. Entries are sorted by name
/// so the archive bytes are deterministic for a given folder state.
pub fn zip_dir_to_bytes(dir: &Path) -> Result<Vec<u8>> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("reading output folder {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for name in &names {
        let data = fs::read(dir.join(name))
            .with_context(|| format!("reading output file {name}"))?;
        writer.start_file(name.as_str(), options)?;
        writer.write_all(&data)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Number of entries in a ZIP archive. Used by handlers and tests to
/// report how many documents a batch produced.
pub fn archive_entry_count(bytes: &[u8]) -> Result<usize> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    Ok(archive.len())
}
