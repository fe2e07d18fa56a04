use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::models::{
    parse_section_file_name, patient_id_from_name, MergedPatientDocument, RawSectionFile,
};

/// List `*.md` files in a directory, sorted by path
fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {:?}", dir))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read directory entry in {:?}", dir))?
            .path();
        if path.is_file() && path.extension().is_some_and(|e| e == "md") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// Read one converter output file; invalid UTF-8 from the OCR converter is
/// replaced rather than rejected
pub fn read_section_file(path: &Path) -> Result<RawSectionFile> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("{:?} is not valid UTF-8, replacing invalid bytes", path);
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    RawSectionFile::from_named(file_name(path), text)
        .with_context(|| format!("Invalid section file name: {:?}", path))
}

/// Read every section file in `dir`; files whose names do not map to a
/// (patient, section) pair, or that cannot be read, are skipped with a warning
pub fn read_section_dir(dir: &Path) -> Result<Vec<RawSectionFile>> {
    let mut files = Vec::new();

    for path in markdown_files(dir)? {
        if let Err(e) = parse_section_file_name(file_name(&path)) {
            warn!("Skipping {:?}: {}", path, e);
            continue;
        }
        match read_section_file(&path) {
            Ok(file) => files.push(file),
            Err(e) => warn!("Skipping {:?}: {:#}", path, e),
        }
    }

    info!("Read {} section files from {:?}", files.len(), dir);
    Ok(files)
}

/// Read a merged `<patient-id>.md` document
pub fn read_merged_file(path: &Path) -> Result<MergedPatientDocument> {
    let patient_id = patient_id_from_name(file_name(path))
        .with_context(|| format!("No patient id in file name: {:?}", path))?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;
    Ok(MergedPatientDocument::from_merged_text(patient_id, text))
}

/// Read merged documents from a single file or every `*.md` file in a directory
pub fn read_merged_input(path: &Path) -> Result<Vec<MergedPatientDocument>> {
    if path.is_file() {
        return Ok(vec![read_merged_file(path)?]);
    }

    let mut documents = Vec::new();
    for file in markdown_files(path)? {
        match read_merged_file(&file) {
            Ok(doc) => documents.push(doc),
            Err(e) => warn!("Skipping {:?}: {:#}", file, e),
        }
    }
    info!("Read {} merged documents from {:?}", documents.len(), path);
    Ok(documents)
}
