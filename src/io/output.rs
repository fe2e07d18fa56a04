use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::{CanonicalPatientRecord, MergedPatientDocument};

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {:?}", dir))
}

/// Write one merged document as `<dir>/<patient-id>.md`
pub fn write_merged_document(dir: &Path, document: &MergedPatientDocument) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(document.file_name());
    let mut file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    write!(file, "{}", document.text)?;
    Ok(path)
}

/// Write a canonical record as `<dir>/<patient-id>.json`
///
/// Existing files are overwritten; duplicate-key policy belongs to the
/// persistence layer that imports these files.
pub fn write_record_json(dir: &Path, record: &CanonicalPatientRecord) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(format!("{}.json", record.id));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, record).context("Failed to write JSON")?;
    Ok(path)
}

/// Write cleaned lines to a text file
pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    std::fs::write(path, lines.join("\n"))
        .with_context(|| format!("Failed to write file: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientDemographic;
    use crate::stages::assemble;

    #[test]
    fn test_write_merged_document() {
        let dir = tempfile::tempdir().unwrap();
        let doc = MergedPatientDocument::from_merged_text(2301, "texto".to_string());

        let path = write_merged_document(&dir.path().join("merged"), &doc).unwrap();

        assert!(path.ends_with("2301.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "texto");
    }

    #[test]
    fn test_write_record_json() {
        let dir = tempfile::tempdir().unwrap();
        let record = assemble(
            PatientDemographic {
                id_patient: 17,
                ..Default::default()
            },
            None,
            None,
        );

        let path = write_record_json(dir.path(), &record).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(path.ends_with("17.json"));
        assert_eq!(json["_id"], 17);

        let back: CanonicalPatientRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_write_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean").join("2301E.md");

        write_lines(&path, &["a".to_string(), "b".to_string()]).unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "a\nb");
    }
}
