use std::fmt;

use serde::{Deserialize, Serialize};

/// Clinical note category, one file per patient per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    AdmissionNote,
    DischargeNote,
    DeathNotice,
    DeathCertificate,
}

impl SectionType {
    /// Canonical merge order
    pub const ORDERED: [SectionType; 4] = [
        SectionType::AdmissionNote,
        SectionType::DischargeNote,
        SectionType::DeathNotice,
        SectionType::DeathCertificate,
    ];

    /// Map a filename type code (E, A, BIC, O) to a section type
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "E" => Some(SectionType::AdmissionNote),
            "A" => Some(SectionType::DischargeNote),
            "BIC" => Some(SectionType::DeathNotice),
            "O" => Some(SectionType::DeathCertificate),
            _ => None,
        }
    }

    /// Label used in the merged document's begin/end markers
    pub fn display_name(&self) -> &'static str {
        match self {
            SectionType::AdmissionNote => "unit admission note",
            SectionType::DischargeNote => "unit discharge note",
            SectionType::DeathNotice => "death notice information",
            SectionType::DeathCertificate => "death certificate",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One converter output file: a single section for a single patient
#[derive(Debug, Clone)]
pub struct RawSectionFile {
    /// Patient identifier (digits of the filename)
    pub patient_id: u64,
    /// Section type (letters of the filename)
    pub section: SectionType,
    /// Raw markdown text
    pub text: String,
}

/// Why a filename could not be mapped to (patient id, section type)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileNameError {
    #[error("no patient id digits in filename")]
    NoDigits,
    #[error("unknown section type code {0:?}")]
    UnknownTypeCode(String),
    #[error("patient id {0:?} does not round-trip as a number")]
    NonCanonicalId(String),
}

/// Derive the patient id from a filename: every digit of the stem, concatenated
///
/// Digit strings with leading zeros or too long for `u64` are rejected, since
/// `0123` and `123` would otherwise merge into one patient.
pub fn patient_id_from_name(file_name: &str) -> Result<u64, FileNameError> {
    let stem = file_stem(file_name);
    let digits: String = stem.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(FileNameError::NoDigits);
    }
    match digits.parse::<u64>() {
        Ok(id) if id.to_string() == digits => Ok(id),
        _ => Err(FileNameError::NonCanonicalId(digits)),
    }
}

/// Parse `2301BIC.md` into `(2301, DeathNotice)`
pub fn parse_section_file_name(file_name: &str) -> Result<(u64, SectionType), FileNameError> {
    let patient_id = patient_id_from_name(file_name)?;
    let code: String = file_stem(file_name)
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();
    let section = SectionType::from_code(&code).ok_or(FileNameError::UnknownTypeCode(code))?;
    Ok((patient_id, section))
}

fn file_stem(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

impl RawSectionFile {
    /// Build from a filename and its contents
    pub fn from_named(file_name: &str, text: String) -> Result<Self, FileNameError> {
        let (patient_id, section) = parse_section_file_name(file_name)?;
        Ok(Self {
            patient_id,
            section,
            text,
        })
    }
}

/// All normalized sections of one patient, concatenated in canonical order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedPatientDocument {
    pub patient_id: u64,
    /// Sections present, in the order they appear in `text`
    pub sections: Vec<SectionType>,
    pub text: String,
}

impl MergedPatientDocument {
    /// File name of the merged intermediate output
    pub fn file_name(&self) -> String {
        format!("{}.md", self.patient_id)
    }

    /// Wrap an already-merged text read back from disk
    pub fn from_merged_text(patient_id: u64, text: String) -> Self {
        let sections = SectionType::ORDERED
            .into_iter()
            .filter(|s| text.contains(&format!(">> {} <<", s.display_name())))
            .collect();
        Self {
            patient_id,
            sections,
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_section_file_name() {
        assert_eq!(
            parse_section_file_name("2301E.md"),
            Ok((2301, SectionType::AdmissionNote))
        );
        assert_eq!(
            parse_section_file_name("2301BIC.md"),
            Ok((2301, SectionType::DeathNotice))
        );
        assert_eq!(
            parse_section_file_name("o2301.md"),
            Ok((2301, SectionType::DeathCertificate))
        );
    }

    #[test]
    fn test_parse_section_file_name_errors() {
        assert_eq!(parse_section_file_name("E.md"), Err(FileNameError::NoDigits));
        assert_eq!(
            parse_section_file_name("2301X.md"),
            Err(FileNameError::UnknownTypeCode("X".to_string()))
        );
    }

    #[test]
    fn test_non_canonical_ids_rejected() {
        assert_eq!(
            parse_section_file_name("0123E.md"),
            Err(FileNameError::NonCanonicalId("0123".to_string()))
        );
        assert_eq!(
            patient_id_from_name("123456789012345678901234A.md"),
            Err(FileNameError::NonCanonicalId("123456789012345678901234".to_string()))
        );
        assert_eq!(patient_id_from_name("0.md"), Ok(0));
    }

    #[test]
    fn test_merged_document_sections_from_text() {
        let text = ">> unit admission note <<\nA\n>> END unit admission note <<\n\n\
                    >> death certificate <<\nB\n>> END death certificate <<\n";
        let doc = MergedPatientDocument::from_merged_text(7, text.to_string());
        assert_eq!(
            doc.sections,
            vec![SectionType::AdmissionNote, SectionType::DeathCertificate]
        );
        assert_eq!(doc.file_name(), "7.md");
    }
}
