use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use super::normalize;
use crate::models::{MergedPatientDocument, RawSectionFile, SectionType};

/// Result of Stage 1 merging
#[derive(Debug, Default)]
pub struct MergeResult {
    /// One document per patient, ordered by patient id
    pub documents: Vec<MergedPatientDocument>,
    /// Files replaced by a later file of the same (patient, section)
    pub duplicate_files: usize,
}

/// Perform Stage 1: group section files per patient and concatenate them
///
/// Sections are emitted in the fixed order admission, discharge, death
/// notice, death certificate, whatever order the files arrive in. Missing
/// sections are skipped. Patients with no files produce no document.
pub fn merge_sections<I>(files: I) -> MergeResult
where
    I: IntoIterator<Item = RawSectionFile>,
{
    let mut by_patient: BTreeMap<u64, BTreeMap<SectionType, RawSectionFile>> = BTreeMap::new();
    let mut duplicate_files = 0;

    for file in files {
        let sections = by_patient.entry(file.patient_id).or_default();
        if let Some(previous) = sections.insert(file.section, file) {
            warn!(
                "Patient {}: duplicate {} file, keeping the later one",
                previous.patient_id, previous.section
            );
            duplicate_files += 1;
        }
    }

    let documents: Vec<MergedPatientDocument> = by_patient
        .into_iter()
        .map(|(patient_id, sections)| merge_patient(patient_id, sections))
        .collect();

    info!(
        "Stage 1: merged {} patients ({} duplicate files)",
        documents.len(),
        duplicate_files
    );

    MergeResult {
        documents,
        duplicate_files,
    }
}

fn merge_patient(
    patient_id: u64,
    mut sections: BTreeMap<SectionType, RawSectionFile>,
) -> MergedPatientDocument {
    let mut blocks = Vec::new();
    let mut present = Vec::new();

    for section in SectionType::ORDERED {
        let Some(file) = sections.remove(&section) else {
            continue;
        };

        let normalized = normalize(&file.text);
        debug!(
            "Patient {}: {} kept {} lines ({} boilerplate, {} duplicates)",
            patient_id,
            section,
            normalized.lines.len(),
            normalized.boilerplate_removed,
            normalized.duplicates_removed
        );

        blocks.push(render_section(section, &normalized.text()));
        present.push(section);
    }

    MergedPatientDocument {
        patient_id,
        sections: present,
        text: blocks.join("\n"),
    }
}

fn render_section(section: SectionType, content: &str) -> String {
    let name = section.display_name();
    format!(">> {} <<\n{}\n>> END {} <<\n", name, content, name)
}
