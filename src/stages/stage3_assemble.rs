use chrono::NaiveDate;

use crate::models::{
    BurnDegreeRow, BurnInjury, CanonicalPatientRecord, ContactBlock, FluidRow, IdsBlock,
    InterventionRow, MedicalHistory, MedicalHistoryBlock, PatientDemographic, SurgeryRow,
};

const SOURCE_DATE_FORMAT: &str = "%d-%m-%Y";

/// Parse a `dd-mm-yyyy` date; anything else is no value
pub fn normalize_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, SOURCE_DATE_FORMAT).ok()
}

/// Trimmed, non-empty text or no value
fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Perform Stage 3: combine the domain records into the persisted shape
///
/// Total for any demographic record. Missing injury or history records
/// produce their defaults; nested blocks are always present.
pub fn assemble(
    demographic: PatientDemographic,
    injury: Option<BurnInjury>,
    history: Option<MedicalHistory>,
) -> CanonicalPatientRecord {
    let injury = injury.unwrap_or_default();
    let history = history.unwrap_or_default();

    let ids = IdsBlock {
        patient_id: demographic
            .process_number
            .map(|n| n.to_string())
            .unwrap_or_default(),
        sns_number: String::new(),
    };

    CanonicalPatientRecord {
        id: demographic.id_patient,
        name: clean_text(demographic.full_name),
        gender: clean_text(demographic.gender),
        dob: normalize_date(demographic.date_of_birth.as_deref()),
        address: clean_text(demographic.address),
        contact: ContactBlock::default(),
        ids,

        injury_date: normalize_date(injury.injury_date.as_deref()),
        injury_time: clean_text(injury.injury_time),
        injury_cause: clean_text(injury.injury_cause),
        injury_location: injury.injury_location,
        burn_degree: injury
            .burn_degree
            .into_iter()
            .map(|b| BurnDegreeRow {
                location: b.location,
                depth: b.depth,
                laterality: b.laterality,
            })
            .collect(),
        tbsa: injury.tbsa,
        inhalation_injury: injury.inhalation_injury,
        pre_hospital_intubation: injury.pre_hospital_intubation,
        pre_hospital_fluid: injury
            .pre_hospital_fluid
            .into_iter()
            .map(|f| FluidRow {
                fluid_type: f.fluid_type,
                volume: f.volume,
            })
            .collect(),
        pre_hospital_other: clean_text(injury.pre_hospital_other),
        admission_date: normalize_date(demographic.admission_date.as_deref()),
        admission_time: clean_text(demographic.admission_time),
        admission_origin: clean_text(demographic.origin),
        mechanical_ventilation: injury.mechanical_ventilation,
        parkland_formula: injury.parkland_formula,
        consultations: injury.consultations,
        interventions: injury
            .interventions
            .into_iter()
            .map(|i| InterventionRow {
                date: normalize_date(i.date.as_deref()),
                procedure: i.procedure,
                details: clean_text(i.details),
            })
            .collect(),

        discharge_date: normalize_date(demographic.discharge_date.as_deref()),
        discharge_time: clean_text(demographic.discharge_time),
        discharge_destination: clean_text(demographic.destination),
        death_date: None,
        cause_of_death: None,
        autopsy: false,

        medical_history: MedicalHistoryBlock {
            diseases: history.diseases,
            medications: history.medications,
            previous_surgeries: history
                .previous_surgeries
                .into_iter()
                .map(|s| SurgeryRow {
                    procedure: s.procedure,
                    date: normalize_date(s.date.as_deref()),
                    details: clean_text(s.details),
                })
                .collect(),
            allergies: history.allergies,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BurnDepth, BurnLocationEntry, FluidAdministration, Intervention, Laterality, Surgery};

    fn demographic() -> PatientDemographic {
        PatientDemographic {
            id_patient: 2301,
            full_name: Some("João Santos".to_string()),
            gender: Some("M".to_string()),
            date_of_birth: Some("15-01-1960".to_string()),
            process_number: Some(12345),
            admission_date: Some("03-02-2023".to_string()),
            discharge_date: Some("31-02-2023".to_string()),
            address: Some("  ".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(
            normalize_date(Some("15-01-2023")),
            NaiveDate::from_ymd_opt(2023, 1, 15)
        );
        assert_eq!(normalize_date(Some("31-02-2023")), None);
        assert_eq!(normalize_date(Some("2023-01-15")), None);
        assert_eq!(normalize_date(Some("")), None);
        assert_eq!(normalize_date(None), None);
    }

    #[test]
    fn test_date_serializes_iso() {
        let record = assemble(
            PatientDemographic {
                admission_date: Some("15-01-2023".to_string()),
                ..Default::default()
            },
            None,
            None,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["admission_date"], "2023-01-15");
        assert!(json["discharge_date"].is_null());
    }

    #[test]
    fn test_demographic_only() {
        let record = assemble(demographic(), None, None);

        assert_eq!(record.id, 2301);
        assert_eq!(record.dob, NaiveDate::from_ymd_opt(1960, 1, 15));
        assert_eq!(record.discharge_date, None);
        assert_eq!(record.address, None);
        assert_eq!(record.ids.patient_id, "12345");
        assert_eq!(record.ids.sns_number, "");
        assert_eq!(record.contact, ContactBlock::default());
        assert!(record.burn_degree.is_empty());
        assert!(record.tbsa.is_none());
        assert!(!record.inhalation_injury);
        assert_eq!(record.medical_history, MedicalHistoryBlock::default());
    }

    #[test]
    fn test_stable_shape_without_optional_records() {
        let json = serde_json::to_value(assemble(PatientDemographic::default(), None, None)).unwrap();

        assert_eq!(json["_id"], 0);
        assert_eq!(json["contact"]["phone"], "");
        assert_eq!(json["ids"]["patient_id"], "");
        assert_eq!(json["burn_degree"], serde_json::json!([]));
        assert!(json["tbsa"].is_null());
        assert_eq!(json["medical_history"]["diseases"], serde_json::json!([]));
        assert_eq!(json["medical_history"]["previous_surgeries"], serde_json::json!([]));
        assert_eq!(json["autopsy"], false);
    }

    #[test]
    fn test_projections() {
        let injury = BurnInjury {
            injury_date: Some("01-02-2023".to_string()),
            burn_degree: vec![BurnLocationEntry::new("arm", BurnDepth::ThirdDegree)
                .with_laterality(Laterality::Left)
                .circumferential()],
            tbsa: Some(18.0),
            pre_hospital_fluid: vec![FluidAdministration {
                fluid_type: "Lactato de Ringer".to_string(),
                volume: "1000 ml".to_string(),
            }],
            interventions: vec![Intervention {
                date: Some("05-02-2023".to_string()),
                procedure: "escharotomy".to_string(),
                details: None,
            }],
            ..Default::default()
        };
        let history = MedicalHistory {
            diseases: vec!["HTA".to_string()],
            previous_surgeries: vec![Surgery {
                procedure: "appendectomy".to_string(),
                date: None,
                details: Some("childhood".to_string()),
            }],
            ..Default::default()
        };

        let record = assemble(demographic(), Some(injury), Some(history));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json["burn_degree"][0],
            serde_json::json!({"location": "arm", "depth": "third-degree", "laterality": "left"})
        );
        assert_eq!(
            json["pre_hospital_fluid"][0],
            serde_json::json!({"type": "Lactato de Ringer", "volume": "1000 ml"})
        );
        assert_eq!(json["interventions"][0]["date"], "2023-02-05");
        assert_eq!(json["injury_date"], "2023-02-01");
        assert_eq!(json["tbsa"], 18.0);
        assert_eq!(json["medical_history"]["diseases"][0], "HTA");
        assert!(json["medical_history"]["previous_surgeries"][0]["date"].is_null());
    }
}
