use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{BurnDepth, Laterality};

/// The persisted per-patient document
///
/// Every field is always serialized; absent values are `null`, never `""`.
/// Dates serialize as ISO `yyyy-mm-dd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPatientRecord {
    /// Persistence key
    #[serde(rename = "_id")]
    pub id: u64,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub address: Option<String>,
    pub contact: ContactBlock,
    pub ids: IdsBlock,

    pub injury_date: Option<NaiveDate>,
    pub injury_time: Option<String>,
    pub injury_cause: Option<String>,
    pub injury_location: Vec<String>,
    pub burn_degree: Vec<BurnDegreeRow>,
    pub tbsa: Option<f64>,
    pub inhalation_injury: bool,
    pub pre_hospital_intubation: bool,
    pub pre_hospital_fluid: Vec<FluidRow>,
    pub pre_hospital_other: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub admission_time: Option<String>,
    pub admission_origin: Option<String>,
    pub mechanical_ventilation: bool,
    pub parkland_formula: Option<Map<String, Value>>,
    pub consultations: Vec<String>,
    pub interventions: Vec<InterventionRow>,

    pub discharge_date: Option<NaiveDate>,
    pub discharge_time: Option<String>,
    pub discharge_destination: Option<String>,
    pub death_date: Option<NaiveDate>,
    pub cause_of_death: Option<String>,
    pub autopsy: bool,

    pub medical_history: MedicalHistoryBlock,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactBlock {
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdsBlock {
    /// Hospital process number as text
    pub patient_id: String,
    pub sns_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnDegreeRow {
    pub location: String,
    pub depth: BurnDepth,
    pub laterality: Option<Laterality>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluidRow {
    #[serde(rename = "type")]
    pub fluid_type: String,
    pub volume: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionRow {
    pub date: Option<NaiveDate>,
    pub procedure: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurgeryRow {
    pub procedure: String,
    pub date: Option<NaiveDate>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalHistoryBlock {
    pub diseases: Vec<String>,
    pub medications: Vec<String>,
    pub previous_surgeries: Vec<SurgeryRow>,
    pub allergies: Vec<String>,
}
