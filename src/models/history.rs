use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surgery {
    pub procedure: String,
    /// dd-mm-yyyy, if known
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// Medical history prior to the current burn episode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicalHistory {
    #[serde(default)]
    pub diseases: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub previous_surgeries: Vec<Surgery>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

impl MedicalHistory {
    /// No disease, medication, surgery or allergy recorded
    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
            && self.medications.is_empty()
            && self.previous_surgeries.is_empty()
            && self.allergies.is_empty()
    }
}
