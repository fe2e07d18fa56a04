use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Demographic and admission/discharge data extracted from the merged notes
///
/// Dates are as the oracle returned them (`dd-mm-yyyy`); the assembler
/// normalizes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientDemographic {
    /// Overwritten with the filename-derived id after extraction
    #[serde(default, deserialize_with = "deserialize_any_id")]
    pub id_patient: u64,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    /// Hospital process number
    #[serde(default, deserialize_with = "deserialize_process_number")]
    pub process_number: Option<u64>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub admission_date: Option<String>,
    /// HH:MM, 24h
    #[serde(default)]
    pub admission_time: Option<String>,
    /// Where the patient was admitted from
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub discharge_date: Option<String>,
    #[serde(default)]
    pub discharge_time: Option<String>,
    /// Discharge destination
    #[serde(default)]
    pub destination: Option<String>,
}

/// The oracle's id is replaced by the filename id, so any value is accepted
fn deserialize_any_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

/// Number, digit string (`"12345"`) or null
fn deserialize_process_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid process number: {}", n))
        }),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid process number: {:?}", s))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid process number: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_demographic() {
        let json = r#"{
            "id_patient": 99,
            "gender": "F",
            "date_of_birth": "02-03-1950",
            "full_name": "Maria Silva",
            "admission_date": null
        }"#;

        let data: PatientDemographic = serde_json::from_str(json).unwrap();

        assert_eq!(data.id_patient, 99);
        assert_eq!(data.gender.as_deref(), Some("F"));
        assert!(data.admission_date.is_none());
        assert!(data.process_number.is_none());
    }

    #[test]
    fn test_id_patient_accepts_any_shape() {
        for json in [
            r#"{"id_patient": null}"#,
            r#"{"id_patient": "abc"}"#,
            r#"{"id_patient": [1]}"#,
        ] {
            let data: PatientDemographic = serde_json::from_str(json).unwrap();
            assert_eq!(data.id_patient, 0);
        }

        let data: PatientDemographic = serde_json::from_str(r#"{"id_patient": "2301"}"#).unwrap();
        assert_eq!(data.id_patient, 2301);
    }

    #[test]
    fn test_process_number_from_string() {
        let data: PatientDemographic =
            serde_json::from_str(r#"{"process_number": "12345"}"#).unwrap();
        assert_eq!(data.process_number, Some(12345));

        let data: PatientDemographic = serde_json::from_str(r#"{"process_number": ""}"#).unwrap();
        assert_eq!(data.process_number, None);
    }

    #[test]
    fn test_reject_wrong_type() {
        let json = r#"{"process_number": "not a number"}"#;
        assert!(serde_json::from_str::<PatientDemographic>(json).is_err());
    }
}
