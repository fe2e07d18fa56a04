use serde_json::json;

use super::oracle::ToolSpec;
use crate::models::BurnDepth;

fn nullable_string(description: &str) -> serde_json::Value {
    json!({"type": ["string", "null"], "description": description})
}

fn string_list(description: &str) -> serde_json::Value {
    json!({
        "type": "array",
        "items": {"type": "string"},
        "description": description
    })
}

/// Tool schema for demographic extraction
pub fn patient_tool() -> ToolSpec {
    ToolSpec {
        name: "record_patient_data",
        description: "Record the patient's identification, admission and discharge data",
        input_schema: json!({
            "type": "object",
            "properties": {
                "id_patient": {"type": "integer", "description": "Patient ID, if stated"},
                "gender": nullable_string("M or F"),
                "date_of_birth": nullable_string("dd-mm-yyyy"),
                "process_number": {"type": ["integer", "null"], "description": "Hospital process number"},
                "full_name": nullable_string("Full patient name"),
                "address": nullable_string("Full street address when available"),
                "admission_date": nullable_string("Burn unit admission date, dd-mm-yyyy"),
                "admission_time": nullable_string("HH:MM, 24h"),
                "origin": nullable_string("Where the patient was admitted from"),
                "discharge_date": nullable_string("dd-mm-yyyy"),
                "discharge_time": nullable_string("HH:MM, 24h"),
                "destination": nullable_string("Discharge destination")
            },
            "required": []
        }),
    }
}

/// Tool schema for burn injury extraction
pub fn burn_tool() -> ToolSpec {
    let depths: Vec<&str> = BurnDepth::ALL.iter().map(|d| d.as_str()).collect();

    ToolSpec {
        name: "record_burn_data",
        description: "Record the burn injury, pre-hospital care and burn unit interventions",
        input_schema: json!({
            "type": "object",
            "properties": {
                "injury_date": nullable_string("dd-mm-yyyy"),
                "injury_time": nullable_string("HH:MM, 24h"),
                "injury_cause": nullable_string("Mechanism and agent of the burn"),
                "injury_location": string_list("Where the accident happened"),
                "burn_degree": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "location": {"type": "string", "description": "Body part in english, without side"},
                            "depth": {"type": "string", "enum": depths},
                            "laterality": {"type": ["string", "null"], "enum": ["left", "right", "bilateral", null]},
                            "circumferential": {"type": ["boolean", "null"]}
                        },
                        "required": ["location", "depth"]
                    }
                },
                "tbsa": {"type": ["number", "null"], "description": "Total body surface area burned, percent"},
                "inhalation_injury": {"type": "boolean"},
                "pre_hospital_intubation": {"type": "boolean"},
                "pre_hospital_fluid": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "type": {"type": "string"},
                            "volume": {"type": "string"}
                        },
                        "required": ["type", "volume"]
                    }
                },
                "pre_hospital_other": nullable_string("Other pre-hospital care"),
                "mechanical_ventilation": {"type": "boolean"},
                "parkland_formula": {"type": ["object", "null"], "description": "Parkland formula values as stated"},
                "consultations": string_list("Specialty consultations"),
                "interventions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "date": nullable_string("dd-mm-yyyy"),
                            "procedure": {"type": "string"},
                            "details": nullable_string("Additional details")
                        },
                        "required": ["procedure"]
                    }
                }
            },
            "required": []
        }),
    }
}

/// Tool schema for prior medical history extraction
pub fn history_tool() -> ToolSpec {
    ToolSpec {
        name: "record_medical_history",
        description: "Record the patient's medical history before the current burn episode",
        input_schema: json!({
            "type": "object",
            "properties": {
                "diseases": string_list("Pre-existing conditions"),
                "medications": string_list("Regular medications before the injury"),
                "previous_surgeries": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "procedure": {"type": "string"},
                            "date": nullable_string("dd-mm-yyyy if known"),
                            "details": nullable_string("Additional details")
                        },
                        "required": ["procedure"]
                    }
                },
                "allergies": string_list("Known allergies")
            },
            "required": []
        }),
    }
}
