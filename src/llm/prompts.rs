use crate::error::Domain;

/// Rules common to every extraction domain
const COMMON_RULES: &str = r#"You extract structured data from Portuguese clinical notes of a burn unit.
The notes are split into sections marked ">> section name <<" ... ">> END section name <<".

You MUST follow these rules:
1. Only report what the notes state. Never guess.
2. Dates MUST be dd-mm-yyyy. Times MUST be HH:MM (24h).
3. Use null for missing single values and an empty list for missing lists.
4. Respond ONLY by calling the provided tool."#;

const PATIENT_RULES: &str = r#"TASK: patient identification, admission and discharge.
- admission_date / admission_time refer to admission to the burn unit.
- origin is where the patient came from (another hospital, emergency room, home).
- destination is where the patient went on discharge.
- address should be the full street address when available."#;

const BURN_RULES: &str = r#"TASK: burn injury, pre-hospital care and burn unit treatment.
Burn locations (burn_degree):
- location is a body part in english (e.g. "face", "arm", "leg"). Do not put the side in location.
- depth is one of: first-degree, second-degree-superficial, second-degree-deep, third-degree, fourth-degree.
- laterality is "left", "right" or "bilateral" when it applies, null otherwise.
- One entry per body part and side; if several depths are described, report the deepest.
- circumferential only applies to limbs and the torso.
Total body surface area (tbsa):
- Take the percentage from the ASCQ / ASC value, as a number without ~ or %.
Boolean flags are false unless the notes state otherwise."#;

const HISTORY_RULES: &str = r#"TASK: medical history BEFORE the current burn episode.
- diseases: pre-existing conditions.
- medications: regular medication taken before the injury.
- previous_surgeries: procedures done before this episode, with dates if available.
- allergies: known allergies.
Do not include anything that happened during the current admission."#;

fn domain_rules(domain: Domain) -> &'static str {
    match domain {
        Domain::Demographic => PATIENT_RULES,
        Domain::Injury => BURN_RULES,
        Domain::History => HISTORY_RULES,
    }
}

/// Build the system prompt for one domain
///
/// Called once per extractor at construction; the result is shared read-only.
pub fn build_system_prompt(domain: Domain, instructions: &str, glossary: &str) -> String {
    let mut prompt = String::with_capacity(
        COMMON_RULES.len() + instructions.len() + glossary.len() + 1024,
    );

    prompt.push_str(COMMON_RULES);
    prompt.push_str("\n\n");
    prompt.push_str(domain_rules(domain));
    prompt.push_str("\n\n# DOMAIN INSTRUCTIONS\n\n");
    prompt.push_str(instructions.trim());
    prompt.push_str("\n\n# PORTUGUESE MEDICAL GLOSSARY\n\n");
    prompt.push_str(glossary.trim());
    prompt.push('\n');

    prompt
}

/// Build the user prompt carrying the merged document
pub fn build_document_prompt(patient_id: u64, document: &str) -> String {
    format!(
        "# Patient {}\n\nExtract the data from these notes:\n\n{}\n",
        patient_id, document
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_includes_instructions_and_glossary() {
        let prompt = build_system_prompt(Domain::Injury, "Use ASCQ.", "queimadura = burn");

        assert!(prompt.contains("second-degree-deep"));
        assert!(prompt.contains("Use ASCQ."));
        assert!(prompt.contains("queimadura = burn"));
        assert!(!prompt.contains("previous_surgeries"));
    }

    #[test]
    fn test_document_prompt() {
        let prompt = build_document_prompt(2301, ">> unit admission note <<\nx\n");
        assert!(prompt.starts_with("# Patient 2301"));
        assert!(prompt.contains(">> unit admission note <<"));
    }
}
