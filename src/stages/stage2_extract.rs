use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{Instructions, PipelineConfig};
use crate::error::{Domain, ExtractionFailure};
use crate::llm::{
    build_document_prompt, build_system_prompt, burn_tool, history_tool, patient_tool, Oracle,
    OracleRequest, ToolSpec,
};
use crate::models::{
    normalize_burn_locations, BurnInjury, LateralityPolicy, MedicalHistory,
    MergedPatientDocument, PatientDemographic,
};

/// Facts known outside the oracle that post-processing may rely on
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    /// Filename-derived patient id
    pub patient_id: u64,
    pub laterality: &'a LateralityPolicy,
}

/// A record type the oracle can be asked to fill
pub trait DomainRecord: DeserializeOwned + Send + Sync + 'static {
    const DOMAIN: Domain;

    /// Schema the oracle must answer with
    fn tool() -> ToolSpec;

    /// Deterministic cleanup applied after a successful parse
    fn finalize(self, context: &ExtractionContext<'_>) -> Self;

    /// One-line summary for logs
    fn summary(&self) -> String;
}

impl DomainRecord for PatientDemographic {
    const DOMAIN: Domain = Domain::Demographic;

    fn tool() -> ToolSpec {
        patient_tool()
    }

    /// The filename id is authoritative; whatever the oracle inferred is dropped
    fn finalize(self, context: &ExtractionContext<'_>) -> Self {
        if self.id_patient != 0 && self.id_patient != context.patient_id {
            debug!(
                "Oracle guessed patient id {}, using {}",
                self.id_patient, context.patient_id
            );
        }
        Self {
            id_patient: context.patient_id,
            ..self
        }
    }

    fn summary(&self) -> String {
        format!(
            "name={}, admission={}, discharge={}",
            self.full_name.is_some(),
            self.admission_date.as_deref().unwrap_or("-"),
            self.discharge_date.as_deref().unwrap_or("-")
        )
    }
}

impl DomainRecord for BurnInjury {
    const DOMAIN: Domain = Domain::Injury;

    fn tool() -> ToolSpec {
        burn_tool()
    }

    fn finalize(self, context: &ExtractionContext<'_>) -> Self {
        let burn_degree = normalize_burn_locations(self.burn_degree, context.laterality);
        Self {
            burn_degree,
            ..self
        }
    }

    fn summary(&self) -> String {
        format!(
            "tbsa={:?}, {} burn locations, {} interventions",
            self.tbsa,
            self.burn_degree.len(),
            self.interventions.len()
        )
    }
}

impl DomainRecord for MedicalHistory {
    const DOMAIN: Domain = Domain::History;

    fn tool() -> ToolSpec {
        history_tool()
    }

    fn finalize(self, _context: &ExtractionContext<'_>) -> Self {
        self
    }

    fn summary(&self) -> String {
        if self.is_empty() {
            return "no prior history recorded".to_string();
        }
        format!(
            "{} diseases, {} medications, {} surgeries, {} allergies",
            self.diseases.len(),
            self.medications.len(),
            self.previous_surgeries.len(),
            self.allergies.len()
        )
    }
}

/// Capability: turn a merged patient document into one typed record
///
/// Never panics or propagates into the caller; every failure is an
/// `ExtractionFailure` the caller branches on.
#[async_trait]
pub trait Extractor<R>: Send + Sync {
    async fn extract(&self, document: &MergedPatientDocument) -> Result<R, ExtractionFailure>;
}

/// Oracle-backed extractor for one domain
///
/// The system prompt (rules, instructions, glossary) is built once at
/// construction and shared read-only by every call.
pub struct SchemaExtractor<R> {
    oracle: Arc<dyn Oracle>,
    system_prompt: Arc<str>,
    tool: ToolSpec,
    timeout: Duration,
    laterality: LateralityPolicy,
    _record: PhantomData<fn() -> R>,
}

impl<R: DomainRecord> SchemaExtractor<R> {
    pub fn new(oracle: Arc<dyn Oracle>, instructions: &Instructions, config: &PipelineConfig) -> Self {
        let system_prompt = build_system_prompt(
            R::DOMAIN,
            instructions.for_domain(R::DOMAIN),
            &instructions.glossary,
        );
        Self {
            oracle,
            system_prompt: Arc::from(system_prompt),
            tool: R::tool(),
            timeout: config.oracle_timeout,
            laterality: config.laterality.clone(),
            _record: PhantomData,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn parse(&self, value: Value, patient_id: u64) -> Result<R, ExtractionFailure> {
        if value.is_null() {
            return Err(ExtractionFailure::NoData { domain: R::DOMAIN });
        }

        let record: R = serde_json::from_value(value).map_err(|source| {
            ExtractionFailure::SchemaViolation {
                domain: R::DOMAIN,
                source,
            }
        })?;

        let context = ExtractionContext {
            patient_id,
            laterality: &self.laterality,
        };
        Ok(record.finalize(&context))
    }
}

#[async_trait]
impl<R: DomainRecord> Extractor<R> for SchemaExtractor<R> {
    async fn extract(&self, document: &MergedPatientDocument) -> Result<R, ExtractionFailure> {
        let user_prompt = build_document_prompt(document.patient_id, &document.text);
        let request = OracleRequest {
            system: &self.system_prompt,
            document: &user_prompt,
            tool: &self.tool,
        };

        debug!(
            "Patient {}: {} extraction via {} ({} chars)",
            document.patient_id,
            R::DOMAIN,
            self.oracle.name(),
            user_prompt.len()
        );

        let value = tokio::time::timeout(self.timeout, self.oracle.extract_structured(request))
            .await
            .map_err(|_| ExtractionFailure::Timeout {
                domain: R::DOMAIN,
                after: self.timeout,
            })?
            .map_err(|source| ExtractionFailure::Oracle {
                domain: R::DOMAIN,
                source,
            })?;

        let record = self.parse(value, document.patient_id)?;
        info!(
            "Patient {}: {} extracted ({})",
            document.patient_id,
            R::DOMAIN,
            record.summary()
        );
        Ok(record)
    }
}
