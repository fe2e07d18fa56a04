use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, warn, Instrument};

use super::{assemble, Extractor, SchemaExtractor};
use crate::config::{DomainModels, Instructions, PipelineConfig};
use crate::error::{Domain, OracleError, PipelineError};
use crate::llm::{AnthropicClient, AnthropicConfig, Oracle};
use crate::models::{
    BurnInjury, CanonicalPatientRecord, MedicalHistory, MergedPatientDocument, PatientDemographic,
};

/// The three domain extractors used for every patient
#[derive(Clone)]
pub struct ExtractorSet {
    pub demographic: Arc<dyn Extractor<PatientDemographic>>,
    pub injury: Arc<dyn Extractor<BurnInjury>>,
    pub history: Arc<dyn Extractor<MedicalHistory>>,
}

impl ExtractorSet {
    /// Oracle-backed extractors, one oracle per domain
    pub fn with_oracles(
        demographic: Arc<dyn Oracle>,
        injury: Arc<dyn Oracle>,
        history: Arc<dyn Oracle>,
        instructions: &Instructions,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            demographic: Arc::new(SchemaExtractor::<PatientDemographic>::new(
                demographic,
                instructions,
                config,
            )),
            injury: Arc::new(SchemaExtractor::<BurnInjury>::new(injury, instructions, config)),
            history: Arc::new(SchemaExtractor::<MedicalHistory>::new(
                history,
                instructions,
                config,
            )),
        }
    }

    /// One Anthropic client per domain, each with its own model
    pub fn anthropic(
        api: &AnthropicConfig,
        models: &DomainModels,
        instructions: &Instructions,
        config: &PipelineConfig,
    ) -> Result<Self, OracleError> {
        let oracle_for = |domain: Domain| -> Result<Arc<dyn Oracle>, OracleError> {
            let client = AnthropicClient::new(api.with_model(models.for_domain(domain)))?;
            info!("{} extractor using model {}", domain, client.model());
            Ok(Arc::new(client))
        };

        Ok(Self::with_oracles(
            oracle_for(Domain::Demographic)?,
            oracle_for(Domain::Injury)?,
            oracle_for(Domain::History)?,
            instructions,
            config,
        ))
    }
}

/// Run extraction and assembly for one patient
///
/// The three extractions run concurrently. Demographic failure aborts the
/// patient; injury or history failure is logged and replaced by defaults.
pub async fn process_patient(
    extractors: &ExtractorSet,
    document: &MergedPatientDocument,
) -> Result<CanonicalPatientRecord, PipelineError> {
    let patient_id = document.patient_id;

    let (demographic, injury, history) = tokio::join!(
        extractors.demographic.extract(document),
        extractors.injury.extract(document),
        extractors.history.extract(document),
    );

    let demographic = demographic.map_err(|source| {
        error!("Patient {}: {}", patient_id, source);
        PipelineError::AssemblyImpossible { patient_id, source }
    })?;

    let injury = injury
        .map_err(|e| warn!("Patient {}: {}; using defaults", patient_id, e))
        .ok();
    let history = history
        .map_err(|e| warn!("Patient {}: {}; using defaults", patient_id, e))
        .ok();

    Ok(assemble(demographic, injury, history))
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Produced records, ordered by patient id
    pub records: Vec<CanonicalPatientRecord>,
    /// Patients for which no record was produced
    pub failures: Vec<PipelineError>,
}

impl BatchResult {
    pub fn failed_patient_ids(&self) -> Vec<u64> {
        self.failures.iter().map(|f| f.patient_id()).collect()
    }
}

/// Process many patients with at most `config.concurrency` in flight
///
/// Each patient runs in its own task. A failing patient never affects the
/// others. Dropping the returned future aborts every in-flight task.
pub async fn process_batch(
    extractors: &ExtractorSet,
    documents: Vec<MergedPatientDocument>,
    config: &PipelineConfig,
) -> BatchResult {
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let mut tasks = JoinSet::new();
    let mut task_patients = HashMap::new();
    let total = documents.len();

    info!(
        "Extracting {} patients (concurrency {})",
        total,
        config.concurrency.max(1)
    );

    for document in documents {
        let extractors = extractors.clone();
        let semaphore = Arc::clone(&semaphore);
        let run_id = uuid::Uuid::new_v4();
        let span = info_span!("patient", id = document.patient_id, run = %run_id);

        let patient_id = document.patient_id;
        let handle = tasks.spawn(
            async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return Err(PipelineError::Cancelled { patient_id });
                };
                process_patient(&extractors, &document).await
            }
            .instrument(span),
        );
        task_patients.insert(handle.id(), patient_id);
    }

    let mut result = BatchResult::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(record)) => result.records.push(record),
            Ok(Err(e)) => result.failures.push(e),
            Err(e) => {
                let Some(patient_id) = task_patients.get(&e.id()).copied() else {
                    error!("Unknown patient task did not complete: {}", e);
                    continue;
                };
                if e.is_panic() {
                    error!("Patient {}: task panicked", patient_id);
                    result.failures.push(PipelineError::Panicked {
                        patient_id,
                        message: panic_message(e.into_panic()),
                    });
                } else {
                    result.failures.push(PipelineError::Cancelled { patient_id });
                }
            }
        }
    }

    result.records.sort_by_key(|r| r.id);
    result.failures.sort_by_key(|f| f.patient_id());

    info!(
        "Batch complete: {} records, {} patients failed",
        result.records.len(),
        result.failures.len()
    );

    result
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
