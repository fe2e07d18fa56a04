use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::error::Domain;
use crate::models::LateralityPolicy;

pub const PATIENT_INSTRUCTIONS_FILE: &str = "patient-extraction.md";
pub const BURN_INSTRUCTIONS_FILE: &str = "burns-extraction.md";
pub const HISTORY_INSTRUCTIONS_FILE: &str = "medical-history-extraction.md";
pub const GLOSSARY_FILE: &str = "dicionario-PT.md";

/// Domain instructions and the shared glossary, loaded once at startup
#[derive(Debug, Clone)]
pub struct Instructions {
    pub patient: Arc<str>,
    pub burn: Arc<str>,
    pub history: Arc<str>,
    pub glossary: Arc<str>,
}

impl Instructions {
    /// Read all instruction files from `dir`. Any missing file is an error.
    pub fn load(dir: &Path) -> Result<Self> {
        let read = |name: &str| -> Result<Arc<str>> {
            let path = dir.join(name);
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read instructions file: {:?}", path))?;
            info!("Loaded {} ({} bytes)", name, text.len());
            Ok(Arc::from(text))
        };

        Ok(Self {
            patient: read(PATIENT_INSTRUCTIONS_FILE)?,
            burn: read(BURN_INSTRUCTIONS_FILE)?,
            history: read(HISTORY_INSTRUCTIONS_FILE)?,
            glossary: read(GLOSSARY_FILE)?,
        })
    }

    pub fn for_domain(&self, domain: Domain) -> &str {
        match domain {
            Domain::Demographic => &self.patient,
            Domain::Injury => &self.burn,
            Domain::History => &self.history,
        }
    }
}

/// Model per extraction domain
#[derive(Debug, Clone)]
pub struct DomainModels {
    pub demographic: String,
    pub injury: String,
    pub history: String,
}

impl DomainModels {
    pub fn uniform(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            demographic: model.clone(),
            injury: model.clone(),
            history: model,
        }
    }

    pub fn for_domain(&self, domain: Domain) -> &str {
        match domain {
            Domain::Demographic => &self.demographic,
            Domain::Injury => &self.injury,
            Domain::History => &self.history,
        }
    }
}

/// Configuration for extraction and batch execution
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum patients processed at once
    pub concurrency: usize,
    /// Upper bound on one oracle round-trip
    pub oracle_timeout: Duration,
    /// Laterality rules for burn locations
    pub laterality: LateralityPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            oracle_timeout: Duration::from_secs(120),
            laterality: LateralityPolicy::default(),
        }
    }
}
