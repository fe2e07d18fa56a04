use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Which extractor a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Demographic,
    Injury,
    History,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Demographic => "demographic",
            Domain::Injury => "injury",
            Domain::History => "history",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from one oracle round-trip
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Oracle API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode oracle response: {0}")]
    Decode(String),

    #[error("No structured output in oracle response")]
    MissingStructuredOutput,
}

impl From<reqwest::Error> for OracleError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            OracleError::Decode(e.to_string())
        } else {
            OracleError::Transport(e.to_string())
        }
    }
}

/// An extractor call that produced no usable record
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("{domain} extraction: {source}")]
    Oracle {
        domain: Domain,
        #[source]
        source: OracleError,
    },

    #[error("{domain} extraction timed out after {after:?}")]
    Timeout { domain: Domain, after: Duration },

    #[error("{domain} extraction: oracle returned no data")]
    NoData { domain: Domain },

    #[error("{domain} extraction: response does not match schema: {source}")]
    SchemaViolation {
        domain: Domain,
        #[source]
        source: serde_json::Error,
    },
}

impl ExtractionFailure {
    pub fn domain(&self) -> Domain {
        match self {
            ExtractionFailure::Oracle { domain, .. }
            | ExtractionFailure::Timeout { domain, .. }
            | ExtractionFailure::NoData { domain }
            | ExtractionFailure::SchemaViolation { domain, .. } => *domain,
        }
    }
}

/// A patient run that produced no canonical record
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Patient {patient_id}: no record produced, demographic extraction failed: {source}")]
    AssemblyImpossible {
        patient_id: u64,
        #[source]
        source: ExtractionFailure,
    },

    #[error("Patient {patient_id}: run was cancelled")]
    Cancelled { patient_id: u64 },

    #[error("Patient {patient_id}: task panicked: {message}")]
    Panicked { patient_id: u64, message: String },
}

impl PipelineError {
    pub fn patient_id(&self) -> u64 {
        match self {
            PipelineError::AssemblyImpossible { patient_id, .. }
            | PipelineError::Cancelled { patient_id }
            | PipelineError::Panicked { patient_id, .. } => *patient_id,
        }
    }
}
