pub mod config;
pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod stages;

pub use config::{DomainModels, Instructions, PipelineConfig};
pub use error::{Domain, ExtractionFailure, OracleError, PipelineError};
pub use io::{read_merged_input, read_section_dir, write_merged_document, write_record_json};
pub use llm::{AnthropicClient, AnthropicConfig, Oracle, OracleRequest, ToolSpec};
pub use models::{
    BurnInjury, CanonicalPatientRecord, LateralityPolicy, LateralityRule, MedicalHistory,
    MergedPatientDocument, PatientDemographic, RawSectionFile, SectionType,
};
pub use stages::{
    assemble, merge_sections, normalize, process_batch, process_patient, BatchResult, Extractor,
    ExtractorSet, SchemaExtractor,
};
