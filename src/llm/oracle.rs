use async_trait::async_trait;
use serde_json::Value;

use crate::error::OracleError;

/// The structured output the oracle is asked to produce
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// One extraction round-trip: instructions + document + target schema
#[derive(Debug, Clone, Copy)]
pub struct OracleRequest<'a> {
    /// Domain instructions and glossary
    pub system: &'a str,
    /// Merged patient document
    pub document: &'a str,
    pub tool: &'a ToolSpec,
}

/// A structured-extraction backend
///
/// Returns the raw JSON object the model produced for `request.tool`, or
/// `Value::Null` when it produced nothing. Schema checking is the caller's job.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn extract_structured(&self, request: OracleRequest<'_>) -> Result<Value, OracleError>;

    /// Human-readable backend name for logs
    fn name(&self) -> &str;
}
