//! Error types for analysis

use docket_llm::LlmError;
use thiserror::Error;

/// Errors that can occur while analyzing a batch
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The model call itself failed
    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    /// The model call exceeded the configured deadline
    #[error("analysis timed out")]
    Timeout,

    /// The response contained no balanced JSON object
    #[error("no JSON object found in model response")]
    NoJsonFound,

    /// The located JSON region failed to parse
    #[error("model returned malformed JSON: {0}")]
    InvalidJson(String),
}
