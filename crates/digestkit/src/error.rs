//! Error types for DigestKit

use thiserror::Error;

/// Classified failure of a pipeline invocation
///
/// Every stage converts its own transport, parsing and protocol errors into
/// one of these variants, so callers only ever see this taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// URL is empty, unparsable, or not http/https
    #[error("Invalid URL: please enter a valid YouTube or website URL")]
    InvalidUrl,

    /// Credential is empty or whitespace-only
    #[error("Missing API key: credential must not be empty")]
    EmptyCredential,

    /// Content could not be extracted from the URL
    #[error("Extraction failed: {0}")]
    ExtractionFailure(String),

    /// The LLM call failed or returned nothing usable
    #[error("Summarization failed: {0}")]
    SummarizationFailure(String),
}

impl PipelineError {
    /// Create an extraction failure with the given reason
    pub fn extraction(reason: impl Into<String>) -> Self {
        PipelineError::ExtractionFailure(reason.into())
    }

    /// Create a summarization failure with the given reason
    pub fn summarization(reason: impl Into<String>) -> Self {
        PipelineError::SummarizationFailure(reason.into())
    }

    /// Classify a reqwest error raised while fetching a generic page
    pub fn fetch_failed(err: reqwest::Error) -> Self {
        let cause = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "could not connect to server".to_string()
        } else {
            err.to_string()
        };
        PipelineError::extraction(format!("fetch failed: {}", cause))
    }

    /// Classify a reqwest error raised while calling the completion endpoint
    pub fn transport(err: reqwest::Error) -> Self {
        let cause = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        PipelineError::summarization(format!("transport error: {}", cause))
    }

    /// The diagnostic reason carried by stage failures
    pub fn reason(&self) -> Option<&str> {
        match self {
            PipelineError::ExtractionFailure(reason)
            | PipelineError::SummarizationFailure(reason) => Some(reason),
            PipelineError::InvalidUrl | PipelineError::EmptyCredential => None,
        }
    }
}
