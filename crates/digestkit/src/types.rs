//! Core types for DigestKit

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Request to summarize a URL
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SummarizeRequest {
    /// The URL to summarize (web page or video page)
    pub url: String,

    /// API credential for the completion endpoint
    #[serde(default, skip_serializing)]
    pub credential: String,

    /// Hosted model to call
    pub model_id: String,
}

impl SummarizeRequest {
    /// Create a new request
    pub fn new(
        url: impl Into<String>,
        credential: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            credential: credential.into(),
            model_id: model_id.into(),
        }
    }

    /// Check that the credential has something other than whitespace
    pub fn has_credential(&self) -> bool {
        !self.credential.trim().is_empty()
    }
}

impl fmt::Debug for SummarizeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizeRequest")
            .field("url", &self.url)
            .field("credential", &"<redacted>")
            .field("model_id", &self.model_id)
            .finish()
    }
}

/// Normalized text content extracted from a URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Plain text ready for prompting
    pub text: String,

    /// Descriptive metadata (title, author, length, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub source_metadata: BTreeMap<String, String>,
}

impl Document {
    /// Create a document with no metadata
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.source_metadata.insert(key.into(), value.into());
        self
    }

    /// Look up a metadata entry
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.source_metadata.get(key).map(String::as_str)
    }

    /// True if the text is empty or whitespace-only
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Final instruction text sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt(String);

impl RenderedPrompt {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    /// The prompt text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output of a successful pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    /// Raw model output
    pub text: String,
}
