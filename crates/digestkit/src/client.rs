//! Entry points for DigestKit
//!
//! This module provides the functions callers use to summarize a URL.
//! The stages themselves live in [`extractors`](crate::extractors),
//! [`prompt`](crate::prompt) and [`llm`](crate::llm); the state machine
//! tying them together is in [`pipeline`](crate::pipeline).

use crate::error::PipelineError;
use crate::pipeline::Summarizer;
use crate::prompt::PromptTemplate;
use crate::types::{SummarizeRequest, SummaryResult};
use crate::BROWSER_USER_AGENT;
use std::time::Duration;

/// Whole-request timeout for page, watch page and caption fetches
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Whole-request timeout for the completion call
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(120);

/// Video service origin
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

/// OpenAI-compatible completion endpoint base (Groq)
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Caption language used when none is configured
pub const DEFAULT_TRANSCRIPT_LANGUAGE: &str = "en";

/// Pipeline options that can be configured via [`SummarizerBuilder`](crate::SummarizerBuilder)
///
/// Unset fields fall back to the `DEFAULT_*` constants of this module.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// User-Agent for page and video fetches
    pub user_agent: Option<String>,
    /// Verify TLS certificates on generic page fetches (off by default)
    pub verify_certificates: bool,
    /// Timeout for page, watch page and caption fetches
    pub fetch_timeout: Option<Duration>,
    /// Origin used to build video watch page URLs
    pub youtube_base_url: Option<String>,
    /// Preferred caption languages, most preferred first
    pub transcript_languages: Vec<String>,
    /// Base URL of the chat completions endpoint
    pub llm_base_url: Option<String>,
    /// Timeout for the completion call
    pub llm_timeout: Option<Duration>,
    /// Sampling temperature sent with the completion request
    pub temperature: Option<f32>,
    /// Instruction template used to render the prompt
    pub prompt_template: Option<PromptTemplate>,
}

impl PipelineOptions {
    /// User-Agent header value
    pub fn effective_user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(BROWSER_USER_AGENT)
    }

    /// Fetch timeout
    pub fn effective_fetch_timeout(&self) -> Duration {
        self.fetch_timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT)
    }

    /// Video service origin
    pub fn effective_youtube_base_url(&self) -> &str {
        self.youtube_base_url
            .as_deref()
            .unwrap_or(DEFAULT_YOUTUBE_BASE_URL)
    }

    /// Caption languages in preference order
    pub fn effective_transcript_languages(&self) -> Vec<String> {
        if self.transcript_languages.is_empty() {
            vec![DEFAULT_TRANSCRIPT_LANGUAGE.to_string()]
        } else {
            self.transcript_languages.clone()
        }
    }
}

/// Summarize a URL with default options
///
/// This is the single operation a presentation layer needs: it validates the
/// inputs, extracts the content, and performs one completion call.
/// For custom options, use [`run_pipeline_with_options`].
pub async fn run_pipeline(
    url: &str,
    credential: &str,
    model_id: &str,
) -> Result<SummaryResult, PipelineError> {
    let request = SummarizeRequest::new(url, credential, model_id);
    run_pipeline_with_options(request, PipelineOptions::default()).await
}

/// Summarize a URL with custom options
///
/// Builds a fresh [`Summarizer`] for this invocation. To reuse one
/// configuration across many calls, build a [`Summarizer`] directly.
pub async fn run_pipeline_with_options(
    request: SummarizeRequest,
    options: PipelineOptions,
) -> Result<SummaryResult, PipelineError> {
    let summarizer = Summarizer::from_options(options);
    summarizer.execute(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_pipeline_empty_url() {
        let result = run_pipeline("", "key", "model").await;
        assert_eq!(result, Err(PipelineError::InvalidUrl));
    }

    #[tokio::test]
    async fn test_run_pipeline_invalid_scheme() {
        let result = run_pipeline("ftp://example.com", "key", "model").await;
        assert_eq!(result, Err(PipelineError::InvalidUrl));
    }

    #[tokio::test]
    async fn test_run_pipeline_empty_credential() {
        let result = run_pipeline("https://example.com", "   ", "model").await;
        assert_eq!(result, Err(PipelineError::EmptyCredential));
    }

    #[test]
    fn test_pipeline_options_default() {
        let options = PipelineOptions::default();
        assert!(options.user_agent.is_none());
        assert!(!options.verify_certificates);
        assert!(options.transcript_languages.is_empty());
        assert_eq!(options.effective_user_agent(), BROWSER_USER_AGENT);
        assert_eq!(options.effective_fetch_timeout(), DEFAULT_FETCH_TIMEOUT);
        assert_eq!(options.effective_youtube_base_url(), DEFAULT_YOUTUBE_BASE_URL);
        assert_eq!(options.effective_transcript_languages(), vec!["en".to_string()]);
    }

    #[test]
    fn test_pipeline_options_overrides() {
        let options = PipelineOptions {
            user_agent: Some("TestAgent/1.0".to_string()),
            fetch_timeout: Some(Duration::from_secs(5)),
            youtube_base_url: Some("http://127.0.0.1:9".to_string()),
            transcript_languages: vec!["de".to_string(), "en".to_string()],
            ..Default::default()
        };
        assert_eq!(options.effective_user_agent(), "TestAgent/1.0");
        assert_eq!(options.effective_fetch_timeout(), Duration::from_secs(5));
        assert_eq!(options.effective_youtube_base_url(), "http://127.0.0.1:9");
        assert_eq!(
            options.effective_transcript_languages(),
            vec!["de".to_string(), "en".to_string()]
        );
    }
}
