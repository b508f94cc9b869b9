//! Summarization through a hosted chat completions model
//!
//! [`CompletionService`] is the seam between the pipeline and the model
//! provider. The credential is passed on every call, so one service can be
//! shared by concurrent invocations made on behalf of different callers.

use crate::client::{DEFAULT_LLM_BASE_URL, DEFAULT_LLM_TIMEOUT};
use crate::error::PipelineError;
use crate::types::{RenderedPrompt, SummaryResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A model endpoint that turns a prompt into generated text
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Perform one completion call
    ///
    /// Failures must already be classified as `SummarizationFailure`.
    async fn complete(
        &self,
        prompt: &RenderedPrompt,
        model_id: &str,
        credential: &str,
    ) -> Result<String, PipelineError>;
}

/// Run the summarization stage: one call, no retry, output returned as-is
pub async fn summarize(
    service: &dyn CompletionService,
    prompt: &RenderedPrompt,
    credential: &str,
    model_id: &str,
) -> Result<SummaryResult, PipelineError> {
    if model_id.trim().is_empty() {
        return Err(PipelineError::summarization("no model selected"));
    }

    let text = service.complete(prompt, model_id, credential).await?;
    if text.trim().is_empty() {
        return Err(PipelineError::summarization("empty response"));
    }

    Ok(SummaryResult { text })
}

/// Client for OpenAI-compatible `/chat/completions` endpoints
///
/// Defaults to Groq. The HTTP client is built per call.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    base_url: String,
    timeout: Duration,
    temperature: Option<f32>,
}

impl Default for ChatCompletionsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatCompletionsClient {
    /// Create a client for the default endpoint
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            timeout: DEFAULT_LLM_TIMEOUT,
            temperature: None,
        }
    }

    /// Set a custom base URL (other providers, proxies, tests)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the whole-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Provider error body: `{"error": {"message": ..., "code": ...}}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
}

#[async_trait]
impl CompletionService for ChatCompletionsClient {
    fn name(&self) -> &'static str {
        "chat_completions"
    }

    async fn complete(
        &self,
        prompt: &RenderedPrompt,
        model_id: &str,
        credential: &str,
    ) -> Result<String, PipelineError> {
        let start = Instant::now();

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(PipelineError::transport)?;

        let request = ChatRequest {
            model: model_id,
            messages: vec![Message {
                role: "user",
                content: prompt.as_str(),
            }],
            temperature: self.temperature,
        };

        let response = client
            .post(self.endpoint())
            .bearer_auth(credential)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Completion request failed");
                PipelineError::transport(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(PipelineError::transport)?;

        if !status.is_success() {
            warn!(status = status.as_u16(), error = %body, "Completion endpoint returned an error");
            return Err(classify_error(status, &body));
        }

        let chat: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| PipelineError::summarization(format!("malformed response: {}", e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| PipelineError::summarization("empty response"))?;

        debug!(
            model = model_id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat completion"
        );

        Ok(content)
    }
}

/// Map a non-success response to a summarization failure
fn classify_error(status: StatusCode, body: &str) -> PipelineError {
    let api_error = serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error);
    let message = api_error
        .as_ref()
        .map(|e| e.message.trim().to_string())
        .filter(|m| !m.is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|m| !m.is_empty()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
    let context_exceeded = api_error
        .as_ref()
        .and_then(|e| e.code.as_deref())
        .is_some_and(|code| code == "context_length_exceeded");

    let reason = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "authentication rejected".to_string(),
        StatusCode::TOO_MANY_REQUESTS => "quota exhausted".to_string(),
        StatusCode::PAYLOAD_TOO_LARGE => format!("prompt too large: {}", message),
        _ if context_exceeded => format!("prompt too large: {}", message),
        _ => format!("HTTP {}: {}", status.as_u16(), message),
    };
    PipelineError::summarization(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(&'static str);

    #[async_trait]
    impl CompletionService for Canned {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn complete(
            &self,
            _prompt: &RenderedPrompt,
            _model_id: &str,
            _credential: &str,
        ) -> Result<String, PipelineError> {
            Ok(self.0.to_string())
        }
    }

    fn prompt() -> RenderedPrompt {
        RenderedPrompt::new("Summarize: text".to_string())
    }

    #[test]
    fn test_client_builder() {
        let client = ChatCompletionsClient::new()
            .with_base_url("https://custom.api.com/v1/")
            .with_timeout(Duration::from_secs(5))
            .with_temperature(0.2);

        assert_eq!(client.base_url(), "https://custom.api.com/v1/");
        assert_eq!(client.endpoint(), "https://custom.api.com/v1/chat/completions");
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.temperature, Some(0.2));
        assert_eq!(
            ChatCompletionsClient::default().endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "m",
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
            temperature: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"model":"m","messages":[{"role":"user","content":"hi"}]}"#
        );
    }

    #[test]
    fn test_classify_error_auth_and_quota() {
        assert_eq!(
            classify_error(StatusCode::UNAUTHORIZED, r#"{"error":{"message":"Invalid API Key","code":"invalid_api_key"}}"#),
            PipelineError::summarization("authentication rejected")
        );
        assert_eq!(
            classify_error(StatusCode::FORBIDDEN, ""),
            PipelineError::summarization("authentication rejected")
        );
        assert_eq!(
            classify_error(StatusCode::TOO_MANY_REQUESTS, r#"{"error":{"message":"Rate limit reached"}}"#),
            PipelineError::summarization("quota exhausted")
        );
    }

    #[test]
    fn test_classify_error_context_length() {
        assert_eq!(
            classify_error(
                StatusCode::BAD_REQUEST,
                r#"{"error":{"message":"Please reduce the length of the messages","code":"context_length_exceeded"}}"#
            ),
            PipelineError::summarization("prompt too large: Please reduce the length of the messages")
        );
        assert_eq!(
            classify_error(StatusCode::PAYLOAD_TOO_LARGE, "Request Entity Too Large"),
            PipelineError::summarization("prompt too large: Request Entity Too Large")
        );
    }

    #[test]
    fn test_classify_error_other_statuses() {
        assert_eq!(
            classify_error(StatusCode::NOT_FOUND, r#"{"error":{"message":"model not found","code":null}}"#),
            PipelineError::summarization("HTTP 404: model not found")
        );
        assert_eq!(
            classify_error(StatusCode::BAD_GATEWAY, "upstream down"),
            PipelineError::summarization("HTTP 502: upstream down")
        );
        assert_eq!(
            classify_error(StatusCode::INTERNAL_SERVER_ERROR, "  "),
            PipelineError::summarization("HTTP 500: Internal Server Error")
        );
    }

    #[tokio::test]
    async fn test_summarize_returns_output_unmodified() {
        let output = "  A summary with\n\nformatting.  ";
        let result = summarize(&Canned(output), &prompt(), "key", "model").await.unwrap();
        assert_eq!(result.text, output);
    }

    #[tokio::test]
    async fn test_summarize_rejects_empty_output() {
        let result = summarize(&Canned(" \n"), &prompt(), "key", "model").await;
        assert_eq!(result, Err(PipelineError::summarization("empty response")));
    }

    #[tokio::test]
    async fn test_summarize_requires_model() {
        let result = summarize(&Canned("ok"), &prompt(), "key", " ").await;
        assert_eq!(result, Err(PipelineError::summarization("no model selected")));
    }
}
