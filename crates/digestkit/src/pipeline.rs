//! Pipeline coordinator
//!
//! Runs one invocation through `Idle -> Validating -> Extracting ->
//! Prompting -> Summarizing -> Done | Failed`. Each stage either hands a
//! value to the next one or ends the invocation with a classified error.
//! Nothing is retried.

use crate::classify::{classify, validate_url, ExtractionStrategy};
use crate::client::PipelineOptions;
use crate::error::PipelineError;
use crate::extractors::extract;
use crate::llm::{summarize, ChatCompletionsClient, CompletionService};
use crate::prompt::PromptTemplate;
use crate::types::{SummarizeRequest, SummaryResult};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Nothing received yet
    Idle,
    /// Checking URL and credential
    Validating,
    /// Pulling content out of the URL
    Extracting,
    /// Rendering the instruction template
    Prompting,
    /// Waiting on the model
    Summarizing,
    /// Summary produced
    Done,
    /// Invocation ended with an error
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Validating => "validating",
            PipelineStage::Extracting => "extracting",
            PipelineStage::Prompting => "prompting",
            PipelineStage::Summarizing => "summarizing",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A summary along with what was learned about its source
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    /// Strategy the URL was classified into
    pub strategy: ExtractionStrategy,
    /// Metadata collected by the extractor (title, author, ...)
    pub source_metadata: BTreeMap<String, String>,
    /// Model output
    pub summary: SummaryResult,
}

/// Tracks the current stage and reports transitions
struct Progress<F: FnMut(PipelineStage)> {
    stage: PipelineStage,
    callback: F,
}

impl<F: FnMut(PipelineStage)> Progress<F> {
    fn new(callback: F) -> Self {
        Self {
            stage: PipelineStage::Idle,
            callback,
        }
    }

    fn enter(&mut self, next: PipelineStage) {
        debug!(from = %self.stage, to = %next, "Pipeline transition");
        self.stage = next;
        (self.callback)(next);
    }
}

/// Builder for configuring a [`Summarizer`]
#[derive(Default)]
pub struct SummarizerBuilder {
    options: PipelineOptions,
    completion: Option<Box<dyn CompletionService>>,
}

impl SummarizerBuilder {
    /// Create a new builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom User-Agent for page and video fetches
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.options.user_agent = Some(ua.into());
        self
    }

    /// Verify TLS certificates on generic page fetches
    pub fn verify_certificates(mut self, verify: bool) -> Self {
        self.options.verify_certificates = verify;
        self
    }

    /// Set the fetch timeout
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.options.fetch_timeout = Some(timeout);
        self
    }

    /// Set the video service origin
    pub fn youtube_base_url(mut self, url: impl Into<String>) -> Self {
        self.options.youtube_base_url = Some(url.into());
        self
    }

    /// Add a preferred caption language
    pub fn transcript_language(mut self, language: impl Into<String>) -> Self {
        self.options.transcript_languages.push(language.into());
        self
    }

    /// Set the chat completions base URL
    pub fn llm_base_url(mut self, url: impl Into<String>) -> Self {
        self.options.llm_base_url = Some(url.into());
        self
    }

    /// Set the completion call timeout
    pub fn llm_timeout(mut self, timeout: Duration) -> Self {
        self.options.llm_timeout = Some(timeout);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    /// Use a custom instruction template
    pub fn prompt_template(mut self, template: PromptTemplate) -> Self {
        self.options.prompt_template = Some(template);
        self
    }

    /// Use a custom completion service instead of the chat completions client
    pub fn completion_service(mut self, service: Box<dyn CompletionService>) -> Self {
        self.completion = Some(service);
        self
    }

    /// Build the summarizer
    pub fn build(self) -> Summarizer {
        let completion = self
            .completion
            .unwrap_or_else(|| Box::new(chat_client(&self.options)));
        Summarizer {
            options: self.options,
            completion,
        }
    }
}

fn chat_client(options: &PipelineOptions) -> ChatCompletionsClient {
    let mut client = ChatCompletionsClient::new();
    if let Some(ref url) = options.llm_base_url {
        client = client.with_base_url(url.clone());
    }
    if let Some(timeout) = options.llm_timeout {
        client = client.with_timeout(timeout);
    }
    if let Some(temperature) = options.temperature {
        client = client.with_temperature(temperature);
    }
    client
}

/// Configured summarization pipeline
///
/// Holds only immutable configuration; credential and model are supplied
/// per call, so one instance can serve concurrent invocations.
pub struct Summarizer {
    options: PipelineOptions,
    completion: Box<dyn CompletionService>,
}

impl Default for Summarizer {
    fn default() -> Self {
        SummarizerBuilder::new().build()
    }
}

impl fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Summarizer")
            .field("options", &self.options)
            .field("completion", &self.completion.name())
            .finish()
    }
}

impl Summarizer {
    /// Create a new summarizer builder
    pub fn builder() -> SummarizerBuilder {
        SummarizerBuilder::new()
    }

    /// Create a summarizer from plain options
    pub fn from_options(options: PipelineOptions) -> Self {
        SummarizerBuilder {
            options,
            completion: None,
        }
        .build()
    }

    /// Get the configured options
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Summarize a URL
    pub async fn run(
        &self,
        url: &str,
        credential: &str,
        model_id: &str,
    ) -> Result<SummaryResult, PipelineError> {
        self.execute(&SummarizeRequest::new(url, credential, model_id))
            .await
    }

    /// Execute a request
    pub async fn execute(&self, request: &SummarizeRequest) -> Result<SummaryResult, PipelineError> {
        self.execute_with_status(request, |_| {}).await
    }

    /// Execute a request, reporting every stage entered
    ///
    /// The callback sees each stage in order and always ends with
    /// [`PipelineStage::Done`] or [`PipelineStage::Failed`].
    pub async fn execute_with_status<F>(
        &self,
        request: &SummarizeRequest,
        status_callback: F,
    ) -> Result<SummaryResult, PipelineError>
    where
        F: FnMut(PipelineStage),
    {
        self.digest_with_status(request, status_callback)
            .await
            .map(|digest| digest.summary)
    }

    /// Execute a request and keep the source metadata alongside the summary
    pub async fn digest(&self, request: &SummarizeRequest) -> Result<Digest, PipelineError> {
        self.digest_with_status(request, |_| {}).await
    }

    /// Like [`digest`](Self::digest), reporting every stage entered
    pub async fn digest_with_status<F>(
        &self,
        request: &SummarizeRequest,
        status_callback: F,
    ) -> Result<Digest, PipelineError>
    where
        F: FnMut(PipelineStage),
    {
        let mut progress = Progress::new(status_callback);
        let result = self.drive(request, &mut progress).await;

        match &result {
            Ok(digest) => {
                debug!(url = %request.url, chars = digest.summary.text.len(), "Summary produced");
                progress.enter(PipelineStage::Done);
            }
            Err(e) => {
                warn!(url = %request.url, stage = %progress.stage, error = %e, "Pipeline failed");
                progress.enter(PipelineStage::Failed);
            }
        }

        result
    }

    async fn drive<F>(
        &self,
        request: &SummarizeRequest,
        progress: &mut Progress<F>,
    ) -> Result<Digest, PipelineError>
    where
        F: FnMut(PipelineStage),
    {
        progress.enter(PipelineStage::Validating);
        let url = validate_url(&request.url)?;
        if !request.has_credential() {
            return Err(PipelineError::EmptyCredential);
        }
        let strategy = classify(&url);

        progress.enter(PipelineStage::Extracting);
        let document = extract(&strategy, &url, &self.options).await?;
        if document.is_blank() {
            return Err(PipelineError::extraction("empty content"));
        }

        progress.enter(PipelineStage::Prompting);
        let prompt = match self.options.prompt_template {
            Some(ref template) => template.render(&document),
            None => crate::prompt::build(&document),
        };

        progress.enter(PipelineStage::Summarizing);
        debug!(
            service = self.completion.name(),
            model = %request.model_id,
            prompt_chars = prompt.as_str().len(),
            "Requesting summary"
        );
        let summary = summarize(
            self.completion.as_ref(),
            &prompt,
            request.credential.trim(),
            &request.model_id,
        )
        .await?;

        Ok(Digest {
            strategy,
            source_metadata: document.source_metadata,
            summary,
        })
    }
}
