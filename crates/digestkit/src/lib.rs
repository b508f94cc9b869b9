//! DigestKit - summarize a web page or video with one LLM call
//!
//! This crate takes a single URL, extracts its text with a strategy that
//! fits the source, and asks a hosted model for a bounded-length summary.
//!
//! ## Pipeline
//!
//! 1. [`validate_url`] and [`classify`] pick an [`ExtractionStrategy`]
//! 2. [`extractors::extract`] turns the URL into a [`Document`]
//!    - video pages: caption transcript plus title/author/length
//!    - everything else: page fetched with a browser User-Agent, markup stripped
//! 3. [`prompt::build`] renders the document into the instruction template
//! 4. [`llm::summarize`] performs one completion call through a [`CompletionService`]
//!
//! Every failure surfaces as a [`PipelineError`].
//!
//! ```rust,ignore
//! let summary = digestkit::run_pipeline(
//!     "https://example.com/article",
//!     &api_key,
//!     "llama-3.1-8b-instant",
//! )
//! .await?;
//! println!("{}", summary.text);
//! ```

pub mod classify;
pub mod client;
mod convert;
mod error;
pub mod extractors;
pub mod llm;
pub mod pipeline;
pub mod prompt;
mod types;

pub use classify::{classify, validate_url, ExtractionStrategy};
pub use client::{run_pipeline, run_pipeline_with_options, PipelineOptions};
pub use convert::{clean_whitespace, decode_entities, extract_title, html_to_text};
pub use error::PipelineError;
pub use llm::{ChatCompletionsClient, CompletionService};
pub use pipeline::{Digest, PipelineStage, Summarizer, SummarizerBuilder};
pub use prompt::PromptTemplate;
pub use types::{Document, RenderedPrompt, SummarizeRequest, SummaryResult};

/// Desktop browser User-Agent used for page and video fetches
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";

/// Extended documentation for LLM consumption (llmtxt)
pub const LLMTXT: &str = r#"# DigestKit

Summarizes the content of a single URL (web page or YouTube video) with one
call to a hosted chat completions model.

## How it works
- YouTube watch, shorts, embed, live and youtu.be URLs: the caption transcript
  is downloaded, together with title, author and length
- Any other http/https URL: the page is fetched with a browser User-Agent and
  its markup is stripped to plain text
- The text is placed into a fixed instruction asking for a ~300 word summary
- One completion request is sent; the model output is returned unmodified

## Inputs
- `url` (required): http:// or https:// URL
- `credential` (required): API key for the completion endpoint
- `model_id` (required): hosted model to call

## Errors
- Invalid URL: empty, unparsable, or not http/https
- Missing API key: empty or whitespace-only credential
- Extraction failed: `no transcript available`, `unreachable`,
  `fetch failed: ...`, `empty content`
- Summarization failed: `authentication rejected`, `quota exhausted`,
  `prompt too large: ...`, `transport error: ...`, `malformed response: ...`,
  `empty response`

## Notes
- Certificate verification for generic page fetches is off by default and can
  be turned on
- No retries, no caching, no chunking of long documents
"#;
