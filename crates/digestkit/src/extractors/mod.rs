//! Content extraction strategies
//!
//! Design: the classifier picks one of a closed set of strategies and
//! [`extract`] dispatches on it. Both strategies return a single
//! [`Document`] or an `ExtractionFailure`.

mod generic;
mod youtube;

use crate::classify::ExtractionStrategy;
use crate::client::PipelineOptions;
use crate::error::PipelineError;
use crate::types::Document;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::warn;
use url::Url;

/// Extract a document from a validated URL using the selected strategy
pub async fn extract(
    strategy: &ExtractionStrategy,
    url: &Url,
    options: &PipelineOptions,
) -> Result<Document, PipelineError> {
    tracing::debug!(strategy = strategy.name(), url = %url, "Using extractor");

    match strategy {
        ExtractionStrategy::Video { video_id } => youtube::extract(url, video_id, options).await,
        ExtractionStrategy::Generic => generic::extract(url, options).await,
    }
}

/// Build a per-call HTTP client with the configured User-Agent and timeout
fn http_client(
    options: &PipelineOptions,
    mut headers: HeaderMap,
    verify_certificates: bool,
) -> Result<reqwest::Client, reqwest::Error> {
    headers.insert(USER_AGENT, user_agent_header(options));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(options.effective_fetch_timeout())
        .danger_accept_invalid_certs(!verify_certificates)
        .build()
}

/// The configured User-Agent, or the browser default if it is not a valid header value
fn user_agent_header(options: &PipelineOptions) -> HeaderValue {
    let user_agent = options.effective_user_agent();
    HeaderValue::from_str(user_agent).unwrap_or_else(|e| {
        warn!(user_agent, error = %e, "Invalid User-Agent, using the browser default");
        HeaderValue::from_static(crate::BROWSER_USER_AGENT)
    })
}
