//! Generic web page extractor
//!
//! Fetches the page with a browser User-Agent and strips markup to plain
//! text. This is the fallback for every URL the classifier does not
//! recognize as a video.

use super::http_client;
use crate::client::PipelineOptions;
use crate::convert::{clean_whitespace, extract_title, html_to_text, is_html};
use crate::error::PipelineError;
use crate::types::Document;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use tracing::warn;
use url::Url;

/// Binary content type prefixes
const BINARY_PREFIXES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "font/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
    "application/x-tar",
    "application/x-rar",
    "application/x-7z",
    "application/vnd.ms-",
    "application/vnd.openxmlformats",
];

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,text/plain;q=0.9,*/*;q=0.8";

pub(super) async fn extract(url: &Url, options: &PipelineOptions) -> Result<Document, PipelineError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

    if !options.verify_certificates {
        tracing::debug!(url = %url, "Certificate verification disabled for page fetch");
    }

    let client = http_client(options, headers, options.verify_certificates)
        .map_err(PipelineError::fetch_failed)?;

    let response = client.get(url.as_str()).send().await.map_err(|e| {
        warn!(url = %url, error = %e, "Page fetch failed");
        PipelineError::fetch_failed(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!(url = %url, status = status.as_u16(), "Page fetch returned non-success status");
        return Err(PipelineError::extraction(format!(
            "fetch failed: HTTP {}",
            status
        )));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    if let Some(ref ct) = content_type {
        if is_binary_content_type(ct) {
            return Err(PipelineError::extraction(format!(
                "fetch failed: unsupported content type {}",
                ct
            )));
        }
    }

    let body = response.text().await.map_err(|e| {
        warn!(url = %url, error = %e, "Reading page body failed");
        PipelineError::fetch_failed(e)
    })?;

    let document = page_document(url, content_type.as_deref(), &body);
    if document.is_blank() {
        return Err(PipelineError::extraction("empty content"));
    }

    tracing::debug!(url = %url, chars = document.text.len(), "Extracted page text");
    Ok(document)
}

/// Normalize a fetched body into a document
fn page_document(url: &Url, content_type: Option<&str>, body: &str) -> Document {
    let mut document = if is_html(content_type, body) {
        let mut document = Document::new(html_to_text(body));
        if let Some(title) = extract_title(body) {
            document = document.with_metadata("title", title);
        }
        document
    } else {
        Document::new(clean_whitespace(body))
    };

    document = document.with_metadata("source", url.as_str());
    if let Some(ct) = content_type {
        document = document.with_metadata("content_type", ct);
    }
    document
}

/// Check if content type indicates binary content
fn is_binary_content_type(content_type: &str) -> bool {
    let ct_lower = content_type.to_lowercase();
    BINARY_PREFIXES
        .iter()
        .any(|prefix| ct_lower.starts_with(prefix))
}
