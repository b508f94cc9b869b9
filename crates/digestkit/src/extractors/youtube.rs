//! YouTube video extractor
//!
//! Reads the player response embedded in the watch page, picks a caption
//! track and downloads its timed text. Video details from the player
//! response become document metadata.

use super::http_client;
use crate::client::PipelineOptions;
use crate::convert::{decode_entities, html_to_text};
use crate::error::PipelineError;
use crate::types::Document;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use serde::Deserialize;
use tracing::warn;
use url::Url;

/// Variable the watch page assigns the player response to
const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse";

const NO_TRANSCRIPT: &str = "no transcript available";
const UNREACHABLE: &str = "unreachable";

/// Player response embedded in the watch page (partial)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    #[serde(default)]
    captions: Option<Captions>,
    #[serde(default)]
    video_details: Option<VideoDetails>,
    #[serde(default)]
    playability_status: Option<PlayabilityStatus>,
}

#[derive(Debug, Deserialize)]
struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    tracklist: Option<Tracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Tracklist {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
    /// "asr" for auto-generated tracks
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    /// "en" matches "en", "EN" and "en-GB"
    fn matches_language(&self, language: &str) -> bool {
        let code = self.language_code.to_ascii_lowercase();
        let language = language.to_ascii_lowercase();
        code == language
            || code
                .strip_prefix(language.as_str())
                .is_some_and(|rest| rest.starts_with('-'))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoDetails {
    title: Option<String>,
    author: Option<String>,
    length_seconds: Option<String>,
    view_count: Option<String>,
    short_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

pub(super) async fn extract(
    url: &Url,
    video_id: &str,
    options: &PipelineOptions,
) -> Result<Document, PipelineError> {
    let watch_url = watch_url(options.effective_youtube_base_url(), video_id)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    let client = http_client(options, headers, true).map_err(|e| {
        warn!(error = %e, "Failed to build HTTP client");
        PipelineError::extraction(UNREACHABLE)
    })?;

    let page = get_text(&client, &watch_url).await?;

    let player = parse_player_response(&page).ok_or_else(|| {
        warn!(video_id, "Watch page has no player response");
        PipelineError::extraction(NO_TRANSCRIPT)
    })?;

    let tracks = player
        .captions
        .and_then(|c| c.tracklist)
        .map(|t| t.caption_tracks)
        .unwrap_or_default();

    let languages = options.effective_transcript_languages();
    let Some(track) = select_track(&tracks, &languages) else {
        if let Some(status) = player.playability_status {
            tracing::debug!(
                video_id,
                status = status.status.as_deref().unwrap_or(""),
                reason = status.reason.as_deref().unwrap_or(""),
                "No caption tracks"
            );
        }
        return Err(PipelineError::extraction(NO_TRANSCRIPT));
    };

    let track_url = watch_url.join(&track.base_url).map_err(|e| {
        warn!(video_id, error = %e, "Caption track has an invalid URL");
        PipelineError::extraction(NO_TRANSCRIPT)
    })?;
    let timed_text = get_text(&client, &track_url).await?;

    let transcript = parse_timed_text(&timed_text).join(" ");
    if transcript.is_empty() {
        return Err(PipelineError::extraction(NO_TRANSCRIPT));
    }

    tracing::debug!(
        video_id,
        language = %track.language_code,
        generated = track.is_generated(),
        chars = transcript.len(),
        "Fetched transcript"
    );

    let mut document = Document::new(transcript)
        .with_metadata("source", url.as_str())
        .with_metadata("language", track.language_code.clone());
    let details = player.video_details.unwrap_or_default();
    for (key, value) in [
        ("title", details.title),
        ("author", details.author),
        ("length", details.length_seconds),
        ("view_count", details.view_count),
        ("description", details.short_description),
    ] {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            document = document.with_metadata(key, value);
        }
    }

    Ok(document)
}

/// Build `{base}/watch?v={id}`
fn watch_url(base: &str, video_id: &str) -> Result<Url, PipelineError> {
    let mut url = Url::parse(base).map_err(|e| {
        warn!(base, error = %e, "Invalid video service base URL");
        PipelineError::extraction(UNREACHABLE)
    })?;
    url.set_path("/watch");
    url.query_pairs_mut().clear().append_pair("v", video_id);
    Ok(url)
}

/// GET a URL as text, classifying every failure as unreachable
async fn get_text(client: &reqwest::Client, url: &Url) -> Result<String, PipelineError> {
    let response = client.get(url.as_str()).send().await.map_err(|e| {
        warn!(url = %url, error = %e, "Video service request failed");
        PipelineError::extraction(UNREACHABLE)
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!(url = %url, status = status.as_u16(), "Video service returned non-success status");
        return Err(PipelineError::extraction(UNREACHABLE));
    }

    response.text().await.map_err(|e| {
        warn!(url = %url, error = %e, "Reading video service response failed");
        PipelineError::extraction(UNREACHABLE)
    })
}

/// Find and decode the player response object in the watch page
fn parse_player_response(page: &str) -> Option<PlayerResponse> {
    let mut search_from = 0;
    while let Some(offset) = page[search_from..].find(PLAYER_RESPONSE_MARKER) {
        let marker_end = search_from + offset + PLAYER_RESPONSE_MARKER.len();
        search_from = marker_end;

        // Only assignments: `ytInitialPlayerResponse = {...}`
        let rest = page[marker_end..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        if !rest.starts_with('{') {
            continue;
        }

        // The object is followed by more script; decode just the first value
        let mut values = serde_json::Deserializer::from_str(rest).into_iter::<PlayerResponse>();
        if let Some(Ok(player)) = values.next() {
            return Some(player);
        }
    }
    None
}

/// Pick the caption track for the first preferred language that has one
///
/// Manual tracks win over auto-generated ones; with no language match the
/// first listed track is used.
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    for language in languages {
        let mut candidates: Vec<&CaptionTrack> = tracks
            .iter()
            .filter(|t| t.matches_language(language))
            .collect();
        candidates.sort_by_key(|t| t.is_generated());
        if let Some(&track) = candidates.first() {
            return Some(track);
        }
    }
    tracks.first()
}

/// Extract caption segments from a timed-text document
///
/// Handles both `<text start dur>` (srv1) and `<p t d>` (srv3) layouts.
/// Segment bodies are escaped twice, so they are decoded once here and
/// once more while stripping inline markup.
fn parse_timed_text(xml: &str) -> Vec<String> {
    let (name, close) = if find_open_tag(xml, "text").is_some() {
        ("text", "</text>")
    } else {
        ("p", "</p>")
    };

    let mut segments = Vec::new();
    let mut rest = xml;
    while let Some((content, remaining)) = next_segment(rest, name, close) {
        let text = html_to_text(&decode_entities(content));
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            segments.push(text);
        }
        rest = remaining;
    }
    segments
}

/// Split off the next `<name ...>content</name>` element
fn next_segment<'a>(xml: &'a str, name: &str, close: &str) -> Option<(&'a str, &'a str)> {
    let start = find_open_tag(xml, name)?;
    let content_start = start + xml[start..].find('>')? + 1;
    if xml[..content_start].ends_with("/>") {
        return Some(("", &xml[content_start..]));
    }
    let content_end = content_start + xml[content_start..].find(close)?;
    Some((
        &xml[content_start..content_end],
        &xml[content_end + close.len()..],
    ))
}

/// Position of `<name` followed by whitespace, `>` or `/`
fn find_open_tag(xml: &str, name: &str) -> Option<usize> {
    let pattern = format!("<{}", name);
    let mut from = 0;
    while let Some(offset) = xml[from..].find(&pattern) {
        let pos = from + offset;
        let after = pos + pattern.len();
        match xml[after..].chars().next() {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => return Some(pos),
            _ => from = after,
        }
    }
    None
}
