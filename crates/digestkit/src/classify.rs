//! URL validation and extraction strategy selection
//!
//! Classification is a two-way dispatch: URLs on a known video host that
//! carry a readable video id go to the video extractor, everything else is
//! fetched as a generic web page. Ambiguous URLs fall through to generic.

use crate::error::PipelineError;
use url::Url;

/// Hosts whose `/watch`, `/shorts`, `/embed`, `/live` and `/v` paths are videos
const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtube-nocookie.com",
    "www.youtube-nocookie.com",
];

/// Short-link host where the first path segment is the video id
const YOUTU_BE_HOST: &str = "youtu.be";

/// Path prefixes followed by a video id segment
const VIDEO_PATH_PREFIXES: &[&str] = &["shorts", "embed", "live", "v"];

/// How content is pulled out of a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Video page: transcript plus video metadata
    Video {
        /// Video id read from the URL
        video_id: String,
    },
    /// Any other page: fetch and strip markup
    Generic,
}

impl ExtractionStrategy {
    /// Short name for logs and output
    pub fn name(&self) -> &'static str {
        match self {
            ExtractionStrategy::Video { .. } => "video",
            ExtractionStrategy::Generic => "generic",
        }
    }
}

/// Parse and validate a user-supplied URL
///
/// Accepts only absolute http/https URLs with a host.
pub fn validate_url(raw: &str) -> Result<Url, PipelineError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::InvalidUrl);
    }

    let url = Url::parse(trimmed).map_err(|_| PipelineError::InvalidUrl)?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(PipelineError::InvalidUrl);
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(PipelineError::InvalidUrl),
    }
}

/// Select the extraction strategy for a validated URL
pub fn classify(url: &Url) -> ExtractionStrategy {
    match video_id(url) {
        Some(video_id) => ExtractionStrategy::Video { video_id },
        None => ExtractionStrategy::Generic,
    }
}

/// Read the video id from a video-hosting URL
fn video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let candidate = if host == YOUTU_BE_HOST {
        segments.first().map(|s| s.to_string())
    } else if YOUTUBE_HOSTS.contains(&host.as_str()) {
        match segments.as_slice() {
            ["watch"] => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            [prefix, id, ..] if VIDEO_PATH_PREFIXES.contains(prefix) => Some(id.to_string()),
            _ => None,
        }
    } else {
        None
    };

    candidate.filter(|id| is_video_id(id))
}

fn is_video_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(raw: &str) -> ExtractionStrategy {
        classify(&validate_url(raw).unwrap())
    }

    fn video(id: &str) -> ExtractionStrategy {
        ExtractionStrategy::Video {
            video_id: id.to_string(),
        }
    }

    #[test]
    fn test_validate_url_rejects_non_urls() {
        for raw in ["", "   ", "not a url", "example.com", "/relative/path", "http://"] {
            assert_eq!(validate_url(raw), Err(PipelineError::InvalidUrl), "{raw}");
        }
    }

    #[test]
    fn test_validate_url_rejects_other_schemes() {
        for raw in ["ftp://example.com", "file:///etc/passwd", "mailto:a@b.c", "data:text/plain,hi"] {
            assert_eq!(validate_url(raw), Err(PipelineError::InvalidUrl), "{raw}");
        }
    }

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert!(validate_url("https://example.com/article").is_ok());
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("  https://example.com  ").is_ok());
    }

    #[test]
    fn test_classify_watch_urls() {
        assert_eq!(strategy("https://www.youtube.com/watch?v=abc123"), video("abc123"));
        assert_eq!(
            strategy("https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            video("dQw4w9WgXcQ")
        );
        assert_eq!(strategy("https://m.youtube.com/watch?v=a-b_c"), video("a-b_c"));
        assert_eq!(strategy("https://WWW.YouTube.com/watch?v=xyz"), video("xyz"));
    }

    #[test]
    fn test_classify_alternate_video_paths() {
        assert_eq!(strategy("https://youtu.be/dQw4w9WgXcQ"), video("dQw4w9WgXcQ"));
        assert_eq!(strategy("https://youtu.be/dQw4w9WgXcQ?t=42"), video("dQw4w9WgXcQ"));
        assert_eq!(strategy("https://www.youtube.com/shorts/abc"), video("abc"));
        assert_eq!(strategy("https://www.youtube.com/embed/abc"), video("abc"));
        assert_eq!(strategy("https://www.youtube.com/live/abc"), video("abc"));
        assert_eq!(
            strategy("https://www.youtube-nocookie.com/embed/abc"),
            video("abc")
        );
    }

    #[test]
    fn test_classify_ambiguous_youtube_urls_as_generic() {
        for raw in [
            "https://www.youtube.com/",
            "https://www.youtube.com/watch",
            "https://www.youtube.com/watch?v=",
            "https://www.youtube.com/watch?v=bad%20id",
            "https://www.youtube.com/channel/UC123",
            "https://www.youtube.com/@creator",
            "https://youtu.be/",
        ] {
            assert_eq!(strategy(raw), ExtractionStrategy::Generic, "{raw}");
        }
    }

    #[test]
    fn test_classify_other_hosts_as_generic() {
        for raw in [
            "https://example.com/article",
            "https://notyoutube.com/watch?v=abc",
            "https://youtube.com.evil.example/watch?v=abc",
            "https://example.com/?next=https://youtube.com/watch?v=abc",
            "https://vimeo.com/12345",
        ] {
            assert_eq!(strategy(raw), ExtractionStrategy::Generic, "{raw}");
        }
    }

    #[test]
    fn test_strategy_name() {
        assert_eq!(video("x").name(), "video");
        assert_eq!(ExtractionStrategy::Generic.name(), "generic");
    }
}
