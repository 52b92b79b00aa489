//! YouTube video-id extraction
//!
//! Accepts the URL shapes a user is likely to paste: watch pages, short
//! links, embeds, shorts and the legacy `/v/` form.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static VIDEO_URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/)([^&\n?#]+)",
        r"youtube\.com/v/([^&\n?#]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid video url regex"))
    .collect()
});

/// Extract the video id from a YouTube URL, if it has one
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_URL_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Like [`extract_video_id`] but reports unrecognized URLs as invalid input
pub fn require_video_id(url: &str) -> Result<String> {
    extract_video_id(url)
        .ok_or_else(|| Error::InvalidInput(format!("Invalid YouTube URL format: {}", url)))
}
