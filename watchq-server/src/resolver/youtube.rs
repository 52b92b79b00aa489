//! YouTube Data API v3 client
//!
//! One `videos?part=snippet,contentDetails` request per video.

use super::{MetadataResolver, VideoMetadata};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use watchq_common::duration::format_iso8601;
use watchq_common::ResolutionError;

const YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    snippet: Snippet,
    #[serde(rename = "contentDetails")]
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

/// Google API error envelope: `{"error": {"code": 403, "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl VideoResource {
    fn into_metadata(self) -> VideoMetadata {
        let Thumbnails {
            high,
            medium,
            default,
        } = self.snippet.thumbnails;
        let thumbnail = high.or(medium).or(default).map(|t| t.url);

        let duration = self
            .content_details
            .and_then(|details| details.duration)
            .map(|iso| format_iso8601(&iso));

        VideoMetadata {
            title: self.snippet.title,
            thumbnail,
            duration,
        }
    }
}

/// Upstream message from an error body, falling back to the status line
fn upstream_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| format!("HTTP {}", status))
}

/// Metadata resolver backed by the YouTube Data API
pub struct YouTubeResolver {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl YouTubeResolver {
    pub fn new(api_key: Option<String>) -> Result<Self, ResolutionError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ResolutionError::Transport(e.to_string()))?;

        if api_key.is_none() {
            warn!("No YouTube API key configured; adding videos will be rejected");
        }

        Ok(Self {
            http_client,
            api_key,
            base_url: YOUTUBE_API_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API root (self-hosted proxy or mock)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl MetadataResolver for YouTubeResolver {
    async fn resolve(&self, video_id: &str) -> Result<VideoMetadata, ResolutionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ResolutionError::Rejected("YouTube API key is not configured".into()))?;

        let url = format!("{}/videos", self.base_url);
        debug!(video_id = %video_id, "Querying YouTube Data API");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("part", "snippet,contentDetails"),
                ("id", video_id),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|e| ResolutionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = upstream_message(status, &body);
            warn!(video_id = %video_id, status = status.as_u16(), "YouTube API error: {}", message);

            return Err(if status.is_client_error() {
                ResolutionError::Rejected(format!("YouTube API Error: {}", message))
            } else {
                ResolutionError::Transport(format!("YouTube API Error: {}", message))
            });
        }

        let list: VideoListResponse = response
            .json()
            .await
            .map_err(|e| ResolutionError::Transport(format!("Unreadable YouTube response: {}", e)))?;

        list.items
            .into_iter()
            .next()
            .map(VideoResource::into_metadata)
            .ok_or_else(|| {
                ResolutionError::Unavailable(format!("Video {} not found or private", video_id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn parse(json: &str) -> VideoListResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_maps_snippet_and_duration() {
        let list = parse(
            r#"{
                "items": [{
                    "snippet": {
                        "title": "Talk",
                        "thumbnails": {
                            "default": {"url": "d.jpg"},
                            "medium": {"url": "m.jpg"},
                            "high": {"url": "h.jpg"}
                        }
                    },
                    "contentDetails": {"duration": "PT1H2M10S"}
                }]
            }"#,
        );

        let meta = list.items.into_iter().next().unwrap().into_metadata();
        assert_eq!(meta.title, "Talk");
        assert_eq!(meta.thumbnail.as_deref(), Some("h.jpg"));
        assert_eq!(meta.duration.as_deref(), Some("1:02:10"));
    }

    #[test]
    fn test_thumbnail_falls_back() {
        let list = parse(
            r#"{"items": [{
                "snippet": {"title": "T", "thumbnails": {"default": {"url": "d.jpg"}}},
                "contentDetails": {"duration": "PT4M5S"}
            }]}"#,
        );
        let meta = list.items.into_iter().next().unwrap().into_metadata();
        assert_eq!(meta.thumbnail.as_deref(), Some("d.jpg"));
        assert_eq!(meta.duration.as_deref(), Some("4:05"));
    }

    #[test]
    fn test_missing_content_details_leaves_duration_absent() {
        let list = parse(r#"{"items": [{"snippet": {"title": "T"}}]}"#);
        let meta = list.items.into_iter().next().unwrap().into_metadata();
        assert_eq!(meta.thumbnail, None);
        assert_eq!(meta.duration, None);
    }

    #[test]
    fn test_empty_list_parses() {
        assert!(parse(r#"{"kind": "youtube#videoListResponse", "items": []}"#).items.is_empty());
        assert!(parse(r#"{}"#).items.is_empty());
    }

    #[test]
    fn test_upstream_message_extraction() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid."}}"#;
        assert_eq!(
            upstream_message(reqwest::StatusCode::BAD_REQUEST, body),
            "API key not valid."
        );
        assert_eq!(
            upstream_message(reqwest::StatusCode::FORBIDDEN, "<html>"),
            "HTTP 403 Forbidden"
        );
    }

    /// Local stand-in for the Data API, keyed on the requested video id
    async fn fake_api(Query(params): Query<HashMap<String, String>>) -> Response {
        if params.get("key").map(String::as_str) != Some("test-key") {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": {"code": 400, "message": "API key not valid."}})),
            )
                .into_response();
        }

        match params.get("id").map(String::as_str) {
            Some("quota") => (
                StatusCode::FORBIDDEN,
                Json(json!({"error": {"code": 403, "message": "Quota exceeded."}})),
            )
                .into_response(),
            Some("down") => (StatusCode::SERVICE_UNAVAILABLE, "backend unavailable").into_response(),
            Some("gone") => Json(json!({"items": []})).into_response(),
            Some("garbled") => (StatusCode::OK, "{not json").into_response(),
            _ => Json(json!({
                "items": [{
                    "snippet": {"title": "Found", "thumbnails": {"high": {"url": "h.jpg"}}},
                    "contentDetails": {"duration": "PT21M3S"}
                }]
            }))
            .into_response(),
        }
    }

    async fn spawn_fake_api() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/videos", get(fake_api));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn resolver_for(key: &str) -> YouTubeResolver {
        YouTubeResolver::new(Some(key.to_string()))
            .unwrap()
            .with_base_url(spawn_fake_api().await)
    }

    #[tokio::test]
    async fn test_resolves_metadata_over_http() {
        let resolver = resolver_for("test-key").await;
        let meta = resolver.resolve("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(meta.title, "Found");
        assert_eq!(meta.thumbnail.as_deref(), Some("h.jpg"));
        assert_eq!(meta.duration.as_deref(), Some("21:03"));
    }

    #[tokio::test]
    async fn test_client_error_is_rejected_with_upstream_message() {
        let resolver = resolver_for("test-key").await;
        match resolver.resolve("quota").await {
            Err(ResolutionError::Rejected(msg)) => assert!(msg.contains("Quota exceeded.")),
            other => panic!("expected Rejected, got {:?}", other),
        }

        let bad_key = resolver_for("wrong-key").await;
        match bad_key.resolve("dQw4w9WgXcQ").await {
            Err(ResolutionError::Rejected(msg)) => assert!(msg.contains("API key not valid.")),
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_transport() {
        let resolver = resolver_for("test-key").await;
        let result = resolver.resolve("down").await;
        assert!(matches!(result, Err(ResolutionError::Transport(_))));
    }

    #[tokio::test]
    async fn test_empty_items_is_unavailable() {
        let resolver = resolver_for("test-key").await;
        let result = resolver.resolve("gone").await;
        assert!(matches!(result, Err(ResolutionError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_unreadable_body_is_transport() {
        let resolver = resolver_for("test-key").await;
        match resolver.resolve("garbled").await {
            Err(ResolutionError::Transport(msg)) => assert!(msg.starts_with("Unreadable")),
            other => panic!("expected Transport, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_is_rejected() {
        let resolver = YouTubeResolver::new(None).unwrap();
        let result = resolver.resolve("abc").await;
        assert!(matches!(result, Err(ResolutionError::Rejected(_))));
    }
}
