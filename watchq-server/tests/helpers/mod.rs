//! Shared test utilities for watchq-server
//!
//! In-memory database, a scripted metadata resolver, and request helpers for
//! driving the router with `oneshot`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;
use watchq_common::db::{init_memory_database, Item};
use watchq_common::ResolutionError;
use watchq_server::db::NewItem;
use watchq_server::resolver::{MetadataResolver, VideoMetadata};
use watchq_server::{build_router, queue, tagging, AppState};

/// Resolver returning canned metadata
///
/// Unknown ids resolve to `"Video <id>"` with a 3:30 duration.
#[derive(Default)]
pub struct StubResolver {
    scripted: Mutex<HashMap<String, Result<VideoMetadata, ResolutionError>>>,
    calls: AtomicUsize,
}

impl StubResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, video_id: &str, result: Result<VideoMetadata, ResolutionError>) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .insert(video_id.to_string(), result);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataResolver for StubResolver {
    async fn resolve(&self, video_id: &str) -> Result<VideoMetadata, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(result) = self.scripted.lock().unwrap().get(video_id) {
            return result.clone();
        }
        Ok(metadata(&format!("Video {}", video_id), Some("3:30")))
    }
}

pub fn metadata(title: &str, duration: Option<&str>) -> VideoMetadata {
    VideoMetadata {
        title: title.to_string(),
        thumbnail: Some(format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", title)),
        duration: duration.map(String::from),
    }
}

pub async fn test_db() -> SqlitePool {
    init_memory_database().await.unwrap()
}

pub async fn test_app() -> (Router, SqlitePool) {
    test_app_with(StubResolver::new()).await
}

pub async fn test_app_with(resolver: StubResolver) -> (Router, SqlitePool) {
    let db = test_db().await;
    let state = AppState::new(db.clone(), Arc::new(resolver));
    (build_router(state), db)
}

/// Append an item directly, bypassing URL validation and resolution
pub async fn seed_item(db: &SqlitePool, title: &str, duration: Option<&str>, tags: &[&str]) -> Item {
    queue::append(
        db,
        NewItem {
            url: format!("https://youtu.be/{}", title),
            title: title.to_string(),
            thumbnail: None,
            duration: duration.map(String::from),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        },
    )
    .await
    .unwrap()
}

pub async fn seed_tag(db: &SqlitePool, name: &str) -> Uuid {
    tagging::create_tag(db, name, None).await.unwrap().id
}

pub async fn active_titles(db: &SqlitePool) -> Vec<String> {
    queue::list_active(db)
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.title)
        .collect()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send a request and decode the JSON response body
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn titles(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap().to_string())
        .collect()
}
