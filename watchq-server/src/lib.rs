//! watchq-server library - watch queue backend
//!
//! Ranked queue of YouTube videos with a tag registry. The HTTP surface in
//! [`api`] is a thin layer over the ranking engine ([`queue`]), the tag
//! cascade manager ([`tagging`]) and the view projection ([`view`]).

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod queue;
pub mod resolver;
pub mod tagging;
pub mod view;

use resolver::MetadataResolver;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub resolver: Arc<dyn MetadataResolver>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, resolver: Arc<dyn MetadataResolver>) -> Self {
        Self {
            db,
            resolver,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router (no middleware layers)
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::item_routes())
        .merge(api::tag_routes())
        .merge(api::health_routes())
        .with_state(state)
}

/// CORS policy admitting only the configured frontend origins
///
/// Origins that are not valid header values are skipped with a warning.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

/// Router with CORS and request tracing applied
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    build_router(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
