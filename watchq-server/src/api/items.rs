//! Queue item endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use watchq_common::db::{Item, ItemStatus};

use crate::error::ApiResult;
use crate::queue::{self, Move, RankUpdate};
use crate::tagging;
use crate::view::{apply_view, ViewQuery};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub items: Vec<RankUpdate>,
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub message: String,
    pub updated: usize,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ItemStatus,
}

#[derive(Debug, Deserialize)]
pub struct TagsRequest {
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "move")]
    pub movement: Move,
    /// Ids in the order the caller displays them
    pub visible: Option<Vec<Uuid>>,
}

/// GET /items
///
/// Active items by rank. Optional `duration`, `tags` and `order` query
/// parameters apply the view filter on the server.
pub async fn list_items(
    State(state): State<AppState>,
    query: Result<Query<ViewQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Item>>> {
    let Query(query) = query?;
    let (filter, direction) = query.into_parts();

    let items = queue::list_active(&state.db).await?;
    Ok(Json(apply_view(items, &filter, direction)))
}

/// POST /items
pub async fn add_item(
    State(state): State<AppState>,
    payload: Result<Json<AddItemRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let Json(request) = payload?;
    let item = queue::add_video(&state.db, state.resolver.as_ref(), &request.url, &request.tags)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /items/reorder
pub async fn reorder_items(
    State(state): State<AppState>,
    payload: Result<Json<ReorderRequest>, JsonRejection>,
) -> ApiResult<Json<ReorderResponse>> {
    let Json(request) = payload?;
    let updated = queue::bulk_reorder(&state.db, &request.items).await?;
    Ok(Json(ReorderResponse {
        message: "Reordered successfully".to_string(),
        updated,
    }))
}

/// PATCH /items/:id/move
pub async fn move_item(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<Item>>> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let items = queue::move_item(&state.db, id, request.movement, request.visible.as_deref()).await?;
    Ok(Json(items))
}

/// PATCH /items/:id/deprioritize
pub async fn deprioritize_item(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Item>> {
    let Path(id) = path?;
    Ok(Json(queue::deprioritize(&state.db, id).await?))
}

/// PATCH /items/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Json<Item>> {
    let Path(id) = path?;
    let Json(request) = payload?;
    Ok(Json(queue::set_status(&state.db, id, request.status).await?))
}

/// PATCH /items/:id/tags
pub async fn replace_tags(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TagsRequest>, JsonRejection>,
) -> ApiResult<Json<Item>> {
    let Path(id) = path?;
    let Json(request) = payload?;
    Ok(Json(tagging::replace_item_tags(&state.db, id, &request.tags).await?))
}

/// POST /items/:id/tags/:name
pub async fn attach_tag(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, String)>, PathRejection>,
) -> ApiResult<Json<Item>> {
    let Path((id, name)) = path?;
    Ok(Json(tagging::attach_tag(&state.db, id, &name).await?))
}

/// DELETE /items/:id/tags/:name
pub async fn detach_tag(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, String)>, PathRejection>,
) -> ApiResult<Json<Item>> {
    let Path((id, name)) = path?;
    Ok(Json(tagging::detach_tag(&state.db, id, &name).await?))
}

pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(add_item))
        .route("/items/reorder", put(reorder_items))
        .route("/items/:id/move", patch(move_item))
        .route("/items/:id/deprioritize", patch(deprioritize_item))
        .route("/items/:id/status", patch(update_status))
        .route("/items/:id/tags", patch(replace_tags))
        .route("/items/:id/tags/:name", post(attach_tag).delete(detach_tag))
}
