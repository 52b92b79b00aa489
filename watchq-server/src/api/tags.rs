//! Tag registry endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use watchq_common::db::Tag;

use crate::error::ApiResult;
use crate::tagging;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameTagRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteTagResponse {
    pub message: String,
}

/// GET /tags
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(tagging::list_tags(&state.db).await?))
}

/// POST /tags
pub async fn create_tag(
    State(state): State<AppState>,
    payload: Result<Json<CreateTagRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    let Json(request) = payload?;
    let tag = tagging::create_tag(&state.db, &request.name, request.color.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// PATCH /tags/:id
pub async fn rename_tag(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RenameTagRequest>, JsonRejection>,
) -> ApiResult<Json<Tag>> {
    let Path(id) = path?;
    let Json(request) = payload?;
    Ok(Json(tagging::rename_tag(&state.db, id, &request.name).await?))
}

/// DELETE /tags/:id
pub async fn delete_tag(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<DeleteTagResponse>> {
    let Path(id) = path?;
    let tag = tagging::delete_tag(&state.db, id).await?;
    Ok(Json(DeleteTagResponse {
        message: format!("Tag '{}' deleted", tag.name),
    }))
}

pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/:id", patch(rename_tag).delete(delete_tag))
}
