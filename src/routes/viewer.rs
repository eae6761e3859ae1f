/**
 * Viewer Session Routes
 * Server-side carousel state for one page visitor
 */
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::carousel::{Carousel, Direction, Track};
use crate::error::{AppError, AppResult};
use crate::routes::extract::{JsonBody, PathParam, QueryParams};
use crate::site::{self, view};
use crate::viewer::{ViewerSession, ViewerSnapshot};
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateViewerRequest {
    pub viewport_width: u32,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideRequest {
    pub track: Track,
    pub direction: i32,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoToRequest {
    pub track: Track,
    pub index: usize,
}

/// Measured width of the first rendered item, for the offset
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotQuery {
    #[serde(default)]
    pub item_width: Option<f64>,
}

/// Current video and image slides; sample slides when the feed is unavailable
async fn load_slides(state: &AppState) -> (Vec<site::Slide>, Vec<site::Slide>) {
    let backend = state.backend.as_ref();
    let content = site::load_content(backend).await;
    view::slides(content.as_deref(), &site::public_url_fn(backend))
}

async fn session(state: &AppState, id: Uuid) -> AppResult<Arc<ViewerSession>> {
    state
        .viewers
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Viewer session {}", id)))
}

/// POST /api/viewer
pub async fn create_viewer(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SnapshotQuery>,
    JsonBody(payload): JsonBody<CreateViewerRequest>,
) -> AppResult<(StatusCode, Json<ViewerSnapshot>)> {
    let (videos, images) = load_slides(&state).await;
    let carousel = Carousel::with_items(payload.viewport_width, videos, images);
    let viewer = state
        .viewers
        .create(carousel)
        .await
        .ok_or(AppError::Busy("Too many viewer sessions".to_string()))?;

    tracing::debug!("Viewer session created: {}", viewer.id);
    Ok((
        StatusCode::CREATED,
        Json(viewer.snapshot(query.item_width).await),
    ))
}

/// GET /api/viewer/{id}
pub async fn get_viewer(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    QueryParams(query): QueryParams<SnapshotQuery>,
) -> AppResult<Json<ViewerSnapshot>> {
    let viewer = session(&state, id).await?;
    Ok(Json(viewer.snapshot(query.item_width).await))
}

/// POST /api/viewer/{id}/slide
pub async fn slide(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    QueryParams(query): QueryParams<SnapshotQuery>,
    JsonBody(payload): JsonBody<SlideRequest>,
) -> AppResult<Json<ViewerSnapshot>> {
    let direction = Direction::try_from(payload.direction).map_err(AppError::Validation)?;
    let viewer = session(&state, id).await?;
    viewer.update(|c| c.slide(payload.track, direction)).await;
    Ok(Json(viewer.snapshot(query.item_width).await))
}

/// POST /api/viewer/{id}/goto
pub async fn go_to(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    QueryParams(query): QueryParams<SnapshotQuery>,
    JsonBody(payload): JsonBody<GoToRequest>,
) -> AppResult<Json<ViewerSnapshot>> {
    let viewer = session(&state, id).await?;
    viewer.update(|c| c.go_to(payload.track, payload.index)).await;
    Ok(Json(viewer.snapshot(query.item_width).await))
}

/// POST /api/viewer/{id}/resize
pub async fn resize(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    QueryParams(query): QueryParams<SnapshotQuery>,
    JsonBody(payload): JsonBody<CreateViewerRequest>,
) -> AppResult<Json<ViewerSnapshot>> {
    let viewer = session(&state, id).await?;
    viewer.update(|c| c.resize(payload.viewport_width)).await;
    Ok(Json(viewer.snapshot(query.item_width).await))
}

/// POST /api/viewer/{id}/refresh
pub async fn refresh(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    QueryParams(query): QueryParams<SnapshotQuery>,
) -> AppResult<Json<ViewerSnapshot>> {
    let viewer = session(&state, id).await?;
    let (videos, images) = load_slides(&state).await;
    viewer.refresh(videos, images).await;
    Ok(Json(viewer.snapshot(query.item_width).await))
}

/// DELETE /api/viewer/{id}
pub async fn delete_viewer(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<StatusCode> {
    if state.viewers.remove(id).await {
        tracing::debug!("Viewer session closed: {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Viewer session {}", id)))
    }
}
