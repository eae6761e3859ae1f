/**
 * Content Routes
 * Admin CRUD over portfolio_content plus media uploads to the storage bucket
 */
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::models::{
    ContentItem, ContentPatch, ContentType, NewContentItem, SourceType,
};
use crate::backend::Backend;
use crate::error::{AppError, AppResult};
use crate::media;
use crate::routes::auth::{require_admin, AdminContext};
use crate::routes::bearer_token;
use crate::routes::extract::{JsonBody, PathParam, QueryParams};
use crate::AppState;

/// Route-level body limit for uploads (largest per-type cap plus form overhead)
pub const UPLOAD_BODY_LIMIT: usize = 50 * 1024 * 1024 + 64 * 1024;

// ============================================================================
// Types
// ============================================================================

/// Card of the admin content grid
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ContentCard {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content_type: ContentType,
    pub source_type: SourceType,
    pub thumbnail_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_url: Option<String>,
    pub is_active: bool,
    pub draft: bool,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub created_date: String,
}

impl ContentCard {
    pub fn new(item: &ContentItem, backend: &dyn Backend) -> Self {
        let public_url = |path: &str| backend.public_object_url(path);
        Self {
            id: item.id,
            title: item.title.clone(),
            description: item.description.clone(),
            content_type: item.content_type,
            source_type: item.source_type,
            thumbnail_url: media::thumbnail_url(item, public_url),
            asset_url: media::asset_url(item, public_url),
            is_active: item.is_active,
            draft: !item.is_active,
            order_index: item.order_index,
            created_at: item.created_at,
            created_date: item.created_at.format("%b %-d, %Y").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Video,
    Image,
}

impl TypeFilter {
    fn matches(&self, item: &ContentItem) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Video => item.content_type == ContentType::Video,
            TypeFilter::Image => item.content_type == ContentType::Image,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ContentQuery {
    #[serde(default, rename = "type")]
    pub content_type: TypeFilter,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentListResponse {
    pub items: Vec<ContentCard>,
    pub total: usize,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content_type: ContentType,
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: Option<i32>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    /// Storage path left behind when removing the object failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orphaned_object: Option<String>,
}

/// Parsed upload form
#[derive(Debug, Default)]
struct UploadForm {
    title: String,
    description: Option<String>,
    content_type: Option<String>,
    thumbnail_url: Option<String>,
    is_active: Option<bool>,
    file_name: Option<String>,
    mime_type: Option<String>,
    bytes: Option<Bytes>,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Order index for a new item: the current list length, 0 if unreadable
async fn next_order_index(backend: &dyn Backend, admin: &AdminContext) -> i32 {
    match backend.list_all_content(&admin.token).await {
        Ok(items) => i32::try_from(items.len()).unwrap_or(i32::MAX),
        Err(e) => {
            tracing::warn!("Failed to count content, defaulting order index to 0: {}", e);
            0
        }
    }
}

/// Storage path for an upload: `{type}s/{millis}-{random7}.{ext}`
pub fn storage_path(content_type: ContentType, file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string());
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), 7)
        .to_lowercase();
    format!(
        "{}s/{}-{}.{}",
        content_type.as_str(),
        Utc::now().timestamp_millis(),
        suffix,
        ext
    )
}

fn format_size(bytes: usize) -> String {
    format!("{}MB", bytes / (1024 * 1024))
}

async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Multipart error: {}", e);
                return Err(AppError::Validation("Invalid multipart data".to_string()));
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            form.file_name = field.file_name().map(str::to_string);
            form.mime_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| {
                tracing::error!("Failed to read upload bytes: {}", e);
                AppError::Validation("Failed to read file data".to_string())
            })?;
            form.bytes = Some(bytes);
            continue;
        }

        let value = field.text().await.map_err(|e| {
            tracing::error!("Failed to read form field {}: {}", name, e);
            AppError::Validation("Invalid multipart data".to_string())
        })?;
        match name.as_str() {
            "title" => form.title = value,
            "description" => form.description = Some(value),
            "contentType" => form.content_type = Some(value),
            "thumbnailUrl" => form.thumbnail_url = Some(value),
            "isActive" => form.is_active = Some(value.trim() != "false"),
            other => tracing::debug!("Ignoring unknown upload field {}", other),
        }
    }

    Ok(form)
}

async fn fetch_cards(
    backend: &dyn Backend,
    admin: &AdminContext,
    filter: TypeFilter,
) -> AppResult<Vec<ContentCard>> {
    let items = backend
        .list_all_content(&admin.token)
        .await
        .map_err(AppError::fetch("content"))?;

    Ok(items
        .iter()
        .filter(|item| filter.matches(item))
        .map(|item| ContentCard::new(item, backend))
        .collect())
}

/// All content cards; used by the content section as well
pub async fn load_cards(
    backend: &dyn Backend,
    admin: &AdminContext,
) -> AppResult<Vec<ContentCard>> {
    fetch_cards(backend, admin, TypeFilter::All).await
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/admin/content?type=all|video|image
pub async fn list_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    QueryParams(query): QueryParams<ContentQuery>,
) -> AppResult<Json<ContentListResponse>> {
    let admin = require_admin(&state, &headers).await?;
    let backend = state.backend()?;

    let items = fetch_cards(backend.as_ref(), &admin, query.content_type).await?;
    let total = items.len();
    Ok(Json(ContentListResponse { items, total }))
}

/// POST /api/admin/content/link
pub async fn add_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(payload): JsonBody<LinkRequest>,
) -> AppResult<(StatusCode, Json<ContentCard>)> {
    let title = payload.title.trim();
    let url = payload.url.trim();
    if title.is_empty() || url.is_empty() {
        return Err(AppError::Validation("Title and URL are required".to_string()));
    }

    let admin = require_admin(&state, &headers).await?;
    let backend = state.backend()?;

    let thumbnail_url = non_empty(payload.thumbnail_url).or_else(|| match payload.content_type {
        ContentType::Video => media::derived_thumbnail(url),
        ContentType::Image => None,
    });

    let item = NewContentItem {
        title: title.to_string(),
        description: non_empty(payload.description),
        content_type: payload.content_type,
        source_type: SourceType::Url,
        url: Some(url.to_string()),
        storage_path: None,
        thumbnail_url,
        is_active: payload.is_active,
        order_index: next_order_index(backend.as_ref(), &admin).await,
    };

    let created = backend
        .insert_content(&admin.token, &item)
        .await
        .map_err(AppError::write("save content"))?;

    tracing::info!("Content added by link: {} ({})", created.id, created.content_type);
    Ok((
        StatusCode::CREATED,
        Json(ContentCard::new(&created, backend.as_ref())),
    ))
}

/// POST /api/admin/content/upload (multipart: file, title, description, contentType)
pub async fn upload_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<ContentCard>)> {
    // Cheap local checks before the body is read
    state.backend()?;
    if bearer_token(&headers).is_none() {
        return Err(AppError::Auth("Authorization required".to_string()));
    }

    let form = read_upload_form(multipart?).await?;

    let content_type: ContentType = form
        .content_type
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(AppError::Validation)?;
    let title = form.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    let bytes = form
        .bytes
        .ok_or_else(|| AppError::Validation("Please select a file first".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Empty file".to_string()));
    }
    let cap = content_type.max_upload_bytes();
    if bytes.len() > cap {
        return Err(AppError::Validation(format!(
            "File too large. Max size: {}",
            format_size(cap)
        )));
    }

    let admin = require_admin(&state, &headers).await?;
    let backend = state.backend()?;

    let path = storage_path(content_type, form.file_name.as_deref().unwrap_or_default());
    let mime_type = form
        .mime_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let size = bytes.len();

    let stored = backend
        .upload_object(&admin.token, &path, bytes, &mime_type)
        .await
        .map_err(AppError::write("upload file"))?;

    let item = NewContentItem {
        title,
        description: non_empty(form.description),
        content_type,
        source_type: SourceType::Storage,
        url: None,
        storage_path: Some(stored.clone()),
        thumbnail_url: non_empty(form.thumbnail_url),
        is_active: form.is_active.unwrap_or(true),
        order_index: next_order_index(backend.as_ref(), &admin).await,
    };

    let created = match backend.insert_content(&admin.token, &item).await {
        Ok(created) => created,
        Err(insert_err) => {
            // Roll back the object so no file is left without a row
            if let Err(remove_err) = backend.remove_object(&admin.token, &stored).await {
                tracing::warn!(
                    path = %stored,
                    "Orphaned object after failed insert: {}",
                    remove_err
                );
                return Err(AppError::Orphaned {
                    path: stored,
                    source: insert_err,
                });
            }
            return Err(AppError::write("save content")(insert_err));
        }
    };

    tracing::info!("Content uploaded: {} ({} bytes)", stored, size);
    Ok((
        StatusCode::CREATED,
        Json(ContentCard::new(&created, backend.as_ref())),
    ))
}

/// PATCH /api/admin/content/{id}
pub async fn update_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateRequest>,
) -> AppResult<Json<ContentCard>> {
    let patch = ContentPatch {
        title: payload.title.map(|t| t.trim().to_string()),
        description: payload.description,
        order_index: payload.order_index,
        is_active: payload.is_active,
        updated_at: Some(Utc::now()),
    };
    if patch.is_empty() {
        return Err(AppError::Validation("Nothing to update".to_string()));
    }
    if patch.title.as_deref() == Some("") {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let admin = require_admin(&state, &headers).await?;
    let backend = state.backend()?;

    let updated = backend
        .update_content(&admin.token, id, &patch)
        .await
        .map_err(AppError::write("update content"))?;

    tracing::info!("Content updated: {}", id);
    Ok(Json(ContentCard::new(&updated, backend.as_ref())))
}

/// POST /api/admin/content/{id}/active
pub async fn set_active(
    State(state): State<AppState>,
    headers: HeaderMap,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<ActiveRequest>,
) -> AppResult<Json<ContentCard>> {
    let admin = require_admin(&state, &headers).await?;
    let backend = state.backend()?;

    let patch = ContentPatch {
        is_active: Some(payload.is_active),
        updated_at: Some(Utc::now()),
        ..Default::default()
    };
    let updated = backend
        .update_content(&admin.token, id, &patch)
        .await
        .map_err(AppError::write("update visibility"))?;

    tracing::info!("Content {} is_active={}", id, payload.is_active);
    Ok(Json(ContentCard::new(&updated, backend.as_ref())))
}

/// DELETE /api/admin/content/{id}
///
/// Removes the row first, then the stored object. A failed object removal
/// leaves an orphan which is logged and reported, the row stays deleted.
pub async fn delete_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    let admin = require_admin(&state, &headers).await?;
    let backend = state.backend()?;

    let items = backend
        .list_all_content(&admin.token)
        .await
        .map_err(AppError::fetch("content"))?;
    let item = items
        .into_iter()
        .find(|item| item.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Content item {}", id)))?;

    backend
        .delete_content(&admin.token, id)
        .await
        .map_err(AppError::write("delete content"))?;

    let storage_path = match item.source_type {
        SourceType::Storage => item.storage_path.filter(|p| !p.is_empty()),
        SourceType::Url => None,
    };

    let mut orphaned_object = None;
    if let Some(path) = storage_path {
        if let Err(e) = backend.remove_object(&admin.token, &path).await {
            tracing::warn!(path = %path, "Orphaned object after delete: {}", e);
            orphaned_object = Some(path);
        }
    }

    tracing::info!("Content deleted: {}", id);
    Ok(Json(DeleteResponse {
        success: true,
        orphaned_object,
    }))
}
