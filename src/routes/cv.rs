/**
 * CV Routes
 * Experience timeline and skills stored on the admin's own profile row
 */
use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::backend::models::CvData;
use crate::cv::CvForm;
use crate::error::{AppError, AppResult};
use crate::routes::auth::require_admin;
use crate::routes::extract::JsonBody;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvSaveResponse {
    pub success: bool,
    pub cv_data: CvData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_url: Option<String>,
}

/// GET /api/admin/cv
pub async fn get_cv(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<CvForm>> {
    let admin = require_admin(&state, &headers).await?;
    let backend = state.backend()?;

    let profile = backend
        .get_profile(&admin.token, admin.user.id)
        .await
        .map_err(AppError::fetch("CV"))?;

    Ok(Json(CvForm::from_profile(profile.as_ref())))
}

/// PUT /api/admin/cv
pub async fn save_cv(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(form): JsonBody<CvForm>,
) -> AppResult<Json<CvSaveResponse>> {
    let admin = require_admin(&state, &headers).await?;
    let backend = state.backend()?;

    let cv_data = form.to_cv_data();
    let cv_url = form.cv_url().map(str::to_string);

    backend
        .upsert_cv(&admin.token, admin.user.id, &cv_data, cv_url.as_deref())
        .await
        .map_err(AppError::write("save CV"))?;

    tracing::info!(
        "CV saved: {} experiences, {} skill categories",
        cv_data.experiences.len(),
        cv_data.skills.len()
    );
    Ok(Json(CvSaveResponse {
        success: true,
        cv_data,
        cv_url,
    }))
}
