/**
 * Site Settings Routes
 * Homepage editor: catalogue fields in, one bulk upsert out
 */
use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::routes::auth::require_admin;
use crate::routes::extract::JsonBody;
use crate::routes::SuccessResponse;
use crate::settings::{form_fields, rows_for_save, SettingFieldValue, SiteSettings};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub fields: Vec<SettingFieldValue>,
    pub settings: SiteSettings,
}

/// GET /api/admin/settings
pub async fn get_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<SettingsResponse>> {
    let _admin = require_admin(&state, &headers).await?;
    let backend = state.backend()?;

    let rows = backend
        .list_settings()
        .await
        .map_err(AppError::fetch("settings"))?;
    let settings = SiteSettings::to_nested(&rows);

    Ok(Json(SettingsResponse {
        fields: form_fields(&settings),
        settings,
    }))
}

/// PUT /api/admin/settings
///
/// Body is the nested `{ section: { key: value } }` map. Keys outside the
/// editable catalogue are rejected before anything is written.
pub async fn save_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(submitted): JsonBody<SiteSettings>,
) -> AppResult<Json<SuccessResponse>> {
    let rows = rows_for_save(&submitted).map_err(AppError::Validation)?;
    if rows.is_empty() {
        return Err(AppError::Validation("No settings submitted".to_string()));
    }

    let admin = require_admin(&state, &headers).await?;
    let backend = state.backend()?;

    backend
        .upsert_settings(&admin.token, &rows)
        .await
        .map_err(AppError::write("save settings"))?;

    tracing::info!("Saved {} site settings", rows.len());
    Ok(Json(SuccessResponse::with_message("Site settings saved")))
}

#[cfg(test)]
mod tests {
    use crate::backend::memory::Op;
    use crate::backend::models::SiteSetting;
    use crate::routes::test_support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_get_returns_catalogue_with_values() {
        let (memory, token) = with_admin();
        memory.seed_setting("footer", "copyright", "© Me");
        let (status, body) = send(test_app(&memory), Method::GET, "/api/admin/settings", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fields"].as_array().unwrap().len(), 20);
        assert_eq!(body["settings"]["footer"]["copyright"], "© Me");
    }

    #[tokio::test]
    async fn test_save_upserts_in_one_call() {
        let (memory, token) = with_admin();
        memory.seed_setting("hero", "headline", "OLD");
        memory.clear_calls();

        let payload = json!({
            "hero": {"headline": "NEW", "subtitle": "Sub"},
            "footer": {"copyright": "© 2026"}
        });
        let (status, body) = send(
            test_app(&memory),
            Method::PUT,
            "/api/admin/settings",
            Some(&token),
            Some(payload.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let upserts = memory.calls().into_iter().filter(|op| *op == Op::UpsertSettings).count();
        assert_eq!(upserts, 1);

        // Saving the same form again leaves the same rows
        send(test_app(&memory), Method::PUT, "/api/admin/settings", Some(&token), Some(payload)).await;
        let mut rows = memory.settings();
        rows.sort_by(|a, b| (&a.section, &a.key).cmp(&(&b.section, &b.key)));
        assert_eq!(
            rows,
            vec![
                SiteSetting::new("footer", "copyright", "© 2026"),
                SiteSetting::new("hero", "headline", "NEW"),
                SiteSetting::new("hero", "subtitle", "Sub"),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected() {
        let (memory, token) = with_admin();
        let (status, body) = send(
            test_app(&memory),
            Method::PUT,
            "/api/admin/settings",
            Some(&token),
            Some(json!({"hero": {"tagline": "x"}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unknown setting 'hero.tagline'");
        assert!(memory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_failure_is_bad_gateway() {
        let (memory, token) = with_admin();
        memory.fail(Op::UpsertSettings);
        let (status, body) = send(
            test_app(&memory),
            Method::PUT,
            "/api/admin/settings",
            Some(&token),
            Some(json!({"hero": {"headline": "x"}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to save settings");
    }
}
