/**
 * Admin Authentication Routes
 * Login delegated to the auth service, gated on the profile's admin flag
 */
use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::models::{AuthUser, Profile};
use crate::backend::{Backend, BackendError};
use crate::error::{AppError, AppResult};
use crate::routes::extract::JsonBody;
use crate::routes::{bearer_token, SuccessResponse};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

/// Admin identity returned to the dashboard
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&AuthUser> for AdminUser {
    fn from(user: &AuthUser) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub user: AdminUser,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: AdminUser,
}

/// Verified admin caller of an admin endpoint
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub token: String,
    pub user: AuthUser,
    pub profile: Profile,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Ends a session that must not proceed. Failure to sign out is only logged.
async fn revoke(backend: &dyn Backend, token: &str) {
    if let Err(e) = backend.sign_out(token).await {
        tracing::warn!("Failed to sign out unconfirmed session: {}", e);
    }
}

/// The admin profile of `user`, signing the session out when there is none
async fn admin_profile(backend: &dyn Backend, token: &str, user: &AuthUser) -> AppResult<Profile> {
    let profile = backend
        .get_profile(token, user.id)
        .await
        .map_err(AppError::fetch("profile"))?;

    match profile {
        Some(profile) if profile.is_admin => Ok(profile),
        _ => {
            tracing::warn!("Non-admin access attempt by user {}", user.id);
            revoke(backend, token).await;
            Err(AppError::NotAdmin)
        }
    }
}

/// Validate the bearer token and the admin flag of its user
pub async fn require_admin(state: &AppState, headers: &HeaderMap) -> AppResult<AdminContext> {
    let backend = state.backend()?;
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::Auth("Authorization required".to_string()))?;

    let user = match backend.get_user(token).await {
        Ok(user) => user,
        Err(BackendError::InvalidSession) => {
            return Err(AppError::Auth("Invalid or expired session".to_string()))
        }
        Err(e) => return Err(AppError::fetch("session")(e)),
    };

    let profile = admin_profile(backend.as_ref(), token, &user).await?;

    Ok(AdminContext {
        token: token.to_string(),
        user,
        profile,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("Invalid email format".to_string()));
    }

    let backend = state.backend()?;
    let session = match backend.sign_in(email, &payload.password).await {
        Ok(session) => session,
        Err(BackendError::InvalidCredentials) => {
            tracing::warn!("Failed login attempt for {}", email);
            return Err(AppError::Auth("Invalid login credentials".to_string()));
        }
        Err(e) => return Err(AppError::fetch("session")(e)),
    };

    // An admin flag that could not be confirmed ends the fresh session too
    if let Err(e) = admin_profile(backend.as_ref(), &session.access_token, &session.user).await {
        if !matches!(e, AppError::NotAdmin) {
            revoke(backend.as_ref(), &session.access_token).await;
        }
        return Err(e);
    }

    tracing::info!("Admin logged in: {}", session.user.id);
    Ok(Json(LoginResponse {
        success: true,
        user: AdminUser::from(&session.user),
        access_token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// POST /api/admin/logout
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<SuccessResponse>> {
    let backend = state.backend()?;
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::Auth("Authorization required".to_string()))?;

    if let Err(e) = backend.sign_out(token).await {
        // The dashboard drops its token either way
        tracing::warn!("Sign out failed: {}", e);
    }

    Ok(Json(SuccessResponse::with_message("Logged out")))
}

/// GET /api/admin/session
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<SessionResponse>> {
    let admin = require_admin(&state, &headers).await?;
    Ok(Json(SessionResponse {
        authenticated: true,
        user: AdminUser::from(&admin.user),
    }))
}
