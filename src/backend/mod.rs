//! Hosted backend access: auth service, tables and the media bucket.
//!
//! Every operation is a single request against the provider. Nothing is
//! cached and nothing is retried; callers decide how to surface failures.

pub mod models;
pub mod supabase;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use axum::body::Bytes;
use uuid::Uuid;

use models::{
    AuthSession, AuthUser, ContentItem, ContentPatch, CvData, NewContentItem, Profile, SiteSetting,
};

pub use supabase::SupabaseClient;

/// Storage bucket holding uploaded media
pub const MEDIA_BUCKET: &str = "portfolio-media";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid login credentials")]
    InvalidCredentials,
    #[error("session is invalid or expired")]
    InvalidSession,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Delegated authentication
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession>;

    async fn get_user(&self, access_token: &str) -> BackendResult<AuthUser>;

    async fn sign_out(&self, access_token: &str) -> BackendResult<()>;
}

/// `portfolio_content` table and the media bucket
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Active items ordered by `order_index` ascending
    async fn list_active_content(&self) -> BackendResult<Vec<ContentItem>>;

    /// All items ordered by `order_index` ascending
    async fn list_all_content(&self, access_token: &str) -> BackendResult<Vec<ContentItem>>;

    async fn insert_content(
        &self,
        access_token: &str,
        item: &NewContentItem,
    ) -> BackendResult<ContentItem>;

    async fn update_content(
        &self,
        access_token: &str,
        id: Uuid,
        patch: &ContentPatch,
    ) -> BackendResult<ContentItem>;

    async fn delete_content(&self, access_token: &str, id: Uuid) -> BackendResult<()>;

    /// Stores `bytes` under `path` in the media bucket and returns the stored path
    async fn upload_object(
        &self,
        access_token: &str,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> BackendResult<String>;

    async fn remove_object(&self, access_token: &str, path: &str) -> BackendResult<()>;

    /// Public URL of an object in the media bucket
    fn public_object_url(&self, path: &str) -> String;
}

/// `site_settings` table
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn list_settings(&self) -> BackendResult<Vec<SiteSetting>>;

    /// Upsert keyed on (section, key)
    async fn upsert_settings(&self, access_token: &str, rows: &[SiteSetting]) -> BackendResult<()>;
}

/// `profiles` table
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Profile shown on the public site (first row)
    async fn first_profile(&self) -> BackendResult<Option<Profile>>;

    async fn get_profile(&self, access_token: &str, id: Uuid) -> BackendResult<Option<Profile>>;

    async fn upsert_cv(
        &self,
        access_token: &str,
        id: Uuid,
        cv_data: &CvData,
        cv_url: Option<&str>,
    ) -> BackendResult<()>;
}

/// Everything the service needs from the provider
#[async_trait]
pub trait Backend: AuthService + ContentRepository + SettingsRepository + ProfileRepository {
    /// Round-trip latency of a cheap read
    async fn health_check(&self) -> BackendResult<std::time::Duration>;
}

/// Public URL of an object stored in the media bucket
pub fn public_object_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}/{}",
        base_url.trim_end_matches('/'),
        MEDIA_BUCKET,
        path.trim_start_matches('/')
    )
}
