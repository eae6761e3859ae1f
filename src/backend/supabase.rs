/**
 * Supabase Client
 * reqwest implementation of the backend traits (GoTrue auth, PostgREST, Storage)
 */
use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::models::{
    AuthSession, AuthUser, ContentItem, ContentPatch, CvData, NewContentItem, Profile, SiteSetting,
};
use super::{
    AuthService, Backend, BackendError, BackendResult, ContentRepository, ProfileRepository,
    SettingsRepository, MEDIA_BUCKET,
};
use crate::config::BackendConfig;

const CONTENT_TABLE: &str = "portfolio_content";
const SETTINGS_TABLE: &str = "site_settings";
const PROFILES_TABLE: &str = "profiles";

/// Shared client for one project. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SettingUpsert<'a> {
    section: &'a str,
    key: &'a str,
    value: &'a str,
    updated_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct CvUpsert<'a> {
    id: Uuid,
    cv_data: &'a CvData,
    cv_url: Option<&'a str>,
    updated_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct RemoveObjects<'a> {
    prefixes: [&'a str; 1],
}

/// Error body shapes used by PostgREST, GoTrue and Storage
#[derive(Debug, Default, Deserialize)]
struct ProviderError {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ProviderError {
    fn into_message(self, fallback: String) -> String {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or(fallback)
    }
}

impl SupabaseClient {
    pub fn new(config: &BackendConfig) -> BackendResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            MEDIA_BUCKET,
            path.trim_start_matches('/')
        )
    }

    /// Attach the project key and a bearer token; the anon key doubles as the
    /// bearer for public reads.
    fn authorize(&self, builder: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token.unwrap_or(self.anon_key.as_str()))
    }

    async fn send(&self, builder: RequestBuilder) -> BackendResult<String> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!(error = %e, "backend request failed");
            BackendError::Http(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ProviderError>(&body)
                .unwrap_or_default()
                .into_message(status.canonical_reason().unwrap_or("error").to_string());
            tracing::warn!(status = %status, message = %message, "backend returned error");
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> BackendResult<T> {
        let body = self.send(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl AuthService for SupabaseClient {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        let request = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&PasswordGrant { email, password });

        match self.send_json::<AuthSession>(request).await {
            Err(BackendError::Status { status, .. })
                if status == StatusCode::BAD_REQUEST.as_u16()
                    || status == StatusCode::UNAUTHORIZED.as_u16() =>
            {
                Err(BackendError::InvalidCredentials)
            }
            other => other,
        }
    }

    async fn get_user(&self, access_token: &str) -> BackendResult<AuthUser> {
        let request = self.authorize(self.http.get(self.auth_url("user")), Some(access_token));

        match self.send_json::<AuthUser>(request).await {
            Err(BackendError::Status { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16() =>
            {
                Err(BackendError::InvalidSession)
            }
            other => other,
        }
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let request = self.authorize(self.http.post(self.auth_url("logout")), Some(access_token));
        self.send(request).await.map(|_| ())
    }
}

#[async_trait]
impl ContentRepository for SupabaseClient {
    async fn list_active_content(&self) -> BackendResult<Vec<ContentItem>> {
        let request = self
            .authorize(self.http.get(self.rest_url(CONTENT_TABLE)), None)
            .query(&[
                ("select", "*"),
                ("is_active", "eq.true"),
                ("order", "order_index.asc"),
            ]);
        self.send_json(request).await
    }

    async fn list_all_content(&self, access_token: &str) -> BackendResult<Vec<ContentItem>> {
        let request = self
            .authorize(self.http.get(self.rest_url(CONTENT_TABLE)), Some(access_token))
            .query(&[("select", "*"), ("order", "order_index.asc")]);
        self.send_json(request).await
    }

    async fn insert_content(
        &self,
        access_token: &str,
        item: &NewContentItem,
    ) -> BackendResult<ContentItem> {
        let request = self
            .authorize(self.http.post(self.rest_url(CONTENT_TABLE)), Some(access_token))
            .header("Prefer", "return=representation")
            .json(&[item]);

        let rows: Vec<ContentItem> = self.send_json(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound("inserted content row".to_string()))
    }

    async fn update_content(
        &self,
        access_token: &str,
        id: Uuid,
        patch: &ContentPatch,
    ) -> BackendResult<ContentItem> {
        let id_filter = format!("eq.{}", id);
        let request = self
            .authorize(self.http.patch(self.rest_url(CONTENT_TABLE)), Some(access_token))
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=representation")
            .json(patch);

        let rows: Vec<ContentItem> = self.send_json(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("content item {}", id)))
    }

    async fn delete_content(&self, access_token: &str, id: Uuid) -> BackendResult<()> {
        let id_filter = format!("eq.{}", id);
        let request = self
            .authorize(self.http.delete(self.rest_url(CONTENT_TABLE)), Some(access_token))
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=representation");

        let rows: Vec<serde_json::Value> = self.send_json(request).await?;
        if rows.is_empty() {
            return Err(BackendError::NotFound(format!("content item {}", id)));
        }
        Ok(())
    }

    async fn upload_object(
        &self,
        access_token: &str,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> BackendResult<String> {
        let size = bytes.len();
        let request = self
            .authorize(self.http.post(self.object_url(path)), Some(access_token))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);

        self.send(request).await?;
        tracing::info!(path = %path, size, "object uploaded");
        Ok(path.to_string())
    }

    async fn remove_object(&self, access_token: &str, path: &str) -> BackendResult<()> {
        let url = format!("{}/storage/v1/object/{}", self.base_url, MEDIA_BUCKET);
        let request = self
            .authorize(self.http.delete(url), Some(access_token))
            .json(&RemoveObjects { prefixes: [path] });

        self.send(request).await?;
        tracing::info!(path = %path, "object removed");
        Ok(())
    }

    fn public_object_url(&self, path: &str) -> String {
        super::public_object_url(&self.base_url, path)
    }
}

#[async_trait]
impl SettingsRepository for SupabaseClient {
    async fn list_settings(&self) -> BackendResult<Vec<SiteSetting>> {
        let request = self
            .authorize(self.http.get(self.rest_url(SETTINGS_TABLE)), None)
            .query(&[("select", "section,key,value")]);
        self.send_json(request).await
    }

    async fn upsert_settings(&self, access_token: &str, rows: &[SiteSetting]) -> BackendResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let body: Vec<SettingUpsert<'_>> = rows
            .iter()
            .map(|row| SettingUpsert {
                section: &row.section,
                key: &row.key,
                value: &row.value,
                updated_at: now,
            })
            .collect();

        let request = self
            .authorize(self.http.post(self.rest_url(SETTINGS_TABLE)), Some(access_token))
            .query(&[("on_conflict", "section,key")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body);

        self.send(request).await.map(|_| ())
    }
}

#[async_trait]
impl ProfileRepository for SupabaseClient {
    async fn first_profile(&self) -> BackendResult<Option<Profile>> {
        let request = self
            .authorize(self.http.get(self.rest_url(PROFILES_TABLE)), None)
            .query(&[("select", "*"), ("limit", "1")]);

        let rows: Vec<Profile> = self.send_json(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn get_profile(&self, access_token: &str, id: Uuid) -> BackendResult<Option<Profile>> {
        let id_filter = format!("eq.{}", id);
        let request = self
            .authorize(self.http.get(self.rest_url(PROFILES_TABLE)), Some(access_token))
            .query(&[("select", "*"), ("id", id_filter.as_str())]);

        let rows: Vec<Profile> = self.send_json(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_cv(
        &self,
        access_token: &str,
        id: Uuid,
        cv_data: &CvData,
        cv_url: Option<&str>,
    ) -> BackendResult<()> {
        let request = self
            .authorize(self.http.post(self.rest_url(PROFILES_TABLE)), Some(access_token))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&CvUpsert {
                id,
                cv_data,
                cv_url,
                updated_at: Utc::now(),
            });

        self.send(request).await.map(|_| ())
    }
}

#[async_trait]
impl Backend for SupabaseClient {
    async fn health_check(&self) -> BackendResult<Duration> {
        let start = Instant::now();
        let request = self
            .authorize(self.http.get(self.rest_url(SETTINGS_TABLE)), None)
            .query(&[("select", "section"), ("limit", "1")]);
        self.send(request).await?;
        Ok(start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SupabaseClient {
        SupabaseClient::new(&BackendConfig {
            url: "https://abc.supabase.co/".to_string(),
            anon_key: "anon".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_urls_are_built_from_trimmed_base() {
        let client = client();
        assert_eq!(
            client.rest_url(CONTENT_TABLE),
            "https://abc.supabase.co/rest/v1/portfolio_content"
        );
        assert_eq!(client.auth_url("user"), "https://abc.supabase.co/auth/v1/user");
        assert_eq!(
            client.object_url("/videos/1-a.mp4"),
            "https://abc.supabase.co/storage/v1/object/portfolio-media/videos/1-a.mp4"
        );
    }

    #[test]
    fn test_provider_error_message_precedence() {
        let err: ProviderError =
            serde_json::from_str(r#"{"msg":"Invalid login credentials","error":"invalid_grant"}"#)
                .unwrap();
        assert_eq!(err.into_message("fallback".into()), "Invalid login credentials");

        let empty = ProviderError::default();
        assert_eq!(empty.into_message("Bad Request".into()), "Bad Request");
    }

    #[test]
    fn test_auth_session_deserializes_token_response() {
        let body = r#"{
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "r",
            "user": { "id": "6b7a1a8e-3f0e-4a55-9f43-1d1e2c1f3b10", "email": "a@b.c", "role": "authenticated" }
        }"#;
        let session: AuthSession = serde_json::from_str(body).unwrap();
        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.user.email.as_deref(), Some("a@b.c"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_surfaces_http_error() {
        let client = SupabaseClient::new(&BackendConfig {
            url: "http://127.0.0.1:9".to_string(),
            anon_key: "anon".to_string(),
            timeout_secs: 1,
        })
        .unwrap();
        let err = client.list_active_content().await.unwrap_err();
        assert!(matches!(err, BackendError::Http(_)));
    }
}
