//! In-memory backend used by tests. Records every operation and can be told
//! to fail specific ones.

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

use super::models::{
    AuthSession, AuthUser, ContentItem, ContentPatch, ContentType, CvData, NewContentItem, Profile,
    SiteSetting, SourceType,
};
use super::{
    AuthService, Backend, BackendError, BackendResult, ContentRepository, ProfileRepository,
    SettingsRepository,
};

pub const BASE_URL: &str = "https://test.supabase.co";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    SignIn,
    GetUser,
    SignOut,
    ListActive,
    ListAll,
    Insert,
    Update,
    Delete,
    Upload,
    Remove,
    ListSettings,
    UpsertSettings,
    FirstProfile,
    GetProfile,
    UpsertCv,
}

#[derive(Default)]
struct State {
    users: HashMap<String, (String, AuthUser)>,
    tokens: HashMap<String, Uuid>,
    content: Vec<ContentItem>,
    settings: Vec<SiteSetting>,
    profiles: HashMap<Uuid, Profile>,
    objects: HashMap<String, Bytes>,
    calls: Vec<Op>,
    failing: HashSet<Op>,
}

#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

fn injected() -> BackendError {
    BackendError::Status {
        status: 500,
        message: "injected failure".to_string(),
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Record the call and fail it if requested
    fn enter(&self, op: Op) -> BackendResult<MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.calls.push(op);
        if state.failing.contains(&op) {
            return Err(injected());
        }
        Ok(state)
    }

    fn caller(state: &State, access_token: &str) -> BackendResult<Uuid> {
        state
            .tokens
            .get(access_token)
            .copied()
            .ok_or(BackendError::InvalidSession)
    }

    pub fn add_user(&self, email: &str, password: &str, is_admin: bool) -> Uuid {
        let id = Uuid::new_v4();
        let mut state = self.lock();
        state.users.insert(
            email.to_lowercase(),
            (
                password.to_string(),
                AuthUser {
                    id,
                    email: Some(email.to_string()),
                },
            ),
        );
        state.profiles.insert(
            id,
            Profile {
                id,
                is_admin,
                cv_data: None,
                cv_url: None,
            },
        );
        id
    }

    /// Issue a token for an existing user without going through `sign_in`
    pub fn token_for(&self, user_id: Uuid) -> String {
        let token = format!("token-{}", Uuid::new_v4());
        self.lock().tokens.insert(token.clone(), user_id);
        token
    }

    pub fn set_profile(&self, profile: Profile) {
        self.lock().profiles.insert(profile.id, profile);
    }

    pub fn profile(&self, id: Uuid) -> Option<Profile> {
        self.lock().profiles.get(&id).cloned()
    }

    pub fn seed_item(
        &self,
        title: &str,
        content_type: ContentType,
        source_type: SourceType,
        location: &str,
        order_index: i32,
    ) -> ContentItem {
        let (url, storage_path) = match source_type {
            SourceType::Url => (Some(location.to_string()), None),
            SourceType::Storage => (None, Some(location.to_string())),
        };
        let item = ContentItem {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            content_type,
            source_type,
            url,
            storage_path,
            thumbnail_url: None,
            is_active: true,
            order_index,
            created_at: Utc::now(),
            updated_at: None,
        };
        let mut state = self.lock();
        if source_type == SourceType::Storage {
            state
                .objects
                .insert(location.to_string(), Bytes::from_static(b"stored"));
        }
        state.content.push(item.clone());
        item
    }

    pub fn seed_setting(&self, section: &str, key: &str, value: &str) {
        self.lock().settings.push(SiteSetting::new(section, key, value));
    }

    pub fn fail(&self, op: Op) {
        self.lock().failing.insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.lock().failing.remove(&op);
    }

    pub fn calls(&self) -> Vec<Op> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn content(&self) -> Vec<ContentItem> {
        self.lock().content.clone()
    }

    pub fn settings(&self) -> Vec<SiteSetting> {
        self.lock().settings.clone()
    }

    pub fn object_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.lock().objects.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn is_signed_in(&self, access_token: &str) -> bool {
        self.lock().tokens.contains_key(access_token)
    }
}

fn sorted(mut items: Vec<ContentItem>) -> Vec<ContentItem> {
    items.sort_by_key(|item| item.order_index);
    items
}

#[async_trait]
impl AuthService for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        let user = {
            let state = self.enter(Op::SignIn)?;
            match state.users.get(&email.to_lowercase()) {
                Some((expected, user)) if expected == password => user.clone(),
                _ => return Err(BackendError::InvalidCredentials),
            }
        };
        let access_token = self.token_for(user.id);
        Ok(AuthSession {
            access_token,
            refresh_token: Some("refresh".to_string()),
            user,
        })
    }

    async fn get_user(&self, access_token: &str) -> BackendResult<AuthUser> {
        let state = self.enter(Op::GetUser)?;
        let id = Self::caller(&state, access_token)?;
        state
            .users
            .values()
            .find(|(_, user)| user.id == id)
            .map(|(_, user)| user.clone())
            .ok_or(BackendError::InvalidSession)
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let mut state = self.enter(Op::SignOut)?;
        state.tokens.remove(access_token);
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for MemoryBackend {
    async fn list_active_content(&self) -> BackendResult<Vec<ContentItem>> {
        let state = self.enter(Op::ListActive)?;
        Ok(sorted(
            state.content.iter().filter(|c| c.is_active).cloned().collect(),
        ))
    }

    async fn list_all_content(&self, access_token: &str) -> BackendResult<Vec<ContentItem>> {
        let state = self.enter(Op::ListAll)?;
        Self::caller(&state, access_token)?;
        Ok(sorted(state.content.clone()))
    }

    async fn insert_content(
        &self,
        access_token: &str,
        item: &NewContentItem,
    ) -> BackendResult<ContentItem> {
        let mut state = self.enter(Op::Insert)?;
        Self::caller(&state, access_token)?;
        let row = ContentItem {
            id: Uuid::new_v4(),
            title: item.title.clone(),
            description: item.description.clone(),
            content_type: item.content_type,
            source_type: item.source_type,
            url: item.url.clone(),
            storage_path: item.storage_path.clone(),
            thumbnail_url: item.thumbnail_url.clone(),
            is_active: item.is_active,
            order_index: item.order_index,
            created_at: Utc::now(),
            updated_at: None,
        };
        state.content.push(row.clone());
        Ok(row)
    }

    async fn update_content(
        &self,
        access_token: &str,
        id: Uuid,
        patch: &ContentPatch,
    ) -> BackendResult<ContentItem> {
        let mut state = self.enter(Op::Update)?;
        Self::caller(&state, access_token)?;
        let row = state
            .content
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("content item {}", id)))?;
        if let Some(title) = &patch.title {
            row.title = title.clone();
        }
        if let Some(description) = &patch.description {
            row.description = Some(description.clone());
        }
        if let Some(order_index) = patch.order_index {
            row.order_index = order_index;
        }
        if let Some(is_active) = patch.is_active {
            row.is_active = is_active;
        }
        row.updated_at = patch.updated_at.or(row.updated_at);
        Ok(row.clone())
    }

    async fn delete_content(&self, access_token: &str, id: Uuid) -> BackendResult<()> {
        let mut state = self.enter(Op::Delete)?;
        Self::caller(&state, access_token)?;
        let before = state.content.len();
        state.content.retain(|c| c.id != id);
        if state.content.len() == before {
            return Err(BackendError::NotFound(format!("content item {}", id)));
        }
        Ok(())
    }

    async fn upload_object(
        &self,
        access_token: &str,
        path: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> BackendResult<String> {
        let mut state = self.enter(Op::Upload)?;
        Self::caller(&state, access_token)?;
        state.objects.insert(path.to_string(), bytes);
        Ok(path.to_string())
    }

    async fn remove_object(&self, access_token: &str, path: &str) -> BackendResult<()> {
        let mut state = self.enter(Op::Remove)?;
        Self::caller(&state, access_token)?;
        state.objects.remove(path);
        Ok(())
    }

    fn public_object_url(&self, path: &str) -> String {
        super::public_object_url(BASE_URL, path)
    }
}

#[async_trait]
impl SettingsRepository for MemoryBackend {
    async fn list_settings(&self) -> BackendResult<Vec<SiteSetting>> {
        let state = self.enter(Op::ListSettings)?;
        Ok(state.settings.clone())
    }

    async fn upsert_settings(&self, access_token: &str, rows: &[SiteSetting]) -> BackendResult<()> {
        let mut state = self.enter(Op::UpsertSettings)?;
        Self::caller(&state, access_token)?;
        for row in rows {
            let existing = state
                .settings
                .iter()
                .position(|s| s.section == row.section && s.key == row.key);
            match existing {
                Some(i) => state.settings[i].value = row.value.clone(),
                None => state.settings.push(row.clone()),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for MemoryBackend {
    async fn first_profile(&self) -> BackendResult<Option<Profile>> {
        let state = self.enter(Op::FirstProfile)?;
        Ok(state.profiles.values().next().cloned())
    }

    async fn get_profile(&self, access_token: &str, id: Uuid) -> BackendResult<Option<Profile>> {
        let state = self.enter(Op::GetProfile)?;
        Self::caller(&state, access_token)?;
        Ok(state.profiles.get(&id).cloned())
    }

    async fn upsert_cv(
        &self,
        access_token: &str,
        id: Uuid,
        cv_data: &CvData,
        cv_url: Option<&str>,
    ) -> BackendResult<()> {
        let mut state = self.enter(Op::UpsertCv)?;
        Self::caller(&state, access_token)?;
        let profile = state.profiles.entry(id).or_insert(Profile {
            id,
            is_admin: false,
            cv_data: None,
            cv_url: None,
        });
        profile.cv_data = Some(cv_data.clone());
        profile.cv_url = cv_url.map(str::to_string);
        Ok(())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn health_check(&self) -> BackendResult<Duration> {
        self.enter(Op::ListSettings)?;
        Ok(Duration::from_millis(1))
    }
}
