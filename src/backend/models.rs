//! Backend Models - rows of the hosted tables (`portfolio_content`, `site_settings`, `profiles`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of media a content item carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Image,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Image => "image",
        }
    }

    /// Upload size cap in bytes
    pub fn max_upload_bytes(&self) -> usize {
        match self {
            ContentType::Video => 50 * 1024 * 1024,
            ContentType::Image => 10 * 1024 * 1024,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" => Ok(ContentType::Video),
            "image" => Ok(ContentType::Image),
            other => Err(format!("Unknown content type '{}'", other)),
        }
    }
}

/// Where the asset of a content item lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Url,
    Storage,
}

/// Resolved location of a content item's asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset<'a> {
    Url(&'a str),
    Storage(&'a str),
}

/// Portfolio content row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content_type: ContentType,
    pub source_type: SourceType,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContentItem {
    /// The field that is meaningful for `source_type`. The other one is ignored
    /// even when the row happens to carry it.
    pub fn asset(&self) -> Option<Asset<'_>> {
        match self.source_type {
            SourceType::Url => self
                .url
                .as_deref()
                .filter(|u| !u.is_empty())
                .map(Asset::Url),
            SourceType::Storage => self
                .storage_path
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(Asset::Storage),
        }
    }
}

/// New content row for insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContentItem {
    pub title: String,
    pub description: Option<String>,
    pub content_type: ContentType,
    pub source_type: SourceType,
    pub url: Option<String>,
    pub storage_path: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_active: bool,
    pub order_index: i32,
}

/// Partial update of a content row; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContentPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.order_index.is_none()
            && self.is_active.is_none()
    }
}

/// Site setting row, unique on (section, key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSetting {
    pub section: String,
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl SiteSetting {
    pub fn new(section: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One entry of the work-experience list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub description: String,
}

/// Named group of skills
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub items: Vec<String>,
}

/// Nested CV document stored in `profiles.cv_data`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvData {
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub skills: Vec<SkillCategory>,
}

/// Profile row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub cv_data: Option<CvData>,
    #[serde(default)]
    pub cv_url: Option<String>,
}

/// Authenticated identity as reported by the auth service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens issued by the auth service after a password sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}
