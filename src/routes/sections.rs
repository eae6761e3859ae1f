/**
 * Dashboard Section Routes
 * Switching section always reloads that section's data
 */
use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::models::ContentType;
use crate::cv::CvForm;
use crate::error::{AppError, AppResult};
use crate::routes::auth::require_admin;
use crate::routes::content::{load_cards, ContentCard};
use crate::routes::extract::PathParam;
use crate::settings::{form_fields, SettingFieldValue, SiteSettings};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Content,
    Upload,
    Profile,
    Cv,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Section::Content => "Content Management",
            Section::Upload => "Add New Content",
            Section::Profile => "Edit Homepage",
            Section::Cv => "Edit CV & Experience",
        }
    }
}

impl std::str::FromStr for Section {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" => Ok(Section::Content),
            "upload" => Ok(Section::Upload),
            "profile" => Ok(Section::Profile),
            "cv" => Ok(Section::Cv),
            other => Err(AppError::NotFound(format!("Section '{}'", other))),
        }
    }
}

/// Upload limits shown by the add-content form
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadLimits {
    pub content_type: ContentType,
    pub max_bytes: usize,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum SectionData {
    Content { items: Vec<ContentCard> },
    Upload { limits: Vec<UploadLimits> },
    Profile { fields: Vec<SettingFieldValue> },
    Cv(CvForm),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResponse {
    pub section: Section,
    pub title: String,
    #[serde(flatten)]
    pub data: SectionData,
}

/// GET /api/admin/sections/{section}
pub async fn show_section(
    State(state): State<AppState>,
    headers: HeaderMap,
    PathParam(name): PathParam<String>,
) -> AppResult<Json<SectionResponse>> {
    let section: Section = name.parse()?;
    let admin = require_admin(&state, &headers).await?;
    let backend = state.backend()?;

    let data = match section {
        Section::Content => SectionData::Content {
            items: load_cards(backend.as_ref(), &admin).await?,
        },
        Section::Upload => SectionData::Upload {
            limits: [ContentType::Video, ContentType::Image]
                .into_iter()
                .map(|content_type| UploadLimits {
                    content_type,
                    max_bytes: content_type.max_upload_bytes(),
                })
                .collect(),
        },
        Section::Profile => {
            let rows = backend
                .list_settings()
                .await
                .map_err(AppError::fetch("settings"))?;
            SectionData::Profile {
                fields: form_fields(&SiteSettings::to_nested(&rows)),
            }
        }
        Section::Cv => {
            let profile = backend
                .get_profile(&admin.token, admin.user.id)
                .await
                .map_err(AppError::fetch("CV"))?;
            SectionData::Cv(CvForm::from_profile(profile.as_ref()))
        }
    };

    tracing::debug!("Loaded admin section {:?}", section);
    Ok(Json(SectionResponse {
        section,
        title: section.title().to_string(),
        data,
    }))
}
