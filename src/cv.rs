//! CV editor form <-> `profiles.cv_data` document.

use serde::{Deserialize, Serialize};

use crate::backend::models::{CvData, Experience, Profile, SkillCategory};

/// Skill row as edited: a category and a comma-separated list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRow {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub items_text: String,
}

impl From<&SkillCategory> for SkillRow {
    fn from(skill: &SkillCategory) -> Self {
        Self {
            category: skill.category.clone(),
            items_text: skill.items.join(", "),
        }
    }
}

/// CV editor payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvForm {
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub skills: Vec<SkillRow>,
    #[serde(default)]
    pub cv_url: String,
}

fn template_skills() -> Vec<SkillRow> {
    vec![
        SkillRow {
            category: "Content Creation".to_string(),
            items_text: "Video Editing, Copywriting, Photography, Motion Graphics".to_string(),
        },
        SkillRow {
            category: "Platforms".to_string(),
            items_text: "Instagram, TikTok, YouTube, LinkedIn".to_string(),
        },
    ]
}

impl CvForm {
    /// Form for a stored profile. Empty lists are replaced by one blank
    /// experience row and the default skill categories so the editor always
    /// has something to fill in.
    pub fn from_profile(profile: Option<&Profile>) -> Self {
        let cv = profile.and_then(|p| p.cv_data.as_ref());

        let experiences = match cv {
            Some(cv) if !cv.experiences.is_empty() => cv.experiences.clone(),
            _ => vec![Experience::default()],
        };

        let skills = match cv {
            Some(cv) if !cv.skills.is_empty() => cv.skills.iter().map(SkillRow::from).collect(),
            _ => template_skills(),
        };

        Self {
            experiences,
            skills,
            cv_url: profile
                .and_then(|p| p.cv_url.clone())
                .unwrap_or_default(),
        }
    }

    /// Document to store. Experiences without a title and categories without
    /// a name are dropped; skills are trimmed and blanks removed.
    pub fn to_cv_data(&self) -> CvData {
        let experiences = self
            .experiences
            .iter()
            .filter(|e| !e.title.trim().is_empty())
            .cloned()
            .collect();

        let skills = self
            .skills
            .iter()
            .filter(|s| !s.category.trim().is_empty())
            .map(|s| SkillCategory {
                category: s.category.trim().to_string(),
                items: s
                    .items_text
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            })
            .collect();

        CvData {
            experiences,
            skills,
        }
    }

    pub fn cv_url(&self) -> Option<&str> {
        Some(self.cv_url.trim()).filter(|u| !u.is_empty())
    }
}
