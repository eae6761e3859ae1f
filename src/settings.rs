//! Site settings: flat `(section, key, value)` rows and the nested
//! section → key → value view used by the public page and the admin form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::backend::models::SiteSetting;

/// Nested settings, grouped by section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteSettings(BTreeMap<String, BTreeMap<String, String>>);

impl SiteSettings {
    /// Group rows by section. Duplicate (section, key) pairs keep the last value.
    pub fn to_nested(rows: &[SiteSetting]) -> Self {
        let mut nested: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for row in rows {
            nested
                .entry(row.section.clone())
                .or_default()
                .insert(row.key.clone(), row.value.clone());
        }
        Self(nested)
    }

    /// Flatten back to rows, sorted by section then key
    pub fn to_rows(&self) -> Vec<SiteSetting> {
        self.0
            .iter()
            .flat_map(|(section, keys)| {
                keys.iter()
                    .map(move |(key, value)| SiteSetting::new(section, key, value))
            })
            .collect()
    }

    /// Value for `section.key`, treating an empty string as unset
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.0
            .get(section)
            .and_then(|keys| keys.get(key))
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.0.contains_key(section)
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.0
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }
}

/// One editable homepage field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingField {
    pub section: &'static str,
    pub key: &'static str,
    pub label: &'static str,
}

const fn field(section: &'static str, key: &'static str, label: &'static str) -> SettingField {
    SettingField {
        section,
        key,
        label,
    }
}

/// Fields exposed by the homepage editor, in form order
pub const EDITABLE_FIELDS: &[SettingField] = &[
    field("hero", "headline", "Headline"),
    field("hero", "subtitle", "Subtitle"),
    field("hero", "cta_primary", "Primary button"),
    field("hero", "cta_secondary", "Secondary button"),
    field("about", "profile_image", "Profile image URL"),
    field("about", "lead_text", "Lead text"),
    field("about", "bio_text", "Bio"),
    field("stats", "campaigns", "Stat 1"),
    field("stats", "campaigns_label", "Stat 1 label"),
    field("stats", "views", "Stat 2"),
    field("stats", "views_label", "Stat 2 label"),
    field("stats", "experience", "Stat 3"),
    field("stats", "experience_label", "Stat 3 label"),
    field("social", "instagram", "Instagram URL"),
    field("social", "tiktok", "TikTok URL"),
    field("social", "linkedin", "LinkedIn URL"),
    field("social", "email", "Email link"),
    field("contact", "headline", "Contact headline"),
    field("contact", "subtext", "Contact subtext"),
    field("footer", "copyright", "Copyright"),
];

pub fn is_editable(section: &str, key: &str) -> bool {
    EDITABLE_FIELDS
        .iter()
        .any(|f| f.section == section && f.key == key)
}

/// A field of the homepage editor with its current value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingFieldValue {
    pub section: String,
    pub key: String,
    pub label: String,
    pub value: String,
}

/// Editor form: every editable field, blank when the backend has no value
pub fn form_fields(settings: &SiteSettings) -> Vec<SettingFieldValue> {
    EDITABLE_FIELDS
        .iter()
        .map(|f| SettingFieldValue {
            section: f.section.to_string(),
            key: f.key.to_string(),
            label: f.label.to_string(),
            value: settings.get(f.section, f.key).unwrap_or_default().to_string(),
        })
        .collect()
}

/// Rows to upsert for a submitted form. Unknown (section, key) pairs are rejected.
pub fn rows_for_save(submitted: &SiteSettings) -> Result<Vec<SiteSetting>, String> {
    let rows = submitted.to_rows();
    if let Some(bad) = rows.iter().find(|r| !is_editable(&r.section, &r.key)) {
        return Err(format!(
            "Unknown setting '{}.{}'",
            bad.section, bad.key
        ));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row_round_trip() {
        let rows = vec![SiteSetting::new("hero", "headline", "A")];
        let nested = SiteSettings::to_nested(&rows);
        assert_eq!(nested.get("hero", "headline"), Some("A"));
        assert_eq!(nested.to_rows(), rows);
    }

    #[test]
    fn test_duplicate_pairs_keep_last_value() {
        let rows = vec![
            SiteSetting::new("hero", "headline", "first"),
            SiteSetting::new("about", "bio_text", "bio"),
            SiteSetting::new("hero", "headline", "second"),
        ];
        let nested = SiteSettings::to_nested(&rows);
        assert_eq!(nested.get("hero", "headline"), Some("second"));
        assert_eq!(nested.to_rows().len(), 2);
    }

    #[test]
    fn test_empty_value_reads_as_unset() {
        let nested = SiteSettings::to_nested(&[SiteSetting::new("hero", "subtitle", "  ")]);
        assert_eq!(nested.get("hero", "subtitle"), None);
        assert!(nested.has_section("hero"));
    }

    #[test]
    fn test_serializes_as_nested_object() {
        let mut settings = SiteSettings::default();
        settings.set("footer", "copyright", "© 2024");
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json, serde_json::json!({ "footer": { "copyright": "© 2024" } }));
    }

    #[test]
    fn test_form_fields_cover_catalogue() {
        let mut settings = SiteSettings::default();
        settings.set("stats", "views", "10M+");
        let fields = form_fields(&settings);
        assert_eq!(fields.len(), EDITABLE_FIELDS.len());
        let views = fields.iter().find(|f| f.key == "views").unwrap();
        assert_eq!(views.value, "10M+");
        assert!(fields.iter().filter(|f| f.key != "views").all(|f| f.value.is_empty()));
    }

    #[test]
    fn test_rows_for_save_rejects_unknown_keys() {
        let mut settings = SiteSettings::default();
        settings.set("hero", "headline", "Hi");
        assert_eq!(rows_for_save(&settings).unwrap().len(), 1);

        settings.set("hero", "tagline", "nope");
        let err = rows_for_save(&settings).unwrap_err();
        assert!(err.contains("hero.tagline"));
    }
}
