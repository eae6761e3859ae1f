/**
 * Public site
 *
 * Loads settings, the active content feed and the public profile, then hands
 * them to the view model. A failed read is logged and treated as missing so
 * the page always renders.
 */
pub mod defaults;
pub mod render;
pub mod view;

use std::sync::Arc;

use crate::backend::models::ContentItem;
use crate::backend::Backend;
use crate::settings::SiteSettings;
pub use view::{SiteData, SiteView, Slide};

/// Active feed only; `None` when there is no backend or the read failed
pub async fn load_content(backend: Option<&Arc<dyn Backend>>) -> Option<Vec<ContentItem>> {
    let backend = backend?;
    match backend.list_active_content().await {
        Ok(items) => Some(items),
        Err(e) => {
            tracing::warn!("Failed to load portfolio content, using fallback: {}", e);
            None
        }
    }
}

/// Everything the public page needs. Reads run one after another.
pub async fn load_site_data(backend: Option<&Arc<dyn Backend>>) -> SiteData {
    let Some(client) = backend else {
        return SiteData::default();
    };

    let settings = match client.list_settings().await {
        Ok(rows) => Some(SiteSettings::to_nested(&rows)),
        Err(e) => {
            tracing::warn!("Failed to load site settings, using defaults: {}", e);
            None
        }
    };

    let content = load_content(backend).await;

    let profile = match client.first_profile().await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!("Failed to load CV data, using defaults: {}", e);
            None
        }
    };

    SiteData {
        settings,
        content,
        profile,
    }
}

/// Public storage URL resolver for the configured backend
pub fn public_url_fn(backend: Option<&Arc<dyn Backend>>) -> impl Fn(&str) -> String + '_ {
    move |path: &str| match backend {
        Some(b) => b.public_object_url(path),
        None => path.to_string(),
    }
}
