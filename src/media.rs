//! Media URL helpers: video-host id extraction, embeds and thumbnails.

use regex::Regex;

use crate::backend::models::{Asset, ContentItem, ContentType};

pub const VIDEO_PLACEHOLDER: &str = "https://via.placeholder.com/400x225?text=Video";
pub const IMAGE_PLACEHOLDER: &str = "https://via.placeholder.com/400x225?text=Image";

/// Ids used by public embeds when a URL cannot be parsed
pub const FALLBACK_YOUTUBE_ID: &str = "dQw4w9WgXcQ";
pub const FALLBACK_VIMEO_ID: &str = "76979871";

lazy_static::lazy_static! {
    static ref YOUTUBE_REGEX: Regex =
        Regex::new(r"^.*(youtu.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*").unwrap();
    static ref VIMEO_REGEX: Regex = Regex::new(r"vimeo\.com/(\d+)").unwrap();
}

pub fn is_youtube_url(url: &str) -> bool {
    url.contains("youtube") || url.contains("youtu.be")
}

pub fn is_vimeo_url(url: &str) -> bool {
    url.contains("vimeo")
}

/// The 11-character video id, if the URL carries one
pub fn youtube_id(url: &str) -> Option<&str> {
    YOUTUBE_REGEX
        .captures(url)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
        .filter(|id| id.len() == 11)
}

pub fn vimeo_id(url: &str) -> Option<&str> {
    VIMEO_REGEX
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn youtube_thumbnail(id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/mqdefault.jpg", id)
}

pub fn youtube_embed(url: &str) -> String {
    format!(
        "https://www.youtube.com/embed/{}",
        youtube_id(url).unwrap_or(FALLBACK_YOUTUBE_ID)
    )
}

pub fn vimeo_embed(url: &str) -> String {
    format!(
        "https://player.vimeo.com/video/{}",
        vimeo_id(url).unwrap_or(FALLBACK_VIMEO_ID)
    )
}

/// Thumbnail derived from a link alone (used when adding by URL)
pub fn derived_thumbnail(url: &str) -> Option<String> {
    if is_youtube_url(url) {
        youtube_id(url).map(youtube_thumbnail)
    } else {
        None
    }
}

/// Thumbnail for the admin grid. An explicit `thumbnail_url` wins, anything
/// unresolvable ends at a placeholder.
pub fn thumbnail_url(item: &ContentItem, public_url: impl Fn(&str) -> String) -> String {
    if let Some(thumb) = item.thumbnail_url.as_deref().filter(|t| !t.is_empty()) {
        return thumb.to_string();
    }

    match (item.content_type, item.asset()) {
        (ContentType::Video, Some(Asset::Url(url))) => {
            derived_thumbnail(url).unwrap_or_else(|| VIDEO_PLACEHOLDER.to_string())
        }
        (ContentType::Video, _) => VIDEO_PLACEHOLDER.to_string(),
        (ContentType::Image, Some(Asset::Storage(path))) => public_url(path),
        (ContentType::Image, Some(Asset::Url(url))) => url.to_string(),
        (ContentType::Image, None) => IMAGE_PLACEHOLDER.to_string(),
    }
}

/// Playable/viewable URL of an item, if it has one
pub fn asset_url(item: &ContentItem, public_url: impl Fn(&str) -> String) -> Option<String> {
    match item.asset()? {
        Asset::Url(url) => Some(url.to_string()),
        Asset::Storage(path) => Some(public_url(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::models::SourceType;
    use chrono::Utc;
    use uuid::Uuid;

    fn video(url: &str) -> ContentItem {
        ContentItem {
            id: Uuid::new_v4(),
            title: "clip".to_string(),
            description: None,
            content_type: ContentType::Video,
            source_type: SourceType::Url,
            url: Some(url.to_string()),
            storage_path: None,
            thumbnail_url: None,
            is_active: true,
            order_index: 0,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn public(path: &str) -> String {
        format!("https://cdn/{}", path)
    }

    #[test]
    fn test_youtube_id_forms() {
        assert_eq!(youtube_id("https://youtu.be/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
        assert_eq!(
            youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10s"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            youtube_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(youtube_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(youtube_id("https://example.com/video.mp4"), None);
    }

    #[test]
    fn test_youtu_be_thumbnail() {
        let item = video("https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(
            thumbnail_url(&item, public),
            "https://img.youtube.com/vi/dQw4w9WgXcQ/mqdefault.jpg"
        );
    }

    #[test]
    fn test_unparseable_video_falls_back_to_placeholder() {
        assert_eq!(
            thumbnail_url(&video("https://youtube.com/channel/xyz"), public),
            VIDEO_PLACEHOLDER
        );
        assert_eq!(thumbnail_url(&video("not a url"), public), VIDEO_PLACEHOLDER);
        assert_eq!(thumbnail_url(&video(""), public), VIDEO_PLACEHOLDER);
    }

    #[test]
    fn test_explicit_thumbnail_wins() {
        let mut item = video("https://youtu.be/dQw4w9WgXcQ");
        item.thumbnail_url = Some("https://img/custom.jpg".to_string());
        assert_eq!(thumbnail_url(&item, public), "https://img/custom.jpg");
    }

    #[test]
    fn test_image_thumbnails() {
        let mut item = video("https://img/a.jpg");
        item.content_type = ContentType::Image;
        assert_eq!(thumbnail_url(&item, public), "https://img/a.jpg");

        item.source_type = SourceType::Storage;
        item.storage_path = Some("images/a.jpg".to_string());
        assert_eq!(thumbnail_url(&item, public), "https://cdn/images/a.jpg");

        item.storage_path = None;
        assert_eq!(thumbnail_url(&item, public), IMAGE_PLACEHOLDER);
    }

    #[test]
    fn test_embeds_use_fallback_ids() {
        assert_eq!(
            youtube_embed("https://youtube.com/"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
        assert_eq!(
            vimeo_embed("https://vimeo.com/123456"),
            "https://player.vimeo.com/video/123456"
        );
        assert_eq!(
            vimeo_embed("https://vimeo.com/channels/staff"),
            "https://player.vimeo.com/video/76979871"
        );
    }
}
