//! View model of the public page.
//!
//! `SiteView::build` is a pure projection of whatever the backend returned.
//! Anything missing, empty, or not fetched at all is filled from
//! [`defaults`](super::defaults), so the page is never blank.

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::backend::models::{Asset, ContentItem, ContentType, Experience, Profile};
use crate::media;
use crate::settings::SiteSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Media {
    /// Third-party player iframe
    Embed { src: String },
    Video { src: String, poster: Option<String> },
    Image { src: String, alt: String },
}

/// One carousel item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    pub description: String,
    pub media: Option<Media>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroView {
    pub headline: String,
    pub subtitle: String,
    pub cta_primary: String,
    pub cta_secondary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutView {
    pub lead_text: String,
    pub bio_text: String,
    pub profile_image: String,
    /// Shown if `profile_image` fails to load
    pub profile_image_fallback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatView {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub label: String,
    pub href: String,
    pub external: bool,
}

/// Contact headline split around the highlighted word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactView {
    pub headline_before: String,
    pub highlight: Option<String>,
    pub headline_after: String,
    pub subtext: String,
}

impl ContactView {
    fn new(headline: &str, subtext: &str) -> Self {
        match headline.split_once(defaults::CONTACT_HIGHLIGHT) {
            Some((before, after)) => Self {
                headline_before: before.to_string(),
                highlight: Some(defaults::CONTACT_HIGHLIGHT.to_string()),
                headline_after: after.to_string(),
                subtext: subtext.to_string(),
            },
            None => Self {
                headline_before: headline.to_string(),
                highlight: None,
                headline_after: String::new(),
                subtext: subtext.to_string(),
            },
        }
    }

    pub fn headline(&self) -> String {
        format!(
            "{}{}{}",
            self.headline_before,
            self.highlight.as_deref().unwrap_or_default(),
            self.headline_after
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteView {
    pub page_title: String,
    pub hero: HeroView,
    pub about: AboutView,
    pub stats: Vec<StatView>,
    pub contact: ContactView,
    pub social_links: Vec<SocialLink>,
    pub footer_copyright: String,
    pub timeline: Vec<Experience>,
    pub cv_download_url: Option<String>,
    pub videos: Vec<Slide>,
    pub images: Vec<Slide>,
}

/// What the loaders managed to fetch; `None` means missing or failed
#[derive(Debug, Clone, Default)]
pub struct SiteData {
    pub settings: Option<SiteSettings>,
    pub content: Option<Vec<ContentItem>>,
    pub profile: Option<Profile>,
}

fn pick(settings: Option<&SiteSettings>, section: &str, key: &str, default: &str) -> String {
    settings
        .and_then(|s| s.get(section, key))
        .unwrap_or(default)
        .to_string()
}

fn social_links(settings: Option<&SiteSettings>) -> Vec<SocialLink> {
    // A stored social section is authoritative: unset networks are hidden.
    let stored = settings.filter(|s| s.has_section("social"));

    defaults::SOCIAL
        .iter()
        .filter_map(|(key, label, default_href)| {
            let href = match stored {
                Some(s) => s.get("social", key)?.to_string(),
                None => default_href.to_string(),
            };
            Some(SocialLink {
                label: label.to_string(),
                external: *key != "email",
                href,
            })
        })
        .collect()
}

fn video_slide(item: &ContentItem, public_url: &dyn Fn(&str) -> String) -> Slide {
    let poster = item.thumbnail_url.clone().filter(|t| !t.is_empty());
    let media = match item.asset() {
        Some(Asset::Url(url)) if media::is_youtube_url(url) => Some(Media::Embed {
            src: media::youtube_embed(url),
        }),
        Some(Asset::Url(url)) if media::is_vimeo_url(url) => Some(Media::Embed {
            src: media::vimeo_embed(url),
        }),
        Some(Asset::Url(url)) => Some(Media::Video {
            src: url.to_string(),
            poster,
        }),
        Some(Asset::Storage(path)) => Some(Media::Video {
            src: public_url(path),
            poster,
        }),
        None => None,
    };

    Slide {
        title: item.title.clone(),
        description: item.description.clone().unwrap_or_default(),
        media,
    }
}

fn image_slide(item: &ContentItem, public_url: &dyn Fn(&str) -> String) -> Slide {
    Slide {
        title: item.title.clone(),
        description: item.description.clone().unwrap_or_default(),
        media: media::asset_url(item, public_url).map(|src| Media::Image {
            src,
            alt: item.title.clone(),
        }),
    }
}

fn placeholder(title: &str, description: &str, media: Option<Media>) -> Vec<Slide> {
    vec![Slide {
        title: title.to_string(),
        description: description.to_string(),
        media,
    }]
}

/// Split the active feed into the two carousel tracks. `None` (feed not
/// loaded) yields the sample slides; an empty track yields its placeholder.
pub fn slides(
    content: Option<&[ContentItem]>,
    public_url: &dyn Fn(&str) -> String,
) -> (Vec<Slide>, Vec<Slide>) {
    let Some(content) = content else {
        return (
            placeholder(
                defaults::SAMPLE_VIDEO_TITLE,
                defaults::SAMPLE_VIDEO_DESCRIPTION,
                Some(Media::Embed {
                    src: defaults::SAMPLE_VIDEO_URL.to_string(),
                }),
            ),
            placeholder(
                defaults::SAMPLE_IMAGE_TITLE,
                defaults::SAMPLE_IMAGE_DESCRIPTION,
                Some(Media::Image {
                    src: defaults::SAMPLE_IMAGE_URL.to_string(),
                    alt: defaults::SAMPLE_IMAGE_TITLE.to_string(),
                }),
            ),
        );
    };

    let mut videos: Vec<Slide> = content
        .iter()
        .filter(|c| c.content_type == ContentType::Video)
        .map(|c| video_slide(c, public_url))
        .collect();
    let mut images: Vec<Slide> = content
        .iter()
        .filter(|c| c.content_type == ContentType::Image)
        .map(|c| image_slide(c, public_url))
        .collect();

    if videos.is_empty() {
        videos = placeholder(
            defaults::EMPTY_VIDEOS_TITLE,
            defaults::EMPTY_VIDEOS_DESCRIPTION,
            None,
        );
    }
    if images.is_empty() {
        images = placeholder(
            defaults::EMPTY_IMAGES_TITLE,
            defaults::EMPTY_IMAGES_DESCRIPTION,
            Some(Media::Image {
                src: defaults::EMPTY_IMAGES_URL.to_string(),
                alt: "Placeholder".to_string(),
            }),
        );
    }

    (videos, images)
}

impl SiteView {
    pub fn build(data: &SiteData, public_url: &dyn Fn(&str) -> String) -> Self {
        let s = data.settings.as_ref();

        let hero = HeroView {
            headline: pick(s, "hero", "headline", defaults::HERO_HEADLINE),
            subtitle: pick(s, "hero", "subtitle", defaults::HERO_SUBTITLE),
            cta_primary: pick(s, "hero", "cta_primary", defaults::HERO_CTA_PRIMARY),
            cta_secondary: pick(s, "hero", "cta_secondary", defaults::HERO_CTA_SECONDARY),
        };

        let about = AboutView {
            lead_text: pick(s, "about", "lead_text", defaults::ABOUT_LEAD),
            bio_text: pick(s, "about", "bio_text", defaults::ABOUT_BIO),
            profile_image: pick(s, "about", "profile_image", defaults::PROFILE_IMAGE),
            profile_image_fallback: defaults::PROFILE_IMAGE.to_string(),
        };

        let stats = defaults::STATS
            .iter()
            .map(|(value_key, value, label_key, label)| StatView {
                value: pick(s, "stats", value_key, value),
                label: pick(s, "stats", label_key, label),
            })
            .collect();

        let contact = ContactView::new(
            &pick(s, "contact", "headline", defaults::CONTACT_HEADLINE),
            &pick(s, "contact", "subtext", defaults::CONTACT_SUBTEXT),
        );

        let cv = data.profile.as_ref().and_then(|p| p.cv_data.as_ref());
        let timeline = match cv {
            Some(cv) => cv.experiences.clone(),
            None => defaults::timeline(),
        };
        let cv_download_url = data
            .profile
            .as_ref()
            .and_then(|p| p.cv_url.clone())
            .filter(|u| !u.trim().is_empty());

        let (videos, images) = slides(data.content.as_deref(), public_url);

        Self {
            page_title: s
                .and_then(|s| s.get("hero", "headline"))
                .unwrap_or(defaults::PAGE_TITLE)
                .to_string(),
            hero,
            about,
            stats,
            contact,
            social_links: social_links(s),
            footer_copyright: pick(s, "footer", "copyright", defaults::FOOTER_COPYRIGHT),
            timeline,
            cv_download_url,
            videos,
            images,
        }
    }
}
