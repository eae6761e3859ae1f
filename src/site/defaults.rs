//! Hardcoded copy used whenever the backend has nothing (or fails).

use crate::backend::models::Experience;

pub const PAGE_TITLE: &str = "Creative Portfolio";

pub const HERO_HEADLINE: &str = "CREATIVE CONTENT";
pub const HERO_SUBTITLE: &str = "Social Media Strategist & Visual Storyteller";
pub const HERO_CTA_PRIMARY: &str = "View My Work";
pub const HERO_CTA_SECONDARY: &str = "Get In Touch";

pub const ABOUT_LEAD: &str = "I'm a passionate content creator specializing in social media strategy, video production, and brand storytelling.";
pub const ABOUT_BIO: &str = "With over 5 years of experience in digital marketing, I've helped brands grow their online presence through engaging visual content.";
pub const PROFILE_IMAGE: &str =
    "https://images.unsplash.com/photo-1494790108377-be9c29b29330?w=600";

/// (value key, default value, label key, default label) per stat, in display order
pub const STATS: [(&str, &str, &str, &str); 3] = [
    ("campaigns", "50+", "campaigns_label", "Brand Campaigns"),
    ("views", "10M+", "views_label", "Total Views"),
    ("experience", "5", "experience_label", "Years Experience"),
];

pub const CONTACT_HEADLINE: &str = "Let's Create Something Amazing Together";
pub const CONTACT_SUBTEXT: &str =
    "Open for collaborations, freelance projects, and full-time opportunities.";
pub const CONTACT_HIGHLIGHT: &str = "Amazing";

/// (key, label, default href)
pub const SOCIAL: [(&str, &str, &str); 4] = [
    ("instagram", "Instagram", "#"),
    ("tiktok", "TikTok", "#"),
    ("linkedin", "LinkedIn", "#"),
    ("email", "Email", "mailto:hello@example.com"),
];

pub const FOOTER_COPYRIGHT: &str = "© Creative Portfolio. All rights reserved.";

pub const SAMPLE_VIDEO_TITLE: &str = "Sample Video";
pub const SAMPLE_VIDEO_DESCRIPTION: &str = "Add your videos in admin";
pub const SAMPLE_VIDEO_URL: &str = "https://www.youtube.com/embed/dQw4w9WgXcQ";

pub const SAMPLE_IMAGE_TITLE: &str = "Sample Image";
pub const SAMPLE_IMAGE_DESCRIPTION: &str = "Add your images in admin";
pub const SAMPLE_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1469334031218-e382a71b716b?w=800";

pub const EMPTY_VIDEOS_TITLE: &str = "No videos yet";
pub const EMPTY_VIDEOS_DESCRIPTION: &str = "Check back soon!";

pub const EMPTY_IMAGES_TITLE: &str = "Summer Collection";
pub const EMPTY_IMAGES_DESCRIPTION: &str = "Coming soon";
pub const EMPTY_IMAGES_URL: &str =
    "https://images.unsplash.com/photo-1515886657613-9f3515b0c78f?w=600";

pub fn timeline() -> Vec<Experience> {
    vec![Experience {
        year: "2022 - Present".to_string(),
        title: "Senior Content Creator".to_string(),
        company: "Creative Agency".to_string(),
        description: "Add your experience in the admin panel.".to_string(),
    }]
}
