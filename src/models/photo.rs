// src/models/photo.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Gallery categories as (value, label)
pub const PHOTO_CATEGORIES: [(&str, &str); 5] = [
    ("tournament", "Tournament"),
    ("practice", "Practice Sessions"),
    ("venue", "Venue"),
    ("awards", "Awards Ceremony"),
    ("team", "Team Photos"),
];

pub const DEFAULT_CATEGORY: &str = "tournament";

/// File extensions accepted for upload
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

pub fn is_known_category(value: &str) -> bool {
    PHOTO_CATEGORIES.iter().any(|(v, _)| *v == value)
}

/// Tags derived from a title: its lower-cased words
pub fn tags_from_title(title: &str) -> Vec<String> {
    title.split_whitespace().map(|w| w.to_lowercase()).collect()
}

/// Gallery photo record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Upload day, YYYY-MM-DD
    pub date: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// Storage key, used to delete the underlying object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pathname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Photo {
    /// Same predicate the website applies: category match and a
    /// case-insensitive search over title, description and tags.
    pub fn matches(&self, category: &str, search: &str) -> bool {
        let matches_category = category == "all" || self.category == category;
        if !matches_category {
            return false;
        }

        let needle = search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
    }
}

/// Query parameters for GET /api/gallery/photos
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoQuery {
    /// Category value or "all"
    pub category: Option<String>,
    /// Free-text search
    pub q: Option<String>,
}

/// Metadata accompanying an upload
#[derive(Debug, Clone, Default, Validate)]
pub struct NewPhoto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 1000, message = "Description too long (max 1000 characters)"))]
    pub description: String,
    pub category: String,
}

/// Body of PUT /api/gallery/photos/{id}
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePhotoRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "Description too long (max 1000 characters)"))]
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Body of DELETE /api/gallery-delete
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeletePhotoRequest {
    pub url: Option<String>,
    pub pathname: Option<String>,
    pub id: Option<i64>,
}

/// Category entry for GET /api/gallery/categories
#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn categories() -> Vec<CategoryResponse> {
    PHOTO_CATEGORIES
        .iter()
        .map(|&(value, label)| CategoryResponse { value, label })
        .collect()
}

/// Photos the gallery starts with
pub fn sample_photos() -> Vec<Photo> {
    let sample = |id: i64, url: &str, title: &str, description: &str, category: &str, date: &str, tags: &[&str]| Photo {
        id,
        url: url.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        date: date.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        download_url: None,
        pathname: None,
        size: None,
    };

    vec![
        sample(
            1,
            "/static/images/sample1.jpg",
            "Onam Football Celebration",
            "Players celebrating during Onam football tournament",
            "tournament",
            "2025-07-30",
            &["onam", "celebration", "football"],
        ),
        sample(
            2,
            "/static/images/sample2.jpg",
            "Kerala Village Football",
            "Traditional football match in Kerala village setting",
            "practice",
            "2025-07-29",
            &["kerala", "village", "football"],
        ),
        sample(
            3,
            "/static/images/sample3.jpg",
            "Hyderabad FC Venue",
            "Professional football venue in Hyderabad",
            "venue",
            "2025-07-28",
            &["hyderabad", "venue", "stadium"],
        ),
    ]
}
