//! News article types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query string of `GET /api/news`.
#[derive(Debug, Default, Deserialize)]
pub struct NewsFilter {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNewsRequest {
    #[validate(length(max = 255))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub excerpt: Option<String>,
    #[validate(length(min = 1))]
    pub content: String,
    pub image: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 100))]
    pub author: Option<String>,
    /// Defaults to now.
    pub published_at: Option<DateTime<Utc>>,
}

/// Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNewsRequest {
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub excerpt: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub image: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 100))]
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}
