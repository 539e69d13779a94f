//! Program types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

/// Program lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "program_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProgramStatus {
    Active,
    Completed,
    Archived,
}

/// A fundraising program shown on the public site.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: i32,
    pub slug: String,
    pub title: String,
    /// Short description for cards.
    pub description: String,
    /// Long description for the detail page.
    pub full_description: Option<String>,
    pub category: String,
    pub category_color: String,
    /// Material icon name.
    pub icon: String,
    pub image: Option<String>,
    pub hero_image: Option<String>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Decimal,
    pub location: Option<String>,
    pub locations: Option<Value>,
    pub target_audience: Option<String>,
    pub schedule_frequency: Option<String>,
    pub schedule_duration: Option<String>,
    pub objectives: Option<Value>,
    pub activities: Option<Value>,
    pub testimonials: Option<Value>,
    pub impact: Option<Value>,
    pub status: ProgramStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/admin/programs`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProgramRequest {
    /// Derived from the title when omitted.
    #[validate(length(max = 255))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub full_description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(max = 50))]
    pub category_color: Option<String>,
    #[validate(length(max = 100))]
    pub icon: Option<String>,
    pub image: Option<String>,
    pub hero_image: Option<String>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    pub location: Option<String>,
    pub locations: Option<Value>,
    pub target_audience: Option<String>,
    pub schedule_frequency: Option<String>,
    pub schedule_duration: Option<String>,
    pub objectives: Option<Value>,
    pub activities: Option<Value>,
    pub testimonials: Option<Value>,
    pub impact: Option<Value>,
    pub status: Option<ProgramStatus>,
}

/// Body of `PUT /api/admin/programs/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgramRequest {
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub full_description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 50))]
    pub category_color: Option<String>,
    #[validate(length(max = 100))]
    pub icon: Option<String>,
    pub image: Option<String>,
    pub hero_image: Option<String>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    pub location: Option<String>,
    pub locations: Option<Value>,
    pub target_audience: Option<String>,
    pub schedule_frequency: Option<String>,
    pub schedule_duration: Option<String>,
    pub objectives: Option<Value>,
    pub activities: Option<Value>,
    pub testimonials: Option<Value>,
    pub impact: Option<Value>,
    pub status: Option<ProgramStatus>,
}
