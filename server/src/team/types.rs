//! Team member types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeamType {
    Leadership,
    Coordinators,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: i32,
    pub name: String,
    pub role: String,
    pub bio: Option<String>,
    pub photo: Option<String>,
    pub team_type: TeamType,
    /// Position on the team page, ascending.
    #[serde(rename = "order")]
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamMemberRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub role: String,
    pub bio: Option<String>,
    #[validate(length(max = 255))]
    pub photo: Option<String>,
    pub team_type: Option<TeamType>,
    #[serde(rename = "order")]
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamMemberRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub role: Option<String>,
    pub bio: Option<String>,
    #[validate(length(max = 255))]
    pub photo: Option<String>,
    pub team_type: Option<TeamType>,
    #[serde(rename = "order")]
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}
