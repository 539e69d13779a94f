//! Event types.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::uploads::{FormError, FormFields, MultipartForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Offline,
    Online,
}

impl FromStr for EventType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "offline" => Ok(Self::Offline),
            "online" => Ok(Self::Online),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl FromStr for EventStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "upcoming" => Ok(Self::Upcoming),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub venue: String,
    pub event_type: EventType,
    pub objectives: Option<String>,
    pub target_audience: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub start_time: String,
    pub end_time: String,
    pub image: Option<String>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event creation. Dates are kept as text until [`parse_event_date`]
/// so that form posts and JSON accept the same formats.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(max = 255))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 255))]
    pub venue: String,
    pub event_type: EventType,
    pub objectives: Option<String>,
    #[validate(length(max = 255))]
    pub target_audience: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    /// Existing image path or URL, used when no file is attached.
    #[validate(length(max = 255))]
    pub image_url: Option<String>,
    pub status: Option<EventStatus>,
}

impl MultipartForm for CreateEventRequest {
    const FILE_FIELD: &'static str = "image";

    fn from_form(fields: &FormFields) -> Result<Self, FormError> {
        Ok(Self {
            slug: fields.text("slug"),
            name: fields.required("name")?,
            description: fields.required("description")?,
            venue: fields.required("venue")?,
            event_type: fields
                .parse("eventType")?
                .ok_or(FormError::Missing("eventType"))?,
            objectives: fields.text("objectives"),
            target_audience: fields.text("targetAudience"),
            start_date: fields.required("startDate")?,
            end_date: fields.required("endDate")?,
            start_time: fields.required("startTime")?,
            end_time: fields.required("endTime")?,
            image_url: fields.text("imageUrl"),
            status: fields.parse("status")?,
        })
    }
}

/// Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub venue: Option<String>,
    pub event_type: Option<EventType>,
    pub objectives: Option<String>,
    #[validate(length(max = 255))]
    pub target_audience: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[validate(length(max = 255))]
    pub image_url: Option<String>,
    pub status: Option<EventStatus>,
}

impl MultipartForm for UpdateEventRequest {
    const FILE_FIELD: &'static str = "image";

    fn from_form(fields: &FormFields) -> Result<Self, FormError> {
        Ok(Self {
            slug: fields.text("slug"),
            name: fields.text("name"),
            description: fields.text("description"),
            venue: fields.text("venue"),
            event_type: fields.parse("eventType")?,
            objectives: fields.text("objectives"),
            target_audience: fields.text("targetAudience"),
            start_date: fields.text("startDate"),
            end_date: fields.text("endDate"),
            start_time: fields.text("startTime"),
            end_time: fields.text("endTime"),
            image_url: fields.text("imageUrl"),
            status: fields.parse("status")?,
        })
    }
}

/// Parses RFC 3339, `YYYY-MM-DDTHH:MM` (read as UTC) or a bare
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// True for a 24-hour `HH:MM` time.
#[must_use]
pub fn is_clock_time(raw: &str) -> bool {
    raw.len() == 5 && NaiveTime::parse_from_str(raw, "%H:%M").is_ok()
}
