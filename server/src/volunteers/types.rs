//! Volunteer application types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::uploads::{FormError, FormFields, MultipartForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "volunteer_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VolunteerStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub skills: Option<String>,
    pub motivation: Option<String>,
    pub availability: Option<String>,
    pub photo: Option<String>,
    pub status: VolunteerStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVolunteerRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub skills: Option<String>,
    pub motivation: Option<String>,
    #[validate(length(max = 100))]
    pub availability: Option<String>,
}

impl MultipartForm for CreateVolunteerRequest {
    const FILE_FIELD: &'static str = "photo";

    fn from_form(fields: &FormFields) -> Result<Self, FormError> {
        Ok(Self {
            name: fields.required("name")?,
            email: fields.required("email")?,
            phone: fields.text("phone"),
            address: fields.text("address"),
            skills: fields.text("skills"),
            motivation: fields.text("motivation"),
            availability: fields.text("availability"),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateVolunteerStatusRequest {
    pub status: VolunteerStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_form() {
        let mut fields = FormFields::default();
        fields.insert("name", "Dewi");
        fields.insert("email", "dewi@example.org");
        fields.insert("skills", "  ");
        fields.insert("availability", "Weekends");

        let req = CreateVolunteerRequest::from_form(&fields).unwrap();
        assert_eq!(req.name, "Dewi");
        assert!(req.skills.is_none());
        assert_eq!(req.availability.as_deref(), Some("Weekends"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_from_form_requires_email() {
        let mut fields = FormFields::default();
        fields.insert("name", "Dewi");
        assert!(matches!(
            CreateVolunteerRequest::from_form(&fields),
            Err(FormError::Missing("email"))
        ));
    }

    #[test]
    fn test_status_wire_format() {
        let req: UpdateVolunteerStatusRequest =
            serde_json::from_str(r#"{"status":"approved"}"#).unwrap();
        assert_eq!(req.status, VolunteerStatus::Approved);
        assert!(serde_json::from_str::<UpdateVolunteerStatusRequest>(r#"{"status":"maybe"}"#).is_err());
    }
}
