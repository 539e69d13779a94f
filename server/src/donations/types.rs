//! Donation types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::uploads::{FormError, FormFields, MultipartForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: i32,
    pub program_id: Option<i32>,
    pub donor_name: String,
    pub donor_email: String,
    pub donor_phone: Option<String>,
    pub amount: Decimal,
    pub is_anonymous: bool,
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_proof: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Public view of a completed donation. Carries no contact data.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentDonation {
    pub id: i32,
    /// `None` when the donor asked to stay anonymous.
    pub donor_name: Option<String>,
    pub amount: Decimal,
    pub program_id: Option<i32>,
    pub program_title: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Query string of `GET /api/donations/recent`.
#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

/// Query string of `GET /api/admin/donations`.
#[derive(Debug, Default, Deserialize)]
pub struct DonationFilter {
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationRequest {
    pub program_id: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub donor_name: String,
    #[validate(email, length(max = 255))]
    pub donor_email: String,
    #[validate(length(max = 50))]
    pub donor_phone: Option<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub is_anonymous: bool,
    #[validate(length(max = 50))]
    pub payment_method: Option<String>,
    #[validate(length(max = 2000))]
    pub message: Option<String>,
}

impl CreateDonationRequest {
    /// Checks the amount is positive with at most two decimal places.
    pub fn check_amount(&self) -> Result<(), String> {
        if self.amount <= Decimal::ZERO {
            return Err("amount: must be greater than zero".into());
        }
        if self.amount.normalize().scale() > 2 {
            return Err("amount: at most two decimal places".into());
        }
        Ok(())
    }
}

impl MultipartForm for CreateDonationRequest {
    const FILE_FIELD: &'static str = "paymentProof";

    fn from_form(fields: &FormFields) -> Result<Self, FormError> {
        Ok(Self {
            program_id: fields.parse("programId")?,
            donor_name: fields.required("donorName")?,
            donor_email: fields.required("donorEmail")?,
            donor_phone: fields.text("donorPhone"),
            amount: fields
                .parse("amount")?
                .ok_or(FormError::Missing("amount"))?,
            is_anonymous: fields.flag("isAnonymous")?.unwrap_or(false),
            payment_method: fields.text("paymentMethod"),
            message: fields.text("message"),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
}

/// Change to a program's raised total when a donation of `amount` moves
/// from `from` to `to`. Only transitions into or out of `completed` count.
#[must_use]
pub fn program_total_delta(
    from: PaymentStatus,
    to: PaymentStatus,
    amount: Decimal,
) -> Option<Decimal> {
    match (from == PaymentStatus::Completed, to == PaymentStatus::Completed) {
        (false, true) => Some(amount),
        (true, false) => Some(-amount),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn request(amount: &str) -> CreateDonationRequest {
        CreateDonationRequest {
            program_id: None,
            donor_name: "Rina".into(),
            donor_email: "rina@example.org".into(),
            donor_phone: None,
            amount: dec(amount),
            is_anonymous: false,
            payment_method: None,
            message: None,
        }
    }

    #[test]
    fn test_program_total_delta() {
        use PaymentStatus::{Completed, Failed, Pending};
        let amount = dec("150000");
        assert_eq!(program_total_delta(Pending, Completed, amount), Some(amount));
        assert_eq!(program_total_delta(Completed, Failed, amount), Some(-amount));
        assert_eq!(program_total_delta(Completed, Pending, amount), Some(-amount));
        assert_eq!(program_total_delta(Pending, Failed, amount), None);
        assert_eq!(program_total_delta(Completed, Completed, amount), None);
    }

    #[test]
    fn test_check_amount() {
        assert!(request("50000").check_amount().is_ok());
        assert!(request("10.50").check_amount().is_ok());
        assert!(request("10.500").check_amount().is_ok());
        assert!(request("0").check_amount().is_err());
        assert!(request("-5").check_amount().is_err());
        assert!(request("1.234").check_amount().is_err());
    }

    #[test]
    fn test_amount_accepts_string_or_number() {
        let from_string: CreateDonationRequest = serde_json::from_value(serde_json::json!({
            "donorName": "A",
            "donorEmail": "a@example.org",
            "amount": "250000"
        }))
        .unwrap();
        assert_eq!(from_string.amount, dec("250000"));
        assert!(!from_string.is_anonymous);

        let from_number: CreateDonationRequest = serde_json::from_value(serde_json::json!({
            "donorName": "A",
            "donorEmail": "a@example.org",
            "amount": 75000,
            "isAnonymous": true
        }))
        .unwrap();
        assert_eq!(from_number.amount, dec("75000"));
        assert!(from_number.is_anonymous);
    }

    #[test]
    fn test_from_form() {
        let mut fields = FormFields::default();
        fields.insert("donorName", "Budi");
        fields.insert("donorEmail", "budi@example.org");
        fields.insert("amount", "100000");
        fields.insert("isAnonymous", "1");
        fields.insert("programId", "3");

        let req = CreateDonationRequest::from_form(&fields).unwrap();
        assert_eq!(req.program_id, Some(3));
        assert!(req.is_anonymous);
        assert_eq!(req.amount, dec("100000"));

        fields.insert("amount", "lots");
        assert!(matches!(
            CreateDonationRequest::from_form(&fields),
            Err(FormError::Invalid("amount"))
        ));
    }

    #[test]
    fn test_invalid_email_fails_validation() {
        let mut req = request("1000");
        req.donor_email = "not-an-email".into();
        assert!(req.validate().is_err());
    }
}
