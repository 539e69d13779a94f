//! Response bodies shared by content handlers.

use serde::Serialize;

/// `{"success": true}` acknowledgement, optionally carrying the new row id.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Success {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Success {
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            id: None,
            message: None,
        }
    }

    #[must_use]
    pub const fn created(id: i32) -> Self {
        Self {
            success: true,
            id: Some(id),
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// `{"id": ..}` returned by public submission endpoints.
#[derive(Debug, Serialize)]
pub struct Submitted {
    pub id: i32,
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes() {
        assert_eq!(
            serde_json::to_value(Success::ok()).unwrap(),
            serde_json::json!({"success": true})
        );
        assert_eq!(
            serde_json::to_value(Success::created(4)).unwrap(),
            serde_json::json!({"success": true, "id": 4})
        );
        assert_eq!(
            serde_json::to_value(Success::ok().with_message("done")).unwrap(),
            serde_json::json!({"success": true, "message": "done"})
        );
    }
}
