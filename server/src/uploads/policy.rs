//! Upload policies.
//!
//! Each [`UploadCategory`] maps to a fixed size limit plus MIME and
//! extension whitelists. The tables are compile-time constants shared by
//! every request; nothing mutates them at runtime.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// One mebibyte.
pub const MB: u64 = 1024 * 1024;

/// Category of an uploaded file, selecting which policy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadCategory {
    Image,
    Document,
}

/// Size limit and whitelists for one category.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPolicy {
    pub max_size_bytes: u64,
    pub allowed_mime_types: &'static [&'static str],
    pub allowed_extensions: &'static [&'static str],
}

static IMAGE_POLICY: UploadPolicy = UploadPolicy {
    max_size_bytes: 5 * MB,
    allowed_mime_types: &[
        "image/jpeg",
        "image/jpg",
        "image/png",
        "image/webp",
        "image/gif",
    ],
    allowed_extensions: &[".jpg", ".jpeg", ".png", ".webp", ".gif"],
};

static DOCUMENT_POLICY: UploadPolicy = UploadPolicy {
    max_size_bytes: 10 * MB,
    allowed_mime_types: &[
        "application/pdf",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ],
    allowed_extensions: &[".pdf", ".doc", ".docx"],
};

impl UploadCategory {
    /// Returns the policy for this category.
    #[must_use]
    pub fn policy(self) -> &'static UploadPolicy {
        match self {
            Self::Image => &IMAGE_POLICY,
            Self::Document => &DOCUMENT_POLICY,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
        }
    }
}

impl UploadPolicy {
    /// Size limit in whole megabytes, as shown in error messages.
    #[must_use]
    pub const fn max_size_mb(&self) -> u64 {
        self.max_size_bytes / MB
    }

    #[must_use]
    pub fn allows_mime_type(&self, normalized: &str) -> bool {
        self.allowed_mime_types.contains(&normalized)
    }

    #[must_use]
    pub fn allows_extension(&self, lowercase_ext: &str) -> bool {
        self.allowed_extensions.contains(&lowercase_ext)
    }
}

/// Storage subdirectory under the upload root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadFolder {
    PaymentProofs,
    Programs,
    News,
    Team,
    General,
    Volunteers,
    Events,
}

impl UploadFolder {
    pub const ALL: [Self; 7] = [
        Self::PaymentProofs,
        Self::Programs,
        Self::News,
        Self::Team,
        Self::General,
        Self::Volunteers,
        Self::Events,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PaymentProofs => "payment-proofs",
            Self::Programs => "programs",
            Self::News => "news",
            Self::Team => "team",
            Self::General => "general",
            Self::Volunteers => "volunteers",
            Self::Events => "events",
        }
    }
}

impl fmt::Display for UploadFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unknown folder name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown upload folder: {0}")]
pub struct UnknownFolder(pub String);

impl FromStr for UploadFolder {
    type Err = UnknownFolder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|folder| folder.as_str() == s)
            .ok_or_else(|| UnknownFolder(s.to_string()))
    }
}

/// Read-only view of the policy table for monitoring.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySummary {
    pub image: &'static UploadPolicy,
    pub document: &'static UploadPolicy,
    pub folders: Vec<&'static str>,
}

#[must_use]
pub fn policy_summary() -> PolicySummary {
    PolicySummary {
        image: UploadCategory::Image.policy(),
        document: UploadCategory::Document.policy(),
        folders: UploadFolder::ALL.iter().map(|f| f.as_str()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_policy_limits() {
        let policy = UploadCategory::Image.policy();
        assert_eq!(policy.max_size_bytes, 5 * 1024 * 1024);
        assert_eq!(policy.max_size_mb(), 5);
        assert!(policy.allows_mime_type("image/png"));
        assert!(!policy.allows_mime_type("application/pdf"));
        assert!(policy.allows_extension(".jpeg"));
    }

    #[test]
    fn test_document_policy_limits() {
        let policy = UploadCategory::Document.policy();
        assert_eq!(policy.max_size_mb(), 10);
        assert!(policy.allows_extension(".docx"));
        assert!(!policy.allows_extension(".exe"));
    }

    #[test]
    fn test_folder_round_trip() {
        for folder in UploadFolder::ALL {
            assert_eq!(folder.as_str().parse::<UploadFolder>(), Ok(folder));
        }
        assert!("../etc".parse::<UploadFolder>().is_err());
    }

    #[test]
    fn test_policy_summary_lists_folders() {
        let summary = policy_summary();
        assert_eq!(summary.folders.len(), 7);
        assert!(summary.folders.contains(&"payment-proofs"));
    }
}
