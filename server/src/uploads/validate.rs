//! Policy validation for incoming files.
//!
//! Pure checks against [`UploadCategory`] policies. The order is fixed and
//! the first failure wins:
//!
//! 1. a file with a name is present
//! 2. extension whitelist
//! 3. MIME whitelist
//! 4. size limit
//! 5. non-empty

use super::error::{UploadError, UploadResult};
use super::policy::UploadCategory;
use super::sanitize::{extension_of, sanitize_filename};

/// Metadata of an uploaded file as declared by the client.
#[derive(Debug, Clone, Copy)]
pub struct FileMeta<'a> {
    /// Client-supplied filename, if any.
    pub name: Option<&'a str>,
    /// Declared content type.
    pub mime_type: &'a str,
    /// Size of the payload in bytes.
    pub size_bytes: u64,
}

/// A file that passed every policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    /// Sanitized display name of the file.
    pub sanitized_filename: String,
}

/// Normalizes a declared content type: lowercase, parameters dropped.
///
/// `"Image/JPEG; charset=binary"` becomes `"image/jpeg"`.
#[must_use]
pub fn normalize_mime_type(declared: &str) -> String {
    declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Validates `file` against the policy of `category`.
pub fn validate_upload(
    file: Option<&FileMeta<'_>>,
    category: UploadCategory,
) -> UploadResult<ValidatedUpload> {
    let policy = category.policy();

    let Some(file) = file else {
        return Err(UploadError::NoFile);
    };
    let Some(name) = file.name.filter(|n| !n.is_empty()) else {
        return Err(UploadError::NoFile);
    };

    let sanitized_filename = sanitize_filename(name);

    let ext = extension_of(&sanitized_filename).to_ascii_lowercase();
    if !policy.allows_extension(&ext) {
        return Err(UploadError::InvalidExtension {
            allowed: policy.allowed_extensions.join(", "),
        });
    }

    let mime_type = normalize_mime_type(file.mime_type);
    if !policy.allows_mime_type(&mime_type) {
        return Err(UploadError::InvalidMimeType {
            allowed: policy.allowed_mime_types.join(", "),
        });
    }

    if file.size_bytes > policy.max_size_bytes {
        return Err(UploadError::TooLarge {
            limit_mb: policy.max_size_mb(),
        });
    }

    if file.size_bytes == 0 {
        return Err(UploadError::Empty);
    }

    Ok(ValidatedUpload { sanitized_filename })
}
