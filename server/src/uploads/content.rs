//! Magic-byte verification.
//!
//! Compares the leading bytes of a payload with the signatures registered
//! for its declared MIME type. Types without a registered signature pass
//! and are logged; every type admitted by the upload policies has one.

use tracing::warn;

use super::validate::normalize_mime_type;

const JPEG: &[&[u8]] = &[&[0xFF, 0xD8, 0xFF]];
const PNG: &[&[u8]] = &[&[0x89, 0x50, 0x4E, 0x47]];
const GIF: &[&[u8]] = &[&[0x47, 0x49, 0x46, 0x38]];
const WEBP: &[&[u8]] = &[&[0x52, 0x49, 0x46, 0x46]];
const PDF: &[&[u8]] = &[&[0x25, 0x50, 0x44, 0x46]];
const OLE2: &[&[u8]] = &[&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]];
const ZIP: &[&[u8]] = &[&[0x50, 0x4B, 0x03, 0x04]];

/// Declared MIME type to accepted leading-byte signatures.
pub const MAGIC_SIGNATURES: &[(&str, &[&[u8]])] = &[
    ("image/jpeg", JPEG),
    ("image/jpg", JPEG),
    ("image/png", PNG),
    ("image/gif", GIF),
    ("image/webp", WEBP),
    ("application/pdf", PDF),
    ("application/msword", OLE2),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ZIP,
    ),
];

/// Returns the registered signatures for a normalized MIME type.
#[must_use]
pub fn signatures_for(mime_type: &str) -> Option<&'static [&'static [u8]]> {
    MAGIC_SIGNATURES
        .iter()
        .find(|(mime, _)| *mime == mime_type)
        .map(|(_, sigs)| *sigs)
}

/// Checks `bytes` against the signatures of `declared_mime`.
///
/// Returns `true` when any signature is a prefix of `bytes`, or when the
/// type has no registered signature.
#[must_use]
pub fn verify_content(bytes: &[u8], declared_mime: &str) -> bool {
    let mime_type = normalize_mime_type(declared_mime);

    let Some(signatures) = signatures_for(&mime_type) else {
        warn!(
            mime_type = %mime_type,
            "No magic-byte signature registered, skipping content check"
        );
        return true;
    };

    signatures.iter().any(|sig| bytes.starts_with(sig))
}

/// Best guess at the real type of `bytes`, for logging rejected uploads.
#[must_use]
pub fn detect_mime(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}
