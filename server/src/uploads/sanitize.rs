//! Filename sanitization and storage-name generation.

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;

/// Longest sanitized filename, extension included.
pub const MAX_FILENAME_LENGTH: usize = 100;

/// Name used when nothing survives sanitization.
pub const FALLBACK_FILENAME: &str = "file";

/// Bytes of randomness in a generated name (rendered as 32 hex chars).
const RANDOM_BYTES: usize = 16;

/// Returns the extension of `name` including the leading dot, or `""`.
///
/// A dot at the very start of the name does not begin an extension, so
/// `".bashrc"` has none while `"report.PDF"` yields `".PDF"`.
#[must_use]
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &name[idx..],
    }
}

/// Reduces a client-supplied filename to a safe display name.
///
/// Keeps only the last non-empty path segment, maps every character outside
/// `[A-Za-z0-9._-]` to `-`, collapses dot runs, trims leading and trailing
/// dots and dashes, and caps the result at [`MAX_FILENAME_LENGTH`] while
/// keeping the extension. Never returns an empty string.
#[must_use]
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let mut cleaned = String::with_capacity(base.len());
    for c in base.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '-'
        };
        if c == '.' && cleaned.ends_with('.') {
            continue;
        }
        cleaned.push(c);
    }

    let mut name = cleaned.trim_matches(['.', '-']).to_string();

    if name.len() > MAX_FILENAME_LENGTH {
        name = truncate_keeping_extension(&name);
    }

    if name.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        name
    }
}

/// Input is ASCII-only at this point, so byte offsets are char offsets.
fn truncate_keeping_extension(name: &str) -> String {
    let ext = extension_of(name);
    if ext.len() >= MAX_FILENAME_LENGTH / 2 {
        return name[..MAX_FILENAME_LENGTH]
            .trim_end_matches(['.', '-'])
            .to_string();
    }

    let stem = name[..MAX_FILENAME_LENGTH - ext.len()].trim_end_matches(['.', '-']);
    let stem = if stem.is_empty() { FALLBACK_FILENAME } else { stem };
    format!("{stem}{ext}")
}

/// Builds a collision-resistant storage name from a sanitized filename.
///
/// Format: `{prefix-}{unix millis}-{32 hex}{ext}` with the extension
/// lowercased. The random part comes from the operating system CSPRNG.
#[must_use]
pub fn generate_secure_filename(sanitized: &str, prefix: Option<&str>) -> String {
    let ext = extension_of(sanitized).to_ascii_lowercase();
    let timestamp = Utc::now().timestamp_millis();

    let mut random = [0u8; RANDOM_BYTES];
    OsRng.fill_bytes(&mut random);
    let random = hex::encode(random);

    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{prefix}-{timestamp}-{random}{ext}"),
        None => format!("{timestamp}-{random}{ext}"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use regex::Regex;

    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.jpg"), ".jpg");
        assert_eq!(extension_of("archive.tar.GZ"), ".GZ");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of(".hidden"), "");
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\..\\windows\\win.ini"), "win.ini");
        assert_eq!(sanitize_filename("dangerous../../name.jpg"), "name.jpg");
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("my photo (1).png"), "my-photo--1-.png");
        assert_eq!(sanitize_filename("test<script>.png"), "test-script-.png");
        assert_eq!(sanitize_filename("foto_ümlaut.gif"), "foto_-mlaut.gif");
    }

    #[test]
    fn test_sanitize_collapses_dots_and_trims() {
        assert_eq!(sanitize_filename("..report...pdf"), "report.pdf");
        assert_eq!(sanitize_filename("--name--.jpg--"), "name--.jpg");
        assert_eq!(sanitize_filename("file...."), "file");
    }

    #[test]
    fn test_sanitize_falls_back_when_empty() {
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("...."), "file");
        assert_eq!(sanitize_filename("/"), "file");
        assert_eq!(sanitize_filename("\\\\"), "file");
    }

    #[test]
    fn test_sanitize_ignores_trailing_separators() {
        assert_eq!(sanitize_filename("photo.jpg/"), "photo.jpg");
        assert_eq!(sanitize_filename("dir/photo.jpg//"), "photo.jpg");
        assert_eq!(sanitize_filename("C:\\docs\\cv.pdf\\"), "cv.pdf");
        assert_eq!(sanitize_filename("uploads/"), "uploads");
    }

    #[test]
    fn test_sanitize_output_alphabet() {
        let allowed = Regex::new(r"^[A-Za-z0-9._-]+$").unwrap();
        for raw in [
            "a b c.jpg",
            "%00null.png",
            "name\0.jpg",
            "💥boom.webp",
            "C:\\Users\\me\\Desktop\\cv.docx",
        ] {
            let out = sanitize_filename(raw);
            assert!(allowed.is_match(&out), "{raw:?} -> {out:?}");
            assert!(!out.starts_with(['.', '-']));
            assert!(!out.ends_with(['.', '-']));
        }
    }

    #[test]
    fn test_sanitize_truncates_long_names_keeping_extension() {
        let raw = format!("{}.jpeg", "a".repeat(300));
        let out = sanitize_filename(&raw);
        assert_eq!(out.len(), MAX_FILENAME_LENGTH);
        assert!(out.ends_with(".jpeg"));
    }

    #[test]
    fn test_sanitize_bounds_pathological_extension() {
        let raw = format!("a.{}", "b".repeat(300));
        let out = sanitize_filename(&raw);
        assert!(out.len() <= MAX_FILENAME_LENGTH);
        assert!(!out.is_empty());
    }

    #[test]
    fn test_generate_format() {
        let name = generate_secure_filename("Holiday.JPG", Some("team"));
        let pattern = Regex::new(r"^team-\d+-[0-9a-f]{32}\.jpg$").unwrap();
        assert!(pattern.is_match(&name), "unexpected name: {name}");

        let bare = generate_secure_filename("notes", None);
        let pattern = Regex::new(r"^\d+-[0-9a-f]{32}$").unwrap();
        assert!(pattern.is_match(&bare), "unexpected name: {bare}");
    }

    #[test]
    fn test_generate_is_unique() {
        let names: HashSet<String> = (0..1000)
            .map(|_| generate_secure_filename("photo.jpg", None))
            .collect();
        assert_eq!(names.len(), 1000);
    }
}
