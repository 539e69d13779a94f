//! Shared utility functions

use rust_decimal::{Decimal, RoundingStrategy};

/// Maximum slug length (matches the `VARCHAR(255)` slug columns).
pub const MAX_SLUG_LENGTH: usize = 255;

/// Generate a URL slug from a title.
///
/// # Examples
///
/// ```
/// use charity_server::util::slugify;
///
/// assert_eq!(slugify("Clean Water for Everyone!"), "clean-water-for-everyone");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let slug = title
        .to_lowercase()
        .chars()
        // Only keep ASCII alphanumeric characters (matches frontend behavior)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.len() <= MAX_SLUG_LENGTH {
        slug
    } else {
        slug[..MAX_SLUG_LENGTH].trim_end_matches('-').to_string()
    }
}

/// Normalize a client-supplied slug. `None` if nothing usable remains.
#[must_use]
pub fn normalize_slug(raw: &str) -> Option<String> {
    Some(slugify(raw)).filter(|s| !s.is_empty())
}

/// Slug for a new record: the explicit one if given, else derived from `title`.
#[must_use]
pub fn slug_or_title(explicit: Option<&str>, title: &str) -> Option<String> {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => normalize_slug(raw),
        None => normalize_slug(title),
    }
}

/// Format an amount as Indonesian Rupiah, e.g. `Rp 1.250.000`.
///
/// Fractions are rounded half away from zero.
#[must_use]
pub fn format_idr(amount: &Decimal) -> String {
    let whole = amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .abs()
        .trunc()
        .to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}Rp {grouped}")
}
