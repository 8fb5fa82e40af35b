//! Regex patterns for email, phone and SSN-shaped values.

use once_cell::sync::Lazy;
use regex::Regex;

// Patterns compiled once at startup
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("Invalid regex: email")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\d[\d\-\s]{6,}\d").expect("Invalid regex: phone"));

static SSN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3}-\d{2}-\d{4}$").expect("Invalid regex: SSN"));

/// Strict `local@domain.tld` check with a 2+ letter TLD.
pub fn is_valid_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

/// Whether a phone-number-shaped run appears anywhere in the value.
pub fn looks_like_phone(s: &str) -> bool {
    PHONE_RE.is_match(s)
}

/// Whether the whole value is shaped like `123-45-6789`.
pub fn is_ssn(s: &str) -> bool {
    SSN_RE.is_match(s)
}

#[inline]
pub fn contains_at_sign(s: &str) -> bool {
    s.contains('@')
}
