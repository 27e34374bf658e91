use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::shared::constants::{PASSWORD_MIN, PHONE_MIN_DIGITS};

lazy_static! {
    /// Runs of whitespace, collapsed to a single space by [`collapse_whitespace`]
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    /// Category slugs: lowercase alphanumeric words joined by single hyphens
    /// - Valid: "plumbing", "yard-work", "hvac2"
    /// - Invalid: "-yard", "yard-", "yard--work", "Yard"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    static ref HAS_UPPER: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref HAS_LOWER: Regex = Regex::new(r"[a-z]").unwrap();
    static ref HAS_DIGIT: Regex = Regex::new(r"[0-9]").unwrap();
    static ref HAS_SPECIAL: Regex = Regex::new(r"[^A-Za-z0-9]").unwrap();
}

/// Trim and collapse internal whitespace to single spaces.
pub fn collapse_whitespace(input: &str) -> String {
    WHITESPACE_RUN.replace_all(input.trim(), " ").into_owned()
}

/// Trim an optional field, mapping blank values to `None`.
pub fn blank_to_none(input: Option<String>) -> Option<String> {
    input
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Derive a URL slug from a display name ("Yard Work" -> "yard-work").
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Password strength: minimum length plus upper, lower, digit and special characters.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let strong = password.chars().count() as u64 >= PASSWORD_MIN
        && HAS_UPPER.is_match(password)
        && HAS_LOWER.is_match(password)
        && HAS_DIGIT.is_match(password)
        && HAS_SPECIAL.is_match(password);

    if strong {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_strength");
        err.message = Some(
            "Password must be at least 8 characters and contain uppercase, lowercase, number and special character"
                .into(),
        );
        Err(err)
    }
}

/// Phone numbers need at least ten digits once formatting characters are stripped.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits >= PHONE_MIN_DIGITS {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("Phone number must contain at least 10 digits".into());
        Err(err)
    }
}

/// Proposed rates are money amounts in (0.01 ..= 100000) with at most two fraction digits.
pub fn validate_rate(rate: &Decimal) -> Result<(), ValidationError> {
    let min = Decimal::new(1, 2);
    let max = Decimal::new(100_000, 0);

    if *rate < min || *rate > max {
        let mut err = ValidationError::new("proposed_rate");
        err.message = Some("Proposed rate must be between 0.01 and 100000".into());
        return Err(err);
    }
    if rate.normalize().scale() > 2 {
        let mut err = ValidationError::new("proposed_rate");
        err.message = Some("Proposed rate can have at most two decimal places".into());
        return Err(err);
    }
    Ok(())
}
