use lazy_static::lazy_static;
use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_USERNAME_LEN: usize = 50;
pub const MAX_INGREDIENT_NAME_LEN: usize = 100;

/// Text that does not name any variant of a closed enum (unit, category).
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Lowercased, trimmed form used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trims and checks length bounds, counting characters rather than bytes.
pub fn bounded_name(raw: &str, max: usize) -> Option<String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    (len > 0 && len <= max).then(|| trimmed.to_string())
}

pub fn is_valid_quantity(quantity: f64) -> bool {
    quantity.is_finite() && quantity >= 0.0
}
