//! Field-level validation shared by all record types.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static CURRENCY_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid currency code regex"));
static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

/// A record failed an invariant check before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid `{}`: {}", self.field, self.message)
    }
}

impl Error for ValidationError {}

pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    Ok(())
}

pub(crate) fn optional_email(
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    match value {
        Some(email) if !EMAIL_RE.is_match(email.trim()) => Err(ValidationError::new(
            field,
            "must look like `name@domain.tld`",
        )),
        _ => Ok(()),
    }
}

pub(crate) fn non_negative_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(
            field,
            format!("must be a finite amount >= 0, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn optional_non_negative_amount(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |amount| non_negative_amount(field, amount))
}

pub(crate) fn currency_code(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if !CURRENCY_CODE_RE.is_match(value) {
        return Err(ValidationError::new(
            field,
            format!("must be three uppercase letters, got `{value}`"),
        ));
    }
    Ok(())
}

pub(crate) fn optional_hex_color(
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    match value {
        Some(color) if !HEX_COLOR_RE.is_match(color) => Err(ValidationError::new(
            field,
            format!("must be `#RRGGBB`, got `{color}`"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        currency_code, non_negative_amount, optional_email, optional_hex_color, require_non_blank,
    };

    #[test]
    fn blank_names_are_rejected() {
        let err = require_non_blank("name", "   ").expect_err("blank must fail");
        assert_eq!(err.field, "name");
        assert!(require_non_blank("name", "Acme").is_ok());
    }

    #[test]
    fn email_is_checked_only_when_present() {
        assert!(optional_email("email", None).is_ok());
        assert!(optional_email("email", Some("a@b.com")).is_ok());
        assert!(optional_email("email", Some("not-an-email")).is_err());
    }

    #[test]
    fn amounts_must_be_finite_and_non_negative() {
        assert!(non_negative_amount("price", 0.0).is_ok());
        assert!(non_negative_amount("price", -1.0).is_err());
        assert!(non_negative_amount("price", f64::NAN).is_err());
    }

    #[test]
    fn currency_codes_and_colors_follow_their_formats() {
        assert!(currency_code("code", "USD").is_ok());
        assert!(currency_code("code", "usd").is_err());
        assert!(optional_hex_color("color", Some("#22AA44")).is_ok());
        assert!(optional_hex_color("color", Some("green")).is_err());
    }
}
