//! Validation rules shared by the form validators

use super::FieldErrorKind;
use validator::ValidateEmail;

pub const MIN_MESSAGE_CHARS: usize = 10;

/// Present and non-blank; yields the trimmed value.
pub fn required_text(value: Option<&str>, missing: FieldErrorKind) -> Result<String, FieldErrorKind> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(missing),
    }
}

/// Blank collapses to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn email_address(value: Option<&str>) -> Result<String, FieldErrorKind> {
    let email = required_text(value, FieldErrorKind::EmailRequired)?;

    if email.len() > 254 || !email.validate_email() {
        return Err(FieldErrorKind::EmailInvalid);
    }

    Ok(email)
}

pub fn min_chars(
    value: String,
    min: usize,
    too_short: FieldErrorKind,
) -> Result<String, FieldErrorKind> {
    if value.chars().count() < min {
        return Err(too_short);
    }
    Ok(value)
}

/// Contact message: required first, then at least [`MIN_MESSAGE_CHARS`].
pub fn contact_message(value: Option<&str>) -> Result<String, FieldErrorKind> {
    let message = required_text(value, FieldErrorKind::MessageRequired)?;
    min_chars(message, MIN_MESSAGE_CHARS, FieldErrorKind::MessageTooShort)
}

/// Render time of the form in epoch milliseconds.
pub fn epoch_millis(value: Option<i64>) -> Result<i64, FieldErrorKind> {
    match value {
        Some(ts) if ts > 0 => Ok(ts),
        _ => Err(FieldErrorKind::TimestampInvalid),
    }
}

/// Same as [`epoch_millis`] for values that arrive as multipart text.
pub fn epoch_millis_text(value: Option<&str>) -> Result<i64, FieldErrorKind> {
    let parsed = value
        .map(str::trim)
        .and_then(|v| v.parse::<i64>().ok());
    epoch_millis(parsed)
}
