//! Input checks shared by the use cases.

use chrono::NaiveDate;

use crate::domain::DATE_FORMAT;
use crate::error::ServiceError;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NAME_LEN: usize = 2;

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Return the field's value, or fail if it is absent or blank.
pub fn require_field<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, ServiceError> {
    match value {
        Some(v) if !is_blank(v) => Ok(v),
        _ => Err(ServiceError::validation(format!("Field '{}' is required", name))),
    }
}

pub fn validate_email(email: &str) -> Result<(), ServiceError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ServiceError::validation("Invalid email format"))
    }
}

pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ServiceError> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(ServiceError::validation(format!(
            "Name must be at least {} characters long",
            MIN_NAME_LEN
        )));
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` query value, failing with `message`.
pub fn parse_date(value: &str, message: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ServiceError::validation(message))
}

/// Syntactic address check: `local@domain.tld` with no whitespace, a
/// single `@`, and a dotted domain of non-empty labels.
fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 || email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > 64 || domain.contains('@') {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}
