// ABOUTME: Field validation rules for registration, recipients, events and ideas
// ABOUTME: Each validator returns a 400 AppError naming the offending field
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{NaiveDate, TimeDelta};

use crate::constants::limits;
use crate::errors::{AppError, AppResult, ErrorCode};

/// Check a string's character count against inclusive bounds
///
/// # Errors
///
/// Returns `ValueOutOfRange` when the length is outside `min..=max`
pub fn validate_length(field: &str, value: &str, min: usize, max: usize) -> AppResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::out_of_range(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

/// Usernames are 4..=32 characters without whitespace
///
/// # Errors
///
/// Returns an error when the username is too short, too long or contains whitespace
pub fn validate_username(username: &str) -> AppResult<()> {
    validate_length(
        "username",
        username,
        limits::USERNAME_MIN,
        limits::USERNAME_MAX,
    )?;
    if username.chars().any(char::is_whitespace) {
        return Err(AppError::invalid_input("username must not contain whitespace"));
    }
    Ok(())
}

/// Passwords are 8..=64 characters
///
/// # Errors
///
/// Returns an error when the password length is out of bounds
pub fn validate_password(password: &str) -> AppResult<()> {
    validate_length(
        "password",
        password,
        limits::PASSWORD_MIN,
        limits::PASSWORD_MAX,
    )
}

/// Structural email check: one `@`, non-empty local part, dotted domain
///
/// # Errors
///
/// Returns `InvalidFormat` when the address is malformed
pub fn validate_email(email: &str) -> AppResult<()> {
    let invalid = || {
        AppError::new(
            ErrorCode::InvalidFormat,
            format!("'{email}' is not a valid email address"),
        )
    };

    if email.len() > limits::EMAIL_MAX || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || !domain.contains('.')
    {
        return Err(invalid());
    }
    Ok(())
}

/// Birthdays lie strictly before today and not before 1900-01-01
///
/// # Errors
///
/// Returns `InvalidInput` for future or implausibly old dates
pub fn validate_birthday(birthday: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if birthday >= today {
        return Err(AppError::invalid_input("Birthday must be in the past"));
    }
    let earliest = NaiveDate::from_ymd_opt(limits::BIRTHDAY_MIN_YEAR, 1, 1)
        .ok_or_else(|| AppError::internal("invalid earliest birthday constant"))?;
    if birthday < earliest {
        return Err(AppError::invalid_input(format!(
            "Birthday is too far in the past (before {})",
            limits::BIRTHDAY_MIN_YEAR
        )));
    }
    Ok(())
}

/// Preference lists hold 1..=10 entries
///
/// # Errors
///
/// Returns `ValueOutOfRange` for empty or oversized lists
pub fn validate_preferences(preferences: Option<&[String]>) -> AppResult<()> {
    if let Some(list) = preferences {
        if list.is_empty() || list.len() > limits::PREFERENCES_MAX {
            return Err(AppError::out_of_range(format!(
                "preferences must contain between 1 and {} items",
                limits::PREFERENCES_MAX
            )));
        }
    }
    Ok(())
}

/// Links must parse as absolute http(s) URLs of at most 255 characters
///
/// # Errors
///
/// Returns `InvalidFormat` for unparsable or non-http URLs
pub fn validate_view_url(view_url: &str) -> AppResult<()> {
    validate_length("view_url", view_url, 1, limits::VIEW_URL_MAX)?;
    let parsed = url::Url::parse(view_url).map_err(|e| {
        AppError::new(
            ErrorCode::InvalidFormat,
            format!("view_url is not a valid URL: {e}"),
        )
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::new(
            ErrorCode::InvalidFormat,
            "view_url must use http or https",
        ));
    }
    Ok(())
}

/// Prices are non-negative and fit NUMERIC(10,2); returns the value rounded to cents
///
/// # Errors
///
/// Returns `ValueOutOfRange` for negative, non-finite or oversized prices
pub fn normalize_price(price: f64) -> AppResult<f64> {
    if !price.is_finite() || price < 0.0 || price >= limits::PRICE_MAX {
        return Err(AppError::out_of_range(
            "estimated_price must be between 0 and 99999999.99",
        ));
    }
    Ok((price * 100.0).round() / 100.0)
}

/// Calendar ranges are ordered and span at most 366 days
///
/// # Errors
///
/// Returns `InvalidInput` when `from > to` or the span is too wide
pub fn validate_date_range(from: NaiveDate, to: NaiveDate) -> AppResult<()> {
    if from > to {
        return Err(AppError::invalid_input(
            "from_date must not be after to_date",
        ));
    }
    if to - from > TimeDelta::days(limits::CALENDAR_MAX_DAYS) {
        return Err(AppError::out_of_range(format!(
            "date range must not exceed {} days",
            limits::CALENDAR_MAX_DAYS
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("anna").is_ok());
        assert!(validate_username("ann").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("an na").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
        assert!(validate_password(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("user@example.com").is_ok());
        for bad in ["user", "@example.com", "user@example", "a@b@c.com", "a b@c.com", "u@.com"] {
            assert!(validate_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_birthday_rules() {
        let today = date(2025, 6, 1);
        assert!(validate_birthday(date(1990, 1, 1), today).is_ok());
        assert!(validate_birthday(date(1900, 1, 1), today).is_ok());
        assert!(validate_birthday(today, today).is_err());
        assert!(validate_birthday(date(1899, 12, 31), today).is_err());
    }

    #[test]
    fn test_preferences_rules() {
        assert!(validate_preferences(None).is_ok());
        assert!(validate_preferences(Some(&["books".to_owned()][..])).is_ok());
        assert!(validate_preferences(Some(&[][..])).is_err());
        let many: Vec<String> = (0..11).map(|i| i.to_string()).collect();
        assert!(validate_preferences(Some(many.as_slice())).is_err());
    }

    #[test]
    fn test_view_url_rules() {
        assert!(validate_view_url("https://shop.example.com/item/1").is_ok());
        assert!(validate_view_url("not a url").is_err());
        assert!(validate_view_url("ftp://example.com/file").is_err());
        let long = format!("https://example.com/{}", "a".repeat(250));
        assert!(validate_view_url(&long).is_err());
    }

    #[test]
    fn test_price_rounding_and_bounds() {
        assert!((normalize_price(19.999).unwrap() - 20.0).abs() < f64::EPSILON);
        assert!((normalize_price(0.0).unwrap()).abs() < f64::EPSILON);
        assert!(normalize_price(-1.0).is_err());
        assert!(normalize_price(f64::NAN).is_err());
        assert!(normalize_price(100_000_000.0).is_err());
    }

    #[test]
    fn test_date_range_rules() {
        assert!(validate_date_range(date(2025, 1, 1), date(2025, 12, 31)).is_ok());
        assert!(validate_date_range(date(2025, 1, 1), date(2025, 1, 1)).is_ok());
        assert!(validate_date_range(date(2025, 2, 1), date(2025, 1, 1)).is_err());
        assert!(validate_date_range(date(2024, 1, 1), date(2025, 6, 1)).is_err());
    }
}
