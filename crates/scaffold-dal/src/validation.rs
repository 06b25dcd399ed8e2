//! Attribute rules for `#[garde(custom(...))]`.
//!
//! Unlike garde's built-in rules these also fail on a missing value, so an
//! absent attribute is reported once for every rule it breaks. garde runs
//! custom rules in declaration order, which keeps reported errors stable.

use garde::rules::email::Email as _;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime,
    format_description::well_known::{Iso8601, Rfc3339},
};

pub fn is_string(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value {
        Some(_) => Ok(()),
        None => Err(garde::Error::new("must be a string")),
    }
}

pub fn not_empty(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value.as_deref() {
        Some(s) if !s.is_empty() => Ok(()),
        _ => Err(garde::Error::new("should not be empty")),
    }
}

/// Length in characters within `min..=max`, missing value counts as too short
pub fn length(
    min: usize,
    max: usize,
) -> impl FnOnce(&Option<String>, &()) -> garde::Result {
    move |value, _ctx| {
        let len = value.as_deref().map(|s| s.chars().count()).unwrap_or(0);
        if len < min {
            Err(garde::Error::new(format!(
                "must be longer than or equal to {min} characters"
            )))
        } else if len > max {
            Err(garde::Error::new(format!(
                "must be shorter than or equal to {max} characters"
            )))
        } else {
            Ok(())
        }
    }
}

pub fn email(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value {
        Some(s) if s.validate_email().is_ok() => Ok(()),
        _ => Err(garde::Error::new("must be an email")),
    }
}

pub fn positive(value: &Option<i64>, _ctx: &()) -> garde::Result {
    match value {
        Some(n) if *n > 0 => Ok(()),
        _ => Err(garde::Error::new("must be a positive number")),
    }
}

/// ISO 8601 date or date time, with or without offset
pub fn iso8601(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value.as_deref() {
        Some(s) if is_iso8601(s) => Ok(()),
        _ => Err(garde::Error::new("must be a valid ISO 8601 date string")),
    }
}

fn is_iso8601(value: &str) -> bool {
    OffsetDateTime::parse(value, &Rfc3339).is_ok()
        || OffsetDateTime::parse(value, &Iso8601::DEFAULT).is_ok()
        || PrimitiveDateTime::parse(value, &Iso8601::DEFAULT).is_ok()
        || Date::parse(value, &Iso8601::DEFAULT).is_ok()
}
