use std::{fmt::Display, str::FromStr};

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

/// Parse a numeric setting. Missing or malformed values fall back to `default`; the error text is handed back so the
/// caller can log it in its own context.
pub fn parse_number_or<T>(value: Option<String>, default: T) -> (T, Option<String>)
where
    T: FromStr + Copy,
    T::Err: Display,
{
    match value {
        None => (default, None),
        Some(s) => match s.trim().parse::<T>() {
            Ok(v) => (v, None),
            Err(e) => (default, Some(format!("'{s}' is not a valid value ({e})"))),
        },
    }
}
