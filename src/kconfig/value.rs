use std::fmt;

use serde::Serialize;

/// A typed Kconfig value.
///
/// Kconfig writes disabled options as comments, so a boolean is only ever
/// produced for the literal `y`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i128),
    Str(String),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Int(i) => write!(f, "{i}"),
            ConfigValue::Str(s) => f.write_str(s),
        }
    }
}

/// Reasons a raw value could not be coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CoerceError {
    InvalidHex,
}

/// Coerces a raw `VALUE` string, first matching rule wins:
/// `y`, `0x` hex, double-quoted string, decimal digits, raw string.
pub(crate) fn coerce_value(raw: &str) -> Result<ConfigValue, CoerceError> {
    if raw == "y" {
        return Ok(ConfigValue::Bool(true));
    }

    if let Some(digits) = raw.strip_prefix("0x") {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoerceError::InvalidHex);
        }
        return i128::from_str_radix(digits, 16)
            .map(ConfigValue::Int)
            .map_err(|_| CoerceError::InvalidHex);
    }

    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Ok(ConfigValue::Str(raw[1..raw.len() - 1].to_string()));
    }

    if looks_like_decimal(raw) {
        if let Ok(i) = raw.parse::<i128>() {
            return Ok(ConfigValue::Int(i));
        }
    }

    Ok(ConfigValue::Str(raw.to_string()))
}

fn looks_like_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
