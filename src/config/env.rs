use toml::Value;

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// Settings overrides from `<PREFIX><SEP>SECTION<SEP>KEY` environment variables.
///
/// Path segments are lowercased, so `SUIT_BUILD__ADDRESS__BASE_OFFSET`
/// sets `address.base_offset`.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self {
            prefix: prefix.into(),
            separator,
        }
    }

    fn entries_from(&self, vars: impl IntoIterator<Item = (String, String)>) -> Vec<ConfigEntry> {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);
        let mut entries = Vec::new();

        for (key, value) in vars {
            let Some(path_str) = key.strip_prefix(&prefix_with_sep) else {
                continue;
            };
            if path_str.is_empty() {
                continue;
            }

            let path: Vec<String> = path_str
                .split(&self.separator)
                .map(|s| s.to_lowercase())
                .collect();
            entries.push(ConfigEntry::at_path(path, coerce_value(&value)));
        }

        entries
    }
}

impl ConfigSource for EnvSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        Ok(self.entries_from(std::env::vars()))
    }
}

fn coerce_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    // Addresses are usually written in hex
    if let Some(digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if let Ok(i) = i64::from_str_radix(digits, 16) {
            return Value::Integer(i);
        }
    }

    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
    }

    Value::String(s.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_prefixed_vars_become_paths() {
        let source = EnvSource::new("SUIT_BUILD", "__");
        let entries = source.entries_from(vars(&[
            ("SUIT_BUILD__ADDRESS__BASE_OFFSET", "0x0E100000"),
            ("SUIT_BUILD__NAMESPACE__REJECT_COLLISIONS", "true"),
            ("SUIT_BUILD__IMAGE__PROGRAM", "/opt/suit-generator"),
            ("OTHER__ADDRESS__BASE_OFFSET", "1"),
            ("SUIT_BUILD__", "ignored"),
        ]));

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].path, vec!["address", "base_offset"]);
        assert_eq!(entries[0].value, Value::Integer(0x0E10_0000));
        assert_eq!(entries[1].value, Value::Boolean(true));
        assert_eq!(entries[2].value, Value::String("/opt/suit-generator".into()));
    }

    #[test]
    fn test_coerce_value() {
        assert_eq!(coerce_value("FALSE"), Value::Boolean(false));
        assert_eq!(coerce_value("6"), Value::Integer(6));
        assert_eq!(coerce_value("-6"), Value::Integer(-6));
        assert_eq!(coerce_value("0XFF"), Value::Integer(255));
        assert_eq!(coerce_value("0xnope"), Value::String("0xnope".into()));
        assert_eq!(coerce_value("1.5"), Value::String("1.5".into()));
    }
}
