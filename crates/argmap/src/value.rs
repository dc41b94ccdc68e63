//! Scalar value model shared by coercion, accumulation, and export.

use serde::{Serialize, Serializer};

/// A parsed argument value.
///
/// Flags and positionals carry one of four scalar kinds. Arrays and nested
/// objects only appear in the exported mapping, never inside the pipeline.
/// Numbers are `f64`; a whole-valued finite number exports as a JSON integer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render the value the way it would appear as a raw token.
    ///
    /// Whole-valued numbers drop the fractional point (`3.0` renders as `"3"`).
    pub fn to_token(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => match as_integer(*n) {
                Some(i) => i.to_string(),
                None => n.to_string(),
            },
            Value::Str(s) => s.clone(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => match as_integer(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Value::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => match as_integer(*n) {
                Some(i) => serde_json::Value::from(i),
                None => serde_json::Number::from_f64(*n)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
            },
            Value::Str(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        serde_json::Value::from(&value)
    }
}

/// Parse a token that is a number in its entirety (`"3"`, `"+5"`, `"1e3"`,
/// `"-2.5"`). Empty, partial-numeric, and non-finite input stays a string.
pub(crate) fn parse_number(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    token.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn as_integer(n: f64) -> Option<i64> {
    // 2^53 bounds the exactly-representable integers.
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= 9_007_199_254_740_992.0 {
        Some(n as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_tokens_parse_as_numbers() {
        assert_eq!(parse_number("3"), Some(3.0));
        assert_eq!(parse_number("-2.5"), Some(-2.5));
        assert_eq!(parse_number("+5"), Some(5.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(" 42 "), Some(42.0));
    }

    #[test]
    fn partial_and_non_finite_tokens_stay_strings() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("123abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1e999"), None);
    }

    #[test]
    fn tokens_render_without_trailing_point() {
        assert_eq!(Value::Number(3.0).to_token(), "3");
        assert_eq!(Value::Number(3.5).to_token(), "3.5");
        assert_eq!(Value::Bool(true).to_token(), "true");
        assert_eq!(Value::Str("abc".to_string()).to_token(), "abc");
    }

    #[test]
    fn whole_numbers_export_as_json_integers() {
        assert_eq!(serde_json::Value::from(Value::Number(3.0)), serde_json::json!(3));
        assert_eq!(serde_json::Value::from(Value::Number(0.5)), serde_json::json!(0.5));
        assert_eq!(serde_json::Value::from(Value::Null), serde_json::Value::Null);
    }
}
