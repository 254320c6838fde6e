//! Helpers for loosely typed API payloads and timestamps.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Name of a JSON value's kind, for error messages.
pub fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// False for `null`, `false`, `0`, `""`, `[]` and `{}`.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(m) => !m.is_empty(),
    }
}

/// Convert an id field to an integer.
///
/// The v7 API sends ids as numeric strings; older payloads use numbers.
/// Floats are truncated. Booleans and anything else are rejected.
pub fn as_int(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Strings as-is, other non-null values as their JSON rendering.
pub fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parse ISO 8601 time string.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim().trim_end_matches('Z').trim_end_matches('z');
    let parsed = chrono::DateTime::parse_from_rfc3339(&format!("{}Z", s))
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(s))
        .map_err(|e| e.to_string())?;
    Ok(parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_int() {
        assert_eq!(as_int(&json!(10)), Some(10));
        assert_eq!(as_int(&json!("281474976710706")), Some(281474976710706));
        assert_eq!(as_int(&json!(" 7 ")), Some(7));
        assert_eq!(as_int(&json!(3.9)), Some(3));
        assert_eq!(as_int(&json!("x")), None);
        assert_eq!(as_int(&json!("1.5")), None);
        assert_eq!(as_int(&json!(true)), None);
        assert_eq!(as_int(&json!(null)), None);
        assert_eq!(as_int(&json!([1])), None);
    }

    #[test]
    fn test_is_truthy() {
        for v in [json!(null), json!(false), json!(0), json!(""), json!([]), json!({})] {
            assert!(!is_truthy(&v), "{} should be falsy", v);
        }
        for v in [json!(true), json!(1), json!("a"), json!([0]), json!({"a": 1})] {
            assert!(is_truthy(&v), "{} should be truthy", v);
        }
    }

    #[test]
    fn test_as_text() {
        assert_eq!(as_text(&json!("ok")), Some("ok".to_string()));
        assert_eq!(as_text(&json!(3)), Some("3".to_string()));
        assert_eq!(as_text(&json!(null)), None);
    }

    #[test]
    fn test_parse_time() {
        let t = parse_time("2025-04-29T00:00:00Z").unwrap();
        assert_eq!(t.to_rfc3339(), "2025-04-29T00:00:00+00:00");
        let t = parse_time("2025-04-29T02:00:00+02:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2025-04-29T00:00:00+00:00");
        assert!(parse_time("yesterday").is_err());
    }
}
