//! Parsing of the `client` subcommand's trailing tokens.
//!
//! The first token (if any) is the tool name; everything after it must be a
//! `key=value` pair. Values are coerced best-effort to JSON types, mirroring
//! what a human would mean on a shell: `true`/`false`, `null`/`none`,
//! integers, floats, else a plain string.

use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::ClientError;

fn int_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^-?\d+$").expect("valid regex"))
}

fn float_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^-?\d+\.\d*$").expect("valid regex"))
}

/// Best-effort conversion of a CLI string to a JSON value
pub fn coerce(value: &str) -> Value {
    let lower = value.to_lowercase();
    if lower == "true" || lower == "false" {
        return Value::Bool(lower == "true");
    }
    if lower == "null" || lower == "none" {
        return Value::Null;
    }
    if int_re().is_match(value) {
        if let Ok(n) = value.parse::<i64>() {
            return Value::from(n);
        }
    }
    if float_re().is_match(value) {
        if let Ok(f) = value.parse::<f64>() {
            return Value::from(f);
        }
    }
    Value::String(value.to_string())
}

/// Split trailing CLI tokens into an optional tool name and its arguments.
///
/// Reports malformed tokens before any network call is attempted.
pub fn parse_invocation(
    tokens: &[String],
) -> Result<(Option<String>, Map<String, Value>), ClientError> {
    let mut params = Map::new();
    let Some((tool, rest)) = tokens.split_first() else {
        return Ok((None, params));
    };

    for token in rest {
        let Some((key, value)) = token.split_once('=') else {
            return Err(ClientError::BadParameter(token.clone()));
        };
        if key.is_empty() {
            return Err(ClientError::BadParameter(token.clone()));
        }
        params.insert(key.to_string(), coerce(value));
    }

    Ok((Some(tool.clone()), params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_booleans_and_null() {
        assert_eq!(coerce("true"), json!(true));
        assert_eq!(coerce("FALSE"), json!(false));
        assert_eq!(coerce("null"), Value::Null);
        assert_eq!(coerce("None"), Value::Null);
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(coerce("5"), json!(5));
        assert_eq!(coerce("-42"), json!(-42));
        assert_eq!(coerce("3.14"), json!(3.14));
        assert_eq!(coerce("2."), json!(2.0));
    }

    #[test]
    fn test_coerce_strings() {
        assert_eq!(coerce("foo"), json!("foo"));
        assert_eq!(coerce("1.2.3"), json!("1.2.3"));
        assert_eq!(coerce(""), json!(""));
    }

    #[test]
    fn test_parse_invocation_empty() {
        let (tool, params) = parse_invocation(&[]).unwrap();
        assert!(tool.is_none());
        assert!(params.is_empty());
    }

    #[test]
    fn test_parse_invocation_tool_only() {
        let tokens = vec!["add".to_string()];
        let (tool, params) = parse_invocation(&tokens).unwrap();
        assert_eq!(tool.as_deref(), Some("add"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_parse_invocation_with_args() {
        let tokens: Vec<String> = ["add", "a=5", "b=3"].iter().map(|s| s.to_string()).collect();
        let (tool, params) = parse_invocation(&tokens).unwrap();
        assert_eq!(tool.as_deref(), Some("add"));
        assert_eq!(params.get("a"), Some(&json!(5)));
        assert_eq!(params.get("b"), Some(&json!(3)));
    }

    #[test]
    fn test_parse_invocation_rejects_bad_token() {
        let tokens: Vec<String> = ["add", "a5"].iter().map(|s| s.to_string()).collect();
        let err = parse_invocation(&tokens).unwrap_err();
        assert!(matches!(err, ClientError::BadParameter(t) if t == "a5"));
    }

    #[test]
    fn test_parse_invocation_keeps_equals_in_value() {
        let tokens: Vec<String> = ["echo", "msg=a=b"].iter().map(|s| s.to_string()).collect();
        let (_, params) = parse_invocation(&tokens).unwrap();
        assert_eq!(params.get("msg"), Some(&json!("a=b")));
    }
}
