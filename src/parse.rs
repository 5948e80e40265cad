//! Tolerant extraction of JSON from language-model free text.
//!
//! Model responses are rarely pure JSON: they come wrapped in markdown
//! fences, preambles and trailing commentary. This module slices out the
//! bracketed payload and falls back to line-by-line key extraction when
//! strict parsing fails. Callers treat failure as "no structured answer,"
//! never as a fatal error.

use serde_json::Value;
use tracing::debug;

/// Why a structured answer could not be extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseFailure {
    pub reason: String,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

/// Extract a JSON value delimited by `start_symbol`/`end_symbol` from free
/// text.
///
/// Attempt 1 slices from the first `start_symbol` to the *last*
/// `end_symbol`. If strict parsing fails, attempt 2 retries with the
/// *first* `end_symbol` after the start, which handles trailing commentary
/// that itself contains the end symbol. If both attempts fail and
/// `required_keys` is non-empty, a line-by-line `key: value` scan is used
/// as a last resort for flat objects.
pub fn parse_bracketed(
    text: &str,
    start_symbol: char,
    end_symbol: char,
    required_keys: &[&str],
) -> Result<Value, ParseFailure> {
    let Some(start) = text.find(start_symbol) else {
        if !required_keys.is_empty() {
            if let Some(value) = scan_flat_object(text, required_keys) {
                return Ok(value);
            }
        }
        return Err(ParseFailure {
            reason: format!("no '{}' found in response", start_symbol),
        });
    };

    // Attempt 1: widest slice, first start to last end
    if let Some(end) = text.rfind(end_symbol) {
        if end > start {
            let slice = &text[start..=end];
            if let Ok(value) = serde_json::from_str::<Value>(slice) {
                return Ok(value);
            }
            debug!("Wide JSON slice failed to parse, retrying with tight slice");
        }
    }

    // Attempt 2: tightest slice, first end after the start
    if let Some(rel_end) = text[start..].find(end_symbol) {
        if rel_end > 0 {
            let slice = &text[start..=start + rel_end];
            if let Ok(value) = serde_json::from_str::<Value>(slice) {
                return Ok(value);
            }
            debug!("Tight JSON slice failed to parse");
        }
    }

    // Last resort: flat key/value scan for object-shaped answers
    if !required_keys.is_empty() {
        if let Some(value) = scan_flat_object(text, required_keys) {
            return Ok(value);
        }
    }

    Err(ParseFailure {
        reason: "no parseable JSON between symbols".to_string(),
    })
}

/// Scan text line by line for `key: value` pairs covering every required
/// key. Literal `true`/`false`/`null` tokens become the matching JSON
/// values; everything else is kept as a string.
fn scan_flat_object(text: &str, required_keys: &[&str]) -> Option<Value> {
    let mut map = serde_json::Map::new();

    for line in text.lines() {
        let line = line.trim().trim_matches(|c| c == '{' || c == '}' || c == ',');
        let Some((raw_key, raw_value)) = line.split_once(':') else {
            continue;
        };
        let key = raw_key.trim().trim_matches('"');
        if !required_keys.contains(&key) {
            continue;
        }
        let value_str = raw_value.trim().trim_matches(|c| c == '"' || c == ',');
        let value = match value_str {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            other => Value::String(other.to_string()),
        };
        map.insert(key.to_string(), value);
    }

    if required_keys.iter().all(|k| map.contains_key(*k)) {
        Some(Value::Object(map))
    } else {
        None
    }
}

/// Convenience wrapper extracting a JSON array of strings.
pub fn parse_string_array(text: &str) -> Result<Vec<String>, ParseFailure> {
    let value = parse_bracketed(text, '[', ']', &[])?;
    let items = value.as_array().ok_or_else(|| ParseFailure {
        reason: "parsed value is not an array".to_string(),
    })?;
    Ok(items
        .iter()
        .filter_map(|v| v.as_str().map(|s| s.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_array() {
        let value = parse_bracketed(r#"["a", "b"]"#, '[', ']', &[]).unwrap();
        assert_eq!(value, serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_array_with_markdown_fences() {
        let text = "Here you go:\n```json\n[\"one\", \"two\"]\n```\nHope that helps!";
        let queries = parse_string_array(text).unwrap();
        assert_eq!(queries, vec!["one", "two"]);
    }

    #[test]
    fn test_trailing_commentary_with_end_symbol() {
        // The last ']' belongs to prose, so the wide slice fails and the
        // tight slice must recover the array
        let text = "[\"query one\"]\n\nSee also: notes[3] in the appendix";
        let queries = parse_string_array(text).unwrap();
        assert_eq!(queries, vec!["query one"]);
    }

    #[test]
    fn test_no_brackets_reports_failure() {
        let err = parse_bracketed("just plain prose", '[', ']', &[]).unwrap_err();
        assert!(err.reason.contains("no '['"));
    }

    #[test]
    fn test_flat_object_fallback() {
        let text = "Sure! Here is the result:\nname: Alice\nactive: true\nnote: null";
        let value = parse_bracketed(text, '{', '}', &["name", "active"]);
        // No braces at all, so only the fallback can succeed
        let value = value.unwrap();
        assert_eq!(value["name"], "Alice");
        assert_eq!(value["active"], Value::Bool(true));
    }

    #[test]
    fn test_flat_object_fallback_missing_key() {
        let text = "name: Alice";
        let result = parse_bracketed(text, '{', '}', &["name", "age"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_object_with_required_keys() {
        let text = r#"Answer: {"action": "reply", "say": true}"#;
        let value = parse_bracketed(text, '{', '}', &["action", "say"]).unwrap();
        assert_eq!(value["action"], "reply");
        assert_eq!(value["say"], Value::Bool(true));
    }
}
