//! Tolerant JSON extraction from model output.
//!
//! Output that is *supposed* to contain one JSON object usually arrives
//! wrapped in prose or markdown fences. [`extract_json`] scans for
//! candidates in layers — fenced ```` ```json ```` blocks first, then
//! balanced brace spans — and returns the first candidate that parses,
//! retrying each once with ASCII control characters stripped. Absence of
//! JSON is a result (`None`), never an error.
//!
//! The brace fallback walks a string-aware depth scanner rather than a
//! non-greedy pattern, so an object that nests further objects or arrays
//! is extracted whole.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    // Fenced blocks tagged as JSON; dot matches newline, non-greedy.
    static ref FENCED_JSON: Regex = Regex::new(r"(?s)```json(.*?)```").unwrap();
}

/// Extract the first parseable JSON value embedded in `text`.
///
/// Fenced candidates are preferred; brace-delimited spans are last-resort
/// salvage. Candidates are tried left to right and the first success wins.
pub fn extract_json(text: &str) -> Option<Value> {
    let fenced = fenced_candidates(text);
    let candidates = if fenced.is_empty() {
        brace_candidates(text)
    } else {
        fenced
    };

    for candidate in candidates {
        let candidate = candidate.trim();
        if let Ok(value) = serde_json::from_str(candidate) {
            return Some(value);
        }
        // Stray control characters (raw newlines inside string literals,
        // NULs from truncated generations) break strict parsing; strip
        // and retry once per candidate.
        let cleaned = strip_control_chars(candidate);
        if let Ok(value) = serde_json::from_str(&cleaned) {
            return Some(value);
        }
    }

    None
}

/// All ```json fenced bodies, left to right.
fn fenced_candidates(text: &str) -> Vec<&str> {
    FENCED_JSON
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// All outermost balanced `{...}` spans, left to right.
fn brace_candidates(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(end) = matching_brace(text, i) {
                spans.push(&text[i..=end]);
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }
    spans
}

/// Find the `}` closing the `{` at byte offset `start`.
///
/// Braces inside quoted strings are ignored so spans like
/// `{"note": "use {braces} sparingly"}` scan correctly. Returns `None`
/// for an unbalanced span.
fn matching_brace(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth: u32 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Remove ASCII control characters (0x00–0x1F and 0x7F).
fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| !((c as u32) <= 0x1F || c as u32 == 0x7F))
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fenced_block_extracts() {
        let text = r#"```json{"key": "value"}```"#;
        assert_eq!(extract_json(text), Some(json!({"key": "value"})));
    }

    #[test]
    fn test_fenced_block_with_surrounding_prose() {
        let text = "Here is the plan:\n```json\n{\"steps\": [1, 2]}\n```\nLet me know.";
        assert_eq!(extract_json(text), Some(json!({"steps": [1, 2]})));
    }

    #[test]
    fn test_brace_fallback_in_prose() {
        let text = r#"Text {"a": 1, "b": 2} more text"#;
        assert_eq!(extract_json(text), Some(json!({"a": 1, "b": 2})));
    }

    #[test]
    fn test_no_json_returns_none() {
        assert_eq!(extract_json("No JSON"), None);
        assert_eq!(extract_json(""), None);
    }

    #[test]
    fn test_control_characters_are_stripped_on_retry() {
        let text = "```json\n{\"key\": \"val\u{0000}ue\"}\n```";
        let cleaned = "{\"key\": \"value\"}";
        assert_eq!(
            extract_json(text),
            Some(serde_json::from_str(cleaned).unwrap())
        );
    }

    #[test]
    fn test_nested_object_extracts_whole() {
        let text = r#"Result: {"outer": {"inner": 1}, "list": [{"x": 2}]} done"#;
        assert_eq!(
            extract_json(text),
            Some(json!({"outer": {"inner": 1}, "list": [{"x": 2}]}))
        );
    }

    #[test]
    fn test_braces_inside_strings_do_not_break_the_scan() {
        let text = r#"{"note": "use {braces} sparingly"}"#;
        assert_eq!(
            extract_json(text),
            Some(json!({"note": "use {braces} sparingly"}))
        );
    }

    #[test]
    fn test_first_parseable_candidate_wins() {
        let text = "```json not json at all ``` then ```json {\"second\": true} ```";
        assert_eq!(extract_json(text), Some(json!({"second": true})));
    }

    #[test]
    fn test_fenced_preferred_over_earlier_brace_span() {
        let text = "{\"loose\": 1} and ```json {\"fenced\": 2} ```";
        assert_eq!(extract_json(text), Some(json!({"fenced": 2})));
    }

    #[test]
    fn test_unbalanced_prefix_still_salvages_inner_object() {
        let text = r#"broken { start, but {"a": 1} survives"#;
        assert_eq!(extract_json(text), Some(json!({"a": 1})));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = r#"Answer: {"name": "test", "values": [1, 2, 3]}"#;
        let first = extract_json(text).unwrap();
        let refenced = format!("```json\n{}\n```", serde_json::to_string(&first).unwrap());
        let second = extract_json(&refenced).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let text = r#"{"quote": "he said \"hi\" twice"}"#;
        assert_eq!(
            extract_json(text),
            Some(json!({"quote": "he said \"hi\" twice"}))
        );
    }
}
