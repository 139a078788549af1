//! Tolerant extraction of structured data from model output.
//!
//! Providers wrap JSON in prose, markdown fences, or both. Every caller in
//! the workspace goes through [`parse_structured_response`] so the tolerance
//! rules are defined exactly once.

use serde_json::Value;

use crate::backend::traits::LlmError;

/// Extract the first well-formed JSON array or object from model output.
///
/// Order of attempts: direct parse of the trimmed text; content of a
/// markdown code fence; the first balanced `[...]` or `{...}` found by
/// bracket matching (string- and escape-aware).
pub fn parse_structured_response(text: &str) -> Result<Value, LlmError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    if let Some(fenced) = fenced_block(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(fenced.trim()) {
            return Ok(value);
        }
    }

    if let Some(candidate) = first_balanced(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            return Ok(value);
        }
    }

    let preview: String = trimmed.chars().take(120).collect();
    Err(LlmError::ParseError(format!(
        "no well-formed JSON in response: {preview}"
    )))
}

/// Content of the first ``` fence, with an optional language tag skipped.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

/// Slice of the first balanced bracket pair, respecting JSON strings.
fn first_balanced(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let bytes = text.as_bytes();
    let open = bytes[start];
    let close = if open == b'[' { b']' } else { b'}' };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            _ if b == open => depth += 1,
            _ if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let value = parse_structured_response(r#"{"judgment": "consistent"}"#).unwrap();
        assert_eq!(value["judgment"], "consistent");
    }

    #[test]
    fn strips_markdown_fences() {
        let text = "Here you go:\n```json\n[{\"id\": \"c1\"}]\n```\nHope that helps!";
        let value = parse_structured_response(text).unwrap();
        assert_eq!(value[0]["id"], "c1");
    }

    #[test]
    fn finds_json_inside_prose() {
        let text = "The claims I extracted are {\"claims\": [\"a\", \"b\"]} as requested.";
        let value = parse_structured_response(text).unwrap();
        assert_eq!(value["claims"][0], "a");
    }

    #[test]
    fn brackets_inside_strings_do_not_confuse_matching() {
        let text = r#"Result: {"rationale": "uses } and ] freely", "ok": true} done"#;
        let value = parse_structured_response(text).unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn prose_without_json_is_a_parse_error() {
        let err = parse_structured_response("I cannot answer that.").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn empty_text_is_empty_response() {
        assert!(matches!(
            parse_structured_response("   "),
            Err(LlmError::EmptyResponse)
        ));
    }
}
