//! Parse-or-fallback handling of raw generator output.

/// Returned when the generator output cannot be used.
pub const FALLBACK_SUGGESTION: &str = "Ops! Tente novamente.";

/// Outcome of parsing generator output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSuggestions {
    pub suggestions: Vec<String>,
    /// True when the fallback replaced unusable output.
    pub fell_back: bool,
}

/// Parses a JSON array of strings, capped at `max`.
///
/// Markdown code fences around the array are tolerated. Non-string items and
/// blank strings are dropped. Anything unusable yields the fallback.
pub fn parse_suggestions(raw: &str, max: usize) -> ParsedSuggestions {
    let body = strip_code_fence(raw.trim());

    let parsed = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| match value {
            serde_json::Value::Array(items) => Some(items),
            _ => None,
        })
        .map(|items| {
            items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(text) => Some(text.trim().to_string()),
                    _ => None,
                })
                .filter(|text| !text.is_empty())
                .take(max)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if parsed.is_empty() {
        return ParsedSuggestions {
            suggestions: vec![FALLBACK_SUGGESTION.to_string()],
            fell_back: true,
        };
    }

    ParsedSuggestions {
        suggestions: parsed,
        fell_back: false,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_array() {
        let parsed = parse_suggestions(r#"["oi", "tudo bem?"]"#, 4);
        assert_eq!(parsed.suggestions, vec!["oi", "tudo bem?"]);
        assert!(!parsed.fell_back);
    }

    #[test]
    fn caps_to_max() {
        let parsed = parse_suggestions(r#"["a","b","c","d","e","f"]"#, 4);
        assert_eq!(parsed.suggestions.len(), 4);
        assert_eq!(parsed.suggestions[3], "d");
    }

    #[test]
    fn strips_markdown_fence() {
        let raw = "```json\n[\"a\", \"b\"]\n```";
        assert_eq!(parse_suggestions(raw, 4).suggestions, vec!["a", "b"]);
    }

    #[test]
    fn drops_non_strings_and_blanks() {
        let parsed = parse_suggestions(r#"["a", 3, null, "  ", {"x":1}, "b"]"#, 4);
        assert_eq!(parsed.suggestions, vec!["a", "b"]);
    }

    #[test]
    fn invalid_json_falls_back() {
        let parsed = parse_suggestions("Sure! Here are some ideas: ...", 4);
        assert_eq!(parsed.suggestions, vec![FALLBACK_SUGGESTION]);
        assert!(parsed.fell_back);
    }

    #[test]
    fn non_array_falls_back() {
        let parsed = parse_suggestions(r#"{"suggestions": ["a"]}"#, 4);
        assert!(parsed.fell_back);
    }

    #[test]
    fn empty_array_falls_back() {
        assert!(parse_suggestions("[]", 4).fell_back);
    }
}
