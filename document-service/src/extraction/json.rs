//! Pulls a JSON object out of free-form model output.

/// Body of the first fenced code block, or the whole text when there is none.
pub fn strip_code_fence(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text.trim();
    };
    let after_open = &text[open + 3..];
    // Skip the info string (`json`, `JSON`, ...) up to the end of the line.
    let body_start = match after_open.find('\n') {
        Some(i) if !after_open[..i].contains(|c: char| c == '{' || c == '`') => i + 1,
        _ => 0,
    };
    let body = &after_open[body_start..];
    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// The first balanced `{...}` object in `text`, after fence stripping.
///
/// Braces inside string literals (including escaped quotes) are ignored.
/// Returns `None` when no object opens or the first one never closes.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let body = strip_code_fence(text);
    let start = body.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in body[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&body[start..start + offset + 1]);
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
    fn strips_json_fence() {
        let text = "Here you go:\n```json\n{\"a\": 1}\n```\nThanks";
        assert_eq!(strip_code_fence(text), "{\"a\": 1}");
    }

    #[test]
    fn single_line_fence() {
        let text = "```{\"a\": 1}```\nmore text";
        assert_eq!(strip_code_fence(text), "{\"a\": 1}");
    }

    #[test]
    fn plain_text_is_trimmed() {
        assert_eq!(strip_code_fence("  {\"a\": 1} \n"), "{\"a\": 1}");
    }

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let text = "Sure! {\"document_type\": \"Tax Invoice\"} Let me know.";
        assert_eq!(
            extract_json_object(text),
            Some("{\"document_type\": \"Tax Invoice\"}")
        );
    }

    #[test]
    fn nested_objects_stay_whole() {
        let text = "{\"extracted_data\": {\"total_amount\": 10}, \"compliance_flags\": []} trailing }";
        assert_eq!(
            extract_json_object(text),
            Some("{\"extracted_data\": {\"total_amount\": 10}, \"compliance_flags\": []}")
        );
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let text = r#"{"issue": "Missing } brace \" quote {", "severity": "low"}"#;
        let extracted = extract_json_object(text).unwrap();
        assert_eq!(extracted, text);
        assert!(serde_json::from_str::<serde_json::Value>(extracted).is_ok());
    }

    #[test]
    fn only_the_first_object_is_returned() {
        let text = "{\"a\": 1}\n{\"b\": 2}";
        assert_eq!(extract_json_object(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn unbalanced_or_missing_object_is_none() {
        assert_eq!(extract_json_object("{\"a\": {\"b\": 1}"), None);
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object(""), None);
    }

    #[test]
    fn unterminated_fence_still_yields_object() {
        let text = "```json\n{\"a\": [1, 2]}";
        assert_eq!(extract_json_object(text), Some("{\"a\": [1, 2]}"));
    }
}
