//! Pulling a JSON object out of free-form model output.

/// Remove markdown code-fence markers (```` ```json ```` and ```` ``` ````).
pub fn strip_code_fences(text: &str) -> String {
    text.trim()
        .replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// The span from the first `{` to the last `}` after fence stripping,
/// or `None` when the output holds no brace-delimited object.
pub fn extract_json_object(text: &str) -> Option<String> {
    let cleaned = strip_code_fences(text);
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    Some(cleaned[start..=end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_raw() {
        let input = r#"{"action": "none"}"#;
        assert_eq!(extract_json_object(input).unwrap(), input);
    }

    #[test]
    fn extract_json_code_block() {
        let input = "```json\n{\"action\": \"create_invoice\", \"confidence\": 0.95}\n```";
        assert_eq!(
            extract_json_object(input).unwrap(),
            r#"{"action": "create_invoice", "confidence": 0.95}"#
        );
    }

    #[test]
    fn extract_json_with_prefix_and_suffix() {
        let input = "Sure! Here it is: {\"action\": \"none\"} Hope that helps.";
        assert_eq!(extract_json_object(input).unwrap(), r#"{"action": "none"}"#);
    }

    #[test]
    fn extract_spans_nested_objects_greedily() {
        let input = r#"{"client_id": "ACME", "line_items": [{"cost": 50}]}"#;
        assert_eq!(extract_json_object(input).unwrap(), input);
    }

    #[test]
    fn prose_has_no_object() {
        assert_eq!(extract_json_object("I think you should restart the router."), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }
}
