//! Extraction strategies for heterogeneous provider responses.
//!
//! The same logical provider has shipped several wire formats over time
//! (native binding envelope, REST via gateway, OpenAI-compatible
//! gateway endpoint), so adapters never assume a single shape. Each
//! strategy is a pure function from raw response JSON to an optional
//! answer; an adapter tries its list in priority order and treats the
//! response as unusable only when every strategy returns `None`.
//!
//! A strategy that finds its field returns whatever string is there,
//! including the empty string. "Field present but empty" is a valid
//! (if useless) provider answer; "field absent" means this shape does
//! not apply.

use serde_json::Value;

/// One attempt at pulling answer text out of response JSON.
pub type Strategy = fn(&Value) -> Option<String>;

/// Try `strategies` in order, returning the first match.
pub fn first_match(json: &Value, strategies: &[Strategy]) -> Option<String> {
    strategies.iter().find_map(|strategy| strategy(json))
}

/// `result.response` — Workers AI REST envelope.
pub fn result_response(json: &Value) -> Option<String> {
    json.get("result")?
        .get("response")?
        .as_str()
        .map(str::to_string)
}

/// Bare `response` — Workers AI native binding shape.
pub fn bare_response(json: &Value) -> Option<String> {
    json.get("response")?.as_str().map(str::to_string)
}

/// `choices[0].message.content` — OpenAI-compatible chat shape.
pub fn chat_choice(json: &Value) -> Option<String> {
    json.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

/// `candidates[0].content.parts[].text` — Gemini-family shape.
///
/// Non-empty text parts are joined with a blank line. A candidate whose
/// parts are all empty or missing is treated as no match, so the
/// adapter can report the response as unusable instead of answering
/// with nothing.
pub fn gemini_candidates(json: &Value) -> Option<String> {
    let parts = json
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let texts: Vec<&str> = parts
        .iter()
        .filter_map(|part| part.get("text")?.as_str())
        .filter(|text| !text.is_empty())
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_response_matches_rest_envelope() {
        let json = json!({"result": {"response": "four"}});
        assert_eq!(result_response(&json), Some("four".to_string()));
    }

    #[test]
    fn result_response_matches_empty_string() {
        let json = json!({"result": {"response": ""}});
        assert_eq!(result_response(&json), Some(String::new()));
    }

    #[test]
    fn result_response_ignores_other_shapes() {
        assert_eq!(result_response(&json!({"response": "four"})), None);
        assert_eq!(result_response(&json!({"result": {"response": 4}})), None);
    }

    #[test]
    fn bare_response_matches_binding_shape() {
        let json = json!({"response": "four"});
        assert_eq!(bare_response(&json), Some("four".to_string()));
    }

    #[test]
    fn chat_choice_matches_openai_shape() {
        let json = json!({
            "choices": [{"message": {"role": "assistant", "content": "four"}}]
        });
        assert_eq!(chat_choice(&json), Some("four".to_string()));
    }

    #[test]
    fn chat_choice_requires_first_choice() {
        assert_eq!(chat_choice(&json!({"choices": []})), None);
    }

    #[test]
    fn gemini_joins_parts_with_blank_line() {
        let json = json!({
            "candidates": [{"content": {"parts": [
                {"text": "first"},
                {"text": "second"}
            ]}}]
        });
        assert_eq!(
            gemini_candidates(&json),
            Some("first\n\nsecond".to_string())
        );
    }

    #[test]
    fn gemini_skips_empty_and_textless_parts() {
        let json = json!({
            "candidates": [{"content": {"parts": [
                {"text": ""},
                {"inlineData": {"mimeType": "image/png"}},
                {"text": "kept"}
            ]}}]
        });
        assert_eq!(gemini_candidates(&json), Some("kept".to_string()));
    }

    #[test]
    fn gemini_all_empty_parts_is_no_match() {
        let json = json!({
            "candidates": [{"content": {"parts": [{"text": ""}]}}]
        });
        assert_eq!(gemini_candidates(&json), None);
    }

    #[test]
    fn first_match_respects_priority_order() {
        let json = json!({
            "result": {"response": "from envelope"},
            "response": "bare"
        });
        let strategies: &[Strategy] = &[result_response, bare_response];
        assert_eq!(
            first_match(&json, strategies),
            Some("from envelope".to_string())
        );
    }

    #[test]
    fn first_match_falls_through_to_later_strategies() {
        let json = json!({"response": "bare"});
        let strategies: &[Strategy] = &[result_response, bare_response];
        assert_eq!(first_match(&json, strategies), Some("bare".to_string()));
    }

    #[test]
    fn first_match_none_when_nothing_applies() {
        let strategies: &[Strategy] = &[result_response, bare_response, chat_choice];
        assert_eq!(first_match(&json!({"unrelated": true}), strategies), None);
    }
}
