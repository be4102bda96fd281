use serde::{Deserialize, Serialize};

/// Request body for the reasoning endpoint.
#[derive(Debug, Serialize)]
pub struct ReasoningRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub system: &'a str,
    pub messages: Vec<ReasoningMessage<'a>>,
}

impl<'a> ReasoningRequest<'a> {
    /// Single-turn request: one system prompt, one user message.
    pub fn single_turn(model: &'a str, max_tokens: u32, system: &'a str, user: &'a str) -> Self {
        Self {
            model,
            max_tokens,
            system,
            messages: vec![ReasoningMessage {
                role: "user",
                content: user,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReasoningMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Successful response body.
#[derive(Debug, Deserialize)]
pub struct ReasoningResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl ReasoningResponse {
    /// Text of the first `text` block, if that block carries non-empty text.
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text.as_deref())
            .filter(|text| !text.is_empty())
    }
}

/// Strip a leading ```` ```json ```` / ```` ``` ```` and a trailing ```` ``` ````.
pub fn strip_code_fences(text: &str) -> String {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_expected_shape() {
        let req = ReasoningRequest::single_turn("m", 2048, "sys", "hello");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "m",
                "max_tokens": 2048,
                "system": "sys",
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[test]
    fn first_text_skips_non_text_blocks() {
        let resp: ReasoningResponse = serde_json::from_str(
            r#"{"content":[{"type":"thinking"},{"type":"text","text":"hi"}],"stop_reason":"end_turn"}"#,
        )
        .unwrap();
        assert_eq!(resp.first_text(), Some("hi"));
        assert_eq!(resp.stop_reason.as_deref(), Some("end_turn"));
    }

    #[test]
    fn first_text_requires_non_empty_text() {
        let empty: ReasoningResponse =
            serde_json::from_str(r#"{"content":[{"type":"text","text":""},{"type":"text","text":"later"}]}"#)
                .unwrap();
        assert_eq!(empty.first_text(), None);

        let missing: ReasoningResponse =
            serde_json::from_str(r#"{"content":[{"type":"text"}]}"#).unwrap();
        assert_eq!(missing.first_text(), None);

        let none: ReasoningResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert_eq!(none.first_text(), None);
    }

    #[test]
    fn strips_json_fence() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(strip_code_fences("  ```\n{\"a\":1}```  "), "{\"a\":1}");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fences("  {\"a\":1}\n"), "{\"a\":1}");
        assert_eq!(strip_code_fences("Here: {\"a\":1}"), "Here: {\"a\":1}");
    }
}
