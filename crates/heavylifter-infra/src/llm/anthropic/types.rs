//! Anthropic Messages API types.
//!
//! These are Anthropic-specific request/response structures used for HTTP
//! communication with the Messages API. They are NOT the generic LLM types
//! from heavylifter-types -- those are provider-agnostic.

use serde::{Deserialize, Serialize};

use heavylifter_types::llm::{CompletionRequest, CompletionResponse, StopReason, Usage};

/// Request body for the Anthropic Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

/// A single message in an Anthropic conversation.
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

impl AnthropicMessage {
    /// Messages of a generic request, in order.
    pub fn from_request(request: &CompletionRequest) -> Vec<Self> {
        request
            .messages
            .iter()
            .map(|m| AnthropicMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect()
    }
}

/// A content block in an Anthropic response.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    /// Tool use, thinking and anything newer carry no answer text.
    #[serde(other)]
    Other,
}

/// Token usage from Anthropic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnthropicUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicErrorBody {
    pub error: AnthropicError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

/// Non-streaming response from the Messages API (also returned by Bedrock).
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse {
    pub id: String,
    pub content: Vec<AnthropicContentBlock>,
    pub model: String,
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: AnthropicUsage,
}

impl AnthropicResponse {
    /// Join text blocks and map the stop reason.
    pub fn into_completion(self) -> CompletionResponse {
        let content = self
            .content
            .iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text.as_str()),
                AnthropicContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        let stop_reason = match self.stop_reason.as_deref() {
            Some("tool_use") => StopReason::ToolUse,
            Some("max_tokens") => StopReason::MaxTokens,
            Some("stop_sequence") => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        };

        CompletionResponse {
            id: self.id,
            content,
            model: self.model,
            stop_reason,
            usage: Usage {
                input_tokens: self.usage.input_tokens,
                output_tokens: self.usage.output_tokens,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_request_serialization() {
        let req = AnthropicRequest {
            model: "claude-3-5-sonnet-20240620".to_string(),
            max_tokens: 1024,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            system: None,
            temperature: Some(0.0),
            stop_sequences: Some(vec!["\nSQLResult:".to_string()]),
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "claude-3-5-sonnet-20240620");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["stop_sequences"][0], "\nSQLResult:");
        assert!(json.get("system").is_none());
        assert!(json.get("stream").is_none());
    }

    #[test]
    fn test_response_joins_text_blocks() {
        let json = r#"{
            "id": "msg_456",
            "content": [
                {"type": "text", "text": "SELECT "},
                {"type": "tool_use", "id": "t1", "name": "calc", "input": {}},
                {"type": "text", "text": "1"}
            ],
            "model": "claude-3-5-sonnet-20240620",
            "stop_reason": "stop_sequence",
            "usage": {"input_tokens": 50, "output_tokens": 20}
        }"#;
        let resp: AnthropicResponse = serde_json::from_str(json).unwrap();
        let completion = resp.into_completion();
        assert_eq!(completion.id, "msg_456");
        assert_eq!(completion.content, "SELECT 1");
        assert_eq!(completion.stop_reason, StopReason::StopSequence);
        assert_eq!(completion.usage.input_tokens, 50);
    }

    #[test]
    fn test_unknown_stop_reason_is_end_turn() {
        let json = r#"{"id": "m", "content": [], "model": "x", "stop_reason": "pause_turn"}"#;
        let resp: AnthropicResponse = serde_json::from_str(json).unwrap();
        let completion = resp.into_completion();
        assert_eq!(completion.stop_reason, StopReason::EndTurn);
        assert_eq!(completion.content, "");
        assert_eq!(completion.usage.output_tokens, 0);
    }

    #[test]
    fn test_error_body_deserialization() {
        let json = r#"{"type": "error", "error": {"type": "overloaded_error", "message": "Server busy"}}"#;
        let body: AnthropicErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.error.error_type, "overloaded_error");
        assert_eq!(body.error.message, "Server busy");
    }
}
