//! AWS Bedrock request types.
//!
//! Bedrock uses the same Claude Messages API JSON format as the direct
//! Anthropic API, but with two differences:
//! - The `model` field is omitted from the request body (it goes in the URL path).
//! - An `anthropic_version` field is required in the request body.
//!
//! The response is identical and reused from `super::anthropic::types`.

use serde::Serialize;

use super::super::anthropic::types::AnthropicMessage;

/// Request body for AWS Bedrock Claude `invoke`.
#[derive(Debug, Clone, Serialize)]
pub struct BedrockRequest {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}
