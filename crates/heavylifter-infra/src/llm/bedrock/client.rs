//! Claude on AWS Bedrock through the runtime `invoke` action.
//!
//! Authenticates with a Bedrock API key sent as a Bearer token. The body is
//! the Anthropic Messages shape plus `anthropic_version`.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use heavylifter_core::llm::provider::LlmProvider;
use heavylifter_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use super::super::anthropic::types::{AnthropicMessage, AnthropicResponse};
use super::super::error_from_response;
use super::types::BedrockRequest;

/// Bedrock-hosted Claude. The bearer token is only exposed when building
/// the `Authorization` header.
pub struct BedrockProvider {
    client: reqwest::Client,
    api_key: SecretString,
    region: String,
    model_id: String,
    endpoint: String,
}

impl BedrockProvider {
    const API_VERSION: &'static str = "bedrock-2023-05-31";

    /// Bedrock API keys are handed out with this prefix; the token follows it.
    const KEY_PREFIX: &'static str = "bedrock-api-key-";

    /// `model` may be a bare Claude name or a full Bedrock model ID.
    ///
    /// The token is a base64 presigned URL; when its credential scope names a
    /// region, that region replaces `region`.
    pub fn new(api_key: SecretString, model: String, region: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("failed to create reqwest client");

        let raw_key = api_key.expose_secret().to_string();
        let token_part = raw_key.strip_prefix(Self::KEY_PREFIX).unwrap_or(&raw_key);
        let effective_region = Self::detect_region_from_token(token_part).unwrap_or(region);

        let bearer_token = SecretString::from(token_part.to_string());
        let model_id = Self::to_bedrock_model_id(&model, &effective_region);
        let endpoint = format!("https://bedrock-runtime.{effective_region}.amazonaws.com");

        Self {
            client,
            api_key: bearer_token,
            region: effective_region,
            model_id,
            endpoint,
        }
    }

    /// Send requests to `endpoint` instead of the regional runtime host.
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Region from the credential scope of the decoded token, which reads:
    /// `bedrock.amazonaws.com/?...&X-Amz-Credential=AKIA...%2F20260212%2Fus-east-1%2Fbedrock%2Faws4_request&...`
    fn detect_region_from_token(token: &str) -> Option<String> {
        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD.decode(token).ok()?;
        let text = String::from_utf8(decoded).ok()?;

        let cred_start = text.find("X-Amz-Credential=")?;
        let cred_value = &text[cred_start + "X-Amz-Credential=".len()..];
        let cred_value = cred_value.split('&').next().unwrap_or(cred_value);
        let cred_value = cred_value.replace("%2F", "/").replace("%2f", "/");
        // <access-key>/<date>/<region>/<service>/aws4_request
        let region = cred_value.split('/').nth(2)?;
        if region.is_empty() {
            return None;
        }
        tracing::info!(region = %region, "Using region from Bedrock token");
        Some(region.to_string())
    }

    /// Bare Claude names become cross-region inference profile IDs; anything
    /// with a `.` is assumed to be an ID already.
    ///
    /// ```text
    /// ("claude-3-5-sonnet-20240620", "eu-west-1") → "eu.anthropic.claude-3-5-sonnet-20240620-v1:0"
    /// ("claude-3-5-sonnet-20240620", "us-east-1") → "us.anthropic.claude-3-5-sonnet-20240620-v1:0"
    /// ("anthropic.claude-3-5-sonnet-20240620-v1:0", _) → unchanged
    /// ```
    pub fn to_bedrock_model_id(model: &str, region: &str) -> String {
        if model.contains('.') {
            model.to_string()
        } else {
            let region_prefix = region.split('-').next().unwrap_or("us");
            format!("{region_prefix}.anthropic.{model}-v1:0")
        }
    }

    fn url(&self) -> String {
        format!("{}/model/{}/invoke", self.endpoint, self.model_id)
    }

    fn to_bedrock_request(&self, request: &CompletionRequest) -> BedrockRequest {
        BedrockRequest {
            anthropic_version: Self::API_VERSION.to_string(),
            max_tokens: request.max_tokens,
            messages: AnthropicMessage::from_request(request),
            system: request.system.clone(),
            temperature: request.temperature,
            stop_sequences: request.stop_sequences.clone(),
        }
    }
}

impl LlmProvider for BedrockProvider {
    fn name(&self) -> &str {
        "bedrock"
    }

    fn model(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_bedrock_request(request);
        let url = self.url();

        tracing::debug!(url = %url, model_id = %self.model_id, region = %self.region, "Bedrock invoke request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key.expose_secret()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(error_from_response(self.name(), response).await);
        }

        let bedrock_resp: AnthropicResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        Ok(bedrock_resp.into_completion())
    }
}
