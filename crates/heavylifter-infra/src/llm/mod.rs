//! LLM provider implementations.
//!
//! Contains concrete implementations of the [`LlmProvider`] trait defined in
//! `heavylifter-core`, plus a factory ([`create_provider`]) that builds the
//! configured one.
//!
//! [`LlmProvider`]: heavylifter_core::llm::provider::LlmProvider

pub mod anthropic;
pub mod bedrock;

use secrecy::SecretString;

use heavylifter_core::llm::box_provider::BoxLlmProvider;
use heavylifter_types::config::LlmConfig;
use heavylifter_types::llm::{LlmError, ProviderType};

use self::anthropic::AnthropicProvider;
use self::anthropic::types::AnthropicErrorBody;
use self::bedrock::BedrockProvider;

/// Create a [`BoxLlmProvider`] from the `[llm]` config section.
///
/// `api_key` is the Anthropic API key or the Bedrock bearer token, depending
/// on `config.provider`. `config.base_url` replaces the provider's endpoint.
pub fn create_provider(config: &LlmConfig, api_key: SecretString) -> BoxLlmProvider {
    match config.provider {
        ProviderType::Anthropic => {
            let mut provider = AnthropicProvider::new(api_key, config.model.clone());
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            BoxLlmProvider::new(provider)
        }
        ProviderType::Bedrock => {
            let mut provider =
                BedrockProvider::new(api_key, config.model.clone(), config.region.clone());
            if let Some(base_url) = &config.base_url {
                provider = provider.with_endpoint(base_url.clone());
            }
            BoxLlmProvider::new(provider)
        }
    }
}

/// Map a non-2xx response to an [`LlmError`].
///
/// 401/403 are authentication failures, 429 honours `retry-after` (seconds),
/// 529 is overload; anything else becomes a provider error with the body.
pub(crate) async fn error_from_response(provider: &str, response: reqwest::Response) -> LlmError {
    let status = response.status();
    let retry_after_ms = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| secs.saturating_mul(1000));
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<AnthropicErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);

    tracing::warn!(provider, status = %status, body = %message, "LLM API error response");

    match status.as_u16() {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited { retry_after_ms },
        529 => LlmError::Overloaded(message),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {message}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_anthropic() {
        let config = LlmConfig::default();
        let provider = create_provider(&config, SecretString::from("sk-test-key"));
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.model(), "claude-3-5-sonnet-20240620");
    }

    #[test]
    fn test_create_provider_bedrock() {
        let config = LlmConfig {
            provider: ProviderType::Bedrock,
            region: "eu-west-1".to_string(),
            ..LlmConfig::default()
        };
        let provider = create_provider(&config, SecretString::from("bedrock-api-key-test"));
        assert_eq!(provider.name(), "bedrock");
        assert_eq!(provider.model(), "eu.anthropic.claude-3-5-sonnet-20240620-v1:0");
    }
}
