//! LlmProvider trait definition.
//!
//! This is the core abstraction that all hosted-model clients implement.
//! Uses RPITIT for `complete`, so the trait is not object-safe by itself;
//! see [`BoxLlmProvider`](super::box_provider::BoxLlmProvider).

use heavylifter_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends (Anthropic, Bedrock).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in heavylifter-infra (e.g., `AnthropicProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "anthropic", "bedrock").
    fn name(&self) -> &str;

    /// Model identifier requests are sent with when the request leaves it empty.
    fn model(&self) -> &str;

    /// Send a completion request and wait for the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
