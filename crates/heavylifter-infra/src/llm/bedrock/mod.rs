//! AWS Bedrock LLM provider implementation.
//!
//! Implements [`LlmProvider`](heavylifter_core::llm::provider::LlmProvider)
//! for the AWS Bedrock Runtime API using Bearer token authentication.

mod client;
pub mod types;

pub use client::BedrockProvider;
