//! The model step shared by every chain.

use std::sync::Arc;

use tracing::{Instrument, debug, info_span};

use heavylifter_types::config::LlmConfig;
use heavylifter_types::llm::{CompletionRequest, CompletionResponse, LlmError, Message};

use crate::llm::box_provider::BoxLlmProvider;
use crate::prompt::FormattedChat;

/// A provider plus the sampling settings every chain call is sent with.
#[derive(Clone)]
pub struct ChainModel {
    provider: Arc<BoxLlmProvider>,
    max_tokens: u32,
    temperature: f64,
}

impl ChainModel {
    pub fn new(provider: Arc<BoxLlmProvider>, max_tokens: u32, temperature: f64) -> Self {
        Self {
            provider,
            max_tokens,
            temperature,
        }
    }

    pub fn from_config(provider: Arc<BoxLlmProvider>, config: &LlmConfig) -> Self {
        Self::new(provider, config.max_tokens, config.temperature)
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send a single user message.
    pub async fn complete_text(
        &self,
        step: &'static str,
        prompt: String,
        stop: Option<&str>,
    ) -> Result<CompletionResponse, LlmError> {
        let chat = FormattedChat {
            system: None,
            messages: vec![Message::user(prompt)],
        };
        self.complete_chat(step, chat, stop).await
    }

    /// Send a formatted chat prompt.
    pub async fn complete_chat(
        &self,
        step: &'static str,
        chat: FormattedChat,
        stop: Option<&str>,
    ) -> Result<CompletionResponse, LlmError> {
        let request = CompletionRequest {
            model: self.provider.model().to_string(),
            messages: chat.messages,
            system: chat.system,
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            stop_sequences: stop.map(|s| vec![s.to_string()]),
        };

        for message in &request.messages {
            debug!(step, role = %message.role, prompt = %message.content, "Prompt sent to model");
        }

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            step,
        );
        let response = self.provider.complete(&request).instrument(span).await?;

        debug!(
            step,
            stop_reason = %response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            output = %response.content,
            "Model replied"
        );
        Ok(response)
    }
}
