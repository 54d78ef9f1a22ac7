//! Translation demo chain.

use crate::prompt::{ChatPromptTemplate, PromptValues, defaults};

use super::error::ChainError;
use super::model::ChainModel;

pub struct TranslationChain {
    model: ChainModel,
    prompt: ChatPromptTemplate,
}

impl TranslationChain {
    pub fn new(model: ChainModel) -> Result<Self, ChainError> {
        Ok(Self {
            model,
            prompt: defaults::translation_prompt()?,
        })
    }

    #[tracing::instrument(name = "translation_chain", skip(self, text))]
    pub async fn translate(
        &self,
        input_language: &str,
        output_language: &str,
        text: &str,
    ) -> Result<String, ChainError> {
        let values = PromptValues::new()
            .with("input_language", input_language)
            .with("output_language", output_language)
            .with("input", text);
        let chat = self.prompt.format_messages(&values)?;
        let response = self.model.complete_chat("translate", chat, None).await?;
        Ok(response.content.trim().to_string())
    }
}
