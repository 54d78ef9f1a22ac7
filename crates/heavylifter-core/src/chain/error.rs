//! Chain error type.

use heavylifter_types::error::{PromptError, SqlError};
use heavylifter_types::llm::LlmError;

/// Failure of any step of a chain.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("prompt error: {0}")]
    Prompt(#[from] PromptError),

    #[error("llm error: {0}")]
    Llm(#[from] LlmError),

    #[error("database error: {0}")]
    Sql(#[from] SqlError),

    #[error("model reply contained no SQL query: {output:?}")]
    NoSqlFound { output: String },
}

impl ChainError {
    /// True when the hosted model, not the prompt or the database, failed.
    pub fn is_llm(&self) -> bool {
        matches!(self, ChainError::Llm(_))
    }
}
