//! Question → SQL step.

use tracing::debug;

use heavylifter_types::llm::Usage;

use crate::prompt::{PromptTemplate, PromptValues};
use crate::sql::{SqlDatabase, sanitize_query};

use super::error::ChainError;
use super::model::ChainModel;

/// The model stops before inventing a result for its own query.
pub const STOP_SEQUENCE: &str = "\nSQLResult:";

/// A generated query and what it cost.
#[derive(Debug, Clone)]
pub struct WrittenQuery {
    pub sql: String,
    pub usage: Usage,
}

/// Asks the model to write a query for a question against a database.
#[derive(Clone)]
pub struct SqlQueryWriter {
    model: ChainModel,
    prompt: PromptTemplate,
    top_k: u32,
}

impl SqlQueryWriter {
    /// `prompt` must accept `input`, `table_info` and `top_k`; `dialect` is
    /// supplied too and may be used.
    pub fn new(model: ChainModel, prompt: PromptTemplate, top_k: u32) -> Self {
        Self {
            model,
            prompt,
            top_k,
        }
    }

    pub async fn write<D: SqlDatabase>(
        &self,
        db: &D,
        question: &str,
    ) -> Result<WrittenQuery, ChainError> {
        let table_info = db.table_info(None).await?;
        let values = PromptValues::new()
            .with("input", format!("{question}\nSQLQuery: "))
            .with("table_info", table_info)
            .with("top_k", self.top_k.to_string())
            .with("dialect", db.dialect().prompt_name());
        let prompt = self.prompt.format(&values)?;

        let response = self
            .model
            .complete_text("write_query", prompt, Some(STOP_SEQUENCE))
            .await?;

        let sql = sanitize_query(&response.content).ok_or_else(|| ChainError::NoSqlFound {
            output: response.content.clone(),
        })?;
        debug!(sql = %sql, "Extracted query");

        Ok(WrittenQuery {
            sql,
            usage: response.usage,
        })
    }
}
