//! Question → SQL → rows → natural-language answer.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use heavylifter_types::error::SqlError;
use heavylifter_types::llm::Usage;
use heavylifter_types::sql::{Dialect, QueryResult};

use crate::prompt::{PromptTemplate, PromptValues, defaults};
use crate::sql::SqlDatabase;

use super::error::ChainError;
use super::model::ChainModel;
use super::query_writer::SqlQueryWriter;

/// Everything one pass through [`SqlAnswerChain`] produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlAnswer {
    pub question: String,
    pub query: String,
    pub result: QueryResult,
    /// Set when the generated query failed; the answer explains the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_error: Option<String>,
    pub answer: String,
    pub usage: Usage,
}

/// Writes a query, runs it, and asks the model to phrase the result.
#[derive(Clone)]
pub struct SqlAnswerChain {
    writer: SqlQueryWriter,
    answer_prompt: PromptTemplate,
    model: ChainModel,
}

impl SqlAnswerChain {
    /// Plain-language questions against a database of the given dialect.
    pub fn new(model: ChainModel, dialect: Dialect, top_k: u32) -> Result<Self, ChainError> {
        Ok(Self {
            writer: SqlQueryWriter::new(model.clone(), defaults::query_prompt_for(dialect)?, top_k),
            answer_prompt: defaults::answer_prompt()?,
            model,
        })
    }

    /// GraphQL queries translated to SQL against tables described by `schema`.
    pub fn graphql(model: ChainModel, top_k: u32, schema: &str) -> Result<Self, ChainError> {
        let query_prompt = defaults::graphql_query_prompt()?.partial("gqlSchema", schema);
        Ok(Self {
            writer: SqlQueryWriter::new(model.clone(), query_prompt, top_k),
            answer_prompt: defaults::graphql_answer_prompt()?,
            model,
        })
    }

    #[tracing::instrument(
        name = "sql_answer_chain",
        skip_all,
        fields(provider = %self.model.provider_name(), dialect = %db.dialect())
    )]
    pub async fn ask<D: SqlDatabase>(&self, db: &D, question: &str) -> Result<SqlAnswer, ChainError> {
        let written = self.writer.write(db, question).await?;
        let mut usage = written.usage;
        let query = written.sql;

        let (result, query_error) = match db.run(&query).await {
            Ok(result) => (result, None),
            Err(SqlError::Query(message)) => {
                warn!(error = %message, "Generated query failed");
                (QueryResult::default(), Some(message))
            }
            Err(e) => return Err(e.into()),
        };
        let rendered = match &query_error {
            Some(message) => format!("Error: {message}"),
            None => result.render(),
        };
        debug!(rows = result.rows.len(), result = %rendered, "Query executed");

        let values = PromptValues::new()
            .with("question", question)
            .with("query", query.as_str())
            .with("result", rendered);
        let prompt = self.answer_prompt.format(&values)?;
        let response = self.model.complete_text("answer", prompt, None).await?;
        usage += response.usage;

        let answer = response.content.trim().to_string();
        info!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Question answered"
        );

        Ok(SqlAnswer {
            question: question.to_string(),
            query,
            result,
            query_error,
            answer,
            usage,
        })
    }
}
