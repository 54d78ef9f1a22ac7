//! Test doubles for the core ports.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use heavylifter_types::error::SqlError;
use heavylifter_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};
use heavylifter_types::sql::{Dialect, QueryResult, SqlValue};

use crate::llm::provider::LlmProvider;
use crate::sql::SqlDatabase;

#[derive(Clone)]
pub enum MockError {
    Provider(String),
    Auth,
    RateLimited(Option<u64>),
}

impl From<MockError> for LlmError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::Provider(message) => LlmError::Provider { message },
            MockError::Auth => LlmError::AuthenticationFailed,
            MockError::RateLimited(retry_after_ms) => LlmError::RateLimited { retry_after_ms },
        }
    }
}

/// Replies with canned text, one per call, and records every request.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    failure: Option<MockError>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub fn new<'a>(replies: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            failure: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every call fails with `error`.
    pub fn failing(error: MockError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            failure: Some(error),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the requests seen so far.
    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        self.requests.lock().unwrap().push(request.clone());
        let result = match &self.failure {
            Some(err) => Err(LlmError::from(err.clone())),
            None => self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .map(|content| CompletionResponse {
                    id: "resp-scripted".to_string(),
                    content,
                    model: "scripted-model".to_string(),
                    stop_reason: StopReason::EndTurn,
                    usage: Usage {
                        input_tokens: 10,
                        output_tokens: 20,
                    },
                })
                .ok_or_else(|| LlmError::Provider {
                    message: "script exhausted".to_string(),
                }),
        };
        async move { result }
    }
}

/// In-memory database with canned table info and query results.
pub struct FakeDatabase {
    pub dialect: Dialect,
    pub tables: Vec<String>,
    pub table_info: String,
    results: Mutex<VecDeque<Result<QueryResult, SqlError>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl FakeDatabase {
    pub fn new(tables: &[&str], table_info: &str) -> Self {
        Self {
            dialect: Dialect::Mysql,
            tables: tables.iter().map(|t| t.to_string()).collect(),
            table_info: table_info.to_string(),
            results: Mutex::new(VecDeque::new()),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue the result of the next `run` call.
    pub fn with_result(self, result: Result<QueryResult, SqlError>) -> Self {
        self.results.lock().unwrap().push_back(result);
        self
    }

    pub fn queries(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.queries)
    }
}

impl SqlDatabase for FakeDatabase {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn usable_table_names(&self) -> impl Future<Output = Result<Vec<String>, SqlError>> + Send {
        let mut tables = self.tables.clone();
        tables.sort();
        async move { Ok(tables) }
    }

    fn table_info(
        &self,
        table_names: Option<&[String]>,
    ) -> impl Future<Output = Result<String, SqlError>> + Send {
        let unknown: Vec<String> = table_names
            .unwrap_or_default()
            .iter()
            .filter(|name| !self.tables.contains(*name))
            .cloned()
            .collect();
        let result = if unknown.is_empty() {
            Ok(self.table_info.clone())
        } else {
            Err(SqlError::UnknownTables(unknown))
        };
        async move { result }
    }

    fn run(&self, sql: &str) -> impl Future<Output = Result<QueryResult, SqlError>> + Send {
        self.queries.lock().unwrap().push(sql.to_string());
        let result = self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(QueryResult::default()));
        async move { result }
    }
}

/// Single numeric column; `single_column("n", &["5"])` renders as `[(5,)]`.
pub fn single_column(column: &str, values: &[&str]) -> QueryResult {
    QueryResult {
        columns: vec![column.to_string()],
        rows: values.iter().map(|v| vec![SqlValue::Number(v.to_string())]).collect(),
    }
}
