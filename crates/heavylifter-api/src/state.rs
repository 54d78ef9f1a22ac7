//! Application state wiring the chains together.
//!
//! `AppState` is generic over the database port so the router can be driven
//! by test doubles; the binary pins it to [`SqlxDatabase`].

use std::sync::Arc;

use anyhow::Context;

use heavylifter_core::chain::{ChainModel, SqlAnswerChain, TranslationChain};
use heavylifter_core::chat::ChatService;
use heavylifter_core::llm::box_provider::BoxLlmProvider;
use heavylifter_core::sql::SqlDatabase;
use heavylifter_infra::config::{database_url, load_graphql_schema, resolve_api_key};
use heavylifter_infra::llm::create_provider;
use heavylifter_infra::sql::{DatabaseOptions, SqlxDatabase};
use heavylifter_types::config::AppConfig;

/// Concrete state used by the `heavylifter` binary.
pub type ConcreteAppState = AppState<SqlxDatabase>;

/// Shared state handed to every HTTP handler and CLI command.
pub struct AppState<D: SqlDatabase> {
    pub chat: Arc<ChatService<D>>,
}

impl<D: SqlDatabase> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            chat: Arc::clone(&self.chat),
        }
    }
}

impl<D: SqlDatabase> AppState<D> {
    pub fn new(chat: ChatService<D>) -> Self {
        Self {
            chat: Arc::new(chat),
        }
    }
}

impl AppState<SqlxDatabase> {
    /// Resolve credentials, connect to the database and build both chat pages.
    ///
    /// The GraphQL page is only enabled when a schema file is configured.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let model = build_model(config)?;
        let db = connect_database(config).await?;

        let lifter = SqlAnswerChain::new(model.clone(), db.dialect(), config.database.top_k)?;
        let graphql = match load_graphql_schema(&config.graphql).await? {
            Some(schema) => Some(SqlAnswerChain::graphql(
                model,
                config.database.top_k,
                &schema,
            )?),
            None => None,
        };

        tracing::info!(
            dialect = %db.dialect(),
            graphql = graphql.is_some(),
            "Application state initialized"
        );

        let chat = ChatService::new(Arc::new(db), lifter, graphql)
            .with_max_sessions(config.server.max_sessions);
        Ok(Self::new(chat))
    }
}

/// Build the chain model for the configured provider.
pub fn build_model(config: &AppConfig) -> anyhow::Result<ChainModel> {
    let api_key = resolve_api_key(config.llm.provider)?;
    let provider = create_provider(&config.llm, api_key);
    tracing::debug!(
        provider = provider.name(),
        model = provider.model(),
        "LLM provider created"
    );
    Ok(ChainModel::from_config(Arc::new(provider), &config.llm))
}

/// Connect to the configured database.
pub async fn connect_database(config: &AppConfig) -> anyhow::Result<SqlxDatabase> {
    let url = database_url(config)?;
    SqlxDatabase::connect(url, DatabaseOptions::from(&config.database))
        .await
        .context("failed to connect to the database")
}

/// Translation needs no database.
pub fn build_translation(config: &AppConfig) -> anyhow::Result<TranslationChain> {
    Ok(TranslationChain::new(build_model(config)?)?)
}

/// Wrap a provider directly, bypassing credential resolution.
pub fn model_from_provider(provider: BoxLlmProvider, config: &AppConfig) -> ChainModel {
    ChainModel::from_config(Arc::new(provider), &config.llm)
}
