//! Configuration loader for Heavy Lifter.
//!
//! Layers, lowest to highest priority:
//! 1. built-in defaults ([`AppConfig::default()`]),
//! 2. `heavylifter.toml` (or an explicit `--config` path),
//! 3. environment variables, after `.env` has been loaded with dotenvy.
//!
//! Credentials are never read from the config file, only from the environment.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use heavylifter_types::config::{AppConfig, GraphqlConfig};
use heavylifter_types::error::ConfigError;
use heavylifter_types::llm::ProviderType;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "heavylifter.toml";

pub const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const BEDROCK_TOKEN_VAR: &str = "AWS_BEARER_TOKEN_BEDROCK";

/// Load configuration from `.env`, the config file and the environment.
///
/// An explicit `path` must exist; the default file is optional.
pub async fn load_app_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    if let Ok(env_file) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", env_file.display());
    }

    let mut config = match path {
        Some(path) => read_config_file(path).await?,
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if tokio::fs::try_exists(&default_path).await.unwrap_or(false) {
                read_config_file(&default_path).await?
            } else {
                tracing::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                AppConfig::default()
            }
        }
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    Ok(config)
}

async fn read_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    let config = toml::from_str::<AppConfig>(&content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Apply `HEAVYLIFTER_*` (and a few conventional) variables on top of `config`.
///
/// `lookup` returns a variable's value; empty values are ignored.
pub fn apply_env_overrides(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("HEAVYLIFTER_PROVIDER") {
        config.llm.provider = parse_var("HEAVYLIFTER_PROVIDER", &v)?;
    }
    if let Some(v) = get("HEAVYLIFTER_MODEL") {
        config.llm.model = v;
    }
    if let Some(v) = get("HEAVYLIFTER_TEMPERATURE") {
        config.llm.temperature = parse_var("HEAVYLIFTER_TEMPERATURE", &v)?;
    }
    if let Some(v) = get("HEAVYLIFTER_MAX_TOKENS") {
        config.llm.max_tokens = parse_var("HEAVYLIFTER_MAX_TOKENS", &v)?;
    }
    if let Some(v) = get("HEAVYLIFTER_BASE_URL") {
        config.llm.base_url = Some(v);
    }
    if let Some(v) = get("AWS_REGION") {
        config.llm.region = v;
    }
    if let Some(v) = get("HEAVYLIFTER_DATABASE_URL").or_else(|| get("DATABASE_URL")) {
        config.database.url = Some(v);
    }
    if let Some(v) = get("HEAVYLIFTER_TOP_K") {
        config.database.top_k = parse_var("HEAVYLIFTER_TOP_K", &v)?;
    }
    if let Some(v) = get("HEAVYLIFTER_HOST") {
        config.server.host = v;
    }
    if let Some(v) = get("HEAVYLIFTER_PORT") {
        config.server.port = parse_var("HEAVYLIFTER_PORT", &v)?;
    }
    if let Some(v) = get("HEAVYLIFTER_MAX_SESSIONS") {
        config.server.max_sessions = parse_var("HEAVYLIFTER_MAX_SESSIONS", &v)?;
    }
    if let Some(v) = get("HEAVYLIFTER_GRAPHQL_SCHEMA") {
        config.graphql.schema_path = Some(PathBuf::from(v));
    }
    Ok(())
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Environment variable holding the credential for `provider`.
pub fn credential_var(provider: ProviderType) -> &'static str {
    match provider {
        ProviderType::Anthropic => ANTHROPIC_API_KEY_VAR,
        ProviderType::Bedrock => BEDROCK_TOKEN_VAR,
    }
}

/// Read the API key or bearer token for `provider` from the environment.
pub fn resolve_api_key(provider: ProviderType) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(provider, |var| std::env::var(var).ok())
}

pub fn resolve_api_key_with(
    provider: ProviderType,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let var = credential_var(provider);
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingCredential(var.to_string()))
}

/// The configured database URL, or an error naming the variables to set.
pub fn database_url(config: &AppConfig) -> Result<&str, ConfigError> {
    config
        .database
        .url
        .as_deref()
        .ok_or(ConfigError::MissingDatabaseUrl)
}

/// Read the GraphQL schema file, if one is configured.
pub async fn load_graphql_schema(config: &GraphqlConfig) -> Result<Option<String>, ConfigError> {
    let Some(path) = &config.schema_path else {
        return Ok(None);
    };
    let schema = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(Some(schema))
}
