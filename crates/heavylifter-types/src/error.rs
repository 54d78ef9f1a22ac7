use thiserror::Error;

/// Errors related to the database the questions are asked against.
#[derive(Debug, Error)]
pub enum SqlError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("unsupported database url scheme: '{0}'")]
    UnsupportedDialect(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("table names {0:?} not found in database")]
    UnknownTables(Vec<String>),
}

/// Errors from parsing or filling prompt templates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("malformed template at byte {position}: {reason}")]
    Malformed { position: usize, reason: String },

    #[error("missing value for template variable '{0}'")]
    MissingVariable(String),
}

/// Errors from appending turns to a chat transcript.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("expected a {expected} turn, got {actual}")]
    OutOfTurn { expected: String, actual: String },

    #[error("session not found")]
    SessionNotFound,
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    #[error("missing credential: set the {0} environment variable")]
    MissingCredential(String),

    #[error("no database configured: set HEAVYLIFTER_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,
}
