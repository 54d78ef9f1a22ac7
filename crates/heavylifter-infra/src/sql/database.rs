//! sqlx-backed [`SqlDatabase`] for MySQL and SQLite.
//!
//! Generated queries are run exactly as the model wrote them, so every cell is
//! decoded by trying the Rust types sqlx supports in turn. The first match
//! decides whether the cell is a number, a bool or text.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, ValueRef};

use heavylifter_core::sql::SqlDatabase;
use heavylifter_types::config::DatabaseConfig;
use heavylifter_types::error::SqlError;
use heavylifter_types::sql::{Dialect, QueryResult, SqlValue};

/// Values longer than this are cut in the sample rows of the table info.
const SAMPLE_VALUE_MAX_CHARS: usize = 100;

const UNSUPPORTED_CELL: &str = "<unsupported>";

/// Table filtering and sampling settings.
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub sample_rows: u32,
    pub include_tables: Option<Vec<String>>,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            sample_rows: 3,
            include_tables: None,
        }
    }
}

impl From<&DatabaseConfig> for DatabaseOptions {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            sample_rows: config.sample_rows,
            include_tables: config.include_tables.clone(),
        }
    }
}

#[derive(Clone)]
enum Backend {
    Mysql(MySqlPool),
    Sqlite(SqlitePool),
}

/// A connection pool to the database questions are asked against.
#[derive(Clone)]
pub struct SqlxDatabase {
    backend: Backend,
    options: DatabaseOptions,
}

/// Work out the dialect of a connection URL and rewrite driver-qualified
/// MySQL schemes (`mysql+mysqlconnector://`) to plain `mysql://`.
pub fn normalize_url(url: &str) -> Result<(Dialect, String), SqlError> {
    let scheme = url.split(':').next().unwrap_or_default();
    let base = scheme.split('+').next().unwrap_or_default();
    match base {
        "mysql" | "mariadb" => {
            let rest = &url[scheme.len()..];
            Ok((Dialect::Mysql, format!("mysql{rest}")))
        }
        "sqlite" => Ok((Dialect::Sqlite, url.to_string())),
        _ => Err(SqlError::UnsupportedDialect(scheme.to_string())),
    }
}

impl SqlxDatabase {
    /// Connect to `url` and check the include list against the real tables.
    pub async fn connect(url: &str, options: DatabaseOptions) -> Result<Self, SqlError> {
        let (dialect, url) = normalize_url(url)?;
        let backend = match dialect {
            Dialect::Mysql => {
                let pool = MySqlPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(10))
                    .connect(&url)
                    .await
                    .map_err(connection_error)?;
                Backend::Mysql(pool)
            }
            Dialect::Sqlite => {
                let opts = SqliteConnectOptions::from_str(&url)
                    .map_err(connection_error)?
                    .busy_timeout(Duration::from_secs(5));
                // Every connection to an in-memory database is a new database.
                let max_connections = if url.contains(":memory:") { 1 } else { 4 };
                let pool = SqlitePoolOptions::new()
                    .max_connections(max_connections)
                    .connect_with(opts)
                    .await
                    .map_err(connection_error)?;
                Backend::Sqlite(pool)
            }
        };

        let db = Self { backend, options };
        db.check_include_tables().await?;
        tracing::info!(dialect = %dialect, "Connected to database");
        Ok(db)
    }

    /// Wrap an existing SQLite pool.
    pub async fn from_sqlite_pool(pool: SqlitePool, options: DatabaseOptions) -> Result<Self, SqlError> {
        let db = Self {
            backend: Backend::Sqlite(pool),
            options,
        };
        db.check_include_tables().await?;
        Ok(db)
    }

    async fn check_include_tables(&self) -> Result<(), SqlError> {
        let Some(include) = &self.options.include_tables else {
            return Ok(());
        };
        let all = self.all_table_names().await?;
        let missing: Vec<String> = include.iter().filter(|t| !all.contains(t)).cloned().collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SqlError::UnknownTables(missing))
        }
    }

    async fn all_table_names(&self) -> Result<Vec<String>, SqlError> {
        let mut names: Vec<String> = match &self.backend {
            Backend::Mysql(pool) => sqlx::query_scalar(
                "SELECT CAST(TABLE_NAME AS CHAR) FROM information_schema.TABLES \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE IN ('BASE TABLE', 'VIEW')",
            )
            .fetch_all(pool)
            .await
            .map_err(query_error)?,
            Backend::Sqlite(pool) => sqlx::query_scalar(
                "SELECT name FROM sqlite_master \
                 WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%'",
            )
            .fetch_all(pool)
            .await
            .map_err(query_error)?,
        };
        names.sort();
        Ok(names)
    }

    fn quote_identifier(&self, name: &str) -> String {
        match self.backend {
            Backend::Mysql(_) => format!("`{}`", name.replace('`', "``")),
            Backend::Sqlite(_) => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    async fn create_statement(&self, table: &str) -> Result<String, SqlError> {
        let statement = match &self.backend {
            Backend::Mysql(pool) => {
                let sql = format!("SHOW CREATE TABLE {}", self.quote_identifier(table));
                let row = sqlx::query(&sql).fetch_one(pool).await.map_err(query_error)?;
                mysql_cell(&row, 1).as_str().unwrap_or_default().to_string()
            }
            Backend::Sqlite(pool) => {
                sqlx::query_scalar::<_, Option<String>>("SELECT sql FROM sqlite_master WHERE name = ?")
                    .bind(table)
                    .fetch_one(pool)
                    .await
                    .map_err(query_error)?
                    .unwrap_or_default()
            }
        };
        Ok(statement.trim_end().to_string())
    }

    /// Column names in declaration order, read from the catalog so empty
    /// tables still have a header.
    async fn table_columns(&self, table: &str) -> Result<Vec<String>, SqlError> {
        match &self.backend {
            Backend::Mysql(pool) => sqlx::query_scalar(
                "SELECT CAST(COLUMN_NAME AS CHAR) FROM information_schema.COLUMNS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION",
            )
            .bind(table)
            .fetch_all(pool)
            .await
            .map_err(query_error),
            Backend::Sqlite(pool) => {
                sqlx::query_scalar("SELECT name FROM pragma_table_info(?) ORDER BY cid")
                    .bind(table)
                    .fetch_all(pool)
                    .await
                    .map_err(query_error)
            }
        }
    }

    async fn sample_rows(&self, table: &str) -> Result<String, SqlError> {
        let n = self.options.sample_rows;
        let sql = format!("SELECT * FROM {} LIMIT {n}", self.quote_identifier(table));
        let result = self.run_query(&sql).await?;
        let columns = self.table_columns(table).await?;

        let mut lines = vec![format!("{n} rows from {table} table:"), columns.join("\t")];
        for row in &result.rows {
            let cells: Vec<String> = row
                .iter()
                .map(|value| match value.as_str() {
                    Some(text) => truncate(text, SAMPLE_VALUE_MAX_CHARS),
                    None => "None".to_string(),
                })
                .collect();
            lines.push(cells.join("\t"));
        }
        Ok(format!("/*\n{}\n*/", lines.join("\n")))
    }

    async fn run_query(&self, sql: &str) -> Result<QueryResult, SqlError> {
        match &self.backend {
            Backend::Mysql(pool) => {
                let rows = sqlx::query(sql).fetch_all(pool).await.map_err(query_error)?;
                Ok(collect_rows(&rows, mysql_cell))
            }
            Backend::Sqlite(pool) => {
                let rows = sqlx::query(sql).fetch_all(pool).await.map_err(query_error)?;
                Ok(collect_rows(&rows, sqlite_cell))
            }
        }
    }
}

impl SqlDatabase for SqlxDatabase {
    fn dialect(&self) -> Dialect {
        match self.backend {
            Backend::Mysql(_) => Dialect::Mysql,
            Backend::Sqlite(_) => Dialect::Sqlite,
        }
    }

    async fn usable_table_names(&self) -> Result<Vec<String>, SqlError> {
        let all = self.all_table_names().await?;
        Ok(match &self.options.include_tables {
            Some(include) => all.into_iter().filter(|t| include.contains(t)).collect(),
            None => all,
        })
    }

    async fn table_info(&self, table_names: Option<&[String]>) -> Result<String, SqlError> {
        let usable = self.usable_table_names().await?;
        let tables: Vec<String> = match table_names {
            Some(requested) => {
                let unknown: Vec<String> = requested
                    .iter()
                    .filter(|t| !usable.contains(*t))
                    .cloned()
                    .collect();
                if !unknown.is_empty() {
                    return Err(SqlError::UnknownTables(unknown));
                }
                requested.to_vec()
            }
            None => usable,
        };

        let mut blocks = Vec::with_capacity(tables.len());
        for table in &tables {
            let mut block = self.create_statement(table).await?;
            if self.options.sample_rows > 0 {
                block.push_str("\n\n");
                block.push_str(&self.sample_rows(table).await?);
            }
            blocks.push(block);
        }
        Ok(blocks.join("\n\n"))
    }

    async fn run(&self, sql: &str) -> Result<QueryResult, SqlError> {
        tracing::debug!(sql, "Running query");
        self.run_query(sql).await
    }
}

fn collect_rows<R: Row>(rows: &[R], cell: fn(&R, usize) -> SqlValue) -> QueryResult {
    let columns = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();
    let rows = rows
        .iter()
        .map(|row| (0..row.len()).map(|idx| cell(row, idx)).collect())
        .collect();
    QueryResult { columns, rows }
}

fn mysql_cell(row: &MySqlRow, idx: usize) -> SqlValue {
    if row.try_get_raw(idx).map(|v| v.is_null()).unwrap_or(true) {
        return SqlValue::Null;
    }
    if let Ok(v) = row.try_get::<i64, _>(idx) {
        SqlValue::Number(v.to_string())
    } else if let Ok(v) = row.try_get::<u64, _>(idx) {
        SqlValue::Number(v.to_string())
    } else if let Ok(v) = row.try_get::<f64, _>(idx) {
        SqlValue::Number(render_float(v))
    } else if let Ok(v) = row.try_get::<Decimal, _>(idx) {
        SqlValue::Number(v.to_string())
    } else if let Ok(v) = row.try_get::<bool, _>(idx) {
        SqlValue::Bool(v)
    } else if let Ok(v) = row.try_get::<String, _>(idx) {
        SqlValue::Text(v)
    } else if let Ok(v) = row.try_get::<NaiveDateTime, _>(idx) {
        SqlValue::Text(v.to_string())
    } else if let Ok(v) = row.try_get::<DateTime<Utc>, _>(idx) {
        SqlValue::Text(v.to_rfc3339())
    } else if let Ok(v) = row.try_get::<NaiveDate, _>(idx) {
        SqlValue::Text(v.to_string())
    } else if let Ok(v) = row.try_get::<NaiveTime, _>(idx) {
        SqlValue::Text(v.to_string())
    } else if let Ok(v) = row.try_get::<Vec<u8>, _>(idx) {
        SqlValue::Text(String::from_utf8_lossy(&v).into_owned())
    } else {
        SqlValue::Text(UNSUPPORTED_CELL.to_string())
    }
}

fn sqlite_cell(row: &SqliteRow, idx: usize) -> SqlValue {
    if row.try_get_raw(idx).map(|v| v.is_null()).unwrap_or(true) {
        return SqlValue::Null;
    }
    if let Ok(v) = row.try_get::<i64, _>(idx) {
        SqlValue::Number(v.to_string())
    } else if let Ok(v) = row.try_get::<f64, _>(idx) {
        SqlValue::Number(render_float(v))
    } else if let Ok(v) = row.try_get::<String, _>(idx) {
        SqlValue::Text(v)
    } else if let Ok(v) = row.try_get::<Vec<u8>, _>(idx) {
        SqlValue::Text(String::from_utf8_lossy(&v).into_owned())
    } else {
        SqlValue::Text(UNSUPPORTED_CELL.to_string())
    }
}

/// Whole floats keep a trailing `.0` so they still read as floats.
fn render_float(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

fn connection_error(e: sqlx::Error) -> SqlError {
    SqlError::Connection(e.to_string())
}

/// Statement failures are the model's problem; pool and I/O failures are ours.
fn query_error(e: sqlx::Error) -> SqlError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Configuration(_) => SqlError::Connection(e.to_string()),
        sqlx::Error::Database(db) => SqlError::Query(db.message().to_string()),
        other => SqlError::Query(other.to_string()),
    }
}
