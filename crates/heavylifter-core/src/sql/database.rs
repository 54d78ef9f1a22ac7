//! SqlDatabase trait definition.
//!
//! The chains only need four things from a database: its dialect, the table
//! names the model may use, a textual description of those tables, and a way
//! to run the generated query. Implementations live in heavylifter-infra
//! (e.g., `SqlxDatabase`).

use heavylifter_types::error::SqlError;
use heavylifter_types::sql::{Dialect, QueryResult};

/// Port for the relational database questions are asked against.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait SqlDatabase: Send + Sync {
    /// Dialect of the connected database.
    fn dialect(&self) -> Dialect;

    /// Table names the model is allowed to see, sorted.
    fn usable_table_names(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, SqlError>> + Send;

    /// `CREATE TABLE` statements plus sample rows for the given tables
    /// (all usable tables when `None`).
    fn table_info(
        &self,
        table_names: Option<&[String]>,
    ) -> impl std::future::Future<Output = Result<String, SqlError>> + Send;

    /// Run a query and return its typed rows.
    fn run(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = Result<QueryResult, SqlError>> + Send;
}
