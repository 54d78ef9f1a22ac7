//! SQL database port and model-output sanitization.

pub mod database;
pub mod extract;

pub use database::SqlDatabase;
pub use extract::{extract_sql, sanitize_query};
