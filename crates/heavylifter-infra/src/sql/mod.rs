//! Database adapter.

pub mod database;

pub use database::{DatabaseOptions, SqlxDatabase, normalize_url};
