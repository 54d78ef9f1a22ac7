//! SQL dialect and query result types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SQL dialect of the connected database.
///
/// The dialect decides which query-writer prompt is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Mysql,
    Sqlite,
}

impl Dialect {
    /// Display name used inside prompts ("You are a MySQL expert").
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Dialect::Mysql => "MySQL",
            Dialect::Sqlite => "SQLite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Mysql => write!(f, "mysql"),
            Dialect::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(Dialect::Mysql),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(format!("unsupported dialect: '{other}'")),
        }
    }
}

/// One decoded cell of a query result.
///
/// The variant records how the driver decoded the value, so rendering never
/// has to guess from the text whether `'007'` was a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SqlValue {
    Null,
    Bool(bool),
    /// Integer, float or decimal, kept as the driver's text.
    Number(String),
    /// Strings, dates, times and byte columns.
    Text(String),
}

impl SqlValue {
    /// Text of the value as it is shown to people; `None` for `NULL`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Null => None,
            SqlValue::Bool(true) => Some("True"),
            SqlValue::Bool(false) => Some("False"),
            SqlValue::Number(v) | SqlValue::Text(v) => Some(v),
        }
    }

    /// Python-literal form: numbers bare, text single-quoted, `NULL` as `None`.
    pub fn render(&self) -> String {
        match self {
            SqlValue::Null => "None".to_string(),
            SqlValue::Bool(true) => "True".to_string(),
            SqlValue::Bool(false) => "False".to_string(),
            SqlValue::Number(v) => v.clone(),
            SqlValue::Text(v) => format!("'{}'", v.replace('\\', "\\\\").replace('\'', "\\'")),
        }
    }
}

/// Tabular result of running a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the rows as a list of tuples, the shape the answer prompt
    /// has always been given: `[(5,)]`, `[('DE', 'Germany'), ...]`.
    ///
    /// Each cell renders by its decoded type (see [`SqlValue::render`]).
    /// An empty result renders as an empty string.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        let tuples: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let cells: Vec<String> = row.iter().map(SqlValue::render).collect();
                if cells.len() == 1 {
                    format!("({},)", cells[0])
                } else {
                    format!("({})", cells.join(", "))
                }
            })
            .collect();
        format!("[{}]", tuples.join(", "))
    }
}
