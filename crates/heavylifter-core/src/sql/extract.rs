//! Pull the SQL statement out of free-form model output.
//!
//! Models asked for "only the SQL" still tend to answer with prose around a
//! fenced block:
//!
//! ~~~text
//! To find out how many deals are activated, we need to look at the
//! `ttd_deal` table. Here's the query:
//!
//! ```sql
//! SELECT COUNT(*) AS activated_deals
//! FROM `ttd_deal`
//! WHERE `proposal_state` = 'Activated' AND `deleted` = 0;
//! ```
//! ~~~

use std::sync::LazyLock;

use regex::Regex;

/// First ```` ```sql ```` ... ```` ``` ```` block, non-greedy, spanning newlines.
static SQL_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```sql(.*?)```").expect("SQL fence pattern is valid"));

const SQL_QUERY_MARKER: &str = "SQLQuery:";
const SQL_RESULT_MARKER: &str = "SQLResult:";

/// Return the interior of the first fenced `sql` block, exactly as written.
///
/// Returns `None` when the text has no complete block.
pub fn extract_sql(text: &str) -> Option<&str> {
    SQL_FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Reduce model output to the statement that should be executed.
///
/// Tries, in order: a fenced `sql` block, the text after the last
/// `SQLQuery:` marker (cut at `SQLResult:`), and the whole text. The result
/// is trimmed; `None` if nothing is left.
pub fn sanitize_query(text: &str) -> Option<String> {
    let candidate = if let Some(fenced) = extract_sql(text) {
        fenced
    } else if let Some(idx) = text.rfind(SQL_QUERY_MARKER) {
        let rest = &text[idx + SQL_QUERY_MARKER.len()..];
        rest.split(SQL_RESULT_MARKER).next().unwrap_or(rest)
    } else {
        text
    };

    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
