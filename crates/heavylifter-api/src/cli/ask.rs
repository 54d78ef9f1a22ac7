//! `ask` and `graphql` commands: one-off questions outside any chat session.

use std::path::Path;

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use heavylifter_core::chain::SqlAnswer;
use heavylifter_types::chat::ChatPage;

use crate::cli::spinner;
use heavylifter_api::state::ConcreteAppState;

/// Answer a plain-language question from the database.
pub async fn ask(
    state: &ConcreteAppState,
    question: &str,
    show_sql: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    run(state, ChatPage::Lifter, question, show_sql, json, quiet).await
}

/// Translate a GraphQL query to SQL and answer it.
pub async fn graphql(
    state: &ConcreteAppState,
    query: Option<String>,
    query_file: Option<&Path>,
    show_sql: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    if !state.chat.is_available(ChatPage::Graphql) {
        bail!(
            "no GraphQL schema configured: set [graphql].schema_path or HEAVYLIFTER_GRAPHQL_SCHEMA"
        );
    }

    let query = match (query, query_file) {
        (Some(query), _) => query,
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => bail!("pass --query or --query-file"),
    };

    run(state, ChatPage::Graphql, query.trim(), show_sql, json, quiet).await
}

async fn run(
    state: &ConcreteAppState,
    page: ChatPage,
    question: &str,
    show_sql: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    if question.trim().is_empty() {
        bail!("the question must not be empty");
    }

    let spinner = spinner("Doing the heavy lifting...", json || quiet);
    let answer = state.chat.ask_once(page, question).await;
    spinner.finish_and_clear();
    let answer = answer?;

    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }

    println!();
    println!("  {}", answer.answer);
    println!();

    if show_sql {
        print_query(&answer);
    }

    if !quiet {
        println!(
            "  {}",
            style(format!(
                "{} input / {} output tokens",
                answer.usage.input_tokens, answer.usage.output_tokens
            ))
            .dim()
        );
    }

    Ok(())
}

fn print_query(answer: &SqlAnswer) {
    println!("  {}", style("── SQL ──").dim());
    for line in answer.query.lines() {
        println!("  {}", style(line).cyan());
    }
    println!();

    if let Some(error) = &answer.query_error {
        println!("  {} {}", style("✗").red(), style(error).red());
        println!();
        return;
    }

    if answer.result.columns.is_empty() {
        println!("  {}", style("(no rows)").dim());
        println!();
        return;
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        answer
            .result
            .columns
            .iter()
            .map(|c| Cell::new(c).fg(Color::White)),
    );
    for row in &answer.result.rows {
        table.add_row(row.iter().map(|value| match value.as_str() {
            Some(text) => Cell::new(text),
            None => Cell::new("NULL").fg(Color::DarkGrey),
        }));
    }

    println!("{table}");
    println!();
}
