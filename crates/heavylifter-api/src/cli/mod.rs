//! CLI command definitions for the `heavylifter` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod ask;
pub mod schema;
pub mod translate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};

/// Ask your database questions in plain language.
#[derive(Parser)]
#[command(name = "heavylifter", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Hide the spinner and token usage; answers and errors still print.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a TOML config file (defaults to ./heavylifter.toml if present).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web chat UI.
    Serve {
        /// Port to listen on (overrides config).
        #[arg(long, short)]
        port: Option<u16>,

        /// Host to bind to (overrides config).
        #[arg(long)]
        host: Option<String>,
    },

    /// Answer a question from the database.
    Ask {
        /// The question, in plain language.
        question: String,

        /// Also print the generated SQL and its raw result.
        #[arg(long)]
        show_sql: bool,
    },

    /// Translate a GraphQL query to SQL and answer it.
    #[command(name = "graphql")]
    Graphql {
        /// GraphQL query text.
        #[arg(long, conflicts_with = "query_file", required_unless_present = "query_file")]
        query: Option<String>,

        /// File containing the GraphQL query.
        #[arg(long, value_name = "PATH")]
        query_file: Option<PathBuf>,

        /// Also print the generated SQL and its raw result.
        #[arg(long)]
        show_sql: bool,
    },

    /// Translate text between languages.
    Translate {
        /// Language of the input text.
        #[arg(long, default_value = "English")]
        from: String,

        /// Language to translate into.
        #[arg(long, default_value = "German")]
        to: String,

        /// Text to translate.
        text: String,
    },

    /// Show the tables and table info the model is given.
    Schema,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Spinner shown while waiting on the model; hidden for `--json`/`--quiet`.
pub fn spinner(message: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["heavylifter", "ask", "How many deals?", "--json", "-vv"]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Ask { question, show_sql } => {
                assert_eq!(question, "How many deals?");
                assert!(!show_sql);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn quiet_help_matches_behavior() {
        let cmd = Cli::command();
        let quiet = cmd
            .get_arguments()
            .find(|arg| arg.get_id() == "quiet")
            .expect("quiet flag");
        let help = quiet.get_help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("spinner"));
        assert!(!help.contains("all output"));

        let cli = Cli::parse_from(["heavylifter", "translate", "--quiet", "Hallo"]);
        assert!(cli.quiet);
    }

    #[test]
    fn graphql_requires_exactly_one_source() {
        assert!(Cli::try_parse_from(["heavylifter", "graphql"]).is_err());
        assert!(
            Cli::try_parse_from([
                "heavylifter",
                "graphql",
                "--query",
                "{ deals { id } }",
                "--query-file",
                "q.graphql"
            ])
            .is_err()
        );
        assert!(Cli::try_parse_from(["heavylifter", "graphql", "--query-file", "q.graphql"]).is_ok());
    }

    #[test]
    fn translate_defaults() {
        let cli = Cli::parse_from(["heavylifter", "translate", "I love programming."]);
        match cli.command {
            Commands::Translate { from, to, text } => {
                assert_eq!(from, "English");
                assert_eq!(to, "German");
                assert_eq!(text, "I love programming.");
            }
            _ => panic!("expected translate"),
        }
    }
}
