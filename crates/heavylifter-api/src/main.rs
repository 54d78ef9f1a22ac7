//! Heavy Lifter CLI and web chat entry point.
//!
//! Binary name: `heavylifter`
//!
//! Parses CLI arguments, loads configuration, wires the chains, then runs the
//! requested command or starts the web chat UI.

mod cli;

use clap::Parser;
use clap_complete::generate;

use heavylifter_api::http::router::build_router;
use heavylifter_api::state::{self, AppState};
use heavylifter_infra::config::load_app_config;
use heavylifter_observe::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,heavylifter=debug,heavylifter_core=debug,heavylifter_infra=debug,heavylifter_api=debug",
        _ => "trace",
    };
    let mut tracing_options = TracingOptions::new(filter);
    tracing_options.json = cli.json;
    tracing_options.enable_otel = cli.otel;
    init_tracing(&tracing_options).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need config
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "heavylifter", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_app_config(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }

            let state = AppState::init(&config).await?;
            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Heavy Lifter listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Ask { question, show_sql } => {
            let state = AppState::init(&config).await?;
            cli::ask::ask(&state, &question, show_sql, cli.json, cli.quiet).await?;
        }

        Commands::Graphql {
            query,
            query_file,
            show_sql,
        } => {
            let state = AppState::init(&config).await?;
            cli::ask::graphql(
                &state,
                query,
                query_file.as_deref(),
                show_sql,
                cli.json,
                cli.quiet,
            )
            .await?;
        }

        Commands::Translate { from, to, text } => {
            let chain = state::build_translation(&config)?;
            cli::translate::translate(&chain, &from, &to, &text, cli.json, cli.quiet).await?;
        }

        Commands::Schema => {
            let db = state::connect_database(&config).await?;
            cli::schema::show_schema(&db, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
