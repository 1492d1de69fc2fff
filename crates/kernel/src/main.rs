//! Tessera Kernel
//!
//! HTTP server and command-line export of site content documents.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tessera_kernel::config::Config;
use tessera_kernel::routes;
use tessera_kernel::state::AppState;
use tessera_sdk::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Tessera site content kernel.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Generate the content document of one site.
    Export {
        /// Site identifier.
        #[arg(long)]
        site: Uuid,

        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print the document.
        #[arg(long)]
        pretty: bool,
    },

    /// List registered content plugins.
    Plugins,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env().context("failed to load configuration")?;
    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, state).await,
        Command::Export {
            site,
            output,
            pretty,
        } => export(&state, site, output, pretty).await,
        Command::Plugins => {
            list_plugins(&state);
            Ok(())
        }
    }
}

async fn serve(config: &Config, state: AppState) -> Result<()> {
    info!(plugins = state.registry().len(), "Starting Tessera kernel");

    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn export(state: &AppState, site: Uuid, output: Option<PathBuf>, pretty: bool) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("interrupted, returning partial document");
        on_interrupt.cancel();
    });

    let document = state
        .aggregator()
        .generate_site_document_with_cancel(site, &cancel)
        .await
        .with_context(|| format!("failed to generate document for site {site}"))?;

    let json = if pretty {
        document.to_json_pretty()
    } else {
        document.to_json()
    }
    .context("failed to serialize site document")?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(
                path = %path.display(),
                content = document.content.len(),
                omitted = document.omitted.len(),
                "site document written"
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn list_plugins(state: &AppState) {
    if state.registry().is_empty() {
        println!("No plugins registered.");
        return;
    }

    println!("{:<20} {:<12} {}", "PLUGIN", "VERSION", "NAME");
    println!("{}", "-".repeat(56));
    for descriptor in state.registry().descriptors() {
        println!(
            "{:<20} {:<12} {}",
            descriptor.system_name, descriptor.version, descriptor.display_name
        );
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
