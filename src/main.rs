// ABOUTME: Entry point for the newsroom binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and serves the API or regenerates share pages.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use newsroom_server::{AppState, NewsroomConfig, create_router};
use newsroom_store::{NewsStore, ShareDirectory};

#[derive(Debug, Parser)]
#[command(name = "newsroom", version, about = "News publishing backend with share-preview pages")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API and public directory (default).
    Serve,
    /// Rebuild every share page from the news document and exit.
    GenerateShares,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsroom=debug,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = NewsroomConfig::from_env().context("invalid configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::GenerateShares => generate_shares(&config),
    }
}

async fn serve(config: NewsroomConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config).context("failed to initialize server state")?;

    // First-run bootstrap of the document and share pages before accepting requests.
    // Problems here are logged; every request retries the same work.
    {
        let store = state.store.lock().await;
        match store.regenerate() {
            Ok((items, report)) => tracing::info!(
                "loaded {} news items from {} ({} share pages written)",
                items.len(),
                store.path().display(),
                report.map_or(0, |r| r.written)
            ),
            Err(e) => tracing::error!(
                "failed to prepare news store {}: {}",
                store.path().display(),
                e
            ),
        }
    }
    std::fs::create_dir_all(&config.public_dir)
        .with_context(|| format!("failed to create {}", config.public_dir.display()))?;

    let app = create_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!("newsroom listening on http://{}", config.bind);
    axum::serve(listener, app).await?;
    Ok(())
}

fn generate_shares(config: &NewsroomConfig) -> anyhow::Result<()> {
    let shares = ShareDirectory::new(config.share_dir(), config.share_retention);
    let store = NewsStore::open(config.data_file.clone(), shares)?;

    let (items, report) = store.regenerate()?;
    let report = report.with_context(|| {
        format!(
            "failed to regenerate share pages in {}",
            store.shares().dir().display()
        )
    })?;
    tracing::info!(
        "{} share pages generated in {} ({} written, {} unchanged, {} skipped, {} pruned)",
        items.len() - report.skipped,
        store.shares().dir().display(),
        report.written,
        report.unchanged,
        report.skipped,
        report.pruned
    );
    Ok(())
}
