use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use bazaar::api::create_router;
use bazaar::config::Config;
use bazaar::data_models::SearchRequest;
use bazaar::provider::HttpSearchProvider;
use bazaar::service::RecommendationService;

#[derive(Parser)]
#[command(name = "bazaar", about = "Ranked marketplace listing recommendations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the recommendation API over HTTP.
    Serve {
        /// Address to bind, overrides BAZAAR_BIND.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run one recommendation from a JSON file of search candidates.
    Recommend {
        #[arg(long)]
        candidates: PathBuf,
        /// The user's original request, used for relevance scoring.
        #[arg(long, default_value = "")]
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    let provider = HttpSearchProvider::new(&config.provider)
        .context("failed to build search provider client")?;
    let service = Arc::new(RecommendationService::new(
        Arc::new(provider),
        config.recommender.clone(),
    ));

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or(config.server.bind);
            let listener = tokio::net::TcpListener::bind(&bind)
                .await
                .with_context(|| format!("failed to bind {bind}"))?;
            tracing::info!("listening on {bind}");
            axum::serve(listener, create_router(service)).await?;
        }
        Command::Recommend { candidates, query } => {
            let raw = tokio::fs::read_to_string(&candidates)
                .await
                .with_context(|| format!("failed to read {}", candidates.display()))?;
            let requests: Vec<SearchRequest> =
                serde_json::from_str(&raw).context("candidates file is not a JSON array of search requests")?;
            let ranked = service.recommend(&requests, &query).await?;
            if ranked.is_empty() {
                tracing::info!("no good matches");
            }
            println!("{}", serde_json::to_string_pretty(&ranked.to_records())?);
        }
    }
    Ok(())
}
