//! Simple test harness for the recommendation engine.
//!
//! Loads a dataset, builds the engine from `CINERANK_*` configuration and
//! prints recommendations for one user.
//!
//! Usage: server [DATA_DIR] [USER_ID]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use data_loader::DataIndex;
use server::{EngineConfig, RecommendationEngine, RecommendationRequest};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,sources=debug,pipeline=debug")),
        )
        .init();

    info!("Starting CineRank engine test harness");

    let mut args = std::env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data/sample".to_string()));
    let user_id: u32 = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("Invalid user id: {}", raw))?,
        None => 1,
    };

    let config = EngineConfig::from_env().context("Failed to load engine configuration")?;
    info!("Configuration: {:?}", config);

    info!("Loading data from {}...", data_dir.display());
    let data_index = Arc::new(
        DataIndex::load_from_files(&data_dir)
            .with_context(|| format!("Failed to load data from {}", data_dir.display()))?,
    );
    info!("Data index loaded successfully");

    let engine = RecommendationEngine::from_index(data_index, &config)?;

    info!("Getting recommendations for user {}", user_id);
    let response = engine.recommend(RecommendationRequest::new(user_id)).await?;

    info!(
        "Received {} recommendations ({:?}): {}",
        response.items.len(),
        response.status,
        response.status.message()
    );
    for (i, item) in response.items.iter().enumerate() {
        info!(
            "{}. {} ({}) - {}% match",
            i + 1,
            item.movie.title,
            item.movie
                .release_year()
                .map(|y| y.to_string())
                .unwrap_or_else(|| "????".to_string()),
            item.match_percent()
        );
        info!("   Genres: {}", item.movie.genres.join(", "));
        info!("   {}", item.reasons.join(" · "));
    }

    Ok(())
}
