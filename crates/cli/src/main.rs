use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{DataIndex, UserId};
use rand::seq::IndexedRandom;
use server::{
    EngineConfig, RecommendationEngine, RecommendationRequest, RecommendationResponse,
    RecommendationStatus,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::debug;

/// CineRank - Explainable Movie Recommendations
#[derive(Parser)]
#[command(name = "cinerank")]
#[command(about = "Content-based movie recommendations with reasons", long_about = None)]
struct Cli {
    /// Directory containing users.dat, movies.dat, watched.dat and watchlist.dat
    #[arg(short, long, default_value = "data/sample")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get movie recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return (configured default if omitted)
        #[arg(long)]
        limit: Option<usize>,

        /// Show the reasons behind each recommendation
        #[arg(long)]
        explain: bool,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a user's taste profile
    Profile {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = EngineConfig::from_env().context("Failed to load engine configuration")?;
    debug!("Engine configuration: {:?}", config);

    let start = Instant::now();
    let data_index = Arc::new(
        DataIndex::load_from_files(&cli.data_dir)
            .with_context(|| format!("Failed to load dataset from {}", cli.data_dir.display()))?,
    );
    let engine = RecommendationEngine::from_index(data_index.clone(), &config)?;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            user_id,
            limit,
            explain,
            json,
        } => {
            if !json {
                print_loaded(&cli.data_dir, start.elapsed());
            }
            handle_recommend(&engine, user_id, limit, explain, json).await?
        }
        Commands::Profile { user_id } => {
            print_loaded(&cli.data_dir, start.elapsed());
            handle_profile(&engine, &data_index, user_id).await?
        }
        Commands::Benchmark {
            requests,
            concurrent,
        } => {
            print_loaded(&cli.data_dir, start.elapsed());
            handle_benchmark(engine, &data_index, requests, concurrent).await?
        }
    }

    Ok(())
}

fn print_loaded(data_dir: &std::path::Path, elapsed: Duration) {
    println!(
        "{} Loaded dataset from {} in {:?}",
        "✓".green(),
        data_dir.display(),
        elapsed
    );
}

/// Handle the 'recommend' command
async fn handle_recommend(
    engine: &RecommendationEngine,
    user_id: UserId,
    limit: Option<usize>,
    explain: bool,
    json: bool,
) -> Result<()> {
    let request = RecommendationRequest { user_id, limit };
    let response = engine
        .recommend(request)
        .await
        .with_context(|| format!("Failed to recommend for user {}", user_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_recommendations(&response, explain);
    }
    Ok(())
}

/// Handle the 'profile' command
async fn handle_profile(
    engine: &RecommendationEngine,
    data_index: &DataIndex,
    user_id: UserId,
) -> Result<()> {
    let user = data_index
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;
    let profile = engine.taste_profile(user_id).await?;
    let watched = data_index.get_watched(user_id);

    println!("{}", format!("User {} ({})", user_id, user.username).bold().blue());
    println!("{}Email: {}", "• ".green(), user.email);
    println!("{}Watched: {}", "• ".green(), watched.len());
    println!(
        "{}Watchlist: {}",
        "• ".green(),
        data_index.get_watchlist(user_id).len()
    );

    let rated: Vec<u8> = watched.iter().filter_map(|e| e.rating).collect();
    if !rated.is_empty() {
        let avg = rated.iter().map(|&r| f32::from(r)).sum::<f32>() / rated.len() as f32;
        println!(
            "{}Average rating: {:.1}/10 ({} rated)",
            "• ".cyan(),
            avg,
            rated.len()
        );
    }

    if profile.is_cold_start() {
        println!(
            "\n{}",
            "No watch history yet: recommendations fall back to popular choices".yellow()
        );
        return Ok(());
    }

    println!("{}Liked movies: {}", "• ".cyan(), profile.liked_movie_ids.len());
    if !profile.liked_decades.is_empty() {
        let decades: Vec<String> = profile
            .liked_decades
            .iter()
            .map(|decade| format!("{}s", decade))
            .collect();
        println!("{}Liked decades: {}", "• ".cyan(), decades.join(", "));
    }

    println!("\n{}", "Top genres:".bold());
    for (genre, _) in profile.top_genres(5) {
        println!("  - {:<18} {:>3}%", genre, percent(profile.genre_affinity(genre)));
    }
    println!("{}", "Top languages:".bold());
    for (lang, _) in profile.top_languages(3) {
        println!(
            "  - {:<18} {:>3}%",
            lang,
            percent(profile.language_affinity(lang))
        );
    }
    println!("{}", "Favourite eras:".bold());
    for (decade, _) in profile.top_eras(3) {
        println!(
            "  - {:<18} {:>3}%",
            format!("{}s", decade),
            percent(profile.era_affinity(decade))
        );
    }
    if !profile.keyword_weight.is_empty() {
        println!("{}", "Recurring themes:".bold());
        for (keyword, _) in profile.top_keywords(5) {
            println!(
                "  - {:<18} {:>3}%",
                keyword,
                percent(profile.theme_affinity(keyword))
            );
        }
    }
    Ok(())
}

fn percent(affinity: f32) -> u32 {
    (affinity * 100.0).round() as u32
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    engine: RecommendationEngine,
    data_index: &DataIndex,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let known_users = data_index.user_ids();
    if known_users.is_empty() {
        return Err(anyhow!("Dataset has no users to benchmark"));
    }

    // Random users from the dataset
    let mut rng = rand::rng();
    let user_ids: Vec<UserId> = (0..requests)
        .filter_map(|_| known_users.choose(&mut rng).copied())
        .collect();

    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();

    let mut handles = vec![];
    for user in user_ids {
        let engine = engine.clone();
        let permits = permits.clone();
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            engine.recommend(RecommendationRequest::new(user)).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings = vec![];
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();
    if timings.is_empty() {
        println!("No requests made");
        return Ok(());
    }

    let summed: Duration = timings.iter().sum();
    let avg_latency = summed / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[((timings.len() as f32 * 0.95) as usize).min(timings.len() - 1)];
    let p99 = timings[((timings.len() as f32 * 0.99) as usize).min(timings.len() - 1)];
    let throughput = timings.len() as f32 / total_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", timings.len(), concurrent.max(1));
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(response: &RecommendationResponse, explain: bool) {
    println!(
        "{}",
        format!("Recommendations for user {}:", response.user_id)
            .bold()
            .blue()
    );
    println!("{}", response.status.message().italic());
    if response.cold_start && response.status != RecommendationStatus::ColdStart {
        println!("{}", RecommendationStatus::ColdStart.message().italic());
    }

    for (i, item) in response.items.iter().enumerate() {
        let movie = &item.movie;
        let year = movie
            .release_year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "????".to_string());
        println!(
            "{}. {} ({}) [{}] - {}",
            (i + 1).to_string().green(),
            movie.title,
            year,
            movie.genres.join(", "),
            format!("{}% match", item.match_percent()).yellow()
        );
        if explain {
            for reason in &item.reasons {
                println!("     {} {}", "›".cyan(), reason);
            }
        }
    }
}
