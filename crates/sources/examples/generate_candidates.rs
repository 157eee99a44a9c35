//! Example: build a taste profile and generate candidates for a user
//!
//! Run with: cargo run --package sources --example generate_candidates
//!
//! This example shows how to:
//! 1. Load the sample catalog and history
//! 2. Join a user's watched entries with their movies
//! 3. Build the taste profile
//! 4. Generate unseen candidates

use data_loader::{DataIndex, HistoryStore, MovieId};
use sources::{CandidateGenerator, HistoryItem, ProfileBuilder};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("=== CineRank Candidate Generation Example ===\n");

    let start = Instant::now();
    let data_index = DataIndex::load_from_files(Path::new("data/sample"))?;
    println!("Loaded dataset in {:?}\n", start.elapsed());

    let user_id = 1;
    let entries = data_index.get_watched(user_id);
    let history: Vec<HistoryItem> = entries
        .iter()
        .map(|entry| HistoryItem::new(entry, data_index.get_movie(entry.movie_id)))
        .collect();

    let start = Instant::now();
    let profile = ProfileBuilder::new().build(&history)?;
    println!("Built profile in {:?}", start.elapsed());
    println!("  Entries used: {}", profile.history_len);
    println!("  Liked movies: {}", profile.liked_movie_ids.len());
    for (genre, weight) in profile.top_genres(3) {
        println!("  Genre {:<16} {:.2}", genre, weight);
    }
    for (decade, weight) in profile.top_eras(2) {
        println!("  Era   {}s{:<11} {:.2}", decade, "", weight);
    }
    for (keyword, weight) in profile.top_keywords(3) {
        println!("  Theme {:<16} {:.2}", keyword, weight);
    }
    println!();

    let watched: HashSet<MovieId> = entries.iter().map(|e| e.movie_id).collect();
    let watchlist = data_index.get_watchlist_ids(user_id)?;

    let start = Instant::now();
    let candidates = CandidateGenerator::new()
        .with_max_candidates(10)
        .generate(&data_index, &watched, &watchlist)?;
    println!(
        "Generated {} candidates in {:?} (excluded {}, truncated: {})",
        candidates.len(),
        start.elapsed(),
        candidates.excluded,
        candidates.truncated
    );
    for movie in &candidates.movies {
        println!("  {:>7}  {}", movie.id, movie.title);
    }

    Ok(())
}
