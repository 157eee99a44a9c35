//! Scoring, explanation and ranking of movie candidates.
//!
//! This crate provides:
//! - A fixed table of scoring signals (genre, language, era, theme, quality)
//! - Scorer: weighted sum of signals, computed in parallel
//! - Explainer: human-readable reasons derived from the same signals
//! - Ranker: deterministic ordering and truncation
//! - RankingPipeline for running the three stages together
//!
//! ## Architecture
//! Candidates flow through the stages in order:
//! 1. Scorer evaluates every signal and produces a score in `[0, 1]`
//! 2. Explainer turns the strongest contributions into reasons
//! 3. Ranker sorts by score and cuts the list to the requested limit
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{RankingPipeline, Scorer, ScoringWeights};
//!
//! let pipeline = RankingPipeline::new()
//!     .with_scorer(Scorer::new(ScoringWeights::default())?);
//!
//! let items = pipeline.run(&profile, candidates.movies, Some(10), &cancel)?;
//! ```

pub mod explainer;
pub mod ranker;
pub mod ranking_pipeline;
pub mod scorer;
pub mod signals;
pub mod types;

// Re-export main types
pub use explainer::{Explainer, OVERALL_TASTE, POPULAR_CHOICE, language_name};
pub use ranker::{DEFAULT_LIMIT, MAX_LIMIT, Ranker, compare_items};
pub use ranking_pipeline::RankingPipeline;
pub use scorer::{ScoredCandidate, Scorer, ScoringWeights};
pub use signals::{ComponentScores, SIGNALS, SignalKind, SignalPolicy, damped_quality};
pub use types::RecommendationItem;
