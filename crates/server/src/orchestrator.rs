//! # Recommendation Engine
//!
//! This module coordinates the whole recommendation flow for one request:
//! 1. Validate the requested limit
//! 2. Fetch user existence, watched history and watchlist (in parallel)
//! 3. Join history with the catalog and build the taste profile
//! 4. Generate candidates (catalog minus watched and watchlist)
//! 5. Score and explain candidates under a time budget
//! 6. Rank and return the top N
//!
//! Store calls and scoring are blocking work, so they run on
//! `spawn_blocking`. Scoring that overruns the budget is cancelled and
//! retried on a smaller, popularity-capped subset under its own budget.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::task::JoinError;
use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use data_loader::{Catalog, DataIndex, HistoryStore, Movie, MovieId, StoreError, UserId, WatchedEntry};
use pipeline::{RankingPipeline, RecommendationItem};
use sources::{CandidateGenerator, CandidateSet, EngineError, HistoryItem, ProfileBuilder, Result, TasteProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: UserId,
    /// `None` uses the configured default
    pub limit: Option<usize>,
}

impl RecommendationRequest {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    /// Scored against the user's taste profile
    Personalized,
    /// No usable history; ranked by quality alone
    ColdStart,
    /// Scoring ran out of time; only the most popular candidates were scored
    Degraded,
    /// Everything in the catalog has been watched or watchlisted
    NoCandidates,
}

impl RecommendationStatus {
    pub fn message(&self) -> &'static str {
        match self {
            RecommendationStatus::Personalized => "Recommendations based on your watch history",
            RecommendationStatus::ColdStart => {
                "Rate a few movies to get personalized recommendations"
            }
            RecommendationStatus::Degraded => {
                "Showing recommendations from the most popular movies only"
            }
            RecommendationStatus::NoCandidates => {
                "You've seen or saved everything in the catalog"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResponse {
    pub user_id: UserId,
    pub status: RecommendationStatus,
    pub items: Vec<RecommendationItem>,
    /// Candidates that went into scoring
    pub candidates_considered: usize,
    /// The user had no usable history; set even when `status` is `Degraded`
    pub cold_start: bool,
}

/// Sets the flag when dropped, stopping any scoring still in flight.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Main engine; cheap to clone and safe to share across requests.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Arc<dyn Catalog>,
    history: Arc<dyn HistoryStore>,
    profile_builder: ProfileBuilder,
    candidate_generator: CandidateGenerator,
    pipeline: Arc<RankingPipeline>,
    scoring_budget: Duration,
    degraded_budget: Duration,
    degraded_candidates: usize,
}

impl RecommendationEngine {
    /// Create an engine over the given stores.
    ///
    /// Fails with `InvalidInput` if the configuration does not validate.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        history: Arc<dyn HistoryStore>,
        config: &EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            catalog,
            history,
            profile_builder: config.profile_builder(),
            candidate_generator: config.candidate_generator(),
            pipeline: Arc::new(config.ranking_pipeline()?),
            scoring_budget: config.scoring_budget(),
            degraded_budget: config.degraded_budget(),
            degraded_candidates: config.degraded_candidates,
        })
    }

    /// Engine backed by an in-memory index serving as both stores
    pub fn from_index(index: Arc<DataIndex>, config: &EngineConfig) -> Result<Self> {
        Self::new(index.clone(), index, config)
    }

    pub fn with_scoring_budget(mut self, budget: Duration) -> Self {
        self.scoring_budget = budget;
        self
    }

    pub fn with_degraded_budget(mut self, budget: Duration) -> Self {
        self.degraded_budget = budget;
        self
    }

    /// Main entry point: recommendations for one user.
    #[instrument(skip(self), fields(user_id = request.user_id))]
    pub async fn recommend(&self, request: RecommendationRequest) -> Result<RecommendationResponse> {
        let start_time = Instant::now();
        let user_id = request.user_id;

        // Reject a bad limit before touching any store
        let limit = self.pipeline.ranker().resolve_limit(request.limit)?;

        let (entries, watchlist) = self.fetch_user_data(user_id).await?;
        debug!(
            "Fetched {} watched and {} watchlisted movies",
            entries.len(),
            watchlist.len()
        );

        let (profile, candidates) = self.profile_and_candidates(entries, watchlist).await?;
        info!(
            "Built profile from {} entries, {} candidates (truncated: {})",
            profile.history_len,
            candidates.len(),
            candidates.truncated
        );

        let cold_start = profile.is_cold_start();
        if candidates.is_empty() {
            info!("No candidates left for user {}", user_id);
            return Ok(RecommendationResponse {
                user_id,
                status: RecommendationStatus::NoCandidates,
                items: Vec::new(),
                candidates_considered: 0,
                cold_start,
            });
        }

        let (items, considered, degraded) = self.score_within_budget(profile, candidates.movies).await?;

        let items = self.pipeline.rank(items, Some(limit))?;

        let status = if degraded {
            RecommendationStatus::Degraded
        } else if cold_start {
            RecommendationStatus::ColdStart
        } else {
            RecommendationStatus::Personalized
        };

        info!(
            "Returning {} recommendations for user {} ({:?}) in {:.2?}",
            items.len(),
            user_id,
            status,
            start_time.elapsed()
        );

        Ok(RecommendationResponse {
            user_id,
            status,
            items,
            candidates_considered: considered,
            cold_start,
        })
    }

    /// The taste profile the engine would use for this user
    pub async fn taste_profile(&self, user_id: UserId) -> Result<TasteProfile> {
        let (entries, _watchlist) = self.fetch_user_data(user_id).await?;
        let catalog = self.catalog.clone();
        let builder = self.profile_builder.clone();

        tokio::task::spawn_blocking(move || -> Result<TasteProfile> {
            let movies = join_history(catalog.as_ref(), &entries)?;
            build_profile(&builder, &entries, &movies)
        })
        .await
        .map_err(task_failed)?
    }

    /// Existence check, history and watchlist, fetched concurrently.
    async fn fetch_user_data(&self, user_id: UserId) -> Result<(Vec<WatchedEntry>, HashSet<MovieId>)> {
        let (exists, watched, watchlist) = tokio::join!(
            tokio::task::spawn_blocking({
                let history = self.history.clone();
                move || history.user_exists(user_id)
            }),
            tokio::task::spawn_blocking({
                let history = self.history.clone();
                move || history.get_watched(user_id)
            }),
            tokio::task::spawn_blocking({
                let history = self.history.clone();
                move || history.get_watchlist_ids(user_id)
            })
        );

        // Unwrap the spawn_blocking results, then the store results
        if !exists.map_err(task_failed)?? {
            return Err(StoreError::not_found("User", user_id).into());
        }
        let watched = watched.map_err(task_failed)??;
        let watchlist = watchlist.map_err(task_failed)??;
        Ok((watched, watchlist))
    }

    async fn profile_and_candidates(
        &self,
        entries: Vec<WatchedEntry>,
        watchlist: HashSet<MovieId>,
    ) -> Result<(TasteProfile, CandidateSet)> {
        let catalog = self.catalog.clone();
        let builder = self.profile_builder.clone();
        let generator = self.candidate_generator.clone();

        tokio::task::spawn_blocking(move || -> Result<(TasteProfile, CandidateSet)> {
            let movies = join_history(catalog.as_ref(), &entries)?;
            let profile = build_profile(&builder, &entries, &movies)?;

            let watched: HashSet<MovieId> = entries.iter().map(|e| e.movie_id).collect();
            let candidates = generator.generate(catalog.as_ref(), &watched, &watchlist)?;
            Ok((profile, candidates))
        })
        .await
        .map_err(task_failed)?
    }

    /// Score and explain, falling back to the first `degraded_candidates`
    /// movies if the full set does not finish within the budget.
    ///
    /// The fallback runs under `degraded_budget`; if that also expires the
    /// request fails with `BudgetExceeded`.
    ///
    /// Returns the items, how many candidates were scored and whether the
    /// fallback was taken.
    async fn score_within_budget(
        &self,
        profile: TasteProfile,
        movies: Vec<Movie>,
    ) -> Result<(Vec<RecommendationItem>, usize, bool)> {
        let profile = Arc::new(profile);
        // Candidates arrive most popular first
        let fallback: Vec<Movie> = movies.iter().take(self.degraded_candidates).cloned().collect();
        let total = movies.len();

        let cancel = Arc::new(AtomicBool::new(false));
        let _guard = CancelOnDrop(cancel.clone());
        let task = tokio::task::spawn_blocking({
            let pipeline = self.pipeline.clone();
            let profile = profile.clone();
            let cancel = cancel.clone();
            move || pipeline.score_and_explain(&profile, movies, &cancel)
        });

        match tokio::time::timeout(self.scoring_budget, task).await {
            Ok(joined) => Ok((joined.map_err(task_failed)??, total, false)),
            Err(_) => {
                cancel.store(true, Ordering::Relaxed);
                warn!(
                    "Scoring {} candidates exceeded {:?}; scoring top {} only",
                    total,
                    self.scoring_budget,
                    fallback.len()
                );

                let considered = fallback.len();
                let retry_cancel = Arc::new(AtomicBool::new(false));
                let _retry_guard = CancelOnDrop(retry_cancel.clone());
                let retry = tokio::task::spawn_blocking({
                    let pipeline = self.pipeline.clone();
                    let retry_cancel = retry_cancel.clone();
                    move || pipeline.score_and_explain(&profile, fallback, &retry_cancel)
                });

                match tokio::time::timeout(self.degraded_budget, retry).await {
                    Ok(joined) => Ok((joined.map_err(task_failed)??, considered, true)),
                    Err(_) => {
                        retry_cancel.store(true, Ordering::Relaxed);
                        warn!(
                            "Degraded scoring of {} candidates exceeded {:?}",
                            considered, self.degraded_budget
                        );
                        Err(EngineError::BudgetExceeded(self.degraded_budget))
                    }
                }
            }
        }
    }
}

/// Movie for each watched entry, `None` where the catalog no longer has it.
///
/// Only `NotFound` is recovered from; any other store error aborts.
fn join_history(catalog: &dyn Catalog, entries: &[WatchedEntry]) -> Result<Vec<Option<Movie>>> {
    entries
        .iter()
        .map(|entry| match catalog.get_movie(entry.movie_id) {
            Ok(movie) => Ok(Some(movie)),
            Err(StoreError::NotFound { .. }) => {
                debug!("Watched movie {} missing from catalog; skipping", entry.movie_id);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        })
        .collect()
}

fn build_profile(
    builder: &ProfileBuilder,
    entries: &[WatchedEntry],
    movies: &[Option<Movie>],
) -> Result<TasteProfile> {
    let history: Vec<HistoryItem> = entries
        .iter()
        .zip(movies)
        .map(|(entry, movie)| HistoryItem::new(entry, movie.as_ref()))
        .collect();
    builder.build(&history)
}

fn task_failed(err: JoinError) -> EngineError {
    if err.is_cancelled() {
        EngineError::Cancelled
    } else {
        EngineError::UpstreamUnavailable(format!("worker task failed: {}", err))
    }
}
