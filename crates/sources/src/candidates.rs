//! Candidate generation: catalog minus (watched ∪ watchlist).
//!
//! The catalog is asked to do the exclusion, but the result is filtered
//! again here. A movie that is both watched and watchlisted, or a store that
//! ignores the exclusion list, must never leak a seen movie into the output.

use crate::error::Result;
use crate::types::CandidateSet;
use data_loader::{Catalog, MovieId};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Selects unseen movies eligible for scoring.
#[derive(Debug, Clone, Default)]
pub struct CandidateGenerator {
    /// Upper bound on candidates; `None` scores the whole catalog
    max_candidates: Option<usize>,
}

impl CandidateGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keep the `cap` most popular unseen movies
    pub fn with_max_candidates(mut self, cap: usize) -> Self {
        self.max_candidates = Some(cap);
        self
    }

    pub fn max_candidates(&self) -> Option<usize> {
        self.max_candidates
    }

    /// Generate candidates for one request.
    ///
    /// Linear in the number of movies the catalog returns. Store failures
    /// propagate as `UpstreamUnavailable`.
    #[instrument(skip_all, fields(watched = watched.len(), watchlist = watchlist.len()))]
    pub fn generate(
        &self,
        catalog: &dyn Catalog,
        watched: &HashSet<MovieId>,
        watchlist: &HashSet<MovieId>,
    ) -> Result<CandidateSet> {
        let exclude: HashSet<MovieId> = watched.union(watchlist).copied().collect();

        // Ask for one extra so we can tell whether the cap was hit
        let request_cap = self.max_candidates.map(|cap| cap.saturating_add(1));
        let listed = catalog.list_candidates(&exclude, request_cap)?;
        let listed_len = listed.len();

        let mut seen = HashSet::with_capacity(listed_len);
        let mut movies: Vec<_> = listed
            .into_iter()
            .filter(|movie| !exclude.contains(&movie.id))
            .filter(|movie| seen.insert(movie.id))
            .collect();

        if movies.len() != listed_len {
            warn!(
                "Catalog returned {} excluded or duplicate movies; dropped them",
                listed_len - movies.len()
            );
        }

        let truncated = match self.max_candidates {
            Some(cap) if movies.len() > cap => {
                movies.truncate(cap);
                true
            }
            _ => false,
        };

        debug!(
            "Generated {} candidates (excluded {}, truncated: {})",
            movies.len(),
            exclude.len(),
            truncated
        );

        Ok(CandidateSet {
            movies,
            excluded: exclude.len(),
            truncated,
        })
    }
}
