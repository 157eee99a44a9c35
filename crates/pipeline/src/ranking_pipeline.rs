//! The RankingPipeline chains Scorer, Explainer and Ranker.

use crate::explainer::Explainer;
use crate::ranker::Ranker;
use crate::scorer::Scorer;
use crate::types::RecommendationItem;
use data_loader::Movie;
use rayon::prelude::*;
use sources::{Result, TasteProfile};
use std::sync::atomic::AtomicBool;
use tracing::debug;

/// Scores, explains and ranks a candidate set for one profile.
///
/// ## Usage
/// ```ignore
/// let pipeline = RankingPipeline::new()
///     .with_scorer(Scorer::new(weights)?)
///     .with_ranker(Ranker::with_limits(20, 100)?);
///
/// let items = pipeline.run(&profile, candidates.movies, Some(10), &cancel)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RankingPipeline {
    scorer: Scorer,
    explainer: Explainer,
    ranker: Ranker,
}

impl RankingPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_explainer(mut self, explainer: Explainer) -> Self {
        self.explainer = explainer;
        self
    }

    pub fn with_ranker(mut self, ranker: Ranker) -> Self {
        self.ranker = ranker;
        self
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    /// Score and explain every candidate. Output keeps candidate order.
    pub fn score_and_explain(
        &self,
        profile: &TasteProfile,
        candidates: Vec<Movie>,
        cancel: &AtomicBool,
    ) -> Result<Vec<RecommendationItem>> {
        debug!("Scoring {} candidates", candidates.len());
        let scored = self.scorer.score_all(profile, candidates, cancel)?;

        let items: Vec<RecommendationItem> = scored
            .into_par_iter()
            .map(|candidate| {
                let reasons = self.explainer.explain(profile, &candidate);
                RecommendationItem {
                    score: candidate.score,
                    movie: candidate.movie,
                    reasons,
                }
            })
            .collect();
        debug!("Explained {} candidates", items.len());
        Ok(items)
    }

    pub fn rank(
        &self,
        items: Vec<RecommendationItem>,
        limit: Option<usize>,
    ) -> Result<Vec<RecommendationItem>> {
        self.ranker.rank(items, limit)
    }

    /// All three stages. The limit is checked before any scoring happens.
    pub fn run(
        &self,
        profile: &TasteProfile,
        candidates: Vec<Movie>,
        limit: Option<usize>,
        cancel: &AtomicBool,
    ) -> Result<Vec<RecommendationItem>> {
        let limit = self.ranker.resolve_limit(limit)?;
        let items = self.score_and_explain(profile, candidates, cancel)?;
        self.rank(items, Some(limit))
    }
}
