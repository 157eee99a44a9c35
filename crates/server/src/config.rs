//! Engine configuration loaded from the environment.
//!
//! Every field has a default; any of them can be overridden with a
//! `CINERANK_`-prefixed variable, e.g. `CINERANK_GENRE_WEIGHT=0.5`. A `.env`
//! file in the working directory is read first if present.

use pipeline::{Explainer, Ranker, RankingPipeline, Scorer, ScoringWeights};
use serde::Deserialize;
use sources::{
    CandidateGenerator, DEFAULT_LIKED_THRESHOLD, DEFAULT_NEUTRAL_RATING, EngineError,
    ProfileBuilder,
};
use std::time::Duration;
use thiserror::Error;

pub const ENV_PREFIX: &str = "CINERANK_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] EngineError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    /// Most popular unseen movies considered per request
    pub max_candidates: usize,
    /// Candidates scored when the scoring budget runs out
    pub degraded_candidates: usize,
    pub scoring_budget_ms: u64,
    /// Budget for scoring the degraded subset
    pub degraded_budget_ms: u64,

    pub genre_weight: f32,
    pub language_weight: f32,
    pub era_weight: f32,
    pub theme_weight: f32,
    pub quality_weight: f32,
    pub quality_prior_votes: f32,

    pub min_reason_contribution: f32,
    pub max_reasons: usize,

    pub neutral_rating: f32,
    pub liked_threshold: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let weights = ScoringWeights::default();
        Self {
            default_limit: pipeline::DEFAULT_LIMIT,
            max_limit: pipeline::MAX_LIMIT,
            max_candidates: 5000,
            degraded_candidates: 200,
            scoring_budget_ms: 250,
            degraded_budget_ms: 250,
            genre_weight: weights.genre,
            language_weight: weights.language,
            era_weight: weights.era,
            theme_weight: weights.theme,
            quality_weight: weights.quality,
            quality_prior_votes: pipeline::signals::DEFAULT_QUALITY_PRIOR_VOTES,
            min_reason_contribution: pipeline::explainer::DEFAULT_MIN_CONTRIBUTION,
            max_reasons: pipeline::explainer::DEFAULT_MAX_REASONS,
            neutral_rating: DEFAULT_NEUTRAL_RATING,
            liked_threshold: DEFAULT_LIKED_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Read `.env` (if any), then `CINERANK_*` variables, then validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::prefixed(ENV_PREFIX).from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Same as [`from_env`](Self::from_env) but over explicit pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn weights(&self) -> ScoringWeights {
        ScoringWeights {
            genre: self.genre_weight,
            language: self.language_weight,
            era: self.era_weight,
            theme: self.theme_weight,
            quality: self.quality_weight,
        }
    }

    pub fn scoring_budget(&self) -> Duration {
        Duration::from_millis(self.scoring_budget_ms)
    }

    pub fn degraded_budget(&self) -> Duration {
        Duration::from_millis(self.degraded_budget_ms)
    }

    /// Check every field by building the components it configures.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.profile_builder().build(&[])?;
        self.ranking_pipeline()?;

        if self.max_candidates == 0 {
            return Err(EngineError::invalid_input("max_candidates must be positive"));
        }
        if self.degraded_candidates == 0 || self.degraded_candidates > self.max_candidates {
            return Err(EngineError::invalid_input(format!(
                "degraded_candidates {} must be within [1, {}]",
                self.degraded_candidates, self.max_candidates
            )));
        }
        if self.scoring_budget_ms == 0 || self.degraded_budget_ms == 0 {
            return Err(EngineError::invalid_input(
                "scoring_budget_ms and degraded_budget_ms must be positive",
            ));
        }
        Ok(())
    }

    pub fn profile_builder(&self) -> ProfileBuilder {
        ProfileBuilder::new()
            .with_neutral_rating(self.neutral_rating)
            .with_liked_threshold(self.liked_threshold)
    }

    pub fn candidate_generator(&self) -> CandidateGenerator {
        CandidateGenerator::new().with_max_candidates(self.max_candidates)
    }

    pub fn ranking_pipeline(&self) -> Result<RankingPipeline, EngineError> {
        let scorer = Scorer::new(self.weights())?.with_quality_prior_votes(self.quality_prior_votes)?;
        let explainer = Explainer::new()
            .with_min_contribution(self.min_reason_contribution)?
            .with_max_reasons(self.max_reasons)?;
        let ranker = Ranker::with_limits(self.default_limit, self.max_limit)?;

        Ok(RankingPipeline::new()
            .with_scorer(scorer)
            .with_explainer(explainer)
            .with_ranker(ranker))
    }
}
