//! Weighted scoring of candidates against a taste profile.

use crate::signals::{ComponentScores, SignalKind, SignalPolicy};
use data_loader::Movie;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sources::{EngineError, Result, TasteProfile};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, instrument};

/// Allowed drift of the weight sum away from 1.0
pub const WEIGHT_SUM_TOLERANCE: f32 = 1e-4;

/// Per-signal weights. Must be non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub genre: f32,
    pub language: f32,
    pub era: f32,
    pub theme: f32,
    pub quality: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            genre: 0.35,
            language: 0.15,
            era: 0.15,
            theme: 0.10,
            quality: 0.25,
        }
    }
}

impl ScoringWeights {
    pub fn get(&self, kind: SignalKind) -> f32 {
        match kind {
            SignalKind::Genre => self.genre,
            SignalKind::Language => self.language,
            SignalKind::Era => self.era,
            SignalKind::Theme => self.theme,
            SignalKind::Quality => self.quality,
        }
    }

    pub fn sum(&self) -> f32 {
        SignalKind::ALL.iter().map(|&kind| self.get(kind)).sum()
    }

    pub fn validate(&self) -> Result<()> {
        for kind in SignalKind::ALL {
            let weight = self.get(kind);
            if !weight.is_finite() || weight < 0.0 {
                return Err(EngineError::invalid_input(format!(
                    "weight for {} must be a non-negative number, got {}",
                    kind.name(),
                    weight
                )));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::invalid_input(format!(
                "scoring weights must sum to 1.0, got {:.4}",
                sum
            )));
        }
        Ok(())
    }
}

/// A candidate with its score and the numbers that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub movie: Movie,
    /// Raw signal values in `[0, 1]`
    pub components: ComponentScores,
    /// Weighted share each signal added to `score`
    pub contributions: ComponentScores,
    pub score: f32,
    /// Scored on quality alone because the profile was empty
    pub cold_start: bool,
}

#[derive(Debug, Clone)]
pub struct Scorer {
    weights: ScoringWeights,
    policy: SignalPolicy,
}

impl Scorer {
    pub fn new(weights: ScoringWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self {
            weights,
            policy: SignalPolicy::default(),
        })
    }

    pub fn with_quality_prior_votes(mut self, prior_votes: f32) -> Result<Self> {
        if !prior_votes.is_finite() || prior_votes < 0.0 {
            return Err(EngineError::invalid_input(format!(
                "quality prior must be a non-negative number, got {}",
                prior_votes
            )));
        }
        self.policy.quality_prior_votes = prior_votes;
        Ok(self)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score one movie.
    ///
    /// With an empty profile every affinity is zero, so only quality counts
    /// and it carries the full weight.
    pub fn score(&self, profile: &TasteProfile, movie: Movie) -> ScoredCandidate {
        let components = ComponentScores::compute(profile, &movie, &self.policy);
        let cold_start = profile.is_cold_start();

        let mut contributions = ComponentScores::default();
        if cold_start {
            contributions.set(SignalKind::Quality, components.quality);
        } else {
            for kind in SignalKind::ALL {
                contributions.set(kind, self.weights.get(kind) * components.get(kind));
            }
        }

        let total: f32 = SignalKind::ALL
            .iter()
            .map(|&kind| contributions.get(kind))
            .sum();
        let score = if total.is_finite() {
            total.clamp(0.0, 1.0)
        } else {
            0.0
        };

        ScoredCandidate {
            movie,
            components,
            contributions,
            score,
            cold_start,
        }
    }

    /// Score every candidate in parallel, keeping input order.
    ///
    /// `cancel` is checked before each candidate; once set the whole batch
    /// fails with `Cancelled`.
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub fn score_all(
        &self,
        profile: &TasteProfile,
        candidates: Vec<Movie>,
        cancel: &AtomicBool,
    ) -> Result<Vec<ScoredCandidate>> {
        let scored: Option<Vec<ScoredCandidate>> = candidates
            .into_par_iter()
            .map(|movie| {
                if cancel.load(Ordering::Relaxed) {
                    None
                } else {
                    Some(self.score(profile, movie))
                }
            })
            .collect();

        match scored {
            Some(scored) => {
                debug!("Scored {} candidates", scored.len());
                Ok(scored)
            }
            None => Err(EngineError::Cancelled),
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            policy: SignalPolicy::default(),
        }
    }
}
