//! Server crate for the CineRank recommendation engine.
//!
//! This crate contains the engine configuration and the orchestrator that
//! runs every stage of the pipeline for one request.

pub mod config;
pub mod orchestrator;

pub use config::{ConfigError, EngineConfig};
pub use orchestrator::{
    RecommendationEngine, RecommendationRequest, RecommendationResponse, RecommendationStatus,
};
