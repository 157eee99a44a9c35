//! Error type shared by every stage of the recommendation engine.

use data_loader::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the engine to its caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed rating, out-of-range limit, bad configuration
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The user (or another required record) does not exist
    #[error("{entity} with id {id} not found")]
    NotFound { entity: String, id: u32 },

    /// Catalog or history store failed; nothing was scored
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Even the degraded scoring pass did not finish in time
    #[error("Scoring did not finish within {0:?}")]
    BudgetExceeded(Duration),

    /// The caller abandoned the request while work was in flight
    #[error("Request cancelled")]
    Cancelled,
}

impl EngineError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        EngineError::InvalidInput(reason.into())
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            StoreError::Unavailable(reason) => EngineError::UpstreamUnavailable(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
