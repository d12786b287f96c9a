//! Error types for the collaborator seams.
//!
//! The simulation itself is total and never fails; only storage,
//! configuration loading and argument parsing can.

/// Failure reported by a [`Persistence`](crate::persistence::Persistence) implementation.
///
/// Callers log these and carry on: a lost write is accepted, a failed read
/// falls back to the value already held in memory.
#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while loading tuning data.
#[derive(thiserror::Error, Debug)]
pub enum TuningError {
    #[error("Malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A boost name that matches no [`BoostKind`](crate::boosts::BoostKind).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown boost kind `{0}`")]
pub struct UnknownBoost(pub String);
