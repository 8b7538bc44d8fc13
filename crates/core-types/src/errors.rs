//! Error types shared across the healing core

use thiserror::Error;

/// Healing core error enumeration
#[derive(Debug, Error, Clone)]
pub enum HealError {
    /// Malformed or missing failure-record input (fails fast)
    #[error("Invalid failure record: {0}")]
    InvalidRecord(String),

    /// A single strategy provider failed (recovered by the orchestrator)
    #[error("Provider '{provider}' failed: {reason}")]
    ProviderFailed { provider: String, reason: String },

    /// The injected ML scorer failed or exceeded its timeout
    #[error("ML scorer error: {0}")]
    ScorerFailed(String),

    /// Learning-store persistence failed (best-effort, never fatal)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HealError {
    /// Whether this error degrades to an empty contribution rather than
    /// aborting the healing attempt
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            HealError::ProviderFailed { .. }
                | HealError::ScorerFailed(_)
                | HealError::Persistence(_)
        )
    }
}
