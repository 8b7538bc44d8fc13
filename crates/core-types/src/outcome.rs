//! Outcome records fed back into the learning store

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::candidate::StrategyKind;
use crate::failure::FailureKind;

/// Current epoch time in milliseconds
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One observed execution result for a healed (or original) locator.
///
/// Append-only: created by the caller after it attempts a candidate via
/// its browser driver, then handed to the learning store. Never mutated
/// after append, only aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyOutcome {
    /// Stable locator key (see `Locator::key`)
    pub selector: String,

    /// Strategy that produced the attempted candidate
    pub strategy: StrategyKind,

    /// Whether the attempt succeeded
    pub success: bool,

    /// Execution time of the attempt in milliseconds
    pub exec_ms: u64,

    /// Error classification when the attempt failed
    pub error_kind: Option<FailureKind>,

    /// Epoch milliseconds when the outcome was observed
    pub timestamp_ms: u64,
}

impl StrategyOutcome {
    pub fn success(selector: impl Into<String>, strategy: StrategyKind, exec_ms: u64) -> Self {
        Self {
            selector: selector.into(),
            strategy,
            success: true,
            exec_ms,
            error_kind: None,
            timestamp_ms: now_ms(),
        }
    }

    pub fn failure(
        selector: impl Into<String>,
        strategy: StrategyKind,
        exec_ms: u64,
        error_kind: FailureKind,
    ) -> Self {
        Self {
            selector: selector.into(),
            strategy,
            success: false,
            exec_ms,
            error_kind: Some(error_kind),
            timestamp_ms: now_ms(),
        }
    }
}
