//! Reliability aggregates and the persisted snapshot shape

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use locheal_core_types::{clamp01, FailureKind, StrategyOutcome};

/// Seven days in milliseconds, the default recency window
pub const WINDOW_7D_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Recent samples retained per aggregate for windowed rates
pub const RECENT_CAP: usize = 256;

/// Success rate assumed for keys with no recorded history
pub const UNSEEN_RATE: f64 = 0.5;

/// One (timestamp, success) sample in an aggregate's recent history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSample {
    pub timestamp_ms: u64,
    pub success: bool,
}

/// Aggregate reliability state for one selector or one strategy.
///
/// Created on the first outcome for a key; updated on every subsequent
/// outcome; never deleted by the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityStats {
    /// Total recorded attempts
    pub attempts: u64,

    /// Successful attempts
    pub successes: u64,

    /// Rolling average execution time in milliseconds
    pub avg_exec_ms: f64,

    /// Error-kind name -> occurrence count
    pub error_counts: BTreeMap<String, u64>,

    /// Bounded recent samples for windowed rates
    pub recent: VecDeque<OutcomeSample>,
}

impl ReliabilityStats {
    /// Fold one outcome into the aggregate
    pub fn apply(&mut self, outcome: &StrategyOutcome) {
        self.attempts += 1;
        if outcome.success {
            self.successes += 1;
        }

        // Incremental rolling average keeps the update O(1).
        let n = self.attempts as f64;
        self.avg_exec_ms += (outcome.exec_ms as f64 - self.avg_exec_ms) / n;

        if let Some(kind) = outcome.error_kind {
            *self.error_counts.entry(kind.name().to_string()).or_insert(0) += 1;
        }

        self.recent.push_back(OutcomeSample {
            timestamp_ms: outcome.timestamp_ms,
            success: outcome.success,
        });
        while self.recent.len() > RECENT_CAP {
            self.recent.pop_front();
        }
    }

    /// Derived success rate: successes / attempts, [`UNSEEN_RATE`] if empty
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            UNSEEN_RATE
        } else {
            clamp01(self.successes as f64 / self.attempts as f64)
        }
    }

    /// Success rate restricted to samples newer than `now_ms - window_ms`.
    ///
    /// `None` when no retained sample falls inside the window.
    pub fn windowed_rate(&self, now_ms: u64, window_ms: u64) -> Option<f64> {
        let cutoff = now_ms.saturating_sub(window_ms);
        let mut attempts = 0u64;
        let mut successes = 0u64;
        for sample in self.recent.iter().filter(|s| s.timestamp_ms >= cutoff) {
            attempts += 1;
            if sample.success {
                successes += 1;
            }
        }
        if attempts == 0 {
            None
        } else {
            Some(clamp01(successes as f64 / attempts as f64))
        }
    }

    /// Occurrences of one error kind
    pub fn error_count(&self, kind: FailureKind) -> u64 {
        self.error_counts.get(kind.name()).copied().unwrap_or(0)
    }
}

/// Durable snapshot of every aggregate, keyed by selector and by strategy.
///
/// BTreeMaps keep the serialized form stable and human-diffable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Locator key -> aggregate
    pub selectors: BTreeMap<String, ReliabilityStats>,

    /// Strategy name -> aggregate
    pub strategies: BTreeMap<String, ReliabilityStats>,
}

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use locheal_core_types::StrategyKind;

    fn outcome_at(ts: u64, success: bool) -> StrategyOutcome {
        let mut o = if success {
            StrategyOutcome::success("css:#a", StrategyKind::Id, 40)
        } else {
            StrategyOutcome::failure("css:#a", StrategyKind::Id, 40, FailureKind::ElementNotFound)
        };
        o.timestamp_ms = ts;
        o
    }

    #[test]
    fn test_unseen_rate_default() {
        let stats = ReliabilityStats::default();
        assert_eq!(stats.success_rate(), UNSEEN_RATE);
        assert_eq!(stats.windowed_rate(1_000, WINDOW_7D_MS), None);
    }

    #[test]
    fn test_apply_updates_counts_and_average() {
        let mut stats = ReliabilityStats::default();
        let mut first = outcome_at(10, true);
        first.exec_ms = 100;
        let mut second = outcome_at(20, false);
        second.exec_ms = 50;

        stats.apply(&first);
        stats.apply(&second);

        assert_eq!(stats.attempts, 2);
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.success_rate(), 0.5);
        assert!((stats.avg_exec_ms - 75.0).abs() < f64::EPSILON);
        assert_eq!(stats.error_count(FailureKind::ElementNotFound), 1);
    }

    #[test]
    fn test_windowed_rate_excludes_old_samples() {
        let mut stats = ReliabilityStats::default();
        stats.apply(&outcome_at(0, false));
        stats.apply(&outcome_at(WINDOW_7D_MS + 500, true));

        let now = WINDOW_7D_MS + 1_000;
        assert_eq!(stats.windowed_rate(now, WINDOW_7D_MS), Some(1.0));
        // Overall rate still sees the old failure.
        assert_eq!(stats.success_rate(), 0.5);
    }

    #[test]
    fn test_recent_history_is_bounded() {
        let mut stats = ReliabilityStats::default();
        for i in 0..(RECENT_CAP as u64 + 50) {
            stats.apply(&outcome_at(i, true));
        }
        assert_eq!(stats.recent.len(), RECENT_CAP);
        assert_eq!(stats.attempts, RECENT_CAP as u64 + 50);
    }
}
