//! The shared learning store

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use tracing::{debug, warn};

use locheal_core_types::{HealError, StrategyKind, StrategyOutcome};

use crate::model::{LearningSnapshot, ReliabilityStats, SNAPSHOT_VERSION, WINDOW_7D_MS};
use crate::persist;

/// Durable aggregate of past strategy/selector outcomes.
///
/// The sole piece of mutable shared state in the healing core. Aggregates
/// for different keys update concurrently; updates to the same key are
/// serialized by the per-entry lock of the underlying map.
pub struct LearningStore {
    selectors: DashMap<String, ReliabilityStats>,
    strategies: DashMap<StrategyKind, ReliabilityStats>,
    path: Option<PathBuf>,

    /// Outcomes recorded since the last successful flush
    pending: AtomicU32,

    /// Flush after this many recorded outcomes (0 disables auto-flush)
    flush_every: u32,
}

impl LearningStore {
    /// In-memory store with no persistence
    pub fn in_memory() -> Self {
        Self {
            selectors: DashMap::new(),
            strategies: DashMap::new(),
            path: None,
            pending: AtomicU32::new(0),
            flush_every: 0,
        }
    }

    /// Open a persistent store, reloading any existing snapshot.
    ///
    /// A missing file starts empty; an unreadable one is logged and
    /// treated as empty rather than blocking startup.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HealError> {
        let path = path.into();
        let store = Self {
            selectors: DashMap::new(),
            strategies: DashMap::new(),
            path: Some(path.clone()),
            pending: AtomicU32::new(0),
            flush_every: 1,
        };

        match persist::load(&path) {
            Ok(Some(snapshot)) => {
                debug!(
                    selectors = snapshot.selectors.len(),
                    strategies = snapshot.strategies.len(),
                    "Reloaded learning snapshot"
                );
                for (key, stats) in snapshot.selectors {
                    store.selectors.insert(key, stats);
                }
                for (name, stats) in snapshot.strategies {
                    if let Some(kind) = strategy_from_name(&name) {
                        store.strategies.insert(kind, stats);
                    }
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!("Learning snapshot unreadable, starting empty: {}", err);
            }
        }

        Ok(store)
    }

    /// Set the auto-flush batch size (0 disables auto-flush)
    pub fn with_flush_every(mut self, flush_every: u32) -> Self {
        self.flush_every = flush_every;
        self
    }

    /// Append one outcome and update both aggregates.
    ///
    /// Persistence is best-effort: a failed flush is logged and retried
    /// when the next outcome arrives.
    pub fn record_outcome(&self, outcome: &StrategyOutcome) {
        self.selectors
            .entry(outcome.selector.clone())
            .or_default()
            .apply(outcome);
        self.strategies
            .entry(outcome.strategy)
            .or_default()
            .apply(outcome);

        let pending = self.pending.fetch_add(1, Ordering::SeqCst) + 1;
        if self.flush_every > 0 && pending >= self.flush_every {
            if let Err(err) = self.flush() {
                warn!("Learning flush failed (will retry): {}", err);
            }
        }
    }

    /// Success rate for a selector key; 0.5 for unseen selectors
    pub fn selector_success_rate(&self, selector: &str) -> f64 {
        self.selectors
            .get(selector)
            .map(|s| s.success_rate())
            .unwrap_or(crate::model::UNSEEN_RATE)
    }

    /// Success rate for a strategy; 0.5 for unseen strategies
    pub fn strategy_success_rate(&self, strategy: StrategyKind) -> f64 {
        self.strategies
            .get(&strategy)
            .map(|s| s.success_rate())
            .unwrap_or(crate::model::UNSEEN_RATE)
    }

    /// Selector success rate restricted to the most recent 7-day window
    pub fn selector_windowed_rate(&self, selector: &str, now_ms: u64) -> Option<f64> {
        self.selectors
            .get(selector)
            .and_then(|s| s.windowed_rate(now_ms, WINDOW_7D_MS))
    }

    /// Clone of a selector's aggregate, if recorded
    pub fn selector_stats(&self, selector: &str) -> Option<ReliabilityStats> {
        self.selectors.get(selector).map(|s| s.clone())
    }

    /// Clone of a strategy's aggregate, if recorded
    pub fn strategy_stats(&self, strategy: StrategyKind) -> Option<ReliabilityStats> {
        self.strategies.get(&strategy).map(|s| s.clone())
    }

    /// Number of distinct selectors with recorded history
    pub fn selector_count(&self) -> usize {
        self.selectors.len()
    }

    /// Write the current aggregates to disk (no-op without a path)
    pub fn flush(&self) -> Result<(), HealError> {
        let Some(path) = &self.path else {
            self.pending.store(0, Ordering::SeqCst);
            return Ok(());
        };
        let snapshot = self.snapshot();
        persist::store(path, &snapshot).map_err(|err| HealError::Persistence(err.to_string()))?;
        self.pending.store(0, Ordering::SeqCst);
        Ok(())
    }

    /// Human-diffable JSON export of every aggregate
    pub fn export_pretty(&self) -> Result<String, HealError> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|err| HealError::Persistence(err.to_string()))
    }

    fn snapshot(&self) -> LearningSnapshot {
        let mut selectors = BTreeMap::new();
        for entry in self.selectors.iter() {
            selectors.insert(entry.key().clone(), entry.value().clone());
        }
        let mut strategies = BTreeMap::new();
        for entry in self.strategies.iter() {
            strategies.insert(entry.key().name().to_string(), entry.value().clone());
        }
        LearningSnapshot {
            version: SNAPSHOT_VERSION,
            selectors,
            strategies,
        }
    }
}

impl Drop for LearningStore {
    fn drop(&mut self) {
        // Normal shutdown must not lose batched outcomes.
        if self.pending.load(Ordering::SeqCst) > 0 {
            if let Err(err) = self.flush() {
                warn!("Final learning flush failed: {}", err);
            }
        }
    }
}

fn strategy_from_name(name: &str) -> Option<StrategyKind> {
    StrategyKind::all().into_iter().find(|k| k.name() == name)
}
