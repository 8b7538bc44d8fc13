//! Healing orchestration
//!
//! One attempt walks Received -> Classified -> Generating -> Scoring ->
//! Ranked -> Reported. Provider failures degrade to empty contributions;
//! only malformed input fails the attempt outright.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use heal_scoring::ConfidenceScorer;
use heal_strategies::{builtin_providers, MlScorer, NoopScorer, StrategyProvider};
use learning_store::LearningStore;
use locheal_core_types::{
    now_ms, FailureRecord, HealError, HealId, HealReport, PageContext, ScoredCandidate,
    StrategyOutcome,
};

use crate::classifier::classify;

/// Per-attempt pipeline phase, logged at every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HealPhase {
    Received,
    Classified,
    Generating,
    Scoring,
    Ranked,
    Reported,
}

impl HealPhase {
    fn name(&self) -> &'static str {
        match self {
            HealPhase::Received => "received",
            HealPhase::Classified => "classified",
            HealPhase::Generating => "generating",
            HealPhase::Scoring => "scoring",
            HealPhase::Ranked => "ranked",
            HealPhase::Reported => "reported",
        }
    }
}

/// Orchestrator tuning knobs
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Ranked list bound
    pub max_candidates: usize,

    /// Budget for the injected ML scorer call
    pub ml_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_candidates: 8,
            ml_timeout: Duration::from_millis(1_000),
        }
    }
}

/// Coordinates classification, provider fan-out, scoring and ranking.
pub struct HealingOrchestrator {
    providers: Vec<Arc<dyn StrategyProvider>>,
    scorer: ConfidenceScorer,
    learning: Arc<LearningStore>,
    config: EngineConfig,
}

impl HealingOrchestrator {
    /// Orchestrator over an explicit provider set.
    ///
    /// Provider order fixes the tie-break sequence, so callers supplying
    /// their own set must keep it stable across runs.
    pub fn new(
        providers: Vec<Arc<dyn StrategyProvider>>,
        learning: Arc<LearningStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            providers,
            scorer: ConfidenceScorer::new(learning.clone()),
            learning,
            config,
        }
    }

    /// Orchestrator with the built-in providers and an injected ML scorer.
    pub fn with_builtin(
        ml_scorer: Arc<dyn MlScorer>,
        learning: Arc<LearningStore>,
        config: EngineConfig,
    ) -> Self {
        let providers = builtin_providers(ml_scorer, config.ml_timeout);
        Self::new(providers, learning, config)
    }

    /// Orchestrator with built-ins and no ML scorer.
    pub fn without_ml(learning: Arc<LearningStore>, config: EngineConfig) -> Self {
        Self::with_builtin(Arc::new(NoopScorer), learning, config)
    }

    /// Run one healing attempt and return the ranked report.
    ///
    /// Never fails for lack of candidates; an empty ranked list is a
    /// valid reported outcome. Fails only on malformed input.
    pub async fn heal(
        &self,
        record: &FailureRecord,
        page: &PageContext,
    ) -> Result<HealReport, HealError> {
        let id = HealId::new();
        let mut phase = HealPhase::Received;
        debug!(attempt = %id.0, phase = phase.name(), selector = %record.selector, "Heal attempt started");

        validate(record)?;

        let failure_kind = classify(&record.error);
        phase = transition(&id, phase, HealPhase::Classified);
        debug!(attempt = %id.0, kind = failure_kind.name(), "Failure classified");

        phase = transition(&id, phase, HealPhase::Generating);
        let generations = join_all(
            self.providers
                .iter()
                .map(|provider| provider.generate(record, failure_kind, page)),
        )
        .await;

        let mut degraded = Vec::new();
        let mut candidates = Vec::new();
        for (provider, generated) in self.providers.iter().zip(generations) {
            match generated {
                Ok(batch) => candidates.extend(batch),
                Err(err) => {
                    warn!(
                        provider = provider.name(),
                        error = %err,
                        "Provider degraded to zero candidates"
                    );
                    degraded.push(provider.name().to_string());
                }
            }
        }

        phase = transition(&id, phase, HealPhase::Scoring);
        let mut scored: Vec<ScoredCandidate> = candidates
            .iter()
            .enumerate()
            .map(|(sequence, candidate)| self.scorer.score(candidate, record, page, sequence))
            .collect();

        phase = transition(&id, phase, HealPhase::Ranked);
        rank(&mut scored);
        scored.truncate(self.config.max_candidates);

        transition(&id, phase, HealPhase::Reported);
        info!(
            attempt = %id.0,
            kind = failure_kind.name(),
            ranked = scored.len(),
            degraded = degraded.len(),
            top_confidence = scored.first().map(|c| c.confidence).unwrap_or(0.0),
            "Heal attempt reported"
        );

        Ok(HealReport {
            id,
            failure_kind,
            ranked: scored,
            degraded_providers: degraded,
            produced_at_ms: now_ms(),
        })
    }

    /// Feed one observed execution result back into the learning store.
    ///
    /// Learning is advisory: persistence problems are absorbed by the
    /// store and never surface here.
    pub fn record_outcome(&self, outcome: &StrategyOutcome) {
        debug!(
            selector = %outcome.selector,
            strategy = outcome.strategy.name(),
            success = outcome.success,
            "Outcome recorded"
        );
        self.learning.record_outcome(outcome);
    }

    /// Shared learning store handle
    pub fn learning(&self) -> &Arc<LearningStore> {
        &self.learning
    }
}

fn validate(record: &FailureRecord) -> Result<(), HealError> {
    if record.selector.trim().is_empty() {
        return Err(HealError::InvalidRecord("empty selector".to_string()));
    }
    if record.element.tag_name.trim().is_empty() {
        return Err(HealError::InvalidRecord("empty tag name".to_string()));
    }
    Ok(())
}

fn transition(id: &HealId, from: HealPhase, to: HealPhase) -> HealPhase {
    debug!(attempt = %id.0, from = from.name(), to = to.name(), "Phase transition");
    to
}

/// Confidence descending, then priority descending, then insertion order.
///
/// Fully deterministic: never depends on provider completion order or
/// map iteration.
fn rank(scored: &mut [ScoredCandidate]) {
    scored.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.candidate.priority.cmp(&a.candidate.priority))
            .then(a.sequence.cmp(&b.sequence))
    });
}
