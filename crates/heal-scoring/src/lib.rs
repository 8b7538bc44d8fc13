//! Confidence scoring
//!
//! Combines per-candidate signals into a single 0-1 confidence with a
//! qualitative tier, risk notes for weak factors, and human-readable
//! recommendations. Deterministic given identical inputs and identical
//! learning-store state.

pub mod factors;

use std::sync::Arc;

use tracing::debug;

use learning_store::LearningStore;
use locheal_core_types::{
    clamp01, Candidate, ConfidenceTier, FactorKind, FactorScores, FailureRecord, PageContext,
    RiskNote, RiskSeverity, ScoredCandidate,
};

pub use factors::{
    browser_compatibility_factor, element_context_factor, historical_success_factor,
    page_complexity_factor, selector_stability_factor, timing_factor, WEIGHT_BROWSER_COMPAT,
    WEIGHT_ELEMENT_CONTEXT, WEIGHT_HISTORICAL, WEIGHT_PAGE_COMPLEXITY, WEIGHT_STABILITY,
    WEIGHT_TIMING,
};

/// Factor below this score earns a moderate risk note
pub const RISK_THRESHOLD: f64 = 0.6;

/// Factor below this score earns a high-severity risk note
pub const HIGH_RISK_THRESHOLD: f64 = 0.4;

/// Scores candidates against element/browser/page context and history.
pub struct ConfidenceScorer {
    learning: Arc<LearningStore>,
}

impl ConfidenceScorer {
    pub fn new(learning: Arc<LearningStore>) -> Self {
        Self { learning }
    }

    /// Annotate one candidate with its full confidence breakdown.
    pub fn score(
        &self,
        candidate: &Candidate,
        record: &FailureRecord,
        page: &PageContext,
        sequence: usize,
    ) -> ScoredCandidate {
        let factors = FactorScores {
            selector_stability: selector_stability_factor(&candidate.locator, &self.learning),
            element_context: element_context_factor(&record.element),
            historical_success: historical_success_factor(
                candidate,
                &self.learning,
                record.timestamp_ms,
            ),
            browser_compatibility: browser_compatibility_factor(
                &record.browser,
                candidate.strategy,
            ),
            page_complexity: page_complexity_factor(page),
            timing: timing_factor(page),
        }
        .clamped();

        let confidence = clamp01(
            WEIGHT_STABILITY * factors.selector_stability
                + WEIGHT_ELEMENT_CONTEXT * factors.element_context
                + WEIGHT_HISTORICAL * factors.historical_success
                + WEIGHT_BROWSER_COMPAT * factors.browser_compatibility
                + WEIGHT_PAGE_COMPLEXITY * factors.page_complexity
                + WEIGHT_TIMING * factors.timing,
        );

        let risks = risk_notes(&factors);
        let recommendations = recommendations(&factors, record);

        debug!(
            strategy = candidate.strategy.name(),
            locator = %candidate.locator,
            confidence,
            "Candidate scored"
        );

        ScoredCandidate {
            candidate: candidate.clone(),
            factors,
            confidence,
            tier: ConfidenceTier::from_confidence(confidence),
            risks,
            recommendations,
            sequence,
        }
    }
}

fn risk_notes(factors: &FactorScores) -> Vec<RiskNote> {
    factors
        .iter()
        .into_iter()
        .filter(|(_, score)| *score < RISK_THRESHOLD)
        .map(|(factor, score)| RiskNote {
            factor,
            severity: if score < HIGH_RISK_THRESHOLD {
                RiskSeverity::High
            } else {
                RiskSeverity::Moderate
            },
            score,
        })
        .collect()
}

fn recommendations(factors: &FactorScores, record: &FailureRecord) -> Vec<String> {
    let mut out = Vec::new();
    if factors.selector_stability < RISK_THRESHOLD {
        out.push("Prefer a stable attribute selector (data-testid or id)".to_string());
    }
    if factors.element_context < RISK_THRESHOLD {
        out.push("Element state is unreliable; verify visibility and enablement first".to_string());
    }
    if factors.historical_success < HIGH_RISK_THRESHOLD {
        out.push("This selector has a poor track record; consider re-recording the step".to_string());
    }
    if factors.browser_compatibility < 0.7 {
        out.push(format!(
            "Strategy has limited support on {}",
            record.browser.engine.name()
        ));
    }
    if factors.page_complexity < 0.5 {
        out.push("Page is highly dynamic; add explicit waits before interacting".to_string());
    }
    if factors.timing < 0.5 {
        out.push("Wait for page load and network idle before retrying".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use locheal_core_types::{
        ActionKind, BrowserInfo, ElementContext, EngineFamily, Locator, StrategyKind,
        StrategyOutcome,
    };

    fn id_record() -> FailureRecord {
        let mut element = ElementContext::new("button");
        element.attributes.id = Some("submit-btn".into());
        FailureRecord::new(
            ActionKind::Click,
            "#submit-btn",
            "element not found",
            element,
            BrowserInfo::new(EngineFamily::Chromium, 121),
        )
    }

    fn scorer() -> ConfidenceScorer {
        ConfidenceScorer::new(Arc::new(LearningStore::in_memory()))
    }

    #[test]
    fn test_scores_are_bounded() {
        let candidate = Candidate::new(StrategyKind::Id, Locator::Css("#submit-btn".into()));
        let scored = scorer().score(&candidate, &id_record(), &PageContext::default(), 0);

        for (_, score) in scored.factors.iter() {
            assert!((0.0..=1.0).contains(&score));
        }
        assert!((0.0..=1.0).contains(&scored.confidence));
    }

    #[test]
    fn test_stable_id_candidate_reaches_medium() {
        let candidate = Candidate::new(StrategyKind::Id, Locator::Css("#submit-btn".into()));
        let scored = scorer().score(&candidate, &id_record(), &PageContext::default(), 0);
        assert!(scored.confidence >= 0.6, "confidence {}", scored.confidence);
        assert!(matches!(
            scored.tier,
            ConfidenceTier::High | ConfidenceTier::Medium
        ));
    }

    #[test]
    fn test_positional_candidate_is_low_tier() {
        let record = FailureRecord::new(
            ActionKind::Click,
            "div:nth-child(3)",
            "element not found",
            ElementContext::new("div"),
            BrowserInfo::new(EngineFamily::Chromium, 121),
        );
        let candidate = Candidate::new(
            StrategyKind::Structural,
            Locator::Css("div:nth-child(3)".into()),
        );
        let scored = scorer().score(&candidate, &record, &PageContext::default(), 0);

        assert!(
            scored.factors.selector_stability <= 0.4,
            "stability {}",
            scored.factors.selector_stability
        );
        assert!(matches!(
            scored.tier,
            ConfidenceTier::Low | ConfidenceTier::VeryLow
        ));
    }

    #[test]
    fn test_weak_factors_emit_risk_notes() {
        let record = FailureRecord::new(
            ActionKind::Click,
            "//div[3]",
            "element not found",
            ElementContext::new("div"),
            BrowserInfo::new(EngineFamily::WebKit, 17),
        );
        let candidate = Candidate::new(
            StrategyKind::Structural,
            Locator::XPath("//div[3]".into()),
        );
        let scored = scorer().score(&candidate, &record, &PageContext::default(), 0);

        let stability_risk = scored
            .risks
            .iter()
            .find(|r| r.factor == FactorKind::SelectorStability)
            .expect("stability risk");
        assert_eq!(stability_risk.severity, RiskSeverity::High);
        assert!(scored
            .recommendations
            .iter()
            .any(|r| r.contains("stable attribute")));
    }

    #[test]
    fn test_history_raises_confidence() {
        let learning = Arc::new(LearningStore::in_memory());
        let candidate = Candidate::new(StrategyKind::Id, Locator::Css("#submit-btn".into()));
        let record = id_record();

        let baseline = ConfidenceScorer::new(learning.clone()).score(
            &candidate,
            &record,
            &PageContext::default(),
            0,
        );

        for _ in 0..10 {
            learning.record_outcome(&StrategyOutcome::success(
                candidate.locator.key(),
                StrategyKind::Id,
                25,
            ));
        }
        let informed = ConfidenceScorer::new(learning).score(
            &candidate,
            &record,
            &PageContext::default(),
            0,
        );

        assert!(informed.factors.historical_success > baseline.factors.historical_success);
        assert!(informed.factors.selector_stability > baseline.factors.selector_stability);
        assert!(informed.confidence > baseline.confidence);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let scorer = scorer();
        let candidate = Candidate::new(StrategyKind::Id, Locator::Css("#submit-btn".into()));
        let record = id_record();
        let a = scorer.score(&candidate, &record, &PageContext::default(), 3);
        let b = scorer.score(&candidate, &record, &PageContext::default(), 3);
        assert_eq!(a, b);
    }
}
