//! Candidate locators and their scored, explainable counterparts

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clamp01;
use crate::failure::FailureKind;

/// Identifier for one healing attempt
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct HealId(pub String);

impl HealId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for HealId {
    fn default() -> Self {
        Self::new()
    }
}

/// Closed set of built-in candidate-producing strategies.
///
/// Replaces the string-keyed strategy registry of older designs: dispatch
/// is an exhaustive match, so an unknown strategy is a compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// data-testid attribute
    TestId,

    /// id attribute
    Id,

    /// aria-label attribute
    AriaLabel,

    /// name attribute
    Name,

    /// class attribute
    Class,

    /// visible text content
    Text,

    /// DOM-path / XPath traversal
    Structural,

    /// per-engine interaction rewrite of the original selector
    BrowserQuirk,

    /// externally injected ML prediction
    MlPrediction,

    /// similarity match against the page inventory
    SimilarElement,
}

impl StrategyKind {
    /// Stable name used in logs and persisted aggregates
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::TestId => "test-id",
            StrategyKind::Id => "id",
            StrategyKind::AriaLabel => "aria-label",
            StrategyKind::Name => "name",
            StrategyKind::Class => "class",
            StrategyKind::Text => "text",
            StrategyKind::Structural => "structural",
            StrategyKind::BrowserQuirk => "browser-quirk",
            StrategyKind::MlPrediction => "ml-prediction",
            StrategyKind::SimilarElement => "similar-element",
        }
    }

    /// Fixed priority hint (0-10) in descending order of assumed stability
    pub fn base_priority(&self) -> u8 {
        match self {
            StrategyKind::TestId => 10,
            StrategyKind::Id => 9,
            StrategyKind::AriaLabel => 8,
            StrategyKind::Name => 7,
            StrategyKind::BrowserQuirk => 6,
            StrategyKind::Class => 5,
            StrategyKind::SimilarElement => 5,
            StrategyKind::Text => 4,
            StrategyKind::MlPrediction => 4,
            StrategyKind::Structural => 2,
        }
    }

    /// All strategy kinds, in priority order
    pub fn all() -> [StrategyKind; 10] {
        [
            StrategyKind::TestId,
            StrategyKind::Id,
            StrategyKind::AriaLabel,
            StrategyKind::Name,
            StrategyKind::BrowserQuirk,
            StrategyKind::Class,
            StrategyKind::SimilarElement,
            StrategyKind::Text,
            StrategyKind::MlPrediction,
            StrategyKind::Structural,
        ]
    }
}

/// Structured locator descriptor for a candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Locator {
    /// CSS selector
    Css(String),

    /// XPath expression
    XPath(String),

    /// Text content (exact or partial match)
    Text { content: String, exact: bool },

    /// ARIA role and accessible name
    Aria { role: String, name: String },
}

impl Locator {
    /// Stable key form used by the learning store
    pub fn key(&self) -> String {
        match self {
            Locator::Css(s) => format!("css:{}", s),
            Locator::XPath(s) => format!("xpath:{}", s),
            Locator::Text { content, exact } => {
                if *exact {
                    format!("text:exact:'{}'", content)
                } else {
                    format!("text:partial:'{}'", content)
                }
            }
            Locator::Aria { role, name } => format!("aria:{}[name='{}']", role, name),
        }
    }

    /// The raw selector/expression without the scheme prefix
    pub fn raw(&self) -> &str {
        match self {
            Locator::Css(s) | Locator::XPath(s) => s,
            Locator::Text { content, .. } => content,
            Locator::Aria { name, .. } => name,
        }
    }

    pub fn is_xpath(&self) -> bool {
        matches!(self, Locator::XPath(_))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A proposed alternative locator from one strategy provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Strategy that produced this candidate
    pub strategy: StrategyKind,

    /// Proposed locator
    pub locator: Locator,

    /// Priority hint (0-10) from the originating strategy
    pub priority: u8,

    /// Strategy-specific metadata, used only for explainability.
    ///
    /// BTreeMap keeps serialized output and iteration deterministic.
    pub metadata: BTreeMap<String, String>,
}

impl Candidate {
    pub fn new(strategy: StrategyKind, locator: Locator) -> Self {
        Self {
            strategy,
            locator,
            priority: strategy.base_priority(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.min(10);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Scoring factor identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorKind {
    SelectorStability,
    ElementContext,
    HistoricalSuccess,
    BrowserCompatibility,
    PageComplexity,
    Timing,
}

impl FactorKind {
    pub fn name(&self) -> &'static str {
        match self {
            FactorKind::SelectorStability => "selector-stability",
            FactorKind::ElementContext => "element-context",
            FactorKind::HistoricalSuccess => "historical-success",
            FactorKind::BrowserCompatibility => "browser-compatibility",
            FactorKind::PageComplexity => "page-complexity",
            FactorKind::Timing => "timing",
        }
    }
}

/// Per-factor score breakdown, each clamped to [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    pub selector_stability: f64,
    pub element_context: f64,
    pub historical_success: f64,
    pub browser_compatibility: f64,
    pub page_complexity: f64,
    pub timing: f64,
}

impl FactorScores {
    /// Iterate (factor, score) pairs in declaration order
    pub fn iter(&self) -> [(FactorKind, f64); 6] {
        [
            (FactorKind::SelectorStability, self.selector_stability),
            (FactorKind::ElementContext, self.element_context),
            (FactorKind::HistoricalSuccess, self.historical_success),
            (FactorKind::BrowserCompatibility, self.browser_compatibility),
            (FactorKind::PageComplexity, self.page_complexity),
            (FactorKind::Timing, self.timing),
        ]
    }

    /// Clamp every factor into [0, 1]
    pub fn clamped(self) -> Self {
        Self {
            selector_stability: clamp01(self.selector_stability),
            element_context: clamp01(self.element_context),
            historical_success: clamp01(self.historical_success),
            browser_compatibility: clamp01(self.browser_compatibility),
            page_complexity: clamp01(self.page_complexity),
            timing: clamp01(self.timing),
        }
    }
}

/// Qualitative confidence bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceTier {
    /// Map a numeric confidence to its tier
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            ConfidenceTier::High
        } else if confidence >= 0.6 {
            ConfidenceTier::Medium
        } else if confidence >= 0.4 {
            ConfidenceTier::Low
        } else {
            ConfidenceTier::VeryLow
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
            ConfidenceTier::VeryLow => "very-low",
        }
    }
}

/// Severity of a flagged risk factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskSeverity {
    /// Factor scored below 0.6
    Moderate,

    /// Factor scored below 0.4
    High,
}

/// One factor flagged as risky in a score breakdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskNote {
    pub factor: FactorKind,
    pub severity: RiskSeverity,
    pub score: f64,
}

/// A candidate annotated with its full confidence breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,

    /// Per-factor breakdown, each in [0, 1]
    pub factors: FactorScores,

    /// Weighted overall confidence in [0, 1]
    pub confidence: f64,

    /// Qualitative tier derived from the confidence
    pub tier: ConfidenceTier,

    /// Factors scoring below the risk thresholds
    pub risks: Vec<RiskNote>,

    /// Human-readable remediation hints
    pub recommendations: Vec<String>,

    /// Insertion order assigned by the orchestrator, used for tie-breaks
    pub sequence: usize,
}

/// Final ranked result of one healing attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealReport {
    /// Attempt identifier
    pub id: HealId,

    /// Classified failure kind
    pub failure_kind: FailureKind,

    /// Candidates ranked by confidence, bounded to top-N
    pub ranked: Vec<ScoredCandidate>,

    /// Providers that failed or timed out during this attempt
    pub degraded_providers: Vec<String>,

    /// Epoch milliseconds when the report was produced
    pub produced_at_ms: u64,
}

impl HealReport {
    /// Best candidate, if any reached the ranked list
    pub fn top(&self) -> Option<&ScoredCandidate> {
        self.ranked.first()
    }

    /// Whether any candidate reached at least medium confidence
    pub fn has_usable_candidate(&self) -> bool {
        self.ranked
            .iter()
            .any(|c| matches!(c.tier, ConfidenceTier::High | ConfidenceTier::Medium))
    }
}
