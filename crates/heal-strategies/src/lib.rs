//! Strategy providers - independent candidate generators
//!
//! Each provider turns one signal source into zero or more candidate
//! locators:
//! - Stable attributes (test-id, id, aria-label, name, class, text)
//! - DOM-structure traversal when no stable attribute exists
//! - Per-engine interaction quirks applied to the original selector
//! - Externally injected ML predictions behind a timeout
//! - Similarity ranking against the page's element inventory
//!
//! Providers never depend on each other; a provider error is caught by
//! the orchestrator and degrades to zero candidates.

pub mod attributes;
pub mod ml;
pub mod quirks;
pub mod similar;
pub mod structural;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use locheal_core_types::{Candidate, FailureKind, FailureRecord, HealError, PageContext};

pub use attributes::AttributeProvider;
pub use ml::{
    build_features, FeatureVector, MlPrediction, MlPredictionProvider, MlScorer, NoopScorer,
    FEATURE_LAYOUT_VERSION, FEATURE_VECTOR_LEN,
};
pub use quirks::{
    compatibility_score, engine_quirks, BrowserQuirkProvider, ClickStyle, EngineQuirks,
    QUIRK_TABLE_VERSION,
};
pub use similar::SimilarElementProvider;
pub use structural::StructuralProvider;

/// A pluggable candidate generator working from one signal source.
#[async_trait]
pub trait StrategyProvider: Send + Sync {
    /// Provider name for logs and degradation reports
    fn name(&self) -> &'static str;

    /// Generate candidate locators for a classified failure.
    ///
    /// Element, browser and page snapshots arrive read-only; providers
    /// must not retain them. Returning an error is legal and degrades to
    /// an empty contribution at the orchestrator.
    async fn generate(
        &self,
        record: &FailureRecord,
        kind: FailureKind,
        page: &PageContext,
    ) -> Result<Vec<Candidate>, HealError>;
}

/// The built-in provider set, in declaration order.
///
/// Declaration order is what makes ranking tie-breaks deterministic, so
/// it is fixed here rather than left to callers.
pub fn builtin_providers(
    scorer: Arc<dyn MlScorer>,
    ml_timeout: Duration,
) -> Vec<Arc<dyn StrategyProvider>> {
    vec![
        Arc::new(AttributeProvider),
        Arc::new(StructuralProvider),
        Arc::new(BrowserQuirkProvider),
        Arc::new(SimilarElementProvider),
        Arc::new(MlPredictionProvider::new(scorer, ml_timeout)),
    ]
}
