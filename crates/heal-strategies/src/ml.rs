//! External ML prediction adapter
//!
//! The core owns feature-vector construction; the scorer itself is an
//! injected, opaque dependency. A no-op scorer is a legal substitute and
//! simply contributes zero candidates.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use locheal_core_types::{
    clamp01, Candidate, EngineFamily, FailureKind, FailureRecord, HealError, Locator, NetworkSpeed,
    PageContext, StrategyKind,
};

use crate::StrategyProvider;

/// Fixed feature-vector length; unused slots are zero-filled
pub const FEATURE_VECTOR_LEN: usize = 25;

/// Version of the feature layout below
pub const FEATURE_LAYOUT_VERSION: u32 = 1;

/// Fixed-length normalized feature vector handed to the injected scorer.
///
/// Layout v1 (all slots in [0, 1]):
///  0 selector length / 100        13 dynamic-content flag
///  1 xpath-or-positional selector 14 engine: chromium
///  2 has id                       15 engine: gecko
///  3 has test-id                  16 engine: webkit
///  4 has aria-label               17 engine major version / 150
///  5 has name                     18 dom node count / 10000
///  6 has class                    19 spa flag
///  7 has text                     20 load complete
///  8 visible                      21 pending requests / 50
///  9 enabled                      22 network speed class / 3
/// 10 in viewport                  23 retry count / 5
/// 11 dom depth / 50               24 failure kind ordinal / 5
/// 12 shadow-dom flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f32; FEATURE_VECTOR_LEN]);

/// One (selector, confidence) pair returned by the injected scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlPrediction {
    pub selector: String,
    pub confidence: f64,
}

/// Injected scorer contract.
///
/// Implementations live outside this core; the provider bounds every call
/// with a caller-supplied timeout.
#[async_trait]
pub trait MlScorer: Send + Sync {
    async fn predict(&self, features: &FeatureVector) -> Result<Vec<MlPrediction>, HealError>;
}

/// Scorer that always returns no predictions.
pub struct NoopScorer;

#[async_trait]
impl MlScorer for NoopScorer {
    async fn predict(&self, _features: &FeatureVector) -> Result<Vec<MlPrediction>, HealError> {
        Ok(Vec::new())
    }
}

/// Build the deterministic v1 feature vector for a classified failure.
pub fn build_features(record: &FailureRecord, kind: FailureKind, page: &PageContext) -> FeatureVector {
    let element = &record.element;
    let mut slots = [0.0f32; FEATURE_VECTOR_LEN];

    slots[0] = norm(record.selector.len() as f64, 100.0);
    slots[1] = flag(
        record.selector.starts_with("//")
            || record.selector.starts_with("xpath=")
            || record.selector.contains(":nth-child"),
    );
    slots[2] = flag(element.has_id());
    slots[3] = flag(element.has_test_id());
    slots[4] = flag(element.has_aria_label());
    slots[5] = flag(element.has_name());
    slots[6] = flag(element.has_class());
    slots[7] = flag(element.has_text());
    slots[8] = flag(element.is_visible);
    slots[9] = flag(element.is_enabled);
    slots[10] = flag(element.in_viewport);
    slots[11] = norm(element.dom_depth as f64, 50.0);
    slots[12] = flag(element.in_shadow_dom);
    slots[13] = flag(element.is_dynamic);
    slots[14] = flag(record.browser.engine == EngineFamily::Chromium);
    slots[15] = flag(record.browser.engine == EngineFamily::Gecko);
    slots[16] = flag(record.browser.engine == EngineFamily::WebKit);
    slots[17] = norm(record.browser.major_version as f64, 150.0);
    slots[18] = norm(page.dom_node_count as f64, 10_000.0);
    slots[19] = flag(page.is_spa);
    slots[20] = flag(page.load_complete);
    slots[21] = norm(page.pending_requests as f64, 50.0);
    slots[22] = norm(network_class(page.network_speed) as f64, 3.0);
    slots[23] = norm(record.retry_count as f64, 5.0);
    slots[24] = norm(kind_ordinal(kind) as f64, 5.0);

    FeatureVector(slots)
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn norm(value: f64, max: f64) -> f32 {
    clamp01(value / max) as f32
}

fn network_class(speed: NetworkSpeed) -> u8 {
    match speed {
        NetworkSpeed::Fast => 0,
        NetworkSpeed::Average => 1,
        NetworkSpeed::Slow => 2,
        NetworkSpeed::Offline => 3,
    }
}

fn kind_ordinal(kind: FailureKind) -> u8 {
    match kind {
        FailureKind::ElementNotFound => 0,
        FailureKind::ElementNotInteractable => 1,
        FailureKind::ElementDetached => 2,
        FailureKind::NetworkIssue => 3,
        FailureKind::PermissionIssue => 4,
        FailureKind::Unknown => 5,
    }
}

/// Adapter turning injected ML predictions into candidates.
pub struct MlPredictionProvider {
    scorer: Arc<dyn MlScorer>,
    timeout: Duration,
}

impl MlPredictionProvider {
    pub fn new(scorer: Arc<dyn MlScorer>, timeout: Duration) -> Self {
        Self { scorer, timeout }
    }
}

#[async_trait]
impl StrategyProvider for MlPredictionProvider {
    fn name(&self) -> &'static str {
        "ml-prediction"
    }

    async fn generate(
        &self,
        record: &FailureRecord,
        kind: FailureKind,
        page: &PageContext,
    ) -> Result<Vec<Candidate>, HealError> {
        if !kind.is_selector_related() {
            return Ok(Vec::new());
        }

        let features = build_features(record, kind, page);
        let predictions = tokio::time::timeout(self.timeout, self.scorer.predict(&features))
            .await
            .map_err(|_| HealError::ScorerFailed(format!("timeout after {:?}", self.timeout)))??;

        let candidates = predictions
            .into_iter()
            .filter(|p| !p.selector.is_empty())
            .map(|p| {
                let confidence = clamp01(p.confidence);
                Candidate::new(StrategyKind::MlPrediction, Locator::Css(p.selector))
                    .with_priority((confidence * 10.0).round() as u8)
                    .with_meta("ml_confidence", format!("{:.3}", confidence))
                    .with_meta("feature_layout", FEATURE_LAYOUT_VERSION.to_string())
            })
            .collect::<Vec<_>>();

        debug!(count = candidates.len(), "ML candidates generated");
        Ok(candidates)
    }
}
