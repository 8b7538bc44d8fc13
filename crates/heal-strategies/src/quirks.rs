//! Per-engine interaction quirks and compatibility data
//!
//! Static, versioned tables: they may be inspected by callers but are
//! never mutated at runtime. The quirk provider does not invent new
//! selectors; it re-submits the original one with engine-appropriate
//! interaction adjustments.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use locheal_core_types::{
    ActionKind, Candidate, EngineFamily, FailureKind, FailureRecord, HealError, Locator,
    PageContext, StrategyKind,
};

use crate::StrategyProvider;

/// Version stamp for the static tables below
pub const QUIRK_TABLE_VERSION: u32 = 1;

/// Preferred click mechanism for an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickStyle {
    /// Regular trusted click
    Standard,

    /// Click with actionability checks bypassed
    Forced,

    /// Script-invoked `element.click()`
    Scripted,

    /// Click dispatched at element coordinates
    Coordinate,
}

impl ClickStyle {
    pub fn name(&self) -> &'static str {
        match self {
            ClickStyle::Standard => "standard",
            ClickStyle::Forced => "forced",
            ClickStyle::Scripted => "scripted",
            ClickStyle::Coordinate => "coordinate",
        }
    }
}

/// Known interaction quirks for one engine family
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineQuirks {
    pub scroll_before_click: bool,
    pub preferred_click: ClickStyle,
    pub default_wait_ms: u64,
}

/// Interaction quirks for an engine family
pub fn engine_quirks(engine: EngineFamily) -> &'static EngineQuirks {
    match engine {
        EngineFamily::Chromium => &EngineQuirks {
            scroll_before_click: false,
            preferred_click: ClickStyle::Standard,
            default_wait_ms: 1_000,
        },
        EngineFamily::Gecko => &EngineQuirks {
            scroll_before_click: true,
            preferred_click: ClickStyle::Forced,
            default_wait_ms: 1_500,
        },
        EngineFamily::WebKit => &EngineQuirks {
            scroll_before_click: true,
            preferred_click: ClickStyle::Scripted,
            default_wait_ms: 2_000,
        },
    }
}

/// Engine x strategy-kind compatibility matrix.
///
/// Scores reflect how reliably each locator style behaves on each engine,
/// from cross-browser suite experience. All values are in [0, 1].
pub fn compatibility_score(engine: EngineFamily, strategy: StrategyKind) -> f64 {
    match (engine, strategy) {
        (EngineFamily::Chromium, StrategyKind::TestId) => 0.98,
        (EngineFamily::Chromium, StrategyKind::Id) => 0.97,
        (EngineFamily::Chromium, StrategyKind::AriaLabel) => 0.93,
        (EngineFamily::Chromium, StrategyKind::Name) => 0.92,
        (EngineFamily::Chromium, StrategyKind::Class) => 0.85,
        (EngineFamily::Chromium, StrategyKind::Text) => 0.82,
        (EngineFamily::Chromium, StrategyKind::Structural) => 0.60,
        (EngineFamily::Chromium, StrategyKind::BrowserQuirk) => 0.90,
        (EngineFamily::Chromium, StrategyKind::MlPrediction) => 0.85,
        (EngineFamily::Chromium, StrategyKind::SimilarElement) => 0.80,

        (EngineFamily::Gecko, StrategyKind::TestId) => 0.96,
        (EngineFamily::Gecko, StrategyKind::Id) => 0.95,
        (EngineFamily::Gecko, StrategyKind::AriaLabel) => 0.90,
        (EngineFamily::Gecko, StrategyKind::Name) => 0.90,
        (EngineFamily::Gecko, StrategyKind::Class) => 0.82,
        (EngineFamily::Gecko, StrategyKind::Text) => 0.80,
        (EngineFamily::Gecko, StrategyKind::Structural) => 0.55,
        (EngineFamily::Gecko, StrategyKind::BrowserQuirk) => 0.85,
        (EngineFamily::Gecko, StrategyKind::MlPrediction) => 0.82,
        (EngineFamily::Gecko, StrategyKind::SimilarElement) => 0.78,

        (EngineFamily::WebKit, StrategyKind::TestId) => 0.94,
        (EngineFamily::WebKit, StrategyKind::Id) => 0.93,
        (EngineFamily::WebKit, StrategyKind::AriaLabel) => 0.88,
        (EngineFamily::WebKit, StrategyKind::Name) => 0.87,
        (EngineFamily::WebKit, StrategyKind::Class) => 0.78,
        (EngineFamily::WebKit, StrategyKind::Text) => 0.76,
        (EngineFamily::WebKit, StrategyKind::Structural) => 0.50,
        (EngineFamily::WebKit, StrategyKind::BrowserQuirk) => 0.82,
        (EngineFamily::WebKit, StrategyKind::MlPrediction) => 0.80,
        (EngineFamily::WebKit, StrategyKind::SimilarElement) => 0.75,
    }
}

/// Re-submits the original selector with engine-specific interaction
/// adjustments (click style, pre-scroll, wait time).
pub struct BrowserQuirkProvider;

#[async_trait]
impl StrategyProvider for BrowserQuirkProvider {
    fn name(&self) -> &'static str {
        "browser-quirk"
    }

    async fn generate(
        &self,
        record: &FailureRecord,
        kind: FailureKind,
        _page: &PageContext,
    ) -> Result<Vec<Candidate>, HealError> {
        // Interaction rewrites only help when the element was located but
        // the interaction itself misbehaved, or when the cause is unknown.
        let relevant = matches!(
            kind,
            FailureKind::ElementNotInteractable | FailureKind::NetworkIssue | FailureKind::Unknown
        );
        if !relevant || record.selector.is_empty() {
            return Ok(Vec::new());
        }

        let quirks = engine_quirks(record.browser.engine);
        let wait_ms = if kind == FailureKind::NetworkIssue {
            // Give slow responses extra room before retrying.
            quirks.default_wait_ms * 2
        } else {
            quirks.default_wait_ms
        };

        let mut candidate = Candidate::new(
            StrategyKind::BrowserQuirk,
            Locator::Css(record.selector.clone()),
        )
        .with_meta("engine", record.browser.engine.name())
        .with_meta("wait_ms", wait_ms.to_string())
        .with_meta("scroll_first", quirks.scroll_before_click.to_string());

        if matches!(record.action, ActionKind::Click | ActionKind::Hover) {
            candidate = candidate.with_meta("click_style", quirks.preferred_click.name());
        }

        debug!(
            engine = record.browser.engine.name(),
            kind = kind.name(),
            "Quirk rewrite generated"
        );
        Ok(vec![candidate])
    }
}
