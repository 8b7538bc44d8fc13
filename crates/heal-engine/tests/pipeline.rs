//! End-to-end pipeline tests: classify -> generate -> score -> rank

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use heal_engine::{EngineConfig, HealingOrchestrator};
use heal_strategies::{builtin_providers, NoopScorer, StrategyProvider};
use learning_store::LearningStore;
use locheal_core_types::{
    ActionKind, BrowserInfo, Candidate, ConfidenceTier, ElementContext, ElementDigest,
    EngineFamily, FailureKind, FailureRecord, HealError, PageContext, StrategyKind,
    StrategyOutcome,
};

fn engine() -> HealingOrchestrator {
    HealingOrchestrator::without_ml(Arc::new(LearningStore::in_memory()), EngineConfig::default())
}

fn id_button_record() -> FailureRecord {
    let mut element = ElementContext::new("button").with_text("Submit");
    element.attributes.id = Some("submit-btn".into());
    FailureRecord::new(
        ActionKind::Click,
        "#submit-btn",
        "no such element: #submit-btn",
        element,
        BrowserInfo::new(EngineFamily::Chromium, 121),
    )
}

fn page_with_inventory() -> PageContext {
    let mut page = PageContext::default();
    let mut digest = ElementDigest::new("button", "#order-submit");
    digest.text = Some("Submit".into());
    page.inventory = vec![digest];
    page
}

#[tokio::test]
async fn stable_id_yields_attribute_top_candidate() {
    let report = engine()
        .heal(&id_button_record(), &PageContext::default())
        .await
        .unwrap();

    assert_eq!(report.failure_kind, FailureKind::ElementNotFound);
    let top = report.top().expect("non-empty ranked list");
    assert_eq!(top.candidate.strategy, StrategyKind::Id);
    assert!(top.confidence >= 0.6, "confidence {}", top.confidence);
}

#[tokio::test]
async fn positional_only_selector_ranks_low() {
    let record = FailureRecord::new(
        ActionKind::Click,
        "div:nth-child(3)",
        "no such element",
        ElementContext::new("div"),
        BrowserInfo::new(EngineFamily::Chromium, 121),
    );

    let report = engine().heal(&record, &PageContext::default()).await.unwrap();
    let top = report.top().expect("structural fallback expected");

    assert_eq!(top.candidate.strategy, StrategyKind::Structural);
    assert!(top.factors.selector_stability <= 0.4);
    assert!(matches!(
        top.tier,
        ConfidenceTier::Low | ConfidenceTier::VeryLow
    ));
}

#[tokio::test]
async fn empty_error_classifies_unknown_without_panicking() {
    let mut record = id_button_record();
    record.error = String::new();

    let report = engine().heal(&record, &PageContext::default()).await.unwrap();
    assert_eq!(report.failure_kind, FailureKind::Unknown);
    assert!(!report.ranked.is_empty());
}

#[tokio::test]
async fn pipeline_is_deterministic() {
    let orchestrator = engine();
    let record = id_button_record();
    let page = page_with_inventory();

    let first = orchestrator.heal(&record, &page).await.unwrap();
    let second = orchestrator.heal(&record, &page).await.unwrap();

    assert_eq!(first.ranked.len(), second.ranked.len());
    for (a, b) in first.ranked.iter().zip(second.ranked.iter()) {
        assert_eq!(a.candidate.locator, b.candidate.locator);
        assert_eq!(a.candidate.strategy, b.candidate.strategy);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.sequence, b.sequence);
    }
}

struct AlwaysFailingProvider;

#[async_trait]
impl StrategyProvider for AlwaysFailingProvider {
    fn name(&self) -> &'static str {
        "always-failing"
    }

    async fn generate(
        &self,
        _record: &FailureRecord,
        _kind: FailureKind,
        _page: &PageContext,
    ) -> Result<Vec<Candidate>, HealError> {
        Err(HealError::ProviderFailed {
            provider: "always-failing".to_string(),
            reason: "synthetic failure".to_string(),
        })
    }
}

#[tokio::test]
async fn one_broken_provider_does_not_break_the_pipeline() {
    let mut providers = builtin_providers(Arc::new(NoopScorer), Duration::from_millis(100));
    providers.insert(0, Arc::new(AlwaysFailingProvider));

    let orchestrator = HealingOrchestrator::new(
        providers,
        Arc::new(LearningStore::in_memory()),
        EngineConfig::default(),
    );

    let report = orchestrator
        .heal(&id_button_record(), &PageContext::default())
        .await
        .unwrap();

    assert_eq!(report.degraded_providers, vec!["always-failing".to_string()]);
    assert!(!report.ranked.is_empty());
    assert_eq!(
        report.top().unwrap().candidate.strategy,
        StrategyKind::Id
    );
}

#[tokio::test]
async fn noop_ml_scorer_changes_nothing_but_candidate_count() {
    let report = engine()
        .heal(&id_button_record(), &page_with_inventory())
        .await
        .unwrap();

    assert!(!report.ranked.is_empty());
    assert!(report.degraded_providers.is_empty());
    assert!(report
        .ranked
        .iter()
        .all(|c| c.candidate.strategy != StrategyKind::MlPrediction));
}

#[tokio::test]
async fn recorded_successes_raise_future_confidence() {
    let orchestrator = engine();
    let record = id_button_record();

    let before = orchestrator
        .heal(&record, &PageContext::default())
        .await
        .unwrap();
    let top_before = before.top().unwrap().clone();

    for _ in 0..10 {
        orchestrator.record_outcome(&StrategyOutcome::success(
            top_before.candidate.locator.key(),
            top_before.candidate.strategy,
            30,
        ));
    }

    let after = orchestrator
        .heal(&record, &PageContext::default())
        .await
        .unwrap();
    let top_after = after.top().unwrap();

    assert_eq!(top_after.candidate.locator, top_before.candidate.locator);
    assert!(top_after.confidence > top_before.confidence);
    assert!(
        top_after.factors.historical_success > top_before.factors.historical_success
    );
}

#[tokio::test]
async fn ranked_list_is_bounded() {
    let mut page = PageContext::default();
    // Large inventory of plausible matches plus every attribute present.
    for i in 0..20 {
        let mut digest = ElementDigest::new("button", format!("#candidate-{i}"));
        digest.text = Some("Submit".into());
        page.inventory.push(digest);
    }
    let mut record = id_button_record();
    record.element.attributes.test_id = Some("submit".into());
    record.element.attributes.aria_label = Some("Submit".into());
    record.element.attributes.name = Some("submit".into());
    record.element.attributes.classes = vec!["btn".into(), "primary".into()];

    let report = engine().heal(&record, &page).await.unwrap();
    assert!(report.ranked.len() <= 8);
}

#[tokio::test]
async fn learning_survives_restart_through_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("learning.json");

    {
        let store = Arc::new(LearningStore::open(&path).unwrap());
        let orchestrator =
            HealingOrchestrator::without_ml(store, EngineConfig::default());
        orchestrator.record_outcome(&StrategyOutcome::success(
            "css:#submit-btn",
            StrategyKind::Id,
            25,
        ));
    }

    let reloaded = Arc::new(LearningStore::open(&path).unwrap());
    assert_eq!(reloaded.selector_success_rate("css:#submit-btn"), 1.0);
}
