//! The six factor computations
//!
//! Every function returns a value already clamped to [0, 1]. The fixed
//! blend weights sum to 1.0.

use learning_store::LearningStore;
use locheal_core_types::{
    clamp01, BrowserInfo, Candidate, ElementContext, EngineFamily, Locator, NetworkSpeed,
    PageContext, StrategyKind,
};

pub const WEIGHT_STABILITY: f64 = 0.25;
pub const WEIGHT_ELEMENT_CONTEXT: f64 = 0.20;
pub const WEIGHT_HISTORICAL: f64 = 0.20;
pub const WEIGHT_BROWSER_COMPAT: f64 = 0.15;
pub const WEIGHT_PAGE_COMPLEXITY: f64 = 0.10;
pub const WEIGHT_TIMING: f64 = 0.10;

/// Structural syntax beyond this count starts costing stability
const COMPLEXITY_THRESHOLD: usize = 3;

/// Intrinsic selector stability blended 70/30 with the selector's own
/// recorded success rate (0.5 when unseen).
pub fn selector_stability_factor(locator: &Locator, learning: &LearningStore) -> f64 {
    let mut score: f64 = 0.5;

    score += match attribute_class(locator) {
        AttributeClass::TestId => 0.35,
        AttributeClass::Id => 0.30,
        AttributeClass::Aria => 0.25,
        AttributeClass::Name => 0.20,
        AttributeClass::Class => 0.10,
        AttributeClass::None => 0.0,
    };

    if is_positional(locator) {
        score -= 0.4;
    }

    let complexity = syntax_complexity(locator);
    if complexity > COMPLEXITY_THRESHOLD {
        score -= 0.05 * (complexity - COMPLEXITY_THRESHOLD) as f64;
    }

    let recorded = learning.selector_success_rate(&locator.key());
    clamp01(0.7 * clamp01(score) + 0.3 * recorded)
}

enum AttributeClass {
    TestId,
    Id,
    Aria,
    Name,
    Class,
    None,
}

fn attribute_class(locator: &Locator) -> AttributeClass {
    match locator {
        Locator::Aria { .. } => AttributeClass::Aria,
        Locator::Css(selector) => {
            if selector.contains("data-testid") {
                AttributeClass::TestId
            } else if selector.starts_with('#') || selector.contains("[id=") {
                AttributeClass::Id
            } else if selector.contains("aria-label") {
                AttributeClass::Aria
            } else if selector.contains("[name=") {
                AttributeClass::Name
            } else if selector.contains('.') {
                AttributeClass::Class
            } else {
                AttributeClass::None
            }
        }
        Locator::XPath(_) | Locator::Text { .. } => AttributeClass::None,
    }
}

fn is_positional(locator: &Locator) -> bool {
    match locator {
        Locator::XPath(_) => true,
        Locator::Css(selector) => {
            selector.contains(":nth-child") || selector.contains(":nth-of-type")
        }
        _ => false,
    }
}

fn syntax_complexity(locator: &Locator) -> usize {
    let raw = match locator {
        Locator::Css(s) | Locator::XPath(s) => s.as_str(),
        _ => return 0,
    };
    raw.chars()
        .filter(|c| matches!(c, ' ' | '>' | '+' | '~' | '[' | ':' | '/'))
        .count()
}

/// Element-state factor: visibility, enablement, viewport membership,
/// stable-attribute richness, tag reliability, shadow/dynamic penalties.
pub fn element_context_factor(element: &ElementContext) -> f64 {
    let mut score: f64 = 0.5;

    score += if element.is_visible { 0.2 } else { -0.3 };
    score += if element.is_enabled { 0.15 } else { -0.2 };
    score += if element.in_viewport { 0.1 } else { -0.1 };

    score += (0.05 * element.stable_attribute_count() as f64).min(0.15);
    score += tag_reliability(&element.tag_name);

    if element.in_shadow_dom {
        score -= 0.15;
    }
    if element.is_dynamic {
        score -= 0.1;
    }

    clamp01(score)
}

/// Interactive tags locate reliably; anonymous containers do not.
fn tag_reliability(tag: &str) -> f64 {
    match tag {
        "button" | "a" | "input" | "select" | "textarea" => 0.1,
        "form" | "label" | "img" | "table" | "li" | "td" | "th" | "p" => 0.0,
        _ => -0.15,
    }
}

/// Historical factor: 0.5 with no history, otherwise a blend of
/// strategy-level, selector-level and 7-day-window success rates.
pub fn historical_success_factor(
    candidate: &Candidate,
    learning: &LearningStore,
    now_ms: u64,
) -> f64 {
    let key = candidate.locator.key();
    let selector_stats = learning.selector_stats(&key);
    let strategy_stats = learning.strategy_stats(candidate.strategy);
    if selector_stats.is_none() && strategy_stats.is_none() {
        return 0.5;
    }

    let strategy_rate = learning.strategy_success_rate(candidate.strategy);
    let selector_rate = learning.selector_success_rate(&key);
    let windowed = learning
        .selector_windowed_rate(&key, now_ms)
        .unwrap_or(selector_rate);

    clamp01(0.4 * strategy_rate + 0.4 * selector_rate + 0.2 * windowed)
}

/// Engine x strategy compatibility, nudged for engine age.
pub fn browser_compatibility_factor(browser: &BrowserInfo, strategy: StrategyKind) -> f64 {
    let mut score = heal_strategies::compatibility_score(browser.engine, strategy);

    let (modern, legacy) = version_thresholds(browser.engine);
    if browser.major_version >= modern {
        score += 0.05;
    } else if browser.major_version > 0 && browser.major_version < legacy {
        score -= 0.05;
    }

    clamp01(score)
}

fn version_thresholds(engine: EngineFamily) -> (u32, u32) {
    match engine {
        EngineFamily::Chromium => (110, 90),
        EngineFamily::Gecko => (110, 90),
        EngineFamily::WebKit => (15, 12),
    }
}

/// Page-complexity factor: starts at 0.8 and deducts per complexity signal.
pub fn page_complexity_factor(page: &PageContext) -> f64 {
    let mut score: f64 = 0.8;

    if page.dom_node_count > 5_000 {
        score -= 0.2;
    } else if page.dom_node_count > 2_000 {
        score -= 0.1;
    } else if page.dom_node_count > 1_000 {
        score -= 0.05;
    }

    if page.is_spa {
        score -= 0.1;
    }
    if page.has_ajax {
        score -= 0.1;
    }
    if page.has_animations {
        score -= 0.05;
    }
    if page.uses_shadow_dom {
        score -= 0.1;
    }
    if page.iframe_count > 3 {
        score -= 0.1;
    } else if page.iframe_count > 0 {
        score -= 0.05;
    }

    clamp01(score)
}

/// Timing factor: load state, network classification, pending traffic,
/// element-load latency.
pub fn timing_factor(page: &PageContext) -> f64 {
    let mut score: f64 = 0.7;

    score += if page.load_complete { 0.2 } else { -0.3 };

    score += match page.network_speed {
        NetworkSpeed::Fast => 0.1,
        NetworkSpeed::Average => 0.0,
        NetworkSpeed::Slow => -0.15,
        NetworkSpeed::Offline => -0.4,
    };

    score -= 0.02 * page.pending_requests.min(10) as f64;

    match page.element_load_ms {
        Some(ms) if ms > 3_000 => score -= 0.2,
        Some(ms) if ms > 1_000 => score -= 0.1,
        _ => {}
    }

    clamp01(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use locheal_core_types::{FailureKind, StrategyOutcome};

    fn store() -> LearningStore {
        LearningStore::in_memory()
    }

    #[test]
    fn test_stability_orders_attribute_classes() {
        let learning = store();
        let testid =
            selector_stability_factor(&Locator::Css("[data-testid=\"x\"]".into()), &learning);
        let id = selector_stability_factor(&Locator::Css("#x".into()), &learning);
        let aria = selector_stability_factor(
            &Locator::Aria {
                role: "button".into(),
                name: "x".into(),
            },
            &learning,
        );
        let name = selector_stability_factor(&Locator::Css("input[name=\"x\"]".into()), &learning);
        let class = selector_stability_factor(&Locator::Css("button.primary".into()), &learning);
        let xpath = selector_stability_factor(&Locator::XPath("//div".into()), &learning);

        assert!(testid > id && id > aria && aria > name && name > class && class > xpath);
    }

    #[test]
    fn test_stability_penalizes_deep_selectors() {
        let learning = store();
        let shallow = selector_stability_factor(&Locator::Css("#a".into()), &learning);
        let deep = selector_stability_factor(
            &Locator::Css("#a > div > ul li:first-child [role]".into()),
            &learning,
        );
        assert!(deep < shallow);
    }

    #[test]
    fn test_stability_blends_recorded_rate() {
        let learning = store();
        let before = selector_stability_factor(&Locator::Css("#a".into()), &learning);
        for _ in 0..4 {
            learning.record_outcome(&StrategyOutcome::failure(
                "css:#a",
                StrategyKind::Id,
                10,
                FailureKind::ElementNotFound,
            ));
        }
        let after = selector_stability_factor(&Locator::Css("#a".into()), &learning);
        assert!(after < before);
    }

    #[test]
    fn test_element_context_rewards_healthy_interactive() {
        let healthy = element_context_factor(&ElementContext::new("button"));
        let mut hidden = ElementContext::new("button");
        hidden.is_visible = false;
        hidden.is_enabled = false;
        assert!(healthy > element_context_factor(&hidden));

        let mut shadow = ElementContext::new("button");
        shadow.in_shadow_dom = true;
        assert!(healthy > element_context_factor(&shadow));
    }

    #[test]
    fn test_browser_compat_version_nudges() {
        let modern = BrowserInfo::new(EngineFamily::Chromium, 121);
        let legacy = BrowserInfo::new(EngineFamily::Chromium, 80);
        let modern_score = browser_compatibility_factor(&modern, StrategyKind::Id);
        let legacy_score = browser_compatibility_factor(&legacy, StrategyKind::Id);
        assert!(modern_score > legacy_score);
    }

    #[test]
    fn test_page_complexity_deductions_stack() {
        let simple = page_complexity_factor(&PageContext::default());
        assert!((simple - 0.8).abs() < 1e-9);

        let mut busy = PageContext::default();
        busy.dom_node_count = 6_000;
        busy.is_spa = true;
        busy.has_ajax = true;
        busy.uses_shadow_dom = true;
        busy.iframe_count = 5;
        let busy_score = page_complexity_factor(&busy);
        assert!(busy_score < 0.3);
        assert!(busy_score >= 0.0);
    }

    #[test]
    fn test_timing_penalizes_incomplete_load() {
        let loaded = timing_factor(&PageContext::default());
        let mut loading = PageContext::default();
        loading.load_complete = false;
        loading.pending_requests = 8;
        loading.network_speed = NetworkSpeed::Slow;
        assert!(timing_factor(&loading) < loaded);
        assert!(timing_factor(&loading) >= 0.0);
    }
}
