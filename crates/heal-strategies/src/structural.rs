//! DOM-structure traversal fallback
//!
//! Only runs when the element has no stable attribute at all. Structural
//! locators break on any layout change, so every candidate is flagged
//! fragile and carries the lowest priority.

use async_trait::async_trait;
use tracing::debug;

use locheal_core_types::{
    Candidate, FailureKind, FailureRecord, HealError, Locator, PageContext, StrategyKind,
};

use crate::StrategyProvider;

/// Emits DOM-path and XPath candidates for attribute-less elements.
pub struct StructuralProvider;

#[async_trait]
impl StrategyProvider for StructuralProvider {
    fn name(&self) -> &'static str {
        "structural"
    }

    async fn generate(
        &self,
        record: &FailureRecord,
        kind: FailureKind,
        _page: &PageContext,
    ) -> Result<Vec<Candidate>, HealError> {
        if !kind.is_selector_related() {
            return Ok(Vec::new());
        }

        let element = &record.element;
        if element.has_stable_attribute() {
            // Attribute-based strategies cover this element already.
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();

        if let Some(path) = element.dom_path.as_deref().filter(|p| !p.is_empty()) {
            candidates.push(
                Candidate::new(StrategyKind::Structural, Locator::Css(path.to_string()))
                    .with_meta("fragile", "true")
                    .with_meta("source", "dom-path"),
            );
        }

        candidates.push(
            Candidate::new(
                StrategyKind::Structural,
                Locator::XPath(tag_xpath(element)),
            )
            .with_meta("fragile", "true")
            .with_meta("source", "tag-traversal"),
        );

        debug!(
            count = candidates.len(),
            tag = %element.tag_name,
            "Structural candidates generated"
        );
        Ok(candidates)
    }
}

fn tag_xpath(element: &locheal_core_types::ElementContext) -> String {
    match element.attributes.input_type.as_deref() {
        Some(input_type) if element.tag_name == "input" => {
            format!("//input[@type='{}']", input_type)
        }
        _ => format!("//{}", element.tag_name),
    }
}
