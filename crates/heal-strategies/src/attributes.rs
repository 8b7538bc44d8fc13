//! Stable-attribute candidate generation
//!
//! One candidate per present stable attribute, in descending order of
//! assumed stability: test-id > id > aria-label > name > class > text.

use async_trait::async_trait;
use tracing::debug;

use locheal_core_types::{
    Candidate, ElementContext, FailureKind, FailureRecord, HealError, Locator, PageContext,
    StrategyKind,
};

use crate::StrategyProvider;

/// Emits attribute-based locators from the captured element snapshot.
pub struct AttributeProvider;

#[async_trait]
impl StrategyProvider for AttributeProvider {
    fn name(&self) -> &'static str {
        "attribute"
    }

    async fn generate(
        &self,
        record: &FailureRecord,
        kind: FailureKind,
        _page: &PageContext,
    ) -> Result<Vec<Candidate>, HealError> {
        if !kind.is_selector_related() {
            // A different locator will not fix a network/permission failure.
            return Ok(Vec::new());
        }

        let element = &record.element;
        let mut candidates = Vec::new();

        if let Some(test_id) = present(&element.attributes.test_id) {
            candidates.push(
                Candidate::new(
                    StrategyKind::TestId,
                    Locator::Css(format!("[data-testid=\"{}\"]", test_id)),
                )
                .with_meta("attribute", "data-testid")
                .with_meta("value", test_id),
            );
        }

        if let Some(id) = present(&element.attributes.id) {
            candidates.push(
                Candidate::new(StrategyKind::Id, Locator::Css(id_selector(id)))
                    .with_meta("attribute", "id")
                    .with_meta("value", id),
            );
        }

        if let Some(label) = present(&element.attributes.aria_label) {
            candidates.push(
                Candidate::new(
                    StrategyKind::AriaLabel,
                    Locator::Aria {
                        role: aria_role_for_tag(&element.tag_name).to_string(),
                        name: label.to_string(),
                    },
                )
                .with_meta("attribute", "aria-label")
                .with_meta("value", label),
            );
        }

        if let Some(name) = present(&element.attributes.name) {
            candidates.push(
                Candidate::new(
                    StrategyKind::Name,
                    Locator::Css(format!("{}[name=\"{}\"]", element.tag_name, name)),
                )
                .with_meta("attribute", "name")
                .with_meta("value", name),
            );
        }

        if let Some(selector) = class_selector(element) {
            candidates.push(
                Candidate::new(StrategyKind::Class, Locator::Css(selector))
                    .with_meta("attribute", "class"),
            );
        }

        if let Some(text) = element.text.as_deref().filter(|t| !t.is_empty()) {
            candidates.push(
                Candidate::new(
                    StrategyKind::Text,
                    Locator::Text {
                        content: text.to_string(),
                        exact: text.len() <= 30,
                    },
                )
                .with_meta("attribute", "text"),
            );
        }

        debug!(
            count = candidates.len(),
            selector = %record.selector,
            "Attribute candidates generated"
        );
        Ok(candidates)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// `#id` when the value is a plain identifier, attribute form otherwise
fn id_selector(id: &str) -> String {
    let plain = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if plain && !id.starts_with(|c: char| c.is_ascii_digit()) {
        format!("#{}", id)
    } else {
        format!("[id=\"{}\"]", id)
    }
}

/// Tag + up to two classes, skipping utility-sized fragments
fn class_selector(element: &ElementContext) -> Option<String> {
    let classes: Vec<&str> = element
        .attributes
        .classes
        .iter()
        .map(String::as_str)
        .filter(|c| c.len() > 2)
        .take(2)
        .collect();
    if classes.is_empty() {
        return None;
    }
    Some(format!("{}.{}", element.tag_name, classes.join(".")))
}

fn aria_role_for_tag(tag: &str) -> &'static str {
    match tag {
        "button" => "button",
        "a" => "link",
        "input" | "textarea" => "textbox",
        "select" => "combobox",
        "img" => "img",
        _ => "generic",
    }
}
