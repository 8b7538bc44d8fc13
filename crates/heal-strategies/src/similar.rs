//! Similarity ranking against the page's element inventory
//!
//! Scores every inventory element against the failed one with a weighted
//! blend of text similarity, tag match, class overlap and input-type
//! match, then keeps the top three.

use async_trait::async_trait;
use tracing::debug;

use locheal_core_types::{
    Candidate, ElementContext, ElementDigest, FailureKind, FailureRecord, HealError, Locator,
    PageContext, StrategyKind,
};

use crate::StrategyProvider;

const TEXT_WEIGHT: f64 = 0.4;
const TAG_WEIGHT: f64 = 0.2;
const CLASS_WEIGHT: f64 = 0.2;
const TYPE_WEIGHT: f64 = 0.2;

/// Candidates below this blended similarity are discarded
const MIN_SIMILARITY: f64 = 0.3;

/// How many inventory matches are kept
const TOP_N: usize = 3;

/// Ranks current page elements by similarity to the failed one.
pub struct SimilarElementProvider;

#[async_trait]
impl StrategyProvider for SimilarElementProvider {
    fn name(&self) -> &'static str {
        "similar-element"
    }

    async fn generate(
        &self,
        record: &FailureRecord,
        kind: FailureKind,
        page: &PageContext,
    ) -> Result<Vec<Candidate>, HealError> {
        if !kind.is_selector_related() || page.inventory.is_empty() {
            return Ok(Vec::new());
        }

        let element = &record.element;
        let mut scored: Vec<(usize, f64, &ElementDigest)> = page
            .inventory
            .iter()
            .enumerate()
            .map(|(index, digest)| (index, similarity(element, digest), digest))
            .filter(|(_, score, _)| *score >= MIN_SIMILARITY)
            .collect();

        // Stable by inventory index so equal scores rank deterministically.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(TOP_N);

        let candidates = scored
            .into_iter()
            .map(|(index, score, digest)| {
                Candidate::new(
                    StrategyKind::SimilarElement,
                    Locator::Css(digest.selector.clone()),
                )
                .with_meta("similarity", format!("{:.3}", score))
                .with_meta("inventory_index", index.to_string())
            })
            .collect::<Vec<_>>();

        debug!(count = candidates.len(), "Similar-element candidates generated");
        Ok(candidates)
    }
}

/// Weighted blend: text 0.4, tag 0.2, class overlap 0.2, input type 0.2
fn similarity(element: &ElementContext, digest: &ElementDigest) -> f64 {
    TEXT_WEIGHT * text_similarity(element.text.as_deref(), digest.text.as_deref())
        + TAG_WEIGHT * tag_match(&element.tag_name, &digest.tag_name)
        + CLASS_WEIGHT * class_overlap(&element.attributes.classes, &digest.classes)
        + TYPE_WEIGHT
            * type_match(
                element.attributes.input_type.as_deref(),
                digest.input_type.as_deref(),
            )
}

fn text_similarity(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => {
            strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
        }
        (None, None) => 0.5,
        _ => 0.0,
    }
}

fn tag_match(a: &str, b: &str) -> f64 {
    if a.eq_ignore_ascii_case(b) {
        1.0
    } else {
        0.0
    }
}

fn class_overlap(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.5;
    }
    let shared = a.iter().filter(|c| b.contains(c)).count();
    let union = a.len() + b.len() - shared;
    if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    }
}

fn type_match(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => {
            if a.eq_ignore_ascii_case(b) {
                1.0
            } else {
                0.0
            }
        }
        (None, None) => 0.5,
        _ => 0.0,
    }
}
