//! Failure classification
//!
//! Pure function over lower-cased error text, evaluated against an
//! ordered rule list; the first matching rule wins and unmatched input
//! falls back to `Unknown`. Total: never fails, never allocates beyond
//! the lower-cased copy.

use locheal_core_types::FailureKind;

/// How a rule's substrings combine
enum Match {
    /// Any listed substring matches
    Any(&'static [&'static str]),

    /// Every listed substring must match
    All(&'static [&'static str]),
}

/// Ordered classification rules; order is part of the contract.
///
/// Detached/stale checks run before generic not-found terms because
/// drivers often phrase staleness as "element ... not found in the
/// current document".
const RULES: &[(Match, FailureKind)] = &[
    (
        Match::Any(&["stale element", "detached", "document has been replaced"]),
        FailureKind::ElementDetached,
    ),
    (
        Match::Any(&[
            "not interactable",
            "not clickable",
            "intercepts pointer events",
            "element is obscured",
            "element is disabled",
            "outside of the viewport",
        ]),
        FailureKind::ElementNotInteractable,
    ),
    (
        Match::Any(&[
            "no such element",
            "no node found",
            "unable to locate",
            "not found",
            "failed to find element",
            "waiting for selector",
        ]),
        FailureKind::ElementNotFound,
    ),
    (
        Match::Any(&["net::", "timeout", "timed out", "network", "dns", "connection refused"]),
        FailureKind::NetworkIssue,
    ),
    (
        Match::Any(&["permission", "denied", "cross-origin", "blocked by", "insecure"]),
        FailureKind::PermissionIssue,
    ),
    (
        Match::All(&["frame", "navigated"]),
        FailureKind::ElementDetached,
    ),
];

/// Classify raw driver error text into a [`FailureKind`].
pub fn classify(error_text: &str) -> FailureKind {
    let lowered = error_text.to_lowercase();
    for (matcher, kind) in RULES {
        let hit = match matcher {
            Match::Any(needles) => needles.iter().any(|n| lowered.contains(n)),
            Match::All(needles) => needles.iter().all(|n| lowered.contains(n)),
        };
        if hit {
            return *kind;
        }
    }
    FailureKind::Unknown
}
