//! Failure records and their closed classification

use serde::{Deserialize, Serialize};

use crate::element::{BrowserInfo, ElementContext};
use crate::outcome::now_ms;

/// Kind of recorded interaction that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Click,
    Fill,
    Select,
    Hover,
    Wait,
    Assert,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Fill => "fill",
            ActionKind::Select => "select",
            ActionKind::Hover => "hover",
            ActionKind::Wait => "wait",
            ActionKind::Assert => "assert",
        }
    }
}

/// Closed classification of why an interaction failed.
///
/// Derived deterministically from error text; unrecognized input always
/// maps to `Unknown`, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    ElementNotFound,
    ElementNotInteractable,
    ElementDetached,
    NetworkIssue,
    PermissionIssue,
    Unknown,
}

impl FailureKind {
    /// Stable name used in logs and the learning store's error histogram
    pub fn name(&self) -> &'static str {
        match self {
            FailureKind::ElementNotFound => "element-not-found",
            FailureKind::ElementNotInteractable => "element-not-interactable",
            FailureKind::ElementDetached => "element-detached",
            FailureKind::NetworkIssue => "network-issue",
            FailureKind::PermissionIssue => "permission-issue",
            FailureKind::Unknown => "unknown",
        }
    }

    /// Whether selector-replacement strategies are relevant for this kind.
    ///
    /// Network and permission failures are environmental; a different
    /// locator will not fix them.
    pub fn is_selector_related(&self) -> bool {
        matches!(
            self,
            FailureKind::ElementNotFound
                | FailureKind::ElementNotInteractable
                | FailureKind::ElementDetached
                | FailureKind::Unknown
        )
    }
}

/// One failed interaction as reported by the test-execution collaborator.
///
/// Consumed once per healing cycle; never mutated by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Interaction that failed
    pub action: ActionKind,

    /// Selector the recorded test originally used
    pub selector: String,

    /// Raw error text from the driver
    pub error: String,

    /// Element snapshot at failure time
    pub element: ElementContext,

    /// Browser identity
    pub browser: BrowserInfo,

    /// Driver-level retries already spent
    pub retry_count: u32,

    /// Healing attempts already spent on this selector
    pub heal_attempts: u32,

    /// Epoch milliseconds when the failure was observed
    pub timestamp_ms: u64,
}

impl FailureRecord {
    pub fn new(
        action: ActionKind,
        selector: impl Into<String>,
        error: impl Into<String>,
        element: ElementContext,
        browser: BrowserInfo,
    ) -> Self {
        Self {
            action,
            selector: selector.into(),
            error: error.into(),
            element,
            browser,
            retry_count: 0,
            heal_attempts: 0,
            timestamp_ms: now_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_names_are_stable() {
        assert_eq!(FailureKind::ElementNotFound.name(), "element-not-found");
        assert_eq!(FailureKind::Unknown.name(), "unknown");
    }

    #[test]
    fn test_selector_related_kinds() {
        assert!(FailureKind::ElementNotFound.is_selector_related());
        assert!(FailureKind::Unknown.is_selector_related());
        assert!(!FailureKind::NetworkIssue.is_selector_related());
        assert!(!FailureKind::PermissionIssue.is_selector_related());
    }
}
