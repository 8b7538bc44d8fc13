//! Page-level snapshot supplied alongside a failure record

use serde::{Deserialize, Serialize};

/// Coarse network-speed classification reported by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkSpeed {
    Fast,
    Average,
    Slow,
    Offline,
}

impl Default for NetworkSpeed {
    fn default() -> Self {
        NetworkSpeed::Average
    }
}

/// Minimal digest of one element in the page's current inventory.
///
/// The similar-element provider ranks these against the failed element;
/// nothing else reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDigest {
    /// Lower-cased tag name
    pub tag_name: String,

    /// A selector the caller can use to reach this element
    pub selector: String,

    /// Trimmed visible text
    pub text: Option<String>,

    /// Class list
    pub classes: Vec<String>,

    /// `type` attribute for inputs
    pub input_type: Option<String>,
}

impl ElementDigest {
    pub fn new(tag_name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_lowercase(),
            selector: selector.into(),
            text: None,
            classes: Vec::new(),
            input_type: None,
        }
    }
}

/// Snapshot of the page environment at failure time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContext {
    /// Total DOM node count
    pub dom_node_count: u32,

    /// Single-page-application routing detected
    pub is_spa: bool,

    /// In-flight AJAX activity observed recently
    pub has_ajax: bool,

    /// CSS/JS animations active
    pub has_animations: bool,

    /// Shadow roots present anywhere on the page
    pub uses_shadow_dom: bool,

    /// Number of iframes on the page
    pub iframe_count: u32,

    /// Whether the load event has fired
    pub load_complete: bool,

    /// Network classification from the caller
    pub network_speed: NetworkSpeed,

    /// Requests still pending at failure time
    pub pending_requests: u32,

    /// How long the target element took to appear, if known (ms)
    pub element_load_ms: Option<u64>,

    /// Current element inventory for similarity matching
    pub inventory: Vec<ElementDigest>,
}

impl Default for PageContext {
    fn default() -> Self {
        Self {
            dom_node_count: 0,
            is_spa: false,
            has_ajax: false,
            has_animations: false,
            uses_shadow_dom: false,
            iframe_count: 0,
            load_complete: true,
            network_speed: NetworkSpeed::default(),
            pending_requests: 0,
            element_load_ms: None,
            inventory: Vec::new(),
        }
    }
}
