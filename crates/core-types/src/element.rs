//! Element and browser snapshots captured at failure time

use serde::{Deserialize, Serialize};

/// Longest free-text fragment retained in a snapshot.
pub const MAX_TEXT_LEN: usize = 120;

/// Normalized browser engine family (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineFamily {
    /// Blink-based engines (Chrome, Edge, Opera)
    Chromium,

    /// Gecko-based engines (Firefox)
    Gecko,

    /// WebKit-based engines (Safari)
    WebKit,
}

impl EngineFamily {
    /// Stable name used in logs and persisted records
    pub fn name(&self) -> &'static str {
        match self {
            EngineFamily::Chromium => "chromium",
            EngineFamily::Gecko => "gecko",
            EngineFamily::WebKit => "webkit",
        }
    }

    /// All engine families
    pub fn all() -> [EngineFamily; 3] {
        [EngineFamily::Chromium, EngineFamily::Gecko, EngineFamily::WebKit]
    }
}

/// Browser viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Normalized browser identity for a healing attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserInfo {
    /// Engine family from the closed set
    pub engine: EngineFamily,

    /// Major version of the engine
    pub major_version: u32,

    /// Viewport at failure time
    pub viewport: Viewport,
}

impl BrowserInfo {
    pub fn new(engine: EngineFamily, major_version: u32) -> Self {
        Self {
            engine,
            major_version,
            viewport: Viewport::default(),
        }
    }
}

/// Captured attribute values behind the stable-attribute flags.
///
/// Providers need the values (not just presence) to emit concrete
/// locators; the `has_*` accessors on [`ElementContext`] derive the
/// flag view the scorer consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementAttributes {
    pub id: Option<String>,
    pub test_id: Option<String>,
    pub aria_label: Option<String>,
    pub name: Option<String>,
    pub classes: Vec<String>,
    pub input_type: Option<String>,
}

/// Immutable snapshot of a DOM element and its environment.
///
/// Captured by the test-execution collaborator when an interaction fails;
/// read-only to the healing core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementContext {
    /// Lower-cased tag name ("button", "input", ...)
    pub tag_name: String,

    /// Captured stable attribute values
    pub attributes: ElementAttributes,

    /// Trimmed visible text, bounded to [`MAX_TEXT_LEN`]
    pub text: Option<String>,

    /// Whether the element was visible at failure time
    pub is_visible: bool,

    /// Whether the element was enabled
    pub is_enabled: bool,

    /// Whether the element was inside the viewport
    pub in_viewport: bool,

    /// Depth of the element in the DOM tree
    pub dom_depth: u32,

    /// Whether the element lives inside a shadow root
    pub in_shadow_dom: bool,

    /// Whether the element is flagged as dynamically generated content
    pub is_dynamic: bool,

    /// Optional pre-captured CSS path from the document root
    pub dom_path: Option<String>,
}

impl ElementContext {
    /// Create a snapshot for a tag with everything else defaulted healthy
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_lowercase(),
            attributes: ElementAttributes::default(),
            text: None,
            is_visible: true,
            is_enabled: true,
            in_viewport: true,
            dom_depth: 0,
            in_shadow_dom: false,
            is_dynamic: false,
            dom_path: None,
        }
    }

    /// Set the visible text, truncating to the bounded length.
    ///
    /// The cut never lands inside a multi-byte character.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let mut text: String = text.into().trim().to_string();
        if text.len() > MAX_TEXT_LEN {
            let mut end = MAX_TEXT_LEN;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
        }
        self.text = if text.is_empty() { None } else { Some(text) };
        self
    }

    pub fn has_id(&self) -> bool {
        self.attributes.id.as_deref().is_some_and(|v| !v.is_empty())
    }

    pub fn has_test_id(&self) -> bool {
        self.attributes
            .test_id
            .as_deref()
            .is_some_and(|v| !v.is_empty())
    }

    pub fn has_aria_label(&self) -> bool {
        self.attributes
            .aria_label
            .as_deref()
            .is_some_and(|v| !v.is_empty())
    }

    pub fn has_name(&self) -> bool {
        self.attributes
            .name
            .as_deref()
            .is_some_and(|v| !v.is_empty())
    }

    pub fn has_class(&self) -> bool {
        self.attributes.classes.iter().any(|c| !c.is_empty())
    }

    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Count of present stable attributes (id, test-id, aria-label, name,
    /// class, text)
    pub fn stable_attribute_count(&self) -> usize {
        [
            self.has_id(),
            self.has_test_id(),
            self.has_aria_label(),
            self.has_name(),
            self.has_class(),
            self.has_text(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    /// Whether any stable attribute is present
    pub fn has_stable_attribute(&self) -> bool {
        self.stable_attribute_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_attribute_count() {
        let mut ctx = ElementContext::new("BUTTON");
        assert_eq!(ctx.tag_name, "button");
        assert_eq!(ctx.stable_attribute_count(), 0);
        assert!(!ctx.has_stable_attribute());

        ctx.attributes.id = Some("submit-btn".to_string());
        ctx.attributes.classes = vec!["primary".to_string()];
        ctx = ctx.with_text("Submit");
        assert!(ctx.has_id());
        assert!(ctx.has_class());
        assert!(ctx.has_text());
        assert_eq!(ctx.stable_attribute_count(), 3);
    }

    #[test]
    fn test_text_is_bounded() {
        let ctx = ElementContext::new("div").with_text("x".repeat(500));
        assert_eq!(ctx.text.as_ref().map(String::len), Some(MAX_TEXT_LEN));
    }

    #[test]
    fn test_text_truncation_respects_char_boundaries() {
        // 1 ASCII byte + 40 three-byte chars = 121 bytes; byte 120 falls
        // mid-character.
        let ctx = ElementContext::new("button").with_text(format!("a{}", "€".repeat(40)));
        let text = ctx.text.expect("text retained");
        assert!(text.len() <= MAX_TEXT_LEN);
        assert_eq!(text.chars().count(), 40);

        let cjk = ElementContext::new("button").with_text("確".repeat(100));
        let cjk_text = cjk.text.expect("text retained");
        assert!(cjk_text.len() <= MAX_TEXT_LEN);
        assert!(cjk_text.chars().all(|c| c == '確'));
    }

    #[test]
    fn test_empty_attributes_do_not_count() {
        let mut ctx = ElementContext::new("input");
        ctx.attributes.id = Some(String::new());
        assert!(!ctx.has_id());
    }
}
