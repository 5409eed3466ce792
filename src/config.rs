//! Configuration types and defaults
//!
//! Every section derives `Deserialize` with `#[serde(default)]` so the JS
//! side can pass a partial object (`{ timing: { noteTimeoutMs: 8000 } }`)
//! and get defaults for everything else.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::error::VocabError;

// =============================================================================
// Marker classes
// =============================================================================

/// Class names and attributes that identify markup injected by the crate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkerConfig {
    /// Class on every annotation span
    pub highlight_class: String,
    /// Class on the small "Note" affordance shown after a selection
    pub note_class: String,
    /// Class on the definition entry surface
    pub popup_class: String,
    /// Class on the hover tooltip showing a definition
    pub definition_tooltip_class: String,
    /// Elements carrying this attribute are never annotated
    pub ignore_attribute: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            highlight_class: "sticky-vocab-highlight".to_string(),
            note_class: "sticky-vocab-tooltip".to_string(),
            popup_class: "sticky-vocab-popup".to_string(),
            definition_tooltip_class: "sticky-vocab-definition-tooltip".to_string(),
            ignore_attribute: "data-highlight-ignore".to_string(),
        }
    }
}

impl MarkerConfig {
    /// All classes that mark crate-owned (and therefore opaque) elements
    pub fn owned_classes(&self) -> [&str; 4] {
        [
            self.highlight_class.as_str(),
            self.note_class.as_str(),
            self.popup_class.as_str(),
            self.definition_tooltip_class.as_str(),
        ]
    }
}

// =============================================================================
// Opaque elements
// =============================================================================

/// Elements whose subtrees are never traversed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpaqueConfig {
    /// Lowercase tag names
    pub tags: Vec<String>,
    /// Values of the `role` attribute
    pub roles: Vec<String>,
}

impl Default for OpaqueConfig {
    fn default() -> Self {
        Self {
            tags: ["script", "style", "textarea", "input", "select", "option", "button", "noscript"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            roles: vec!["button".to_string(), "textbox".to_string()],
        }
    }
}

// =============================================================================
// Timing
// =============================================================================

/// Delays used by the selection flow and the messaging layer (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingConfig {
    /// Wait after pointer release before reading the selection
    pub selection_debounce_ms: u32,
    /// Unused "Note" affordance disappears after this long
    pub note_timeout_ms: u32,
    /// Delay between activating the note and opening the entry surface
    pub note_activation_delay_ms: u32,
    /// Delay before focusing the entry textarea
    pub entry_focus_delay_ms: u32,
    /// Delay before a requested rescan runs
    pub rescan_delay_ms: u32,
    /// Wait after re-injecting the page listener before the single retry
    pub reinject_retry_delay_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            selection_debounce_ms: 10,
            note_timeout_ms: 5000,
            note_activation_delay_ms: 50,
            entry_focus_delay_ms: 100,
            rescan_delay_ms: 100,
            reinject_retry_delay_ms: 100,
        }
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Placement constants for the note, hover tooltip and entry surface (CSS px)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeometryConfig {
    /// Vertical offset of the note below the pointer
    pub note_offset_y: f64,

    pub tooltip_offset: f64,
    pub tooltip_width: f64,
    pub tooltip_height: f64,
    /// Horizontal distance left of the pointer when flipped
    pub tooltip_flip_x: f64,
    /// Vertical distance above the pointer when flipped
    pub tooltip_flip_y: f64,

    pub entry_offset_y: f64,
    pub entry_width: f64,
    pub entry_height: f64,
    /// Distance from the right viewport edge when clamped
    pub entry_edge_margin: f64,
    /// Vertical distance above the pointer when flipped
    pub entry_flip_y: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            note_offset_y: 20.0,
            tooltip_offset: 15.0,
            tooltip_width: 250.0,
            tooltip_height: 100.0,
            tooltip_flip_x: 260.0,
            tooltip_flip_y: 80.0,
            entry_offset_y: 20.0,
            entry_width: 300.0,
            entry_height: 200.0,
            entry_edge_margin: 310.0,
            entry_flip_y: 220.0,
        }
    }
}

// =============================================================================
// Matcher
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatcherConfig {
    /// Upper bound on the compiled regex size (bytes)
    pub size_limit: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            size_limit: 32 * (1 << 20),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete configuration for a StickyVocab context
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VocabConfig {
    pub markers: MarkerConfig,
    pub opaque: OpaqueConfig,
    pub timing: TimingConfig,
    pub geometry: GeometryConfig,
    pub matcher: MatcherConfig,
}

impl VocabConfig {
    /// Reject configurations that would break annotation or removal
    pub fn validate(&self) -> Result<(), VocabError> {
        for class in self.markers.owned_classes() {
            if class.trim().is_empty() || class.contains(char::is_whitespace) {
                return Err(VocabError::Config(format!(
                    "marker class '{}' must be a single non-empty class name",
                    class
                )));
            }
        }
        if self.markers.highlight_class == self.markers.definition_tooltip_class {
            return Err(VocabError::Config(
                "highlight and definition tooltip classes must differ".to_string(),
            ));
        }
        if self.markers.ignore_attribute.trim().is_empty() {
            return Err(VocabError::Config("ignore attribute must not be empty".to_string()));
        }
        if self.matcher.size_limit == 0 {
            return Err(VocabError::Config("matcher size limit must be positive".to_string()));
        }
        Ok(())
    }

    /// Decode a (possibly partial) config object from JS
    pub fn from_js(value: JsValue) -> Result<Self, VocabError> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        let config: Self = serde_wasm_bindgen::from_value(value)
            .map_err(|e| VocabError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Decode a (possibly partial) config from JSON text
    pub fn from_json(json: &str) -> Result<Self, VocabError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| VocabError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}
