//! Browser glue (wasm32 only)
//!
//! - `dom.rs` - WebDocument: `DocumentTree` over `web_sys`
//! - `tooltip.rs` - hover tooltip rendering and the shared span handlers
//! - `chrome.rs` - `chrome.*` extension APIs behind the storage/messaging traits
//! - `bindings.rs` - `#[wasm_bindgen]` classes for page, background and manager

pub mod dom;
pub mod tooltip;
pub mod chrome;
pub mod bindings;

pub use bindings::{StickyVocabBackground, StickyVocabManager, StickyVocabPage};
pub use dom::WebDocument;

use crate::ui::Viewport;

/// Current window size, or an empty viewport outside a window context
pub fn current_viewport() -> Viewport {
    let window = match web_sys::window() {
        Some(window) => window,
        None => return Viewport::new(0.0, 0.0),
    };
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Viewport::new(width, height)
}
