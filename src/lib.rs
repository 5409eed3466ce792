//! StickyVocab: Personal Vocabulary Highlighter
//!
//! A Rust/WASM engine that finds saved vocabulary terms in a web page and
//! wraps each occurrence in a span that shows the user's definition on hover.
//!
//! # Architecture
//!
//! ## Annotation Engine
//! - `terms/` - TermStore (dictionary + revision), DefinitionResolver, TermStorage trait
//! - `matcher/` - PatternCompiler: one longest-first, whole-word, case-insensitive regex
//! - `dom/` - DocumentTree trait + ArenaDocument (in-memory tree with HTML fixtures)
//! - `annotate/` - NodeClassifier, Annotator (walker), HighlightRemover, Highlighter pipeline
//!
//! ## Interaction
//! - `ui/` - HoverTooltip placement, SelectionFlow (selection -> note -> definition entry)
//! - `content.rs` - PageSession: everything the page context owns
//! - `messaging/` - Message/Response wire types, TabMessenger, background Coordinator
//! - `manager.rs` - TermManager: list, filter, edit, delete, rescan
//!
//! ## Ambient
//! - `config.rs` - VocabConfig (markers, opaque elements, timing, geometry, matcher)
//! - `error.rs` - thiserror enums, `JsValue` conversion
//! - `logging.rs` - `log` facade backed by the browser console
//! - `web/` - web-sys DOM adapter, chrome.* bindings, `#[wasm_bindgen]` classes (wasm32 only)
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { StickyVocabPage, initLogging } from 'sticky-vocab';
//!
//! await init();
//! initLogging('info');
//!
//! // Content script
//! const page = new StickyVocabPage({ timing: { noteTimeoutMs: 8000 } });
//! const report = await page.start();          // { spansCreated, removed, ... }
//!
//! chrome.storage.onChanged.addListener((changes, area) => {
//!   if (area === 'local' && changes.terms) page.onStorageChanged(changes.terms);
//! });
//! chrome.runtime.onMessage.addListener((msg, _sender, reply) => {
//!   page.handleMessage(msg).then(reply);
//!   return true;
//! });
//!
//! // Selection flow: render the returned effects
//! document.addEventListener('mouseup', () => render(page.pointerReleased()));
//! ```

pub mod error;
pub mod logging;
pub mod config;
pub mod terms;
pub mod matcher;
pub mod dom;
pub mod annotate;
pub mod ui;
pub mod messaging;
pub mod content;
pub mod manager;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use annotate::{AnnotationReport, Highlighter};
pub use config::VocabConfig;
pub use content::PageSession;
pub use error::{Result, VocabError};
pub use manager::TermManager;
pub use matcher::{CompiledPattern, PatternCompiler};
pub use messaging::{Coordinator, Message, Response};
pub use terms::{DefinitionResolver, TermMap, TermStore};

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Install the console logger ("error", "warn", "info", "debug", "trace", "off")
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: &str) {
    logging::init_logging(logging::parse_level(level));
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("sticky-vocab v{}", env!("CARGO_PKG_VERSION"))
}
