//! `#[wasm_bindgen]` classes for the three extension contexts
//!
//! Async methods return a `Promise` built with `future_to_promise` over
//! cloned `Rc` handles. Storage is always read before the page session is
//! borrowed, and no borrow is held across an `.await`.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::config::VocabConfig;
use crate::content::PageSession;
use crate::error::VocabError;
use crate::manager::TermManager;
use crate::messaging::{Coordinator, Message, Response, Timer};
use crate::terms::{StorageChange, TermStorage};
use crate::ui::{FlowEffect, SelectionContext};
use crate::web::chrome::{BrowserTimer, ChromeStorage, ChromeTabs};
use crate::web::current_viewport;
use crate::web::dom::WebDocument;
use crate::web::tooltip::TooltipRenderer;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

// =============================================================================
// Page (content script)
// =============================================================================

type Session = Rc<RefCell<PageSession<WebDocument>>>;

/// Page-context engine: annotation, hover tooltip and selection flow
#[wasm_bindgen]
pub struct StickyVocabPage {
    session: Session,
    storage: ChromeStorage,
    timer: BrowserTimer,
}

#[wasm_bindgen]
impl StickyVocabPage {
    /// Bind to the current document. `config` may be a partial object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<StickyVocabPage, JsValue> {
        let config = VocabConfig::from_js(config)?;
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document available"))?;

        let renderer = TooltipRenderer::new(document.clone(), &config);
        let doc = WebDocument::new(document, renderer.handlers());
        let body = doc.body().map_err(VocabError::from)?;

        Ok(StickyVocabPage {
            session: Rc::new(RefCell::new(PageSession::new(doc, body, config))),
            storage: ChromeStorage,
            timer: BrowserTimer,
        })
    }

    /// Load terms from storage and annotate. Resolves to the report.
    pub fn start(&self) -> js_sys::Promise {
        let session = Rc::clone(&self.session);
        let storage = self.storage;
        future_to_promise(async move {
            let stored = storage.get_terms().await.map_err(VocabError::from)?;
            let report = session.borrow_mut().start(stored)?;
            to_js(&report)
        })
    }

    /// Feed a `chrome.storage.onChanged` entry for the terms key
    #[wasm_bindgen(js_name = onStorageChanged)]
    pub fn on_storage_changed(&self, change: JsValue) -> Result<JsValue, JsValue> {
        let change: StorageChange = from_js(change)?;
        let report = self.session.borrow_mut().apply_storage_change(&change)?;
        to_js(&report)
    }

    /// Runtime message from another context. Resolves to the response
    /// (rescan) or to the effects to render (showDefinitionPopup).
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&self, message: JsValue) -> Result<js_sys::Promise, JsValue> {
        let message = Message::from_js(message)?;
        match message {
            Message::RescanPage => Ok(self.rescan()),
            Message::ShowDefinitionPopup { term } => {
                let effects = self
                    .session
                    .borrow_mut()
                    .show_definition_popup(&term, current_viewport());
                Ok(js_sys::Promise::resolve(&to_js(&effects)?))
            }
            Message::SaveTerm { .. } => Ok(js_sys::Promise::resolve(&JsValue::UNDEFINED)),
        }
    }

    /// Re-read storage and reannotate after the configured delay
    pub fn rescan(&self) -> js_sys::Promise {
        let session = Rc::clone(&self.session);
        let storage = self.storage;
        let timer = self.timer;
        let delay = self.session.borrow().config().timing.rescan_delay_ms;
        future_to_promise(async move {
            let stored = storage.get_terms().await;
            timer.sleep(delay).await;
            let response: Response = session.borrow_mut().apply_rescan(stored);
            to_js(&response)
        })
    }

    #[wasm_bindgen(js_name = pointerReleased)]
    pub fn pointer_released(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.borrow_mut().flow_mut().pointer_released())
    }

    #[wasm_bindgen(js_name = selectionSettled)]
    pub fn selection_settled(&self, context: JsValue) -> Result<JsValue, JsValue> {
        let context: SelectionContext = from_js(context)?;
        to_js(&self.session.borrow_mut().flow_mut().selection_settled(&context))
    }

    #[wasm_bindgen(js_name = noteExpired)]
    pub fn note_expired(&self, now_ms: f64) -> Result<JsValue, JsValue> {
        to_js(&self.session.borrow_mut().flow_mut().note_expired(now_ms))
    }

    #[wasm_bindgen(js_name = activateNote)]
    pub fn activate_note(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.borrow_mut().activate_note(current_viewport()))
    }

    #[wasm_bindgen(js_name = pointerPressed)]
    pub fn pointer_pressed(&self, inside_entry: bool) -> Result<JsValue, JsValue> {
        to_js(&self.session.borrow_mut().flow_mut().pointer_pressed(inside_entry))
    }

    pub fn dismiss(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.borrow_mut().flow_mut().dismiss())
    }

    /// Save the entry text. Persists the record when it changed, then
    /// resolves to the effects to render.
    pub fn save(&self, text: String) -> js_sys::Promise {
        let (effects, record) = {
            let mut session = self.session.borrow_mut();
            let effects: Vec<FlowEffect> = session.flow_mut().save(&text);
            let record = effects.iter().find_map(|effect| session.commit(effect));
            (effects, record)
        };
        let session = Rc::clone(&self.session);
        let storage = self.storage;
        future_to_promise(async move {
            if let Some(record) = record {
                storage.set_terms(&record).await.map_err(VocabError::from)?;
                session.borrow_mut().refresh()?;
            }
            to_js(&effects)
        })
    }

    #[wasm_bindgen(js_name = termCount)]
    pub fn term_count(&self) -> usize {
        self.session.borrow().store().len()
    }

    #[wasm_bindgen(js_name = lastReport)]
    pub fn last_report(&self) -> Result<JsValue, JsValue> {
        match self.session.borrow().last_report() {
            Some(report) => to_js(report),
            None => Ok(JsValue::NULL),
        }
    }
}

// =============================================================================
// Background (service worker)
// =============================================================================

type BackgroundCoordinator = Coordinator<ChromeStorage, ChromeTabs, BrowserTimer>;

#[wasm_bindgen]
pub struct StickyVocabBackground {
    coordinator: Rc<BackgroundCoordinator>,
}

#[wasm_bindgen]
impl StickyVocabBackground {
    /// `content_script` is the file re-injected into tabs without a listener
    #[wasm_bindgen(constructor)]
    pub fn new(content_script: &str, config: JsValue) -> Result<StickyVocabBackground, JsValue> {
        let config = VocabConfig::from_js(config)?;
        Ok(StickyVocabBackground {
            coordinator: Rc::new(Coordinator::new(
                ChromeStorage,
                ChromeTabs::new(content_script),
                BrowserTimer,
                config.timing,
            )),
        })
    }

    /// Descriptor for `chrome.contextMenus.create`
    #[wasm_bindgen(js_name = contextMenuItem)]
    pub fn context_menu_item(&self) -> Result<JsValue, JsValue> {
        to_js(&self.coordinator.context_menu_item())
    }

    #[wasm_bindgen(js_name = onInstalled)]
    pub fn on_installed(&self) -> js_sys::Promise {
        let coordinator = Rc::clone(&self.coordinator);
        future_to_promise(async move {
            let created = coordinator.on_installed().await?;
            Ok(JsValue::from_bool(created))
        })
    }

    /// Resolves to whether the page received the request; undeliverable
    /// requests are logged and dropped
    #[wasm_bindgen(js_name = onContextMenu)]
    pub fn on_context_menu(&self, menu_item_id: String, tab_id: i32, selection: String) -> js_sys::Promise {
        let coordinator = Rc::clone(&self.coordinator);
        future_to_promise(async move {
            let delivered = coordinator.on_context_menu(&menu_item_id, tab_id, &selection).await;
            Ok(JsValue::from_bool(delivered))
        })
    }

    /// Resolves to the response, or `undefined` for actions handled by pages
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&self, message: JsValue) -> Result<js_sys::Promise, JsValue> {
        let message = Message::from_js(message)?;
        let coordinator = Rc::clone(&self.coordinator);
        Ok(future_to_promise(async move {
            match coordinator.handle_message(&message).await {
                Some(response) => to_js(&response),
                None => Ok(JsValue::UNDEFINED),
            }
        }))
    }
}

// =============================================================================
// Management view
// =============================================================================

#[wasm_bindgen]
pub struct StickyVocabManager {
    manager: Rc<TermManager<ChromeStorage, ChromeTabs>>,
}

#[wasm_bindgen]
impl StickyVocabManager {
    #[wasm_bindgen(constructor)]
    pub fn new() -> StickyVocabManager {
        StickyVocabManager {
            manager: Rc::new(TermManager::new(ChromeStorage, ChromeTabs::default())),
        }
    }

    /// Load from storage; resolves to the alphabetical entry list
    pub fn load(&self) -> js_sys::Promise {
        let manager = Rc::clone(&self.manager);
        future_to_promise(async move {
            manager.load().await?;
            to_js(&manager.entries())
        })
    }

    pub fn entries(&self) -> Result<JsValue, JsValue> {
        to_js(&self.manager.entries())
    }

    pub fn filter(&self, query: &str) -> Result<JsValue, JsValue> {
        to_js(&self.manager.filter(query))
    }

    pub fn update(&self, term: String, definition: String) -> js_sys::Promise {
        let manager = Rc::clone(&self.manager);
        future_to_promise(async move {
            let changed = manager.update(&term, &definition).await?;
            Ok(JsValue::from_bool(changed))
        })
    }

    pub fn delete(&self, term: String) -> js_sys::Promise {
        let manager = Rc::clone(&self.manager);
        future_to_promise(async move {
            let deleted = manager.delete(&term).await?;
            Ok(JsValue::from_bool(deleted))
        })
    }

    /// Resolves to `{ success, message }` for the status line
    pub fn rescan(&self) -> js_sys::Promise {
        let manager = Rc::clone(&self.manager);
        future_to_promise(async move { to_js(&manager.rescan().await) })
    }

    #[wasm_bindgen(js_name = onStorageChanged)]
    pub fn on_storage_changed(&self, change: JsValue) -> Result<bool, JsValue> {
        let change: StorageChange = from_js(change)?;
        Ok(self.manager.apply_storage_change(&change))
    }
}

impl Default for StickyVocabManager {
    fn default() -> Self {
        Self::new()
    }
}
