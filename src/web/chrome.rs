//! `chrome.*` extension APIs behind the crate's storage and messaging traits
//!
//! Uses the promise-returning (Manifest V3) forms of the APIs. Works in
//! both page and service-worker contexts: nothing here touches `window`.

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::error::{StorageError, TransportError};
use crate::messaging::{Message, Response, TabId, TabMessenger, Timer};
use crate::terms::{TermMap, TermStorage, TERMS_KEY};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = get, catch)]
    async fn storage_local_get(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = set, catch)]
    async fn storage_local_set(items: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = query, catch)]
    async fn tabs_query(query: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = sendMessage, catch)]
    async fn tabs_send_message(tab_id: i32, message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "scripting"], js_name = executeScript, catch)]
    async fn scripting_execute_script(injection: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = setTimeout)]
    fn set_timeout(handler: &Function, timeout: i32) -> JsValue;
}

fn describe(err: &JsValue) -> String {
    Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

// =============================================================================
// Storage
// =============================================================================

/// `chrome.storage.local`, key `"terms"`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStorage;

#[async_trait(?Send)]
impl TermStorage for ChromeStorage {
    async fn get_terms(&self) -> Result<Option<TermMap>, StorageError> {
        let keys = Array::of1(&JsValue::from_str(TERMS_KEY));
        let result = storage_local_get(keys.into())
            .await
            .map_err(|e| StorageError::Unavailable(describe(&e)))?;
        let record = Reflect::get(&result, &JsValue::from_str(TERMS_KEY))
            .map_err(|e| StorageError::Malformed(describe(&e)))?;
        if record.is_undefined() || record.is_null() {
            return Ok(None);
        }
        serde_wasm_bindgen::from_value(record)
            .map(Some)
            .map_err(|e| StorageError::Malformed(e.to_string()))
    }

    async fn set_terms(&self, terms: &TermMap) -> Result<(), StorageError> {
        let record = to_js(terms).map_err(|e| StorageError::Write(e.to_string()))?;
        let items = Object::new();
        Reflect::set(&items, &JsValue::from_str(TERMS_KEY), &record)
            .map_err(|e| StorageError::Write(describe(&e)))?;
        storage_local_set(items.into())
            .await
            .map_err(|e| StorageError::Write(describe(&e)))?;
        Ok(())
    }
}

// =============================================================================
// Tabs
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TabQuery {
    active: bool,
    current_window: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InjectionTarget {
    tab_id: TabId,
}

#[derive(Serialize)]
struct Injection<'a> {
    target: InjectionTarget,
    files: [&'a str; 1],
}

/// `chrome.tabs` messaging; re-injects `content_script` on demand
#[derive(Debug, Clone)]
pub struct ChromeTabs {
    content_script: String,
}

impl Default for ChromeTabs {
    fn default() -> Self {
        Self::new("content.js")
    }
}

impl ChromeTabs {
    pub fn new(content_script: &str) -> Self {
        Self {
            content_script: content_script.to_string(),
        }
    }
}

/// Chrome reports a missing listener as a rejected promise with one of
/// these messages
fn is_missing_receiver(message: &str) -> bool {
    message.contains("Receiving end does not exist") || message.contains("Could not establish connection")
}

#[async_trait(?Send)]
impl TabMessenger for ChromeTabs {
    async fn active_tab(&self) -> Result<Option<TabId>, TransportError> {
        let query = to_js(&TabQuery {
            active: true,
            current_window: true,
        })
        .map_err(|e| TransportError::Failed(e.to_string()))?;
        let tabs = tabs_query(query)
            .await
            .map_err(|e| TransportError::Failed(describe(&e)))?;
        let first = Array::from(&tabs).get(0);
        if first.is_undefined() {
            return Ok(None);
        }
        let id = Reflect::get(&first, &JsValue::from_str("id"))
            .ok()
            .and_then(|id| id.as_f64())
            .map(|id| id as TabId);
        Ok(id)
    }

    async fn send_to_tab(&self, tab: TabId, message: &Message) -> Result<Option<Response>, TransportError> {
        let payload = message
            .to_js()
            .map_err(|e| TransportError::Failed(e.to_string()))?;
        let reply = match tabs_send_message(tab, payload).await {
            Ok(reply) => reply,
            Err(e) => {
                let reason = describe(&e);
                return Err(if is_missing_receiver(&reason) {
                    TransportError::NoReceiver(reason)
                } else {
                    TransportError::Failed(reason)
                });
            }
        };
        if reply.is_undefined() || reply.is_null() {
            return Ok(None);
        }
        serde_wasm_bindgen::from_value(reply)
            .map(Some)
            .map_err(|e| TransportError::Failed(format!("unreadable reply: {}", e)))
    }

    async fn inject_listener(&self, tab: TabId) -> Result<(), TransportError> {
        let injection = to_js(&Injection {
            target: InjectionTarget { tab_id: tab },
            files: [self.content_script.as_str()],
        })
        .map_err(|e| TransportError::Failed(e.to_string()))?;
        scripting_execute_script(injection)
            .await
            .map_err(|e| TransportError::Failed(describe(&e)))?;
        log::info!("[ChromeTabs] injected {} into tab {}", self.content_script, tab);
        Ok(())
    }
}

// =============================================================================
// Timer
// =============================================================================

/// `setTimeout`-backed sleep
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

#[async_trait(?Send)]
impl Timer for BrowserTimer {
    async fn sleep(&self, ms: u32) {
        let delay = i32::try_from(ms).unwrap_or(i32::MAX);
        let promise = Promise::new(&mut |resolve, _reject| {
            set_timeout(&resolve, delay);
        });
        if let Err(e) = JsFuture::from(promise).await {
            log::warn!("[BrowserTimer] sleep interrupted: {}", describe(&e));
        }
    }
}
