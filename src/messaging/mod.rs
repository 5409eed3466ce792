//! Cross-context messaging: message shapes and transport traits
//!
//! The background coordinator, page session and management UI only talk
//! through these types. Payloads are tagged by `action` and use camelCase
//! field names on the wire.

pub mod coordinator;

pub use coordinator::Coordinator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::error::{TransportError, VocabError};

/// Browser tab identifier
pub type TabId = i32;

/// Id of the "save selection" context-menu entry
pub const CONTEXT_MENU_ID: &str = "saveAsVocab";

// =============================================================================
// Messages
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    /// Open the definition entry surface for `term`
    ShowDefinitionPopup { term: String },
    /// Persist a term (answered with `{ success }`)
    SaveTerm { term: String, definition: String },
    /// Reload terms and reannotate the page
    RescanPage,
}

impl Message {
    pub fn from_js(value: JsValue) -> Result<Self, VocabError> {
        serde_wasm_bindgen::from_value(value).map_err(|e| VocabError::Message(e.to_string()))
    }

    pub fn to_js(&self) -> Result<JsValue, VocabError> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        self.serialize(&serializer)
            .map_err(|e| VocabError::Message(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, VocabError> {
        serde_json::from_str(json).map_err(|e| VocabError::Message(e.to_string()))
    }
}

/// Reply to a message. Absent fields are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn rescanned(terms_count: usize, message: &str) -> Self {
        Self {
            success: true,
            terms_count: Some(terms_count),
            message: Some(message.to_string()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn to_js(&self) -> Result<JsValue, VocabError> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        self.serialize(&serializer)
            .map_err(|e| VocabError::Message(e.to_string()))
    }
}

/// Context-menu registration descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMenuItem {
    pub id: String,
    pub title: String,
    pub contexts: Vec<String>,
}

impl Default for ContextMenuItem {
    fn default() -> Self {
        Self {
            id: CONTEXT_MENU_ID.to_string(),
            title: "Save as vocabulary term".to_string(),
            contexts: vec!["selection".to_string()],
        }
    }
}

// =============================================================================
// Transport
// =============================================================================

/// Delivery of messages to page contexts
#[async_trait(?Send)]
pub trait TabMessenger {
    /// Active tab of the current window, if any
    async fn active_tab(&self) -> Result<Option<TabId>, TransportError>;

    /// Send and wait for the reply. `Ok(None)` when the receiver did not
    /// answer; `Err(NoReceiver)` when nothing is listening in the tab.
    async fn send_to_tab(&self, tab: TabId, message: &Message) -> Result<Option<Response>, TransportError>;

    /// Inject the page listener into `tab`
    async fn inject_listener(&self, tab: TabId) -> Result<(), TransportError>;
}

#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, ms: u32);
}
