//! Error types shared across the crate.
//!
//! Errors are grouped by the collaborator that produced them. Document
//! errors are per-node and never abort a traversal; storage and transport
//! errors surface to whichever action initiated the call.

use wasm_bindgen::JsValue;

/// Failure while reading or mutating the document tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The node has no parent, so it cannot be replaced in place
    #[error("node {0} is detached from the document")]
    Detached(String),
    /// The node handle does not refer to a live node
    #[error("node {0} not found")]
    NotFound(String),
    /// The host DOM rejected the operation
    #[error("DOM operation failed: {0}")]
    Operation(String),
}

/// Failure talking to persistent term storage
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The stored record is not a flat term -> definition mapping
    #[error("stored terms are malformed: {0}")]
    Malformed(String),
    #[error("failed to write terms: {0}")]
    Write(String),
}

/// Failure delivering a message to another extension context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Nobody is listening on the receiving side (content script not injected)
    #[error("no receiver for message: {0}")]
    NoReceiver(String),
    #[error("message delivery failed: {0}")]
    Failed(String),
}

/// Crate-level error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VocabError {
    #[error("failed to compile term pattern: {0}")]
    Pattern(String),
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A message or payload crossing the JS boundary could not be decoded
    #[error("invalid message: {0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, VocabError>;

impl From<VocabError> for JsValue {
    fn from(err: VocabError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
