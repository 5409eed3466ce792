//! Persistent storage interface for the term dictionary
//!
//! Storage holds a single record under [`TERMS_KEY`]: a flat term ->
//! definition object with no version field. Every context treats it as
//! the durable source of truth and re-derives its `TermStore` from the
//! change notifications it emits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};

use crate::error::StorageError;
use crate::terms::store::TermMap;

/// Storage key of the term record
pub const TERMS_KEY: &str = "terms";

/// Change notification for the term record (`{ oldValue, newValue }`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    #[serde(default)]
    pub old_value: Option<TermMap>,
    #[serde(default)]
    pub new_value: Option<TermMap>,
}

/// Async key-value storage holding the term record
#[async_trait(?Send)]
pub trait TermStorage {
    /// Read the term record; `None` if it was never written
    async fn get_terms(&self) -> Result<Option<TermMap>, StorageError>;

    /// Overwrite the term record
    async fn set_terms(&self, terms: &TermMap) -> Result<(), StorageError>;
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-process storage used by tests and native tooling. Records a change
/// notification for every write, the way `chrome.storage.onChanged` would.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    record: RefCell<Option<TermMap>>,
    changes: RefCell<Vec<StorageChange>>,
    fail_writes: Cell<bool>,
    fail_reads: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terms(terms: TermMap) -> Self {
        let storage = Self::default();
        storage.record.replace(Some(terms));
        storage
    }

    /// Make subsequent writes fail with `StorageError::Write`
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Make subsequent reads fail with `StorageError::Unavailable`
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Current record without going through the async interface
    pub fn snapshot(&self) -> Option<TermMap> {
        self.record.borrow().clone()
    }

    /// Drain the change notifications emitted so far
    pub fn take_changes(&self) -> Vec<StorageChange> {
        self.changes.take()
    }
}

#[async_trait(?Send)]
impl TermStorage for MemoryStorage {
    async fn get_terms(&self) -> Result<Option<TermMap>, StorageError> {
        if self.fail_reads.get() {
            return Err(StorageError::Unavailable("memory storage read disabled".to_string()));
        }
        Ok(self.record.borrow().clone())
    }

    async fn set_terms(&self, terms: &TermMap) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Write("memory storage write disabled".to_string()));
        }
        let old_value = self.record.replace(Some(terms.clone()));
        self.changes.borrow_mut().push(StorageChange {
            old_value,
            new_value: Some(terms.clone()),
        });
        Ok(())
    }
}
