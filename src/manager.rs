//! TermManager: model behind the term management view
//!
//! Lists, filters, edits and deletes saved terms, and asks the active tab
//! to rescan. Writes go to storage first; the local copy only changes
//! once storage accepted them. The local copy is never borrowed across an
//! await, so overlapping calls from the UI cannot collide.

use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};

use crate::error::VocabError;
use crate::messaging::{Message, TabMessenger};
use crate::terms::{StorageChange, TermEntry, TermStorage, TermStore};

/// Filtered view of the term list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermListing {
    pub entries: Vec<TermEntry>,
    /// Shown instead of the list when nothing matches
    pub empty_message: Option<String>,
}

/// Outcome of a rescan request, ready for the status line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescanStatus {
    pub success: bool,
    pub message: String,
}

impl RescanStatus {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

pub struct TermManager<S, M> {
    storage: S,
    messenger: M,
    store: RefCell<TermStore>,
}

impl<S, M> TermManager<S, M>
where
    S: TermStorage,
    M: TabMessenger,
{
    pub fn new(storage: S, messenger: M) -> Self {
        Self {
            storage,
            messenger,
            store: RefCell::new(TermStore::new()),
        }
    }

    pub fn store(&self) -> Ref<'_, TermStore> {
        self.store.borrow()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// (Re)load the list from storage
    pub async fn load(&self) -> Result<(), VocabError> {
        let terms = self.storage.get_terms().await?.unwrap_or_default();
        self.store.borrow_mut().replace_all(terms);
        Ok(())
    }

    /// All terms, alphabetical
    pub fn entries(&self) -> Vec<TermEntry> {
        self.store.borrow().entries_alphabetical()
    }

    /// Case-insensitive match on term or definition. A blank query lists
    /// everything.
    pub fn filter(&self, query: &str) -> TermListing {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return TermListing {
                entries: self.entries(),
                empty_message: None,
            };
        }

        let entries: Vec<TermEntry> = self
            .entries()
            .into_iter()
            .filter(|e| e.term.to_lowercase().contains(&needle) || e.definition.to_lowercase().contains(&needle))
            .collect();
        let empty_message = entries
            .is_empty()
            .then(|| format!("No matches found for \"{}\"", needle));
        TermListing { entries, empty_message }
    }

    /// Change a definition. Blank or identical text is ignored (`Ok(false)`).
    pub async fn update(&self, term: &str, definition: &str) -> Result<bool, VocabError> {
        let definition = definition.trim();
        let mut terms = {
            let store = self.store.borrow();
            if definition.is_empty() || store.get(term) == Some(definition) {
                return Ok(false);
            }
            store.to_map()
        };

        terms.insert(term.to_string(), definition.to_string());
        self.storage.set_terms(&terms).await?;
        self.store.borrow_mut().replace_all(terms);
        log::info!("[TermManager] updated '{}'", term);
        Ok(true)
    }

    /// Delete a term. Unknown terms are ignored (`Ok(false)`).
    pub async fn delete(&self, term: &str) -> Result<bool, VocabError> {
        let mut terms = {
            let store = self.store.borrow();
            if !store.contains(term) {
                return Ok(false);
            }
            store.to_map()
        };

        terms.remove(term);
        self.storage.set_terms(&terms).await?;
        self.store.borrow_mut().replace_all(terms);
        log::info!("[TermManager] deleted '{}'", term);
        Ok(true)
    }

    pub fn apply_storage_change(&self, change: &StorageChange) -> bool {
        self.store.borrow_mut().reconcile(change)
    }

    /// Ask the active tab to rescan and turn the reply into a status line
    pub async fn rescan(&self) -> RescanStatus {
        let tab = match self.messenger.active_tab().await {
            Ok(Some(tab)) => tab,
            Ok(None) => return RescanStatus::failed("Error: Could not find active tab"),
            Err(e) => {
                log::error!("[TermManager] tab query failed: {}", e);
                return RescanStatus::failed("Error: Could not find active tab");
            }
        };

        let response = match self.messenger.send_to_tab(tab, &Message::RescanPage).await {
            Ok(response) => response,
            Err(e) => {
                log::error!("[TermManager] rescan message failed: {}", e);
                return RescanStatus::failed("Error: Page could not be rescanned");
            }
        };

        match response {
            Some(r) if r.success => {
                if let Err(e) = self.load().await {
                    log::warn!("[TermManager] reload after rescan failed: {}", e);
                }
                let message = match r.terms_count.unwrap_or(0) {
                    0 => "No terms to highlight on this page.".to_string(),
                    n => format!("Page rescanned successfully! Found {} terms.", n),
                };
                RescanStatus { success: true, message }
            }
            Some(r) => RescanStatus::failed(r.error.unwrap_or_else(|| "Unknown error occurred".to_string())),
            None => RescanStatus::failed("Unknown error occurred"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
