//! TermStore: the per-context term dictionary
//!
//! Holds the flat term -> definition mapping that storage persists. Every
//! context (coordinator, page, management UI) owns one and keeps it in step
//! with storage through `reconcile`. The `revision` counter counts changes
//! to this instance only; it is not comparable across stores.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;

use crate::terms::storage::StorageChange;

/// Persisted shape: one flat object, term -> definition
pub type TermMap = BTreeMap<String, String>;

// =============================================================================
// Types
// =============================================================================

/// A single saved term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    pub term: String,
    pub definition: String,
}

/// Outcome of a save request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// New term added
    Added,
    /// Existing term got a different definition
    Updated,
    /// Same definition already stored
    Unchanged,
    /// Empty term or whitespace-only definition; nothing stored
    Ignored,
}

impl SaveOutcome {
    pub fn changed(self) -> bool {
        matches!(self, SaveOutcome::Added | SaveOutcome::Updated)
    }
}

// =============================================================================
// TermStore
// =============================================================================

/// In-memory term dictionary
#[wasm_bindgen]
#[derive(Debug, Clone, Default)]
pub struct TermStore {
    terms: TermMap,
    revision: u64,
}

#[wasm_bindgen]
impl TermStore {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored terms
    #[wasm_bindgen(js_name = termCount)]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Mutation counter; bumped on every change to the mapping
    #[wasm_bindgen(getter)]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Exact-key lookup
    #[wasm_bindgen(js_name = getDefinition)]
    pub fn get_definition(&self, term: &str) -> Option<String> {
        self.get(term).map(str::to_string)
    }

    /// Replace the whole mapping from a JS object (JS binding)
    #[wasm_bindgen(js_name = hydrate)]
    pub fn js_hydrate(&mut self, terms: JsValue) -> Result<(), JsValue> {
        let map: TermMap = if terms.is_undefined() || terms.is_null() {
            TermMap::new()
        } else {
            serde_wasm_bindgen::from_value(terms)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse terms: {}", e)))?
        };
        self.replace_all(map);
        Ok(())
    }

    /// Export the mapping as a plain JS object (JS binding)
    #[wasm_bindgen(js_name = toObject)]
    pub fn js_to_object(&self) -> Result<JsValue, JsValue> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        self.terms
            .serialize(&serializer)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl TermStore {
    pub fn from_map(terms: TermMap) -> Self {
        Self { terms, revision: 1 }
    }

    pub fn get(&self, term: &str) -> Option<&str> {
        self.terms.get(term).map(String::as_str)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// Terms in dictionary iteration order (ascending)
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    /// (term, definition) pairs in dictionary iteration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.terms.iter().map(|(t, d)| (t.as_str(), d.as_str()))
    }

    pub fn as_map(&self) -> &TermMap {
        &self.terms
    }

    pub fn to_map(&self) -> TermMap {
        self.terms.clone()
    }

    /// Replace everything; returns true if the mapping actually changed
    pub fn replace_all(&mut self, terms: TermMap) -> bool {
        if self.terms == terms {
            return false;
        }
        self.terms = terms;
        self.revision += 1;
        true
    }

    /// Store a definition for `term`. The definition is trimmed; an empty
    /// term or blank definition is ignored rather than treated as an error.
    pub fn save(&mut self, term: &str, definition: &str) -> SaveOutcome {
        let definition = definition.trim();
        if term.trim().is_empty() || definition.is_empty() {
            return SaveOutcome::Ignored;
        }

        let outcome = match self.terms.get(term) {
            None => SaveOutcome::Added,
            Some(existing) if existing == definition => return SaveOutcome::Unchanged,
            Some(_) => SaveOutcome::Updated,
        };
        self.terms.insert(term.to_string(), definition.to_string());
        self.revision += 1;
        outcome
    }

    /// Remove a term; returns its definition if it existed
    pub fn remove(&mut self, term: &str) -> Option<String> {
        let removed = self.terms.remove(term);
        if removed.is_some() {
            self.revision += 1;
        }
        removed
    }

    /// Apply a storage change notification. Storage is the source of truth:
    /// the new value replaces the local copy wholesale, and a missing new
    /// value means the record was deleted.
    pub fn reconcile(&mut self, change: &StorageChange) -> bool {
        let next = change.new_value.clone().unwrap_or_default();
        let changed = self.replace_all(next);
        if changed {
            log::debug!("[TermStore] reconciled to {} terms (rev {})", self.terms.len(), self.revision);
        }
        changed
    }

    /// Entries sorted alphabetically (management list order)
    pub fn entries_alphabetical(&self) -> Vec<TermEntry> {
        self.iter()
            .map(|(term, definition)| TermEntry {
                term: term.to_string(),
                definition: definition.to_string(),
            })
            .collect()
    }

    /// Entries sorted longest term first, ties alphabetical
    pub fn entries_by_length(&self) -> Vec<TermEntry> {
        let mut entries = self.entries_alphabetical();
        entries.sort_by(|a, b| b.term.chars().count().cmp(&a.term.chars().count()));
        entries
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn store(pairs: &[(&str, &str)]) -> TermStore {
        TermStore::from_map(
            pairs
                .iter()
                .map(|(t, d)| (t.to_string(), d.to_string()))
                .collect(),
        )
    }

    // -------------------------------------------------------------------------
    // Requirement 1: Save adds, updates, and ignores blank input
    // -------------------------------------------------------------------------
    #[test]
    fn test_save_outcomes() {
        let mut terms = TermStore::new();
        assert_eq!(terms.save("gravity", "a force"), SaveOutcome::Added);
        assert_eq!(terms.save("gravity", "  a force  "), SaveOutcome::Unchanged);
        assert_eq!(terms.save("gravity", "attraction"), SaveOutcome::Updated);
        assert_eq!(terms.save("gravity", "   "), SaveOutcome::Ignored);
        assert_eq!(terms.save("  ", "something"), SaveOutcome::Ignored);
        assert_eq!(terms.get("gravity"), Some("attraction"));
        assert_eq!(terms.len(), 1);
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Keys are case-sensitive
    // -------------------------------------------------------------------------
    #[test]
    fn test_keys_are_case_sensitive() {
        let mut terms = TermStore::new();
        terms.save("Paris", "capital of France");
        terms.save("paris", "plural of pari");
        assert_eq!(terms.len(), 2);
        assert_eq!(terms.get("Paris"), Some("capital of France"));
        assert!(terms.get("PARIS").is_none());
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Revision tracks real mutations only
    // -------------------------------------------------------------------------
    #[test]
    fn test_revision_bumps_on_change_only() {
        let mut terms = TermStore::new();
        let r0 = terms.revision();
        terms.save("cat", "feline");
        let r1 = terms.revision();
        assert!(r1 > r0);

        terms.save("cat", "feline");
        assert_eq!(terms.revision(), r1, "unchanged save must not bump revision");

        assert!(terms.remove("dog").is_none());
        assert_eq!(terms.revision(), r1);

        assert_eq!(terms.remove("cat").as_deref(), Some("feline"));
        assert!(terms.revision() > r1);
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Reconcile replaces wholesale from storage
    // -------------------------------------------------------------------------
    #[test]
    fn test_reconcile_replaces_local_copy() {
        let mut terms = store(&[("old", "stale")]);
        let change = StorageChange {
            old_value: Some(terms.to_map()),
            new_value: Some(store(&[("new", "fresh")]).to_map()),
        };
        assert!(terms.reconcile(&change));
        assert!(terms.get("old").is_none());
        assert_eq!(terms.get("new"), Some("fresh"));

        // Identical notification is a no-op
        assert!(!terms.reconcile(&change));
    }

    #[test]
    fn test_reconcile_deleted_record_clears() {
        let mut terms = store(&[("a", "b")]);
        let change = StorageChange {
            old_value: Some(terms.to_map()),
            new_value: None,
        };
        assert!(terms.reconcile(&change));
        assert!(terms.is_empty());
    }

    // -------------------------------------------------------------------------
    // Requirement 5: Display orderings
    // -------------------------------------------------------------------------
    #[test]
    fn test_entry_orderings() {
        let terms = store(&[("New", "1"), ("New York", "2"), ("Boston", "3"), ("Ann", "4")]);

        let alpha: Vec<String> = terms.entries_alphabetical().into_iter().map(|e| e.term).collect();
        assert_eq!(alpha, vec!["Ann", "Boston", "New", "New York"]);

        let by_len: Vec<String> = terms.entries_by_length().into_iter().map(|e| e.term).collect();
        assert_eq!(by_len, vec!["New York", "Boston", "Ann", "New"]);
    }

    // -------------------------------------------------------------------------
    // Requirement 6: Persisted shape is a flat object
    // -------------------------------------------------------------------------
    #[test]
    fn test_persisted_shape_is_flat_object() {
        let terms = store(&[("gravity", "a force")]);
        let json = serde_json::to_string(terms.as_map()).unwrap();
        assert_eq!(json, r#"{"gravity":"a force"}"#);
    }
}
