//! DefinitionResolver: matched literal -> stored definition
//!
//! The pattern matches case-insensitively, so the literal found on the page
//! can differ in case from the saved key. Resolution walks a fallback chain:
//! exact, lowercase, Capitalized, UPPERCASE, then a substring scan in either
//! direction. The substring step can return a loosely related definition
//! ("art" resolving "heart"); that imprecision is accepted.

use crate::terms::store::TermStore;

/// Which step of the chain produced the definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    Exact,
    Lowercase,
    Capitalized,
    Uppercase,
    Substring,
    Unresolved,
}

pub struct DefinitionResolver<'a> {
    store: &'a TermStore,
}

impl<'a> DefinitionResolver<'a> {
    pub fn new(store: &'a TermStore) -> Self {
        Self { store }
    }

    /// Definition for `matched`, or an empty string if nothing resolves
    pub fn resolve(&self, matched: &str) -> &'a str {
        self.resolve_with_step(matched).0
    }

    pub fn resolve_with_step(&self, matched: &str) -> (&'a str, ResolutionStep) {
        let store = self.store;

        if let Some(definition) = store.get(matched) {
            return (definition, ResolutionStep::Exact);
        }

        let lower = matched.to_lowercase();
        if let Some(definition) = store.get(&lower) {
            return (definition, ResolutionStep::Lowercase);
        }

        if let Some(definition) = store.get(&capitalize(&lower)) {
            return (definition, ResolutionStep::Capitalized);
        }

        if let Some(definition) = store.get(&matched.to_uppercase()) {
            return (definition, ResolutionStep::Uppercase);
        }

        // Last resort, first hit in dictionary order wins
        for (term, definition) in store.iter() {
            let saved = term.to_lowercase();
            if saved.contains(&lower) || lower.contains(&saved) {
                return (definition, ResolutionStep::Substring);
            }
        }

        ("", ResolutionStep::Unresolved)
    }
}

/// First character uppercased, the rest left as given
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Tests
// =============================================================================
