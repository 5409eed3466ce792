//! PatternCompiler: one combined whole-word matcher for the whole dictionary
//!
//! All terms are folded into a single alternation so a text node is scanned
//! once regardless of dictionary size. Alternatives are ordered longest
//! first: the regex engine takes the first alternative that matches at a
//! position, so "New York" is tried before "New" and a term never shadows a
//! longer term that contains it.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::config::MatcherConfig;
use crate::error::VocabError;
use crate::terms::TermStore;

// =============================================================================
// Types
// =============================================================================

/// A single term occurrence inside a text string (byte offsets)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermMatch {
    pub start: usize,
    pub end: usize,
    /// The literal as it appears in the text (case preserved)
    pub text: String,
}

/// Compiled, read-only matcher derived from a term set
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    terms: Vec<String>,
}

impl CompiledPattern {
    /// Terms in alternation order (longest first)
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// The generated regex source
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// All non-overlapping matches, left to right. Each call starts a fresh
    /// scan; nothing carries over between calls.
    pub fn find_matches(&self, text: &str) -> Vec<TermMatch> {
        self.regex
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| TermMatch {
                start: m.start(),
                end: m.end(),
                text: m.as_str().to_string(),
            })
            .collect()
    }
}

// =============================================================================
// PatternCompiler
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct PatternCompiler {
    config: MatcherConfig,
}

impl PatternCompiler {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Compile the store's terms. `Ok(None)` means there is nothing to
    /// match and the caller should skip annotation entirely.
    pub fn compile_store(&self, store: &TermStore) -> Result<Option<CompiledPattern>, VocabError> {
        self.compile(store.terms())
    }

    /// Compile an arbitrary term list. Ties in length keep encounter order.
    pub fn compile<'a, I>(&self, terms: I) -> Result<Option<CompiledPattern>, VocabError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sorted: Vec<String> = Vec::new();
        for term in terms {
            if term.is_empty() || sorted.iter().any(|t| t == term) {
                continue;
            }
            sorted.push(term.to_string());
        }
        if sorted.is_empty() {
            return Ok(None);
        }

        // Stable sort keeps encounter order for equal lengths
        sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

        let alternation = sorted
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let source = format!(r"\b(?:{})\b", alternation);

        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .size_limit(self.config.size_limit)
            .build()
            .map_err(|e| VocabError::Pattern(e.to_string()))?;

        log::debug!("[PatternCompiler] compiled {} terms", sorted.len());

        Ok(Some(CompiledPattern { regex, terms: sorted }))
    }
}

// =============================================================================
// Tests
// =============================================================================
