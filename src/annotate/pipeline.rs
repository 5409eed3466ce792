//! Highlighter: remove, compile, annotate
//!
//! Owns the compiled pattern for one context. The cache is keyed by the
//! term set the pattern was built from, so a pattern is never applied to a
//! store holding different terms, whichever store instance is passed in.
//! Definitions are resolved per match and are not part of the key.

use instant::Instant;
use serde::{Deserialize, Serialize};

use crate::annotate::classify::NodeClassifier;
use crate::annotate::remover::HighlightRemover;
use crate::annotate::walker::{Annotator, WalkStats};
use crate::config::VocabConfig;
use crate::dom::DocumentTree;
use crate::error::VocabError;
use crate::matcher::{CompiledPattern, PatternCompiler};
use crate::terms::TermStore;

/// Summary of one reannotation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationReport {
    /// Spans unwrapped before annotating
    pub removed: usize,
    pub spans_created: usize,
    pub text_nodes_annotated: usize,
    /// Text nodes that failed and were skipped
    pub errors: usize,
    /// Terms in the dictionary at the time of the run
    pub terms: usize,
    pub elapsed_us: u64,
}

impl AnnotationReport {
    fn absorb(&mut self, stats: WalkStats) {
        self.spans_created += stats.spans_created;
        self.text_nodes_annotated += stats.text_nodes_annotated;
        self.errors += stats.errors;
    }
}

struct CachedPattern {
    /// Terms the pattern was compiled from, ascending
    terms: Vec<String>,
    pattern: Option<CompiledPattern>,
}

impl CachedPattern {
    fn built_from(&self, store: &TermStore) -> bool {
        self.terms.len() == store.len() && self.terms.iter().map(String::as_str).eq(store.terms())
    }
}

pub struct Highlighter {
    config: VocabConfig,
    compiler: PatternCompiler,
    classifier: NodeClassifier,
    cache: Option<CachedPattern>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(VocabConfig::default())
    }
}

impl Highlighter {
    pub fn new(config: VocabConfig) -> Self {
        Self {
            compiler: PatternCompiler::new(config.matcher),
            classifier: NodeClassifier::new(&config),
            config,
            cache: None,
        }
    }

    pub fn config(&self) -> &VocabConfig {
        &self.config
    }

    /// Pattern for the store's current terms, compiling if stale
    pub fn pattern_for(&mut self, store: &TermStore) -> Result<Option<&CompiledPattern>, VocabError> {
        let fresh = matches!(&self.cache, Some(cached) if cached.built_from(store));
        if !fresh {
            let pattern = self.compiler.compile_store(store)?;
            self.cache = Some(CachedPattern {
                terms: store.terms().map(str::to_string).collect(),
                pattern,
            });
        }
        Ok(self.cache.as_ref().and_then(|c| c.pattern.as_ref()))
    }

    /// Unwrap every span under `root`
    pub fn remove_highlights<D: DocumentTree>(&self, doc: &mut D, root: &D::Node) -> usize {
        HighlightRemover::new(&self.config.markers.highlight_class).remove(doc, root)
    }

    /// Single annotation pass, without removing existing spans first
    pub fn annotate<D: DocumentTree>(
        &mut self,
        doc: &mut D,
        root: &D::Node,
        store: &TermStore,
    ) -> Result<AnnotationReport, VocabError> {
        let started = Instant::now();
        let mut report = AnnotationReport {
            terms: store.len(),
            ..Default::default()
        };
        self.annotate_into(doc, root, store, &mut report)?;
        report.elapsed_us = started.elapsed().as_micros() as u64;
        Ok(report)
    }

    /// Remove all highlights, then annotate against the current terms.
    /// An empty dictionary leaves the page clean.
    pub fn reannotate<D: DocumentTree>(
        &mut self,
        doc: &mut D,
        root: &D::Node,
        store: &TermStore,
    ) -> Result<AnnotationReport, VocabError> {
        let started = Instant::now();
        let mut report = AnnotationReport {
            removed: self.remove_highlights(doc, root),
            terms: store.len(),
            ..Default::default()
        };
        self.annotate_into(doc, root, store, &mut report)?;
        report.elapsed_us = started.elapsed().as_micros() as u64;

        log::info!(
            "[Highlighter] {} spans in {} text nodes ({} removed, {} errors) in {}us",
            report.spans_created,
            report.text_nodes_annotated,
            report.removed,
            report.errors,
            report.elapsed_us
        );
        Ok(report)
    }

    fn annotate_into<D: DocumentTree>(
        &mut self,
        doc: &mut D,
        root: &D::Node,
        store: &TermStore,
        report: &mut AnnotationReport,
    ) -> Result<(), VocabError> {
        self.pattern_for(store)?;
        let pattern = match self.cache.as_ref().and_then(|c| c.pattern.as_ref()) {
            Some(pattern) => pattern,
            None => return Ok(()),
        };
        let annotator = Annotator::new(pattern, store, &self.classifier, &self.config.markers);
        report.absorb(annotator.annotate(doc, root));
        Ok(())
    }
}
