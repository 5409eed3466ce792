//! PageSession: everything the page context owns
//!
//! Ties the document, the local term copy, the highlighter and the
//! selection flow together. Hover tooltips are rendered by the browser
//! glue straight from each span's definition attribute. All methods are
//! synchronous; the browser glue finishes any storage read before calling in.

use crate::annotate::{AnnotationReport, Highlighter};
use crate::config::VocabConfig;
use crate::dom::DocumentTree;
use crate::error::{StorageError, VocabError};
use crate::messaging::Response;
use crate::terms::{StorageChange, TermMap, TermStore};
use crate::ui::{FlowEffect, SelectionFlow, Viewport};

pub struct PageSession<D: DocumentTree> {
    doc: D,
    root: D::Node,
    store: TermStore,
    highlighter: Highlighter,
    flow: SelectionFlow,
    last_report: Option<AnnotationReport>,
}

impl<D: DocumentTree> PageSession<D> {
    pub fn new(doc: D, root: D::Node, config: VocabConfig) -> Self {
        Self {
            flow: SelectionFlow::new(&config),
            highlighter: Highlighter::new(config),
            store: TermStore::new(),
            last_report: None,
            doc,
            root,
        }
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn root(&self) -> &D::Node {
        &self.root
    }

    pub fn store(&self) -> &TermStore {
        &self.store
    }

    pub fn config(&self) -> &VocabConfig {
        self.highlighter.config()
    }

    pub fn flow(&self) -> &SelectionFlow {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut SelectionFlow {
        &mut self.flow
    }

    pub fn last_report(&self) -> Option<&AnnotationReport> {
        self.last_report.as_ref()
    }

    /// Initial load: adopt the stored terms (if any) and annotate
    pub fn start(&mut self, stored: Option<TermMap>) -> Result<AnnotationReport, VocabError> {
        if let Some(terms) = stored {
            self.store.replace_all(terms);
        }
        self.refresh()
    }

    /// Remove and re-run annotation against the current local terms
    pub fn refresh(&mut self) -> Result<AnnotationReport, VocabError> {
        let report = self.highlighter.reannotate(&mut self.doc, &self.root, &self.store)?;
        self.last_report = Some(report.clone());
        Ok(report)
    }

    /// Storage changed elsewhere: adopt the new record and reannotate
    pub fn apply_storage_change(&mut self, change: &StorageChange) -> Result<AnnotationReport, VocabError> {
        self.store.reconcile(change);
        self.refresh()
    }

    /// Answer a rescan request given the freshly read storage record
    pub fn apply_rescan(&mut self, stored: Result<Option<TermMap>, StorageError>) -> Response {
        match stored {
            Ok(Some(terms)) => {
                self.store.replace_all(terms);
                match self.refresh() {
                    Ok(_) => Response::rescanned(self.store.len(), "Page rescanned successfully"),
                    Err(e) => {
                        log::error!("[PageSession] rescan failed: {}", e);
                        Response::failure(format!("Error during rescan: {}", e))
                    }
                }
            }
            Ok(None) => {
                log::info!("[PageSession] no terms in storage during rescan");
                self.store.replace_all(TermMap::new());
                let removed = self.highlighter.remove_highlights(&mut self.doc, &self.root);
                self.last_report = Some(AnnotationReport {
                    removed,
                    ..Default::default()
                });
                Response::rescanned(0, "No terms to highlight")
            }
            Err(e) => {
                log::error!("[PageSession] rescan could not read storage: {}", e);
                Response::failure(format!("Error during rescan: {}", e))
            }
        }
    }

    /// `showDefinitionPopup` message: entry surface centered in the viewport
    pub fn show_definition_popup(&mut self, term: &str, viewport: Viewport) -> Vec<FlowEffect> {
        let anchor = viewport.entry_anchor(&self.config().geometry);
        self.flow.open_entry(term, anchor, &self.store, viewport)
    }

    pub fn activate_note(&mut self, viewport: Viewport) -> Vec<FlowEffect> {
        self.flow.activate_note(&self.store, viewport)
    }

    /// Apply a `CommitTerm` locally. Returns the record to persist, or
    /// `None` when nothing changed.
    pub fn commit(&mut self, effect: &FlowEffect) -> Option<TermMap> {
        match effect {
            FlowEffect::CommitTerm { term, definition } => {
                if self.store.save(term, definition).changed() {
                    log::info!("[PageSession] term saved: {}", term);
                    Some(self.store.to_map())
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}
