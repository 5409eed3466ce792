//! Annotator: wraps every term occurrence in eligible text nodes
//!
//! Depth-first, pre-order over live children. When a text node is replaced
//! by M fragments the child cursor jumps M positions, so freshly inserted
//! spans and text slices are never revisited. Errors are per text node:
//! they are logged and counted, and the walk moves on to the next sibling.

use serde::{Deserialize, Serialize};

use crate::annotate::classify::NodeClassifier;
use crate::config::MarkerConfig;
use crate::dom::{AnnotationSpan, DocumentTree, NodeKind};
use crate::error::DomError;
use crate::matcher::CompiledPattern;
use crate::terms::{DefinitionResolver, TermStore};

/// Counters from a single annotation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkStats {
    pub spans_created: usize,
    pub text_nodes_annotated: usize,
    pub errors: usize,
}

/// Result of processing one text node
struct Replacement {
    fragments: usize,
    spans: usize,
}

pub struct Annotator<'a> {
    pattern: &'a CompiledPattern,
    resolver: DefinitionResolver<'a>,
    classifier: &'a NodeClassifier,
    markers: &'a MarkerConfig,
}

impl<'a> Annotator<'a> {
    pub fn new(
        pattern: &'a CompiledPattern,
        store: &'a TermStore,
        classifier: &'a NodeClassifier,
        markers: &'a MarkerConfig,
    ) -> Self {
        Self {
            pattern,
            resolver: DefinitionResolver::new(store),
            classifier,
            markers,
        }
    }

    /// Annotate everything under `root` (the root itself included)
    pub fn annotate<D: DocumentTree>(&self, doc: &mut D, root: &D::Node) -> WalkStats {
        let mut stats = WalkStats::default();
        match doc.kind(root) {
            NodeKind::Text => {
                self.visit_text(doc, root, &mut stats);
            }
            NodeKind::Element if !self.classifier.is_opaque(doc, root) => {
                self.walk_children(doc, root, &mut stats)
            }
            _ => {}
        }
        stats
    }

    fn walk_children<D: DocumentTree>(&self, doc: &mut D, parent: &D::Node, stats: &mut WalkStats) {
        let mut index = 0;
        while let Some(child) = doc.child_at(parent, index) {
            match doc.kind(&child) {
                NodeKind::Text => {
                    index += self.visit_text(doc, &child, stats).max(1);
                }
                NodeKind::Element => {
                    if !self.classifier.is_opaque(doc, &child) {
                        self.walk_children(doc, &child, stats);
                    }
                    index += 1;
                }
                NodeKind::Other => index += 1,
            }
        }
    }

    /// Returns how many siblings now occupy the text node's slot
    fn visit_text<D: DocumentTree>(&self, doc: &mut D, node: &D::Node, stats: &mut WalkStats) -> usize {
        match self.wrap_matches(doc, node) {
            Ok(Some(replacement)) => {
                stats.spans_created += replacement.spans;
                stats.text_nodes_annotated += 1;
                replacement.fragments
            }
            Ok(None) => 1,
            Err(e) => {
                log::warn!("[Annotator] skipped text node {:?}: {}", node, e);
                stats.errors += 1;
                1
            }
        }
    }

    fn wrap_matches<D: DocumentTree>(&self, doc: &mut D, node: &D::Node) -> Result<Option<Replacement>, DomError> {
        let data = match doc.text_data(node) {
            Some(data) if !data.trim().is_empty() => data,
            _ => return Ok(None),
        };

        let matches = self.pattern.find_matches(&data);
        if matches.is_empty() {
            return Ok(None);
        }

        let mut fragments = Vec::with_capacity(matches.len() * 2 + 1);
        let mut cursor = 0;
        for found in &matches {
            if found.start > cursor {
                fragments.push(doc.create_text(&data[cursor..found.start])?);
            }
            let span = AnnotationSpan {
                matched_text: found.text.clone(),
                definition: self.resolver.resolve(&found.text).to_string(),
            };
            fragments.push(doc.create_annotation(&span, self.markers)?);
            cursor = found.end;
        }
        if cursor < data.len() {
            fragments.push(doc.create_text(&data[cursor..])?);
        }

        doc.replace_with(node, &fragments)?;

        Ok(Some(Replacement {
            fragments: fragments.len(),
            spans: matches.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ArenaDocument;
    use crate::matcher::PatternCompiler;

    fn run(html: &str, pairs: &[(&str, &str)]) -> (ArenaDocument, WalkStats) {
        let store = TermStore::from_map(pairs.iter().map(|(t, d)| (t.to_string(), d.to_string())).collect());
        let pattern = PatternCompiler::default().compile_store(&store).unwrap().unwrap();
        let classifier = NodeClassifier::default();
        let markers = MarkerConfig::default();
        let mut doc = ArenaDocument::parse_fragment(html).unwrap();
        let body = doc.body();
        let stats = Annotator::new(&pattern, &store, &classifier, &markers).annotate(&mut doc, &body);
        (doc, stats)
    }

    #[test]
    fn test_splits_text_around_matches() {
        let (doc, stats) = run("<p>a cat and a dog</p>", &[("cat", "feline"), ("dog", "canine")]);
        assert_eq!(
            doc.inner_html(doc.body()),
            "<p>a <span class=\"sticky-vocab-highlight\" data-definition=\"feline\">cat</span> and a \
             <span class=\"sticky-vocab-highlight\" data-definition=\"canine\">dog</span></p>"
        );
        assert_eq!(stats.spans_created, 2);
        assert_eq!(stats.text_nodes_annotated, 1);
    }

    #[test]
    fn test_whole_text_node_is_a_term() {
        let (doc, stats) = run("<p><b>cat</b></p>", &[("cat", "feline")]);
        assert_eq!(stats.spans_created, 1);
        let b = doc.find_element(doc.body(), "b").unwrap();
        assert_eq!(doc.children(b).len(), 1);
        assert_eq!(doc.elements_with_class(&b, "sticky-vocab-highlight").len(), 1);
    }

    #[test]
    fn test_adjacent_siblings_are_all_visited() {
        let (_, stats) = run("<p>cat</p><p>cat</p><p>cat</p>", &[("cat", "feline")]);
        assert_eq!(stats.spans_created, 3);
        assert_eq!(stats.text_nodes_annotated, 3);
    }

    #[test]
    fn test_whitespace_only_text_is_skipped() {
        let (doc, stats) = run("<p>   </p>", &[("cat", "feline")]);
        assert_eq!(stats, WalkStats::default());
        assert_eq!(doc.inner_html(doc.body()), "<p>   </p>");
    }

    #[test]
    fn test_opaque_root_is_not_entered() {
        let store = TermStore::from_map([("cat".to_string(), "feline".to_string())].into_iter().collect());
        let pattern = PatternCompiler::default().compile_store(&store).unwrap().unwrap();
        let classifier = NodeClassifier::default();
        let markers = MarkerConfig::default();
        let mut doc = ArenaDocument::parse_fragment("<div data-highlight-ignore>cat</div>").unwrap();
        let div = doc.find_element(doc.body(), "div").unwrap();
        let stats = Annotator::new(&pattern, &store, &classifier, &markers).annotate(&mut doc, &div);
        assert_eq!(stats.spans_created, 0);
    }

    #[test]
    fn test_text_root_is_annotated() {
        let store = TermStore::from_map([("cat".to_string(), "feline".to_string())].into_iter().collect());
        let pattern = PatternCompiler::default().compile_store(&store).unwrap().unwrap();
        let classifier = NodeClassifier::default();
        let markers = MarkerConfig::default();
        let mut doc = ArenaDocument::parse_fragment("<p>a cat</p>").unwrap();
        let p = doc.find_element(doc.body(), "p").unwrap();
        let text = doc.child_at(&p, 0).unwrap();

        let stats = Annotator::new(&pattern, &store, &classifier, &markers).annotate(&mut doc, &text);
        assert_eq!(stats.spans_created, 1);
        assert_eq!(stats.text_nodes_annotated, 1);
        assert_eq!(
            doc.inner_html(p),
            "a <span class=\"sticky-vocab-highlight\" data-definition=\"feline\">cat</span>"
        );
    }
}
