//! NodeClassifier: which elements the walker must not enter

use crate::config::VocabConfig;
use crate::dom::{DocumentTree, NodeKind};

/// Why an element was excluded from traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpaqueReason {
    Tag,
    Role,
    /// Markup injected by this crate (highlight, note, popup, tooltip)
    OwnedMarkup,
    ContentEditable,
    IgnoreAttribute,
}

#[derive(Debug, Clone)]
pub struct NodeClassifier {
    tags: Vec<String>,
    roles: Vec<String>,
    owned_classes: Vec<String>,
    ignore_attribute: String,
}

impl NodeClassifier {
    pub fn new(config: &VocabConfig) -> Self {
        Self {
            tags: config.opaque.tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
            roles: config.opaque.roles.clone(),
            owned_classes: config
                .markers
                .owned_classes()
                .iter()
                .map(|c| c.to_string())
                .collect(),
            ignore_attribute: config.markers.ignore_attribute.clone(),
        }
    }

    /// `Some(reason)` if `node` is an element whose subtree is skipped
    pub fn opaque_reason<D: DocumentTree>(&self, doc: &D, node: &D::Node) -> Option<OpaqueReason> {
        if doc.kind(node) != NodeKind::Element {
            return None;
        }

        if let Some(tag) = doc.tag_name(node) {
            if self.tags.iter().any(|t| *t == tag) {
                return Some(OpaqueReason::Tag);
            }
        }
        if let Some(role) = doc.attribute(node, "role") {
            if self.roles.iter().any(|r| *r == role) {
                return Some(OpaqueReason::Role);
            }
        }
        if self.owned_classes.iter().any(|c| doc.has_class(node, c)) {
            return Some(OpaqueReason::OwnedMarkup);
        }
        if doc.is_content_editable(node) {
            return Some(OpaqueReason::ContentEditable);
        }
        if doc.has_attribute(node, &self.ignore_attribute) {
            return Some(OpaqueReason::IgnoreAttribute);
        }
        None
    }

    pub fn is_opaque<D: DocumentTree>(&self, doc: &D, node: &D::Node) -> bool {
        self.opaque_reason(doc, node).is_some()
    }
}

impl Default for NodeClassifier {
    fn default() -> Self {
        Self::new(&VocabConfig::default())
    }
}
