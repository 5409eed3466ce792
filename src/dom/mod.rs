//! Document tree abstraction
//!
//! The annotator and remover are written against [`DocumentTree`] so the
//! same traversal runs over the browser DOM (`web::dom::WebDocument`, wasm
//! only) and over [`ArenaDocument`], an in-memory tree used natively.

pub mod arena;

pub use arena::*;

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::config::MarkerConfig;
use crate::error::DomError;

/// Attribute holding a span's resolved definition
pub const DEFINITION_ATTRIBUTE: &str = "data-definition";

/// Coarse node classification; only elements and text matter to traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Other,
}

/// Payload of one annotation wrapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationSpan {
    /// Literal as it appeared in the text
    pub matched_text: String,
    /// Resolved definition (may be empty)
    pub definition: String,
}

/// Mutable document tree the engine can annotate
pub trait DocumentTree {
    type Node: Clone + PartialEq + Debug;

    fn kind(&self, node: &Self::Node) -> NodeKind;

    /// Live child at `index`, `None` past the end
    fn child_at(&self, node: &Self::Node, index: usize) -> Option<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Character data of a text node
    fn text_data(&self, node: &Self::Node) -> Option<String>;

    /// Concatenated text of the node and its descendants
    fn text_content(&self, node: &Self::Node) -> String;

    /// Lowercase tag name of an element
    fn tag_name(&self, node: &Self::Node) -> Option<String>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn has_attribute(&self, node: &Self::Node, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn has_class(&self, node: &Self::Node, class: &str) -> bool {
        self.attribute(node, "class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Explicitly editable element (`contenteditable` of "" or "true")
    fn is_content_editable(&self, node: &Self::Node) -> bool {
        self.attribute(node, "contenteditable")
            .map(|v| v.is_empty() || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    fn create_text(&mut self, data: &str) -> Result<Self::Node, DomError>;

    /// Build a detached annotation wrapper: marker class, the matched text
    /// as its only child, the definition attribute, and one hover-enter plus
    /// one hover-leave handler.
    fn create_annotation(
        &mut self,
        span: &AnnotationSpan,
        markers: &MarkerConfig,
    ) -> Result<Self::Node, DomError>;

    /// Replace `target` with `replacements`, in order, at its position
    fn replace_with(&mut self, target: &Self::Node, replacements: &[Self::Node]) -> Result<(), DomError>;

    /// Merge adjacent text nodes and drop empty ones under `node`
    fn normalize(&mut self, node: &Self::Node) -> Result<(), DomError>;

    /// Descendant elements of `root` carrying `class`, in document order
    fn elements_with_class(&self, root: &Self::Node, class: &str) -> Vec<Self::Node>;

    /// Read an annotation back from its wrapper element
    fn annotation_span(&self, node: &Self::Node) -> Option<AnnotationSpan> {
        if self.kind(node) != NodeKind::Element {
            return None;
        }
        let definition = self.attribute(node, DEFINITION_ATTRIBUTE)?;
        Some(AnnotationSpan {
            matched_text: self.text_content(node),
            definition,
        })
    }
}
