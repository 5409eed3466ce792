//! WebDocument: `DocumentTree` over the live browser DOM

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Node};

use crate::config::MarkerConfig;
use crate::dom::{AnnotationSpan, DocumentTree, NodeKind, DEFINITION_ATTRIBUTE};
use crate::error::DomError;
use crate::web::tooltip::HoverHandlers;

fn dom_error(err: JsValue) -> DomError {
    DomError::Operation(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

/// Live document plus the single pair of hover handlers every span shares
pub struct WebDocument {
    document: Document,
    handlers: HoverHandlers,
}

impl WebDocument {
    pub fn new(document: Document, handlers: HoverHandlers) -> Self {
        Self { document, handlers }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// `<body>` as the annotation root
    pub fn body(&self) -> Result<Node, DomError> {
        self.document
            .body()
            .map(Node::from)
            .ok_or_else(|| DomError::NotFound("document.body".to_string()))
    }
}

impl DocumentTree for WebDocument {
    type Node = Node;

    fn kind(&self, node: &Node) -> NodeKind {
        match node.node_type() {
            Node::ELEMENT_NODE => NodeKind::Element,
            Node::TEXT_NODE => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn child_at(&self, node: &Node, index: usize) -> Option<Node> {
        node.child_nodes().item(index as u32)
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn text_data(&self, node: &Node) -> Option<String> {
        if node.node_type() == Node::TEXT_NODE {
            node.node_value()
        } else {
            None
        }
    }

    fn text_content(&self, node: &Node) -> String {
        node.text_content().unwrap_or_default()
    }

    fn tag_name(&self, node: &Node) -> Option<String> {
        node.dyn_ref::<Element>().map(|e| e.tag_name().to_lowercase())
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>().and_then(|e| e.get_attribute(name))
    }

    fn has_attribute(&self, node: &Node, name: &str) -> bool {
        node.dyn_ref::<Element>().map(|e| e.has_attribute(name)).unwrap_or(false)
    }

    fn has_class(&self, node: &Node, class: &str) -> bool {
        node.dyn_ref::<Element>()
            .map(|e| e.class_list().contains(class))
            .unwrap_or(false)
    }

    fn create_text(&mut self, data: &str) -> Result<Node, DomError> {
        Ok(self.document.create_text_node(data).into())
    }

    fn create_annotation(&mut self, span: &AnnotationSpan, markers: &MarkerConfig) -> Result<Node, DomError> {
        let element = self.document.create_element("span").map_err(dom_error)?;
        element.set_class_name(&markers.highlight_class);
        element.set_text_content(Some(&span.matched_text));
        element
            .set_attribute(DEFINITION_ATTRIBUTE, &span.definition)
            .map_err(dom_error)?;
        element
            .add_event_listener_with_callback("mouseenter", self.handlers.enter.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        element
            .add_event_listener_with_callback("mouseleave", self.handlers.leave.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        Ok(element.into())
    }

    fn replace_with(&mut self, target: &Node, replacements: &[Node]) -> Result<(), DomError> {
        let parent = target
            .parent_node()
            .ok_or_else(|| DomError::Detached(target.node_name()))?;
        for replacement in replacements {
            parent.insert_before(replacement, Some(target)).map_err(dom_error)?;
        }
        parent.remove_child(target).map_err(dom_error)?;
        Ok(())
    }

    fn normalize(&mut self, node: &Node) -> Result<(), DomError> {
        node.normalize();
        Ok(())
    }

    fn elements_with_class(&self, root: &Node, class: &str) -> Vec<Node> {
        let root = match root.dyn_ref::<Element>() {
            Some(root) => root,
            None => return Vec::new(),
        };
        let list = match root.query_selector_all(&format!(".{}", class)) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("[WebDocument] selector for '{}' failed: {:?}", class, e);
                return Vec::new();
            }
        };
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }
}
