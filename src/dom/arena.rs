//! ArenaDocument: in-memory document tree
//!
//! Nodes live in a flat arena and are addressed by [`NodeId`]; removed nodes
//! stay allocated but detached. Comes with a small HTML fragment parser and
//! serializer so fixtures and assertions can be written as markup.

use std::fmt;

use crate::config::MarkerConfig;
use crate::dom::{AnnotationSpan, DocumentTree, NodeKind, DEFINITION_ATTRIBUTE};
use crate::error::DomError;

/// Elements that never have children or a closing tag
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link", "wbr", "area", "col"];

/// Elements whose content is raw text up to the matching close tag
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hover handler registered on an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverListener {
    Enter,
    Leave,
}

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct ArenaNode {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<HoverListener>,
}

impl ArenaNode {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }
}

// =============================================================================
// ArenaDocument
// =============================================================================

#[derive(Debug, Clone)]
pub struct ArenaDocument {
    nodes: Vec<ArenaNode>,
    body: NodeId,
    /// Nodes whose replacement fails, for exercising per-node error handling
    poisoned: Vec<NodeId>,
}

impl Default for ArenaDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaDocument {
    /// Empty document with a `<body>` root
    pub fn new() -> Self {
        let body = ArenaNode::new(NodeData::Element {
            tag: "body".to_string(),
            attributes: Vec::new(),
        });
        Self {
            nodes: vec![body],
            body: NodeId(0),
            poisoned: Vec::new(),
        }
    }

    /// Parse `html` into the body of a fresh document
    pub fn parse_fragment(html: &str) -> Result<Self, DomError> {
        let mut doc = Self::new();
        let body = doc.body;
        FragmentParser::new(&mut doc, html).parse_into(body)?;
        Ok(doc)
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> Result<&ArenaNode, DomError> {
        self.nodes.get(id.0).ok_or_else(|| DomError::NotFound(id.to_string()))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut ArenaNode, DomError> {
        self.nodes.get_mut(id.0).ok_or_else(|| DomError::NotFound(id.to_string()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(ArenaNode::new(data));
        NodeId(self.nodes.len() - 1)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.push(NodeData::Comment(data.to_string()))
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        match &mut self.node_mut(node)?.data {
            NodeData::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(n, _)| *n == name) {
                    Some(slot) => slot.1 = value.to_string(),
                    None => attributes.push((name, value.to_string())),
                }
                Ok(())
            }
            _ => Err(DomError::Operation(format!("{} is not an element", node))),
        }
    }

    /// Overwrite a text node's data (simulates page scripts editing text)
    pub fn set_text(&mut self, node: NodeId, data: &str) -> Result<(), DomError> {
        match &mut self.node_mut(node)?.data {
            NodeData::Text(text) => {
                *text = data.to_string();
                Ok(())
            }
            _ => Err(DomError::Operation(format!("{} is not a text node", node))),
        }
    }

    /// Remove `node` from its parent, if any
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        if let Some(parent) = self.node(node)?.parent {
            self.node_mut(parent)?.children.retain(|c| *c != node);
            self.node_mut(node)?.parent = None;
        }
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if parent == child || self.is_ancestor(child, parent) {
            return Err(DomError::Operation(format!("cannot append {} into itself", child)));
        }
        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Create a text node and append it
    pub fn append_text(&mut self, parent: NodeId, data: &str) -> Result<NodeId, DomError> {
        let text = self.push(NodeData::Text(data.to_string()));
        self.append_child(parent, text)?;
        Ok(text)
    }

    /// Create an element and append it
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, DomError> {
        let element = self.create_element(tag);
        self.append_child(parent, element)?;
        Ok(element)
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(node.0).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        false
    }

    /// Make `replace_with(node, ..)` fail
    pub fn poison(&mut self, node: NodeId) {
        self.poisoned.push(node);
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node.0).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn listeners(&self, node: NodeId) -> &[HoverListener] {
        self.nodes.get(node.0).map(|n| n.listeners.as_slice()).unwrap_or(&[])
    }

    /// First descendant element with `tag`, in document order
    pub fn find_element(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| matches!(&self.nodes[id.0].data, NodeData::Element { tag: t, .. } if t == tag))
    }

    /// All descendants of `root` (excluding root), pre-order
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Number of text node children directly under `node`
    pub fn text_child_count(&self, node: NodeId) -> usize {
        self.children(node)
            .iter()
            .filter(|c| matches!(self.nodes[c.0].data, NodeData::Text(_)))
            .count()
    }

    /// Serialize the children of `node` as HTML
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        match &node.data {
            NodeData::Text(text) => {
                let raw = node
                    .parent
                    .map(|p| matches!(&self.nodes[p.0].data, NodeData::Element { tag, .. } if RAW_TEXT_ELEMENTS.contains(&tag.as_str())))
                    .unwrap_or(false);
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for child in &node.children {
                    self.write_html(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

// =============================================================================
// DocumentTree
// =============================================================================

impl DocumentTree for ArenaDocument {
    type Node = NodeId;

    fn kind(&self, node: &NodeId) -> NodeKind {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Element { .. }) => NodeKind::Element,
            Some(NodeData::Text(_)) => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn child_at(&self, node: &NodeId, index: usize) -> Option<NodeId> {
        self.children(*node).get(index).copied()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn text_data(&self, node: &NodeId) -> Option<String> {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Text(text)) => Some(text.clone()),
            _ => None,
        }
    }

    fn text_content(&self, node: &NodeId) -> String {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Text(text)) => text.clone(),
            Some(NodeData::Element { .. }) => self
                .descendants(*node)
                .into_iter()
                .filter_map(|id| match &self.nodes[id.0].data {
                    NodeData::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
            _ => String::new(),
        }
    }

    fn tag_name(&self, node: &NodeId) -> Option<String> {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Element { tag, .. }) => Some(tag.clone()),
            _ => None,
        }
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Element { attributes, .. }) => attributes
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    fn create_text(&mut self, data: &str) -> Result<NodeId, DomError> {
        Ok(self.push(NodeData::Text(data.to_string())))
    }

    fn create_annotation(
        &mut self,
        span: &AnnotationSpan,
        markers: &MarkerConfig,
    ) -> Result<NodeId, DomError> {
        let element = self.push(NodeData::Element {
            tag: "span".to_string(),
            attributes: vec![
                ("class".to_string(), markers.highlight_class.clone()),
                (DEFINITION_ATTRIBUTE.to_string(), span.definition.clone()),
            ],
        });
        self.append_text(element, &span.matched_text)?;
        self.node_mut(element)?
            .listeners
            .extend([HoverListener::Enter, HoverListener::Leave]);
        Ok(element)
    }

    fn replace_with(&mut self, target: &NodeId, replacements: &[NodeId]) -> Result<(), DomError> {
        if self.poisoned.contains(target) {
            return Err(DomError::Operation(format!("replacement of {} rejected", target)));
        }
        let parent = self
            .node(*target)?
            .parent
            .ok_or_else(|| DomError::Detached(target.to_string()))?;

        for replacement in replacements {
            self.node(*replacement)?;
            self.detach(*replacement)?;
        }

        let siblings = &mut self.node_mut(parent)?.children;
        let index = siblings
            .iter()
            .position(|c| c == target)
            .ok_or_else(|| DomError::NotFound(target.to_string()))?;
        siblings.splice(index..=index, replacements.iter().copied());

        for replacement in replacements {
            self.node_mut(*replacement)?.parent = Some(parent);
        }
        self.node_mut(*target)?.parent = None;
        Ok(())
    }

    fn normalize(&mut self, node: &NodeId) -> Result<(), DomError> {
        let children = self.node(*node)?.children.clone();
        let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());

        for child in children {
            match self.nodes[child.0].data.clone() {
                NodeData::Text(text) => {
                    let previous_text = kept
                        .last()
                        .filter(|prev| matches!(self.nodes[prev.0].data, NodeData::Text(_)))
                        .copied();
                    if text.is_empty() {
                        self.node_mut(child)?.parent = None;
                    } else if let Some(prev) = previous_text {
                        if let NodeData::Text(existing) = &mut self.node_mut(prev)?.data {
                            existing.push_str(&text);
                        }
                        self.node_mut(child)?.parent = None;
                    } else {
                        kept.push(child);
                    }
                }
                NodeData::Element { .. } => {
                    self.normalize(&child)?;
                    kept.push(child);
                }
                NodeData::Comment(_) => kept.push(child),
            }
        }

        self.node_mut(*node)?.children = kept;
        Ok(())
    }

    fn elements_with_class(&self, root: &NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(*root)
            .into_iter()
            .filter(|id| self.kind(id) == NodeKind::Element && self.has_class(id, class))
            .collect()
    }
}

// =============================================================================
// FragmentParser
// =============================================================================

/// Minimal HTML fragment parser: elements, attributes, text, comments,
/// void and raw-text elements. Unknown close tags are ignored.
struct FragmentParser<'a> {
    doc: &'a mut ArenaDocument,
    input: &'a str,
    pos: usize,
}

impl<'a> FragmentParser<'a> {
    fn new(doc: &'a mut ArenaDocument, input: &'a str) -> Self {
        Self { doc, input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn error(&self, message: &str) -> DomError {
        DomError::Operation(format!("parse error at byte {}: {}", self.pos, message))
    }

    fn parse_into(mut self, root: NodeId) -> Result<(), DomError> {
        let mut stack = vec![root];

        while self.pos < self.input.len() {
            let parent = *stack.last().unwrap_or(&root);
            let rest = self.rest();

            if let Some(after) = rest.strip_prefix("<!--") {
                let end = after.find("-->").ok_or_else(|| self.error("unterminated comment"))?;
                let comment = self.doc.create_comment(&after[..end]);
                self.doc.append_child(parent, comment)?;
                self.pos += 4 + end + 3;
            } else if let Some(after) = rest.strip_prefix("</") {
                let end = after.find('>').ok_or_else(|| self.error("unterminated close tag"))?;
                let tag = after[..end].trim().to_ascii_lowercase();
                self.pos += 2 + end + 1;
                if let Some(depth) = stack.iter().rposition(|id| {
                    self.doc.tag_name(id).as_deref() == Some(tag.as_str()) && *id != root
                }) {
                    stack.truncate(depth);
                }
            } else if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                let (element, tag, self_closing) = self.parse_open_tag()?;
                self.doc.append_child(parent, element)?;
                if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
                    let close = format!("</{}", tag);
                    let end = self.rest().to_ascii_lowercase().find(&close).unwrap_or(self.rest().len());
                    let raw = &self.rest()[..end];
                    if !raw.is_empty() {
                        self.doc.append_text(element, raw)?;
                    }
                    self.pos += end;
                } else if !self_closing && !VOID_ELEMENTS.contains(&tag.as_str()) {
                    stack.push(element);
                }
            } else {
                let end = rest
                    .char_indices()
                    .skip(1)
                    .find(|(_, c)| *c == '<')
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                self.doc.append_text(parent, &decode_entities(&rest[..end]))?;
                self.pos += end;
            }
        }
        Ok(())
    }

    /// Parse `<tag attr="v" ...>` starting at '<'
    fn parse_open_tag(&mut self) -> Result<(NodeId, String, bool), DomError> {
        self.pos += 1;
        let rest = self.rest();
        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .ok_or_else(|| self.error("unterminated open tag"))?;
        let tag = rest[..name_len].to_ascii_lowercase();
        self.pos += name_len;
        let element = self.doc.create_element(&tag);

        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(self.error("unterminated open tag"));
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                return Ok((element, tag, true));
            }
            if rest.starts_with('>') {
                self.pos += 1;
                return Ok((element, tag, false));
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }

            let name_len = rest
                .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
                .unwrap_or(rest.len());
            let name = rest[..name_len].to_string();
            self.pos += name_len;
            self.skip_whitespace();

            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                self.parse_attribute_value()?
            } else {
                String::new()
            };
            self.doc.set_attribute(element, &name, &decode_entities(&value))?;
        }
    }

    fn parse_attribute_value(&mut self) -> Result<String, DomError> {
        let rest = self.rest();
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'');
        match quote {
            Some(q) => {
                let end = rest[1..].find(q).ok_or_else(|| self.error("unterminated attribute value"))?;
                let value = rest[1..1 + end].to_string();
                self.pos += end + 2;
                Ok(value)
            }
            None => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                let value = rest[..end].to_string();
                self.pos += end;
                Ok(value)
            }
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }
}

// =============================================================================
// Tests
// =============================================================================
