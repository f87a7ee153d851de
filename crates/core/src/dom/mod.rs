//! Read-only document tree capability.
//!
//! Extraction code is written as free functions over [`DocumentTree`], so
//! it only ever needs child/sibling traversal, tag and attribute lookups,
//! and text retrieval. [`Document`] is the arena implementation built from
//! HTML or plain text.

mod document;
pub mod text;

pub use document::Document;

/// Handle to a node inside a [`DocumentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in document (pre-)order of creation.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Elements whose content never contributes text.
pub const IGNORED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Something a node can be recognized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Element tag name (lowercase).
    Tag(&'static str),
    /// Exact class token.
    Class(&'static str),
    /// Class token starting with the given text.
    ClassPrefix(&'static str),
    /// Element id.
    Id(&'static str),
    /// Attribute with an exact value.
    Attr(&'static str, &'static str),
}

/// Minimal read-only view of a hierarchical document.
pub trait DocumentTree {
    /// The document node that holds everything else.
    fn root(&self) -> NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> &[NodeId];

    /// Lowercase tag name; `None` for text and document nodes.
    fn tag(&self, node: NodeId) -> Option<&str>;

    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Character data of a text node; `None` for every other node kind.
    fn text_content(&self, node: NodeId) -> Option<&str>;

    fn is_element(&self, node: NodeId) -> bool {
        self.tag(node).is_some()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == node)?;
        siblings.get(pos + 1).copied()
    }

    fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    fn classes(&self, node: NodeId) -> Vec<&str> {
        self.attr(node, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.classes(node).iter().any(|c| *c == class)
    }

    fn has_marker(&self, node: NodeId, marker: &Marker) -> bool {
        match *marker {
            Marker::Tag(tag) => self.tag(node) == Some(tag),
            Marker::Class(class) => self.has_class(node, class),
            Marker::ClassPrefix(prefix) => self.classes(node).iter().any(|c| c.starts_with(prefix)),
            Marker::Id(id) => self.attr(node, "id") == Some(id),
            Marker::Attr(name, value) => self.attr(node, name) == Some(value),
        }
    }

    fn matches_any(&self, node: NodeId, markers: &[Marker]) -> bool {
        markers.iter().any(|m| self.has_marker(node, m))
    }

    /// All descendants in document order, excluding `node` itself.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Strict ancestors, nearest first.
    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(node);
        while let Some(id) = current {
            out.push(id);
            current = self.parent(id);
        }
        out
    }

    /// Whether `node` lies strictly inside `ancestor`.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Descendants of `scope` matching any marker, in document order.
    fn find_all(&self, scope: NodeId, markers: &[Marker]) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| self.is_element(n) && self.matches_any(n, markers))
            .collect()
    }

    fn find_first(&self, scope: NodeId, markers: &[Marker]) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&n| self.is_element(n) && self.matches_any(n, markers))
    }

    /// Concatenated character data below `node` (like DOM `textContent`),
    /// skipping [`IGNORED_TAGS`].
    fn text(&self, node: NodeId) -> String {
        if let Some(text) = self.text_content(node) {
            return text.to_string();
        }
        let mut out = String::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if let Some(text) = self.text_content(current) {
                out.push_str(text);
                continue;
            }
            if self.tag(current).is_some_and(|t| IGNORED_TAGS.contains(&t)) {
                continue;
            }
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Whether the node holds any non-whitespace text.
    fn has_text(&self, node: NodeId) -> bool {
        !self.text(node).trim().is_empty()
    }
}
