//! Arena-backed document tree.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::{DocumentTree, NodeId};

#[derive(Debug, Clone)]
enum NodeKind {
    Root,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeRecord {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    next_sibling: Option<NodeId>,
}

/// An owned, immutable-after-construction document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeRecord {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                next_sibling: None,
            }],
        }
    }

    /// Parse an HTML document or fragment.
    ///
    /// Comments, doctypes and processing instructions are dropped.
    pub fn parse_html(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut doc = Self::new();
        let root = doc.root();

        let mut stack: Vec<(Handle, NodeId)> = dom
            .document
            .children
            .borrow()
            .iter()
            .rev()
            .map(|child| (child.clone(), root))
            .collect();

        while let Some((handle, parent)) = stack.pop() {
            match &handle.data {
                NodeData::Element { name, attrs, .. } => {
                    let attrs = attrs
                        .borrow()
                        .iter()
                        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                        .collect();
                    let id = doc.append_element(parent, &name.local, attrs);
                    stack.extend(
                        handle
                            .children
                            .borrow()
                            .iter()
                            .rev()
                            .map(|child| (child.clone(), id)),
                    );
                }
                NodeData::Text { contents } => {
                    let text = contents.borrow().to_string();
                    doc.append_text(parent, text);
                }
                _ => {}
            }
        }

        doc
    }

    /// Wrap plain text the way browsers display a text file:
    /// `html > body > pre > text`.
    pub fn from_plain_text(text: &str) -> Self {
        let mut doc = Self::new();
        let root = doc.root();
        let html = doc.append_element(root, "html", Vec::new());
        let body = doc.append_element(html, "body", Vec::new());
        let pre = doc.append_element(body, "pre", Vec::new());
        doc.append_text(pre, text);
        doc
    }

    /// Append an element as the last child of `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: Vec<(String, String)>,
    ) -> NodeId {
        self.push(
            parent,
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                attrs,
            },
        )
    }

    /// Append a text node as the last child of `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.push(parent, NodeKind::Text(text.into()))
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(&last) = self.nodes[parent.0].children.last() {
            self.nodes[last.0].next_sibling = Some(id);
        }
        self.nodes.push(NodeRecord {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            next_sibling: None,
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

impl DocumentTree for Document {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    fn text_content(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.next_sibling)
    }
}
