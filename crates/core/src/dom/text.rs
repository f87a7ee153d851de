//! Line-aware text recovery.
//!
//! `textContent` glues adjacent block elements together ("ab" for
//! `<div>a</div><div>b</div>`). These helpers keep block boundaries and
//! `<br>` as line breaks and collapse whitespace within each line.

use super::{DocumentTree, NodeId, IGNORED_TAGS};

/// Tags that start a new visual line.
pub const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "ul",
];

/// Collapse whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visual lines of `node`, whitespace-collapsed, empty lines dropped.
pub fn block_lines<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Vec<String> {
    block_lines_excluding(doc, node, &|_| false)
}

/// Like [`block_lines`], but skipping every subtree (below `node`) for
/// which `skip` returns true.
pub fn block_lines_excluding<D: DocumentTree + ?Sized>(
    doc: &D,
    node: NodeId,
    skip: &dyn Fn(NodeId) -> bool,
) -> Vec<String> {
    let mut collector = LineCollector::default();
    if let Some(text) = doc.text_content(node) {
        collector.current.push_str(text);
    } else {
        for &child in doc.children(node) {
            collect(doc, child, skip, &mut collector);
        }
    }
    collector.finish()
}

/// All text of `node` on one line.
pub fn inline_text<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> String {
    block_lines(doc, node).join(" ")
}

#[derive(Default)]
struct LineCollector {
    lines: Vec<String>,
    current: String,
}

impl LineCollector {
    fn flush(&mut self) {
        let line = collapse_whitespace(&self.current);
        if !line.is_empty() {
            self.lines.push(line);
        }
        self.current.clear();
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.lines
    }
}

fn collect<D: DocumentTree + ?Sized>(
    doc: &D,
    node: NodeId,
    skip: &dyn Fn(NodeId) -> bool,
    out: &mut LineCollector,
) {
    if let Some(text) = doc.text_content(node) {
        out.current.push_str(text);
        return;
    }
    if skip(node) {
        return;
    }
    let Some(tag) = doc.tag(node) else {
        return;
    };
    if IGNORED_TAGS.contains(&tag) {
        return;
    }
    if tag == "br" {
        out.flush();
        return;
    }

    let is_block = BLOCK_TAGS.contains(&tag);
    if is_block {
        out.flush();
    }
    for &child in doc.children(node) {
        collect(doc, child, skip, out);
    }
    if is_block {
        out.flush();
    }
}
