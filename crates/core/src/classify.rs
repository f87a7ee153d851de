//! Node classification.
//!
//! A node is classified by the first predicate in [`classify`]'s ordered
//! table that accepts it. Order resolves look-alikes: a quote block built
//! from nested `div` rows must be a blockquote, never a grid table, so the
//! table predicate rejects blockquotes explicitly as well.

use regex::Regex;
use std::sync::LazyLock;

use crate::dom::text::block_lines;
use crate::dom::{DocumentTree, Marker, NodeId};

/// "Heading 2: Budget" style prefix that marks a level-2 heading in text.
static LEVEL2_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*heading\s*2\b\s*:?").unwrap());

/// Any "Heading N:" prefix, removed from titles.
static HEADING_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*heading\s*[1-6]\b\s*:?\s*").unwrap());

const H1_MARKERS: &[Marker] = &[
    Marker::Tag("h1"),
    Marker::Class("notion-header-block"),
    Marker::Class("notion-heading_1-block"),
    Marker::Class("notion-h1"),
    Marker::Class("heading-1"),
];

const H2_MARKERS: &[Marker] = &[
    Marker::Tag("h2"),
    Marker::Class("notion-sub_header-block"),
    Marker::Class("notion-heading_2-block"),
    Marker::Class("notion-h2"),
    Marker::Class("heading-2"),
];

const H3_MARKERS: &[Marker] = &[
    Marker::Tag("h3"),
    Marker::Tag("h4"),
    Marker::Tag("h5"),
    Marker::Tag("h6"),
    Marker::Class("notion-sub_sub_header-block"),
    Marker::Class("notion-heading_3-block"),
    Marker::Class("notion-h3"),
    Marker::Class("heading-3"),
];

const NATIVE_HEADINGS: &[Marker] = &[
    Marker::Tag("h1"),
    Marker::Tag("h2"),
    Marker::Tag("h3"),
    Marker::Tag("h4"),
    Marker::Tag("h5"),
    Marker::Tag("h6"),
];

/// List items: every list marker except bare `ul`/`ol` containers.
pub const LIST_ITEM_MARKERS: &[Marker] = &[
    Marker::Tag("li"),
    Marker::Class("notion-bulleted_list-block"),
    Marker::Class("notion-numbered_list-block"),
    Marker::Class("notion-to_do-block"),
    Marker::Class("notion-toggle-block"),
    Marker::Class("notion-list-block"),
    Marker::Class("task-list-item"),
];

pub const LIST_CONTAINER_MARKERS: &[Marker] = &[Marker::Tag("ul"), Marker::Tag("ol")];

const NUMBERED_MARKERS: &[Marker] = &[
    Marker::Tag("ol"),
    Marker::Class("notion-numbered_list-block"),
];

pub const TODO_MARKERS: &[Marker] = &[
    Marker::Class("notion-to_do-block"),
    Marker::Class("task-list-item"),
];

const CODE_MARKERS: &[Marker] = &[
    Marker::Tag("pre"),
    Marker::Class("notion-code-block"),
    Marker::Class("highlight"),
    Marker::Class("code-block"),
];

const CODE_CONTAINER_TAGS: &[&str] = &["div", "section", "figure"];

/// Descendants that disqualify a container from being a plain code wrapper.
const STRUCTURAL_MARKERS: &[Marker] = &[
    Marker::Tag("p"),
    Marker::Tag("h1"),
    Marker::Tag("h2"),
    Marker::Tag("h3"),
    Marker::Tag("h4"),
    Marker::Tag("h5"),
    Marker::Tag("h6"),
    Marker::Tag("ul"),
    Marker::Tag("ol"),
    Marker::Tag("li"),
    Marker::Tag("table"),
    Marker::Tag("blockquote"),
];

const TABLE_MARKERS: &[Marker] = &[
    Marker::Tag("table"),
    Marker::Class("notion-table-block"),
    Marker::Class("notion-simple_table-block"),
];

const BLOCKQUOTE_MARKERS: &[Marker] = &[
    Marker::Tag("blockquote"),
    Marker::Class("notion-quote-block"),
    Marker::Class("notion-callout-block"),
    Marker::Class("markdown-alert"),
];

const PARAGRAPH_MARKERS: &[Marker] = &[
    Marker::Tag("p"),
    Marker::Class("notion-text-block"),
];

const IMAGE_MARKERS: &[Marker] = &[
    Marker::Tag("img"),
    Marker::Class("notion-image-block"),
];

pub const DIVIDER_MARKERS: &[Marker] = &[
    Marker::Tag("hr"),
    Marker::Class("notion-divider-block"),
    Marker::Class("divider"),
];

/// Rows a grid-shaped container must agree on to count as a table.
const GRID_SAMPLE_ROWS: usize = 3;

/// Semantic category of a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Heading of level 1 (slide boundary), 2 (subslide boundary) or 3.
    Heading(u8),
    List { ordered: bool },
    CodeBlock,
    Table,
    Blockquote,
    Paragraph,
    Image,
    Divider,
    Unknown,
}

type Predicate<D> = fn(&D, NodeId) -> Option<Classification>;

fn predicates<D: DocumentTree + ?Sized>() -> [Predicate<D>; 8] {
    [
        detect_heading::<D>,
        detect_list::<D>,
        detect_code_block::<D>,
        detect_table::<D>,
        detect_blockquote::<D>,
        detect_paragraph::<D>,
        detect_image::<D>,
        detect_divider::<D>,
    ]
}

/// Classify a node. Falls back to [`Classification::Unknown`].
pub fn classify<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Classification {
    predicates::<D>()
        .iter()
        .find_map(|predicate| predicate(doc, node))
        .unwrap_or(Classification::Unknown)
}

/// Heading level (1..=3) of a node, if it is a heading.
pub fn heading_level<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<u8> {
    if doc.is_element(node) {
        // GitHub wraps headings: <div class="markdown-heading"><h2>..</h2><a class="anchor">
        if doc.has_class(node, "markdown-heading") {
            let inner = doc.find_first(node, NATIVE_HEADINGS)?;
            return heading_level(doc, inner);
        }
        if doc.matches_any(node, H1_MARKERS) {
            return Some(1);
        }
        if doc.matches_any(node, H2_MARKERS) {
            return Some(2);
        }
        if doc.matches_any(node, H3_MARKERS) {
            return Some(3);
        }
        if doc.attr(node, "role") == Some("heading") {
            let level = doc
                .attr(node, "aria-level")
                .and_then(|l| l.trim().parse::<u8>().ok())
                .unwrap_or(2);
            return Some(level.clamp(1, 3));
        }
    }

    let lines = block_lines(doc, node);
    if lines.len() == 1 && LEVEL2_PREFIX_REGEX.is_match(&lines[0]) {
        return Some(2);
    }

    None
}

/// Level-1 headings start slides.
pub fn is_slide_boundary<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> bool {
    heading_level(doc, node) == Some(1)
}

/// Level-2 headings start subslides.
pub fn is_subslide_boundary<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> bool {
    heading_level(doc, node) == Some(2)
}

/// Remove a leading "Heading N:" marker and surrounding whitespace.
pub fn strip_heading_prefix(text: &str) -> String {
    HEADING_PREFIX_REGEX.replace(text, "").trim().to_string()
}

pub fn is_list_item<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> bool {
    doc.is_element(node) && doc.matches_any(node, LIST_ITEM_MARKERS)
}

pub fn is_list_container<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> bool {
    doc.is_element(node) && doc.matches_any(node, LIST_CONTAINER_MARKERS)
}

/// Whether a list node renders with numbers.
pub fn is_ordered_list<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> bool {
    if doc.matches_any(node, NUMBERED_MARKERS) {
        return true;
    }
    if doc.tag(node) == Some("li") {
        return doc
            .ancestors(node)
            .into_iter()
            .find(|&a| is_list_container(doc, a))
            .is_some_and(|a| doc.tag(a) == Some("ol"));
    }
    false
}

pub fn is_blockquote<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> bool {
    doc.is_element(node) && doc.matches_any(node, BLOCKQUOTE_MARKERS)
}

pub fn is_divider<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> bool {
    doc.is_element(node) && doc.matches_any(node, DIVIDER_MARKERS)
}

/// Whether the node is or holds an image.
pub fn has_image<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> bool {
    doc.is_element(node)
        && (doc.matches_any(node, IMAGE_MARKERS)
            || doc.find_first(node, &[Marker::Tag("img")]).is_some())
}

fn detect_heading<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<Classification> {
    heading_level(doc, node).map(Classification::Heading)
}

fn detect_list<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<Classification> {
    if is_list_item(doc, node) || is_list_container(doc, node) {
        return Some(Classification::List {
            ordered: is_ordered_list(doc, node),
        });
    }
    None
}

fn detect_code_block<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<Classification> {
    let tag = doc.tag(node)?;
    if doc.matches_any(node, CODE_MARKERS) {
        return Some(Classification::CodeBlock);
    }
    if !CODE_CONTAINER_TAGS.contains(&tag)
        || doc.matches_any(node, PARAGRAPH_MARKERS)
        || doc.find_first(node, STRUCTURAL_MARKERS).is_some()
    {
        return None;
    }
    if doc.find_first(node, &[Marker::Tag("pre")]).is_some() {
        return Some(Classification::CodeBlock);
    }
    // A wrapper whose entire text is a single code element.
    let code = doc.find_first(node, &[Marker::Tag("code")])?;
    let code_text = doc.text(code);
    if !code_text.trim().is_empty() && code_text.trim() == doc.text(node).trim() {
        return Some(Classification::CodeBlock);
    }
    None
}

fn detect_table<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<Classification> {
    if !doc.is_element(node) || is_blockquote(doc, node) {
        return None;
    }
    if doc.matches_any(node, TABLE_MARKERS) || is_grid(doc, node) {
        return Some(Classification::Table);
    }
    None
}

/// A container whose first rows all have the same number (≥2) of cells.
fn is_grid<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> bool {
    let rows = doc.element_children(node);
    if rows.len() < 2 {
        return false;
    }
    let width = doc.element_children(rows[0]).len();
    if width < 2 {
        return false;
    }
    rows.iter()
        .take(GRID_SAMPLE_ROWS)
        .all(|&row| doc.element_children(row).len() == width)
}

fn detect_blockquote<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<Classification> {
    is_blockquote(doc, node).then_some(Classification::Blockquote)
}

fn detect_paragraph<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<Classification> {
    if doc.is_element(node) && doc.matches_any(node, PARAGRAPH_MARKERS) && doc.has_text(node) {
        return Some(Classification::Paragraph);
    }
    None
}

fn detect_image<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<Classification> {
    has_image(doc, node).then_some(Classification::Image)
}

fn detect_divider<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<Classification> {
    is_divider(doc, node).then_some(Classification::Divider)
}
