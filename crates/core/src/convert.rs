//! Per-type Markdown converters.
//!
//! Each converter turns one classified node into a Markdown fragment. An
//! empty fragment means "nothing to emit"; an error means the node could
//! not be converted and should be skipped by the caller.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::classify::{
    is_list_container, is_list_item, is_ordered_list, strip_heading_prefix, Classification,
    LIST_ITEM_MARKERS, TODO_MARKERS,
};
use crate::dom::text::{
    block_lines, block_lines_excluding, collapse_whitespace, inline_text, BLOCK_TAGS,
};
use crate::dom::{DocumentTree, Marker, NodeId, IGNORED_TAGS};
use crate::error::{Error, Result};
use crate::lists::{indentation, list_depth};

/// Class names carrying a code language, e.g. `language-rust`.
static LANGUAGE_CLASS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:language|lang|highlight-source|highlight)-([A-Za-z0-9_+#.-]+)$").unwrap()
});

/// Bullet glyphs some renderers emit as text in front of list items.
static BULLET_GLYPH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•◦▪‣·]\s*").unwrap());

const LANGUAGE_INDICATOR_MARKERS: &[Marker] = &[
    Marker::ClassPrefix("code-language"),
    Marker::Class("notion-code-language"),
];

const CHECKED_MARKERS: &[Marker] = &[
    Marker::Class("checkbox-on"),
    Marker::Class("checkboxOn"),
    Marker::Attr("aria-checked", "true"),
];

const TABLE_CELL_TAGS: &[&str] = &["td", "th"];

/// What to do with horizontal rules and divider blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DividerPolicy {
    /// Emit a `---` thematic break.
    #[default]
    Emit,
    /// Drop dividers entirely.
    Omit,
}

/// Settings shared by every converter during one extraction.
#[derive(Debug, Clone, Default)]
pub struct ConvertContext {
    pub divider: DividerPolicy,
    /// Page URL that relative image and link targets resolve against.
    pub base_url: Option<Url>,
}

impl ConvertContext {
    pub fn new(divider: DividerPolicy, base_url: Option<Url>) -> Self {
        Self { divider, base_url }
    }
}

/// Convert a classified node into a Markdown fragment.
pub fn convert_node<D: DocumentTree + ?Sized>(
    doc: &D,
    node: NodeId,
    classification: Classification,
    ctx: &ConvertContext,
) -> Result<String> {
    match classification {
        Classification::Heading(level) => Ok(convert_heading(doc, node, level)),
        Classification::List { .. } => Ok(convert_list(doc, node)),
        Classification::CodeBlock => convert_code_block(doc, node),
        Classification::Table => convert_table(doc, node),
        Classification::Blockquote => Ok(convert_blockquote(doc, node)),
        Classification::Paragraph => Ok(convert_paragraph(doc, node, ctx)),
        Classification::Image => Ok(convert_image(doc, node, ctx)),
        Classification::Divider => Ok(match ctx.divider {
            DividerPolicy::Emit => "---".to_string(),
            DividerPolicy::Omit => String::new(),
        }),
        Classification::Unknown => Ok(convert_fallback(doc, node)),
    }
}

pub fn convert_heading<D: DocumentTree + ?Sized>(doc: &D, node: NodeId, level: u8) -> String {
    let text = strip_heading_prefix(&inline_text(doc, node));
    if text.is_empty() {
        return String::new();
    }
    format!("{} {}", "#".repeat(level.into()), text)
}

/// Render a list node and every list item nested below it, one line each.
pub fn convert_list<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> String {
    let mut items = Vec::new();
    if is_list_item(doc, node) {
        items.push(node);
    }
    items.extend(doc.find_all(node, LIST_ITEM_MARKERS));

    items
        .into_iter()
        .filter_map(|item| list_line(doc, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn list_line<D: DocumentTree + ?Sized>(doc: &D, item: NodeId) -> Option<String> {
    let text = direct_item_text(doc, item);
    if text.is_empty() {
        return None;
    }

    let marker = if is_ordered_list(doc, item) { "1. " } else { "- " };
    let task = if doc.matches_any(item, TODO_MARKERS) {
        if is_checked(doc, item) {
            "[x] "
        } else {
            "[ ] "
        }
    } else {
        ""
    };

    Some(format!(
        "{}{}{}{}",
        indentation(list_depth(doc, item)),
        marker,
        task,
        text
    ))
}

/// Text that belongs to the item itself, excluding nested lists.
fn direct_item_text<D: DocumentTree + ?Sized>(doc: &D, item: NodeId) -> String {
    let skip = |n: NodeId| is_list_item(doc, n) || is_list_container(doc, n);
    let text = block_lines_excluding(doc, item, &skip).join(" ");
    BULLET_GLYPH_REGEX.replace(&text, "").trim().to_string()
}

fn is_checked<D: DocumentTree + ?Sized>(doc: &D, item: NodeId) -> bool {
    doc.descendants(item)
        .into_iter()
        .filter(|&n| doc.is_element(n))
        .filter(|&n| nearest_list_item(doc, n) == Some(item))
        .any(|n| {
            (doc.tag(n) == Some("input") && doc.attr(n, "checked").is_some())
                || doc.matches_any(n, CHECKED_MARKERS)
        })
}

fn nearest_list_item<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<NodeId> {
    doc.ancestors(node)
        .into_iter()
        .find(|&a| is_list_item(doc, a))
}

pub fn convert_code_block<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Result<String> {
    let language = code_language(doc, node).unwrap_or_default();

    let source = match doc.tag(node) {
        Some("pre") | Some("code") => Some(node),
        _ => doc
            .find_first(node, &[Marker::Tag("pre")])
            .or_else(|| doc.find_first(node, &[Marker::Tag("code")])),
    };

    let code = match source {
        Some(pre) => {
            let code_el = doc.find_first(pre, &[Marker::Tag("code")]).unwrap_or(pre);
            doc.text(code_el)
        }
        None => {
            let skip = |n: NodeId| doc.matches_any(n, LANGUAGE_INDICATOR_MARKERS);
            block_lines_excluding(doc, node, &skip).join("\n")
        }
    };

    let code = code.trim_start_matches('\n').trim_end();
    if code.trim().is_empty() {
        return Err(Error::conversion(
            doc.tag(node).unwrap_or("#text"),
            "code block has no code",
        ));
    }

    let fence = fence_for(code);
    Ok(format!("{fence}{language}\n{code}\n{fence}"))
}

/// Language from a `language-xxx` style class, a data attribute, or an
/// explicit language indicator node.
fn code_language<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Option<String> {
    let mut candidates = vec![node];
    candidates.extend(doc.descendants(node).into_iter().filter(|&n| doc.is_element(n)));

    for &candidate in &candidates {
        for class in doc.classes(candidate) {
            if let Some(caps) = LANGUAGE_CLASS_REGEX.captures(class) {
                return Some(caps[1].to_lowercase());
            }
        }
        if let Some(lang) = doc
            .attr(candidate, "data-language")
            .or_else(|| doc.attr(candidate, "data-lang"))
        {
            let lang = lang.trim();
            if !lang.is_empty() {
                return Some(lang.to_lowercase());
            }
        }
    }

    let indicator = doc.find_first(node, LANGUAGE_INDICATOR_MARKERS)?;
    let text = inline_text(doc, indicator);
    (!text.is_empty() && !text.contains(' ')).then(|| text.to_lowercase())
}

/// Backtick fence longer than any backtick run inside the code.
fn fence_for(code: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in code.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

pub fn convert_table<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Result<String> {
    let rows: Vec<Vec<String>> = table_rows(doc, node)
        .into_iter()
        .filter(|row| !row.is_empty())
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return Err(Error::conversion(
            doc.tag(node).unwrap_or("#text"),
            "table has no cells",
        ));
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (idx, row) in rows.iter().enumerate() {
        lines.push(table_line(row, width));
        if idx == 0 {
            lines.push(table_line(&vec!["---".to_string(); width], width));
        }
    }
    Ok(lines.join("\n"))
}

fn table_rows<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> Vec<Vec<String>> {
    let cell_text = |cell: NodeId| inline_text(doc, cell).replace('|', "\\|");

    let trs = doc.find_all(node, &[Marker::Tag("tr")]);
    if !trs.is_empty() {
        return trs
            .into_iter()
            .map(|tr| {
                doc.element_children(tr)
                    .into_iter()
                    .filter(|&c| doc.tag(c).is_some_and(|t| TABLE_CELL_TAGS.contains(&t)))
                    .map(cell_text)
                    .collect()
            })
            .collect();
    }

    doc.element_children(node)
        .into_iter()
        .map(|row| {
            doc.element_children(row)
                .into_iter()
                .map(cell_text)
                .collect()
        })
        .collect()
}

fn table_line(cells: &[String], width: usize) -> String {
    let mut padded: Vec<&str> = cells.iter().map(String::as_str).collect();
    padded.resize(width, " ");
    format!("| {} |", padded.join(" | "))
}

pub fn convert_blockquote<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> String {
    block_lines(doc, node)
        .iter()
        .map(|line| format!("> {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InlineMark {
    Bold,
    Italic,
    Code,
    Link(String),
}

impl InlineMark {
    fn wrap(&self, text: &str) -> String {
        match self {
            Self::Bold => format!("**{}**", text),
            Self::Italic => format!("*{}*", text),
            Self::Code if text.contains('`') => format!("`` {} ``", text),
            Self::Code => format!("`{}`", text),
            Self::Link(href) => format!("[{}]({})", text, href),
        }
    }
}

/// Paragraph text with inline bold/italic/code/link spans re-marked.
///
/// Marks are applied where each inline element sits in the tree, so a
/// word that occurs both plain and marked keeps its mark in place.
pub fn convert_paragraph<D: DocumentTree + ?Sized>(
    doc: &D,
    node: NodeId,
    ctx: &ConvertContext,
) -> String {
    let mut out = String::new();
    for &child in doc.children(node) {
        write_inline(doc, child, ctx, &mut out);
    }
    collapse_whitespace(&out)
}

/// Append the text of `node` to `out`, wrapping the outermost marked
/// elements in their Markdown syntax.
fn write_inline<D: DocumentTree + ?Sized>(
    doc: &D,
    node: NodeId,
    ctx: &ConvertContext,
    out: &mut String,
) {
    if let Some(text) = doc.text_content(node) {
        out.push_str(text);
        return;
    }
    let Some(tag) = doc.tag(node) else {
        return;
    };
    if IGNORED_TAGS.contains(&tag) {
        return;
    }
    if tag == "br" {
        out.push(' ');
        return;
    }

    if let Some(mark) = inline_mark(doc, node, ctx) {
        let text = inline_text(doc, node);
        if text.is_empty() {
            return;
        }
        // Whitespace just inside the element belongs outside the mark.
        let raw = doc.text(node);
        if raw.starts_with(char::is_whitespace) {
            out.push(' ');
        }
        out.push_str(&mark.wrap(&text));
        if raw.ends_with(char::is_whitespace) {
            out.push(' ');
        }
        return;
    }

    let is_block = BLOCK_TAGS.contains(&tag);
    if is_block {
        out.push(' ');
    }
    for &child in doc.children(node) {
        write_inline(doc, child, ctx, out);
    }
    if is_block {
        out.push(' ');
    }
}

fn inline_mark<D: DocumentTree + ?Sized>(
    doc: &D,
    node: NodeId,
    ctx: &ConvertContext,
) -> Option<InlineMark> {
    match doc.tag(node)? {
        "strong" | "b" => return Some(InlineMark::Bold),
        "em" | "i" => return Some(InlineMark::Italic),
        "code" | "kbd" => return Some(InlineMark::Code),
        "a" => {
            let href = doc.attr(node, "href")?.trim();
            if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
                return None;
            }
            return Some(InlineMark::Link(resolve_url(href, ctx.base_url.as_ref())));
        }
        _ => {}
    }

    if doc.has_class(node, "notion-inline-code") {
        return Some(InlineMark::Code);
    }

    let style: String = doc
        .attr(node, "style")?
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if style.contains("font-weight:600")
        || style.contains("font-weight:700")
        || style.contains("font-weight:bold")
    {
        return Some(InlineMark::Bold);
    }
    if style.contains("font-style:italic") {
        return Some(InlineMark::Italic);
    }
    None
}

/// `![alt](src)`, or an empty string when no image URL can be found.
pub fn convert_image<D: DocumentTree + ?Sized>(
    doc: &D,
    node: NodeId,
    ctx: &ConvertContext,
) -> String {
    let img = if doc.tag(node) == Some("img") {
        Some(node)
    } else {
        doc.find_first(node, &[Marker::Tag("img")])
    };
    let Some(img) = img else {
        return String::new();
    };

    let src = doc
        .attr(img, "src")
        .or_else(|| doc.attr(img, "data-src"))
        .map(str::trim)
        .unwrap_or_default();
    if src.is_empty() {
        return String::new();
    }

    let alt = [doc.attr(img, "alt"), doc.attr(img, "title")]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("Image");

    format!(
        "![{}]({})",
        alt.replace(']', "\\]"),
        resolve_url(src, ctx.base_url.as_ref())
    )
}

/// Resolve a possibly relative URL against the page URL.
fn resolve_url(target: &str, base: Option<&Url>) -> String {
    if Url::parse(target).is_ok() {
        return target.to_string();
    }
    base.and_then(|b| b.join(target).ok())
        .map(String::from)
        .unwrap_or_else(|| target.to_string())
}

/// Plain text of an unrecognized node, unless it would read as a heading.
pub fn convert_fallback<D: DocumentTree + ?Sized>(doc: &D, node: NodeId) -> String {
    let text = inline_text(doc, node);
    if text.is_empty() || text.starts_with('#') {
        return String::new();
    }
    text
}
