//! Turning a run of sibling nodes into one Markdown body.

use serde_json::json;

use crate::classify::{classify, has_image, is_divider, is_slide_boundary};
use crate::convert::{convert_node, ConvertContext};
use crate::dom::{DocumentTree, NodeId};
use crate::logging::Logger;

/// Separator between converted fragments.
pub const FRAGMENT_SEPARATOR: &str = "\n\n";

/// The nodes of one slide: the siblings following `start`, up to (not
/// including) the next slide boundary `end`.
///
/// The walk also stops at a level-1 heading and when the siblings run
/// out. A sibling that contains `end` is entered, and its children up to
/// `end` belong to the slide, so a boundary nested deeper than `start`
/// still closes it.
pub fn region_nodes<D: DocumentTree + ?Sized>(
    doc: &D,
    start: NodeId,
    end: Option<NodeId>,
) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    collect_region(doc, doc.next_sibling(start), end, &mut nodes);
    nodes
}

fn collect_region<D: DocumentTree + ?Sized>(
    doc: &D,
    first: Option<NodeId>,
    end: Option<NodeId>,
    nodes: &mut Vec<NodeId>,
) {
    let mut current = first;
    while let Some(node) = current {
        if end == Some(node) || (doc.is_element(node) && is_slide_boundary(doc, node)) {
            return;
        }
        if end.is_some_and(|e| doc.contains(node, e)) {
            collect_region(doc, doc.children(node).first().copied(), end, nodes);
            return;
        }
        nodes.push(node);
        current = doc.next_sibling(node);
    }
}

/// Whether `fragment` repeats a fragment already emitted, either whole or
/// as one complete line of it.
///
/// Only fragments of at least `min_words` words count, so short repeats
/// like "Yes" or "1" survive. A `min_words` of 0 disables the check.
pub fn is_duplicate(emitted: &[String], fragment: &str, min_words: usize) -> bool {
    if min_words == 0 || fragment.split_whitespace().count() < min_words {
        return false;
    }
    let fragment = fragment.trim();
    emitted
        .iter()
        .any(|prev| prev == fragment || prev.lines().any(|line| line.trim() == fragment))
}

/// Content assembler.
///
/// Classifies and converts each node in order, drops empty and repeated
/// fragments, and joins the rest with a blank line. A node that fails to
/// convert is logged and skipped; it never fails the slide.
#[derive(Debug, Clone)]
pub struct Assembler<'a> {
    context: &'a ConvertContext,
    min_duplicate_words: usize,
    logger: &'a Logger,
}

impl<'a> Assembler<'a> {
    pub fn new(context: &'a ConvertContext, logger: &'a Logger) -> Self {
        Self {
            context,
            min_duplicate_words: 2,
            logger,
        }
    }

    pub fn with_min_duplicate_words(mut self, words: usize) -> Self {
        self.min_duplicate_words = words;
        self
    }

    pub fn assemble<D: DocumentTree + ?Sized>(&self, doc: &D, nodes: &[NodeId]) -> String {
        let mut emitted: Vec<String> = Vec::new();

        for &node in nodes {
            if !doc.has_text(node) && !has_image(doc, node) && !is_divider(doc, node) {
                continue;
            }

            let classification = classify(doc, node);
            let fragment = match convert_node(doc, node, classification, self.context) {
                Ok(fragment) => fragment,
                Err(e) => {
                    self.logger.warn(
                        "Skipping node that failed to convert",
                        Some(json!({
                            "node": node.index(),
                            "classification": format!("{classification:?}"),
                            "error": e.to_string(),
                        })),
                    );
                    continue;
                }
            };

            let fragment = fragment.trim_end().trim_start_matches('\n');
            if fragment.trim().is_empty() {
                continue;
            }
            if is_duplicate(&emitted, fragment, self.min_duplicate_words) {
                self.logger.debug(
                    "Dropping repeated fragment",
                    Some(json!({ "node": node.index() })),
                );
                continue;
            }

            emitted.push(fragment.to_string());
        }

        emitted.join(FRAGMENT_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::DividerPolicy;
    use crate::dom::{Document, Marker};

    fn body_children(doc: &Document) -> Vec<NodeId> {
        let body = doc.find_first(doc.root(), &[Marker::Tag("body")]).unwrap();
        doc.element_children(body)
    }

    fn assemble_body(html: &str, divider: DividerPolicy) -> String {
        let doc = Document::parse_html(html);
        let nodes = body_children(&doc);
        let ctx = ConvertContext::new(divider, None);
        let logger = Logger::disabled();
        Assembler::new(&ctx, &logger).assemble(&doc, &nodes)
    }

    #[test]
    fn test_fragments_joined_with_blank_line() {
        let content = assemble_body(
            "<p>First paragraph</p><ul><li>a</li><li>b</li></ul><h3>Detail</h3>",
            DividerPolicy::Emit,
        );
        assert_eq!(content, "First paragraph\n\n- a\n- b\n\n### Detail");
    }

    #[test]
    fn test_empty_nodes_skipped_but_images_kept() {
        let content = assemble_body(
            r#"<p>  </p><div><img src="https://x.io/a.png" alt="A"></div><p>After</p>"#,
            DividerPolicy::Emit,
        );
        assert_eq!(content, "![A](https://x.io/a.png)\n\nAfter");
    }

    #[test]
    fn test_divider_policy() {
        let html = "<p>a</p><hr><p>b</p>";
        assert_eq!(assemble_body(html, DividerPolicy::Emit), "a\n\n---\n\nb");
        assert_eq!(assemble_body(html, DividerPolicy::Omit), "a\n\nb");
    }

    #[test]
    fn test_repeated_multi_word_fragment_dropped() {
        let content = assemble_body(
            "<p>Same words here</p><p>Same words here</p><p>Yes</p><p>Yes</p>",
            DividerPolicy::Emit,
        );
        assert_eq!(content, "Same words here\n\nYes\n\nYes");
    }

    #[test]
    fn test_duplicate_check_can_be_disabled() {
        let doc = Document::parse_html("<p>Same words</p><p>Same words</p>");
        let nodes = body_children(&doc);
        let ctx = ConvertContext::new(DividerPolicy::Emit, None);
        let logger = Logger::disabled();
        let content = Assembler::new(&ctx, &logger)
            .with_min_duplicate_words(0)
            .assemble(&doc, &nodes);
        assert_eq!(content, "Same words\n\nSame words");
    }

    #[test]
    fn test_failed_conversion_is_skipped() {
        let content = assemble_body("<p>kept</p><pre> </pre><table><tr></tr></table>", DividerPolicy::Emit);
        assert_eq!(content, "kept");
    }

    #[test]
    fn test_short_paragraph_inside_longer_one_kept() {
        let content = assemble_body(
            "<p>Thank you all for coming today</p><p>Thank you</p>",
            DividerPolicy::Emit,
        );
        assert_eq!(content, "Thank you all for coming today\n\nThank you");

        let content = assemble_body("<h3>Next steps</h3><p>Next steps</p>", DividerPolicy::Emit);
        assert_eq!(content, "### Next steps\n\nNext steps");
    }

    #[test]
    fn test_is_duplicate() {
        let emitted = vec!["intro two words here".to_string(), "> quoted line\n> two words".to_string()];
        assert!(is_duplicate(&emitted, "intro two words here", 2));
        assert!(is_duplicate(&emitted, "> two words", 2));
        assert!(!is_duplicate(&emitted, "two words", 2));
        assert!(!is_duplicate(&emitted, "intro", 2));
        assert!(!is_duplicate(&emitted, "intro two words here", 0));
        assert!(!is_duplicate(&[], "two words", 2));
    }

    #[test]
    fn test_region_stops_at_next_boundary() {
        let doc = Document::parse_html("<h1>A</h1><p>one</p><p>two</p><h1>B</h1><p>three</p>");
        let children = body_children(&doc);
        let region = region_nodes(&doc, children[0], Some(children[3]));
        assert_eq!(region, vec![children[1], children[2]]);
        let last = region_nodes(&doc, children[3], None);
        assert_eq!(last, vec![children[4]]);
    }

    #[test]
    fn test_region_stops_at_container_holding_boundary() {
        let doc = Document::parse_html(
            "<h1>A</h1><p>one</p><section><h1>B</h1><p>two</p></section>",
        );
        let children = body_children(&doc);
        let b = doc.find_all(doc.root(), &[Marker::Tag("h1")])[1];
        let region = region_nodes(&doc, children[0], Some(b));
        assert_eq!(region, vec![children[1]]);
    }

    #[test]
    fn test_region_enters_container_up_to_boundary() {
        let doc = Document::parse_html("<h1>A</h1><div><p>x</p><h1>B</h1><p>y</p></div>");
        let children = body_children(&doc);
        let b = doc.find_all(doc.root(), &[Marker::Tag("h1")])[1];
        let region = region_nodes(&doc, children[0], Some(b));
        assert_eq!(region.len(), 1);
        assert_eq!(doc.text(region[0]), "x");

        let ctx = ConvertContext::new(DividerPolicy::Emit, None);
        let logger = Logger::disabled();
        assert_eq!(Assembler::new(&ctx, &logger).assemble(&doc, &region), "x");
    }
}
