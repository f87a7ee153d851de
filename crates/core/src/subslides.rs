//! Splitting a slide region at level-2 headings.

use std::ops::Range;

use crate::classify::is_subslide_boundary;
use crate::dom::{DocumentTree, NodeId};

/// A subslide inside a slide region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubslideSpan {
    /// The level-2 heading that opens the subslide.
    pub heading: NodeId,
    /// Indices into the region of the nodes after the heading, up to the
    /// next level-2 heading or the region end.
    pub nodes: Range<usize>,
}

/// How a slide region divides into a body and subslides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideLayout {
    /// Indices of the nodes before the first level-2 heading.
    pub body: Range<usize>,
    pub subslides: Vec<SubslideSpan>,
}

/// Locate the level-2 headings among `region` (the top-level nodes of one
/// slide) and split it into a body plus one span per heading.
///
/// A region without level-2 headings is all body.
pub fn find_subslides<D: DocumentTree + ?Sized>(doc: &D, region: &[NodeId]) -> SlideLayout {
    let headings: Vec<usize> = region
        .iter()
        .enumerate()
        .filter(|(_, &node)| is_subslide_boundary(doc, node))
        .map(|(i, _)| i)
        .collect();

    let Some(&first) = headings.first() else {
        return SlideLayout {
            body: 0..region.len(),
            subslides: Vec::new(),
        };
    };

    let subslides = headings
        .iter()
        .enumerate()
        .map(|(k, &i)| {
            let end = headings.get(k + 1).copied().unwrap_or(region.len());
            SubslideSpan {
                heading: region[i],
                nodes: i + 1..end,
            }
        })
        .collect();

    SlideLayout {
        body: 0..first,
        subslides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn body_children(doc: &Document) -> Vec<NodeId> {
        let body = doc
            .find_first(doc.root(), &[crate::dom::Marker::Tag("body")])
            .unwrap();
        doc.element_children(body)
    }

    #[test]
    fn test_no_subslides() {
        let doc = Document::parse_html("<p>a</p><p>b</p>");
        let region = body_children(&doc);
        let layout = find_subslides(&doc, &region);
        assert_eq!(layout.body, 0..2);
        assert!(layout.subslides.is_empty());
    }

    #[test]
    fn test_body_then_subslides() {
        let doc = Document::parse_html(
            "<p>intro</p><h2>One</h2><p>x</p><p>y</p><h2>Two</h2><p>z</p>",
        );
        let region = body_children(&doc);
        let layout = find_subslides(&doc, &region);

        assert_eq!(layout.body, 0..1);
        assert_eq!(layout.subslides.len(), 2);
        assert_eq!(layout.subslides[0].heading, region[1]);
        assert_eq!(layout.subslides[0].nodes, 2..4);
        assert_eq!(layout.subslides[1].heading, region[4]);
        assert_eq!(layout.subslides[1].nodes, 5..6);
    }

    #[test]
    fn test_heading_2_prefix_opens_subslide() {
        let doc = Document::parse_html(
            r#"<div class="notion-text-block">Heading 2: Budget</div><p>numbers</p>"#,
        );
        let region = body_children(&doc);
        let layout = find_subslides(&doc, &region);
        assert_eq!(layout.body, 0..0);
        assert_eq!(layout.subslides[0].nodes, 1..2);
    }

    #[test]
    fn test_trailing_heading_has_empty_span() {
        let doc = Document::parse_html("<p>a</p><h2>Last</h2>");
        let region = body_children(&doc);
        let layout = find_subslides(&doc, &region);
        assert_eq!(layout.subslides[0].nodes, 2..2);
    }
}
