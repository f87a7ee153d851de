//! The shared DOM extraction pipeline and the [`Extractor`] seam.
//!
//! Every HTML-backed source runs the same steps: find the slide
//! boundaries, gather each slide's nodes, split them at level-2 headings,
//! assemble Markdown, normalize. Extractors differ only in which subtree
//! they scan and in a few conversion options.

use serde_json::json;
use url::Url;

use crate::assemble::{region_nodes, Assembler};
use crate::classify::is_slide_boundary;
use crate::convert::{ConvertContext, DividerPolicy};
use crate::dom::text::inline_text;
use crate::dom::{DocumentTree, NodeId, IGNORED_TAGS};
use crate::error::Result;
use crate::logging::Logger;
use crate::normalize::ContentNormalizer;
use crate::subslides::find_subslides;
use crate::types::{Slide, SourceType};

/// A source-specific slide extractor.
pub trait Extractor {
    /// The source type stamped on every slide this extractor returns.
    fn source_type(&self) -> SourceType;

    /// Extract slides from a parsed document.
    ///
    /// A document without level-1 headings yields an empty list, not an
    /// error.
    fn extract(&self, doc: &dyn DocumentTree, url: &str, logger: &Logger) -> Result<Vec<Slide>>;

    /// The page title, when the source exposes one.
    fn page_title(&self, _doc: &dyn DocumentTree) -> Option<String> {
        None
    }
}

/// Options for the DOM extraction pipeline.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    source_type: SourceType,
    divider: DividerPolicy,
    min_duplicate_words: usize,
    drop_empty_slides: bool,
    fallback_base_url: Option<Url>,
}

impl ExtractOptions {
    /// Options for `source_type` with default settings: dividers emitted,
    /// two-word duplicate threshold, empty slides dropped.
    pub fn new(source_type: SourceType) -> Self {
        Self {
            source_type,
            divider: DividerPolicy::Emit,
            min_duplicate_words: 2,
            drop_empty_slides: true,
            fallback_base_url: None,
        }
    }

    pub fn with_divider_policy(mut self, divider: DividerPolicy) -> Self {
        self.divider = divider;
        self
    }

    /// Minimum word count for a fragment to be dropped as a repeat.
    /// 0 keeps every fragment.
    pub fn with_min_duplicate_words(mut self, words: usize) -> Self {
        self.min_duplicate_words = words;
        self
    }

    /// Keep slides whose body and subslides are all empty.
    pub fn with_drop_empty_slides(mut self, drop: bool) -> Self {
        self.drop_empty_slides = drop;
        self
    }

    /// Base for relative image and link targets when the page URL does
    /// not parse.
    pub fn with_fallback_base_url(mut self, base: Url) -> Self {
        self.fallback_base_url = Some(base);
        self
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn divider_policy(&self) -> DividerPolicy {
        self.divider
    }
}

/// Outermost level-1 headings below `scope`, in document order.
///
/// The walk does not descend into a boundary, so a wrapper and the
/// heading inside it count once.
pub fn find_slide_boundaries<D: DocumentTree + ?Sized>(doc: &D, scope: NodeId) -> Vec<NodeId> {
    let mut boundaries = Vec::new();
    let mut stack: Vec<NodeId> = doc.children(scope).iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        let Some(tag) = doc.tag(node) else {
            continue;
        };
        if IGNORED_TAGS.contains(&tag) {
            continue;
        }
        if is_slide_boundary(doc, node) {
            boundaries.push(node);
            continue;
        }
        stack.extend(doc.children(node).iter().rev().copied());
    }
    boundaries
}

/// Run the pipeline over the subtree at `scope`.
pub fn extract_slides<D: DocumentTree + ?Sized>(
    doc: &D,
    scope: NodeId,
    url: &str,
    options: &ExtractOptions,
    logger: &Logger,
) -> Result<Vec<Slide>> {
    let boundaries = find_slide_boundaries(doc, scope);
    if boundaries.is_empty() {
        logger.info(
            "No slide boundaries found",
            Some(json!({ "url": url, "sourceType": options.source_type.as_str() })),
        );
        return Ok(Vec::new());
    }
    logger.debug(
        "Found slide boundaries",
        Some(json!({ "count": boundaries.len() })),
    );

    let base_url = Url::parse(url)
        .ok()
        .or_else(|| options.fallback_base_url.clone());
    let context = ConvertContext::new(options.divider, base_url);
    let assembler =
        Assembler::new(&context, logger).with_min_duplicate_words(options.min_duplicate_words);
    let normalizer = ContentNormalizer::new();

    let mut slides = Vec::with_capacity(boundaries.len());
    for (i, &start) in boundaries.iter().enumerate() {
        let title = normalizer.normalize_title(&inline_text(doc, start));
        if title.is_empty() {
            logger.warn(
                "Skipping slide heading without text",
                Some(json!({ "node": start.index() })),
            );
            continue;
        }

        let region = region_nodes(doc, start, boundaries.get(i + 1).copied());
        let layout = find_subslides(doc, &region);
        let content = normalizer.normalize(&assembler.assemble(doc, &region[layout.body]));

        let mut subslides = Vec::with_capacity(layout.subslides.len());
        for span in layout.subslides {
            let sub_title = normalizer.normalize_title(&inline_text(doc, span.heading));
            let sub_content =
                normalizer.normalize(&assembler.assemble(doc, &region[span.nodes]));
            if sub_title.is_empty() || (options.drop_empty_slides && sub_content.is_empty()) {
                logger.debug(
                    "Dropping empty subslide",
                    Some(json!({ "slide": title, "subslide": sub_title })),
                );
                continue;
            }
            let index = subslides.len();
            subslides.push(
                Slide::new(sub_title, sub_content, options.source_type)
                    .with_metadata("subslideIndex", index),
            );
        }

        if options.drop_empty_slides && content.is_empty() && subslides.is_empty() {
            logger.debug("Dropping empty slide", Some(json!({ "slide": title })));
            continue;
        }

        let index = slides.len();
        slides.push(
            Slide::new(title, content, options.source_type)
                .with_metadata("slideIndex", index)
                .with_metadata("sourceUrl", url)
                .with_subslides(subslides),
        );
    }

    logger.info(
        "Extracted slides",
        Some(json!({ "url": url, "count": slides.len() })),
    );
    Ok(slides)
}
