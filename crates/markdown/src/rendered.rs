//! Extractor for Markdown rendered to HTML.

use deckify_core::dom::text::inline_text;
use deckify_core::{
    extract_slides, ContentNormalizer, DividerPolicy, DocumentTree, ExtractOptions, Extractor,
    Logger, Marker, Result, Slide, SourceType,
};

/// Containers a rendered Markdown document lives in, most specific first.
const CONTENT_CANDIDATES: &[Marker] = &[
    Marker::Class("markdown-body"),
    Marker::Id("readme"),
    Marker::Tag("article"),
    Marker::Tag("main"),
];

/// Classes Markdown viewers put on the rendered document.
pub const RENDERED_MARKDOWN_MARKERS: &[Marker] = &[
    Marker::Class("markdown-body"),
    Marker::Class("markdown-preview"),
    Marker::Class("markdown-heading"),
];

/// Whether the document holds Markdown rendered by a known viewer.
pub fn is_rendered_markdown(doc: &dyn DocumentTree) -> bool {
    doc.find_first(doc.root(), RENDERED_MARKDOWN_MARKERS).is_some()
}

/// Extractor for rendered Markdown pages.
///
/// Horizontal rules are dropped: in rendered Markdown they mostly
/// separate what are already separate slides.
#[derive(Debug, Clone)]
pub struct RenderedMarkdownExtractor {
    options: ExtractOptions,
}

impl Default for RenderedMarkdownExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderedMarkdownExtractor {
    pub fn new() -> Self {
        Self {
            options: ExtractOptions::new(SourceType::RenderedMarkdown)
                .with_divider_policy(DividerPolicy::Omit),
        }
    }

    /// Replace the pipeline options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }
}

impl Extractor for RenderedMarkdownExtractor {
    fn source_type(&self) -> SourceType {
        SourceType::RenderedMarkdown
    }

    fn extract(&self, doc: &dyn DocumentTree, url: &str, logger: &Logger) -> Result<Vec<Slide>> {
        let root = doc.root();
        let scope = CONTENT_CANDIDATES
            .iter()
            .find_map(|marker| doc.find_first(root, std::slice::from_ref(marker)))
            .unwrap_or(root);
        logger.debug(
            "Scanning rendered Markdown",
            Some(serde_json::json!({ "scope": doc.tag(scope).unwrap_or("#document") })),
        );
        extract_slides(doc, scope, url, &self.options, logger)
    }

    fn page_title(&self, doc: &dyn DocumentTree) -> Option<String> {
        let node = doc.find_first(doc.root(), &[Marker::Tag("title")])?;
        let title = ContentNormalizer::new().normalize_title(&inline_text(doc, node));
        (!title.is_empty()).then_some(title)
    }
}
