//! Notion page extractor implementation.

use deckify_core::dom::text::inline_text;
use deckify_core::{
    extract_slides, ContentNormalizer, DividerPolicy, DocumentTree, ExtractOptions, Extractor,
    Logger, Marker, Result, Slide, SourceType,
};
use url::Url;

/// Where Notion serves relative image paths from.
pub const NOTION_BASE_URL: &str = "https://www.notion.so";

/// Suffix Notion appends to the document `<title>`.
const TITLE_SUFFIX: &str = " | Notion";

const PAGE_CONTENT_MARKERS: &[Marker] = &[Marker::Class("notion-page-content")];

const PAGE_TITLE_MARKERS: &[Marker] = &[Marker::Class("notion-page-block")];

/// Classes only a rendered Notion page carries.
pub const NOTION_DOCUMENT_MARKERS: &[Marker] = &[
    Marker::Class("notion-page-content"),
    Marker::Class("notion-app"),
    Marker::Class("notion-app-inner"),
    Marker::Class("notion-frame"),
    Marker::Class("notion-page-block"),
];

/// Whether the document looks like a rendered Notion page.
pub fn is_notion_document(doc: &dyn DocumentTree) -> bool {
    doc.find_first(doc.root(), NOTION_DOCUMENT_MARKERS).is_some()
}

/// Extractor for rendered Notion pages.
#[derive(Debug, Clone)]
pub struct NotionExtractor {
    options: ExtractOptions,
}

impl Default for NotionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl NotionExtractor {
    /// Create an extractor that keeps dividers and resolves relative
    /// images against notion.so when the page URL is unusable.
    pub fn new() -> Self {
        let mut options =
            ExtractOptions::new(SourceType::Notion).with_divider_policy(DividerPolicy::Emit);
        if let Ok(base) = Url::parse(NOTION_BASE_URL) {
            options = options.with_fallback_base_url(base);
        }
        Self { options }
    }

    /// Replace the pipeline options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }
}

impl Extractor for NotionExtractor {
    fn source_type(&self) -> SourceType {
        SourceType::Notion
    }

    fn extract(&self, doc: &dyn DocumentTree, url: &str, logger: &Logger) -> Result<Vec<Slide>> {
        let root = doc.root();
        let scope = match doc.find_first(root, PAGE_CONTENT_MARKERS) {
            Some(content) => content,
            None => {
                logger.debug("No notion-page-content container, scanning whole page", None);
                root
            }
        };
        extract_slides(doc, scope, url, &self.options, logger)
    }

    fn page_title(&self, doc: &dyn DocumentTree) -> Option<String> {
        let root = doc.root();
        let content = doc.find_first(root, PAGE_CONTENT_MARKERS);

        // Page-link blocks inside the content share the title block's class.
        let block_title = doc
            .find_all(root, PAGE_TITLE_MARKERS)
            .into_iter()
            .find(|&n| content.map_or(true, |c| n != c && !doc.contains(c, n)))
            .map(|n| inline_text(doc, n))
            .filter(|t| !t.is_empty());

        let title = block_title.or_else(|| {
            doc.find_first(root, &[Marker::Tag("title")])
                .map(|n| inline_text(doc, n))
        })?;

        let title = title.strip_suffix(TITLE_SUFFIX).unwrap_or(&title);
        let title = ContentNormalizer::new().normalize_title(title);
        (!title.is_empty()).then_some(title)
    }
}
