//! Page-to-slides extraction.
//!
//! Detects what kind of document a page is, picks the matching extractor
//! and returns its slides. This is the crate front ends depend on; the
//! model and pipeline types are re-exported from `deckify-core`.

pub mod detect;
pub mod dispatch;

pub use deckify_core::{
    ContentNormalizer, DeckFormatter, Document, DocumentTree, Error, ExtractOptions,
    ExtractResponse, Extractor, Logger, Presentation, Result, Slide, SlideStore, SourceType,
};
pub use deckify_markdown::{RawMarkdownExtractor, RenderedMarkdownExtractor};
pub use deckify_notion::NotionExtractor;
pub use detect::{detect, load_document};
pub use dispatch::{build_presentation, extract, extract_as, extract_with, get_extractor};
