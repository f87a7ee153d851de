//! Extractor dispatch and the guarded `extract()` entry point.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use deckify_core::{
    DocumentTree, Error, ExtractResponse, Extractor, Logger, Presentation, Result, Slide,
    SourceType,
};
use deckify_markdown::{is_rendered_markdown, RawMarkdownExtractor, RenderedMarkdownExtractor};
use deckify_notion::NotionExtractor;
use serde_json::json;

use crate::detect::detect;

/// The extractor for `source`.
///
/// The generic [`SourceType::Markdown`] resolves to the rendered or raw
/// extractor depending on what the document holds. Types that have no
/// extractor are rejected with [`Error::UnsupportedSource`].
pub fn get_extractor(source: SourceType, doc: &dyn DocumentTree) -> Result<Box<dyn Extractor>> {
    match source {
        SourceType::Notion => Ok(Box::new(NotionExtractor::new())),
        SourceType::RenderedMarkdown => Ok(Box::new(RenderedMarkdownExtractor::new())),
        SourceType::RawMarkdown => Ok(Box::new(RawMarkdownExtractor::new())),
        SourceType::Markdown if is_rendered_markdown(doc) => {
            Ok(Box::new(RenderedMarkdownExtractor::new()))
        }
        SourceType::Markdown => Ok(Box::new(RawMarkdownExtractor::new())),
        SourceType::Unknown | SourceType::Error => Err(Error::UnsupportedSource(source)),
    }
}

/// Run the extractor for an already known source type.
pub fn extract_as(
    doc: &dyn DocumentTree,
    url: &str,
    source: SourceType,
    logger: &Logger,
) -> Result<Vec<Slide>> {
    let extractor = get_extractor(source, doc)?;
    logger.info(
        "Extracting slides",
        Some(json!({ "url": url, "sourceType": extractor.source_type().as_str() })),
    );
    extractor.extract(doc, url, logger)
}

/// Detect the source type of `doc` and extract its slides.
///
/// Never fails: any error, including a panic inside an extractor, is
/// logged and returned as [`ExtractResponse::Error`]. A supported page
/// without level-1 headings yields an empty slide list.
pub fn extract(doc: &dyn DocumentTree, url: &str, logger: &Logger) -> ExtractResponse {
    guarded(url, logger, || {
        let source = detect(doc, url).ok_or(Error::UnsupportedSource(SourceType::Unknown))?;
        extract_as(doc, url, source, logger)
    })
}

/// Like [`extract`], with the source type chosen by the caller.
pub fn extract_with(
    doc: &dyn DocumentTree,
    url: &str,
    source: SourceType,
    logger: &Logger,
) -> ExtractResponse {
    guarded(url, logger, || extract_as(doc, url, source, logger))
}

/// Assemble a presentation from extracted slides, titled after the page
/// when the extractor can tell.
pub fn build_presentation(
    doc: &dyn DocumentTree,
    source: SourceType,
    slides: Vec<Slide>,
) -> Presentation {
    let title = get_extractor(source, doc)
        .ok()
        .and_then(|extractor| extractor.page_title(doc));
    Presentation::from_slides(title, slides, source)
}

fn guarded<F>(url: &str, logger: &Logger, run: F) -> ExtractResponse
where
    F: FnOnce() -> Result<Vec<Slide>>,
{
    match panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(Ok(slides)) => ExtractResponse::Slides { slides },
        Ok(Err(e)) => {
            logger.error(
                "Extraction failed",
                Some(json!({ "url": url, "error": e.to_string() })),
            );
            ExtractResponse::Error {
                error: e.to_string(),
            }
        }
        Err(payload) => {
            let error = Error::Extraction(panic_message(payload.as_ref()));
            logger.error(
                "Extractor panicked",
                Some(json!({ "url": url, "error": error.to_string() })),
            );
            ExtractResponse::Error {
                error: error.to_string(),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckify_core::Document;

    struct PanickingExtractor;

    impl Extractor for PanickingExtractor {
        fn source_type(&self) -> SourceType {
            SourceType::Unknown
        }

        fn extract(&self, _doc: &dyn DocumentTree, _url: &str, _logger: &Logger) -> Result<Vec<Slide>> {
            panic!("boom")
        }
    }

    #[test]
    fn test_get_extractor_mapping() {
        let rendered = Document::parse_html(r#"<div class="markdown-body"></div>"#);
        let raw = Document::from_plain_text("# A");

        let cases = [
            (SourceType::Notion, &raw, SourceType::Notion),
            (SourceType::RenderedMarkdown, &raw, SourceType::RenderedMarkdown),
            (SourceType::RawMarkdown, &rendered, SourceType::RawMarkdown),
            (SourceType::Markdown, &rendered, SourceType::RenderedMarkdown),
            (SourceType::Markdown, &raw, SourceType::RawMarkdown),
        ];
        for (source, doc, expected) in cases {
            let extractor = get_extractor(source, doc).unwrap();
            assert_eq!(extractor.source_type(), expected, "{source}");
        }
    }

    #[test]
    fn test_get_extractor_unmapped() {
        let doc = Document::new();
        assert!(matches!(
            get_extractor(SourceType::Unknown, &doc),
            Err(Error::UnsupportedSource(SourceType::Unknown))
        ));
        assert!(get_extractor(SourceType::Error, &doc).is_err());
    }

    #[test]
    fn test_unsupported_page_is_error_response() {
        let doc = Document::parse_html("<p>plain page</p>");
        let response = extract(&doc, "https://example.com/", &Logger::disabled());
        assert_eq!(
            response,
            ExtractResponse::Error {
                error: "Unsupported source: unknown".to_string()
            }
        );
    }

    #[test]
    fn test_panic_becomes_error_response() {
        let doc = Document::new();
        let response = guarded("x", &Logger::disabled(), || {
            PanickingExtractor.extract(&doc, "x", &Logger::disabled())
        });
        assert_eq!(
            response,
            ExtractResponse::Error {
                error: "Extraction error: boom".to_string()
            }
        );
    }

    #[test]
    fn test_build_presentation_title() {
        let doc = Document::parse_html(
            "<html><head><title>Guide</title></head><body><article class=\"markdown-body\"><h1>A</h1><p>x</p></article></body></html>",
        );
        let slides = extract_as(&doc, "", SourceType::RenderedMarkdown, &Logger::disabled()).unwrap();
        let presentation = build_presentation(&doc, SourceType::RenderedMarkdown, slides);
        assert_eq!(presentation.title, "Guide");
        assert_eq!(presentation.slide_count(), 1);

        let raw = Document::from_plain_text("# First\n\nbody");
        let slides = extract_as(&raw, "", SourceType::RawMarkdown, &Logger::disabled()).unwrap();
        let presentation = build_presentation(&raw, SourceType::RawMarkdown, slides);
        assert_eq!(presentation.title, "First");
    }
}
