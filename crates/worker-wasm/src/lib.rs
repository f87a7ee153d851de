//! WASM wrapper for page-to-slides extraction.
//!
//! This crate exposes slide extraction to JavaScript, for the browser
//! extension content script and for workers that receive page HTML.

use deckify::{
    detect, extract, DeckFormatter, Document, ExtractResponse, Logger, RawMarkdownExtractor,
    Slide,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of formatting slides as a Markdown deck.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckResult {
    /// The Markdown deck.
    pub text: String,
    /// Number of slides including subslides.
    pub slide_count: usize,
}

/// Serialize to a plain JS object (metadata maps become objects, not `Map`s).
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| js_error(&format!("Serialization error: {}", e)))
}

fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

/// Extract slides from a page's HTML.
///
/// # Arguments
/// * `html` - The page's outer HTML
/// * `url` - The page URL (used for source detection and image URLs)
///
/// # Returns
/// `{slides: [...]}` or `{error: "..."}`.
#[wasm_bindgen]
pub fn extract_slides(html: &str, url: &str) -> Result<JsValue, JsValue> {
    to_js(&extract_slides_impl(html, url))
}

fn extract_slides_impl(html: &str, url: &str) -> ExtractResponse {
    let doc = Document::parse_html(html);
    extract(&doc, url, &Logger::new())
}

/// Extract slides from raw Markdown text.
#[wasm_bindgen]
pub fn extract_markdown(text: &str, url: &str) -> Result<JsValue, JsValue> {
    to_js(&extract_markdown_impl(text, url))
}

fn extract_markdown_impl(text: &str, url: &str) -> ExtractResponse {
    match RawMarkdownExtractor::new().extract_text(text, url, &Logger::new()) {
        Ok(slides) => ExtractResponse::Slides { slides },
        Err(e) => ExtractResponse::Error {
            error: e.to_string(),
        },
    }
}

/// Detect the source type of a page: `"notion"`, `"rendered-markdown"`,
/// `"raw-markdown"`, or `undefined` when unsupported.
#[wasm_bindgen]
pub fn detect_source(html: &str, url: &str) -> Option<String> {
    let doc = Document::parse_html(html);
    detect(&doc, url).map(|source| source.as_str().to_string())
}

/// Format slides (as returned by `extract_slides`) into a Markdown deck.
#[wasm_bindgen]
pub fn format_deck(slides: JsValue) -> Result<JsValue, JsValue> {
    let slides: Vec<Slide> = serde_wasm_bindgen::from_value(slides)
        .map_err(|e| js_error(&format!("Invalid slides array: {}", e)))?;

    to_js(&format_deck_impl(&slides))
}

fn format_deck_impl(slides: &[Slide]) -> DeckResult {
    DeckResult {
        text: DeckFormatter::new().format_with_newline(slides),
        slide_count: slides.iter().map(|s| 1 + s.subslides().len()).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckify::SourceType;

    #[test]
    fn test_extract_slides_from_notion_html() {
        let html = r#"<div class="notion-page-content">
            <div class="notion-header-block">Welcome</div>
            <div class="notion-text-block">Hello there</div>
        </div>"#;
        let response = extract_slides_impl(html, "https://www.notion.so/x");
        let slides = response.slides().unwrap();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title(), "Welcome");
        assert_eq!(slides[0].source_type(), SourceType::Notion);
    }

    #[test]
    fn test_unsupported_page() {
        let response = extract_slides_impl("<p>hi</p>", "https://example.com/");
        assert!(response.is_error());
    }

    #[test]
    fn test_extract_markdown() {
        let response = extract_markdown_impl("# One\n\nfirst\n\n# Two\n\nsecond\n", "talk.md");
        let slides = response.slides().unwrap();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[1].content(), "second");
    }

    #[test]
    fn test_detect_source() {
        assert_eq!(
            detect_source("<div class=\"markdown-body\"></div>", "https://example.com/"),
            Some("rendered-markdown".to_string())
        );
        assert_eq!(detect_source("<p>x</p>", "https://example.com/"), None);
    }

    #[test]
    fn test_format_deck() {
        let slides = vec![
            Slide::new("A", "a", SourceType::RawMarkdown)
                .with_subslides(vec![Slide::new("B", "b", SourceType::RawMarkdown)]),
        ];
        let result = format_deck_impl(&slides);
        assert_eq!(result.slide_count, 2);
        assert_eq!(result.text, "# A\n\na\n\n--\n\n## B\n\nb\n");
    }
}
