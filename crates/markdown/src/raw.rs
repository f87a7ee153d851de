//! Extractor for raw Markdown text.
//!
//! Headings are located with pulldown-cmark so fenced code, setext
//! underlines and escaped `#` are handled the way a Markdown renderer
//! would. Slide bodies are the source text between headings, so the
//! author's own Markdown (including thematic breaks) reaches the slide
//! unchanged apart from normalization.

use std::ops::Range;

use deckify_core::{
    ContentNormalizer, DocumentTree, Extractor, Logger, Marker, Result, Slide, SourceType,
};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};
use serde_json::json;

/// A level-1 or level-2 heading in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineHeading {
    pub level: u8,
    pub title: String,
    /// Byte range of the heading itself.
    pub span: Range<usize>,
}

/// Level-1 and level-2 headings of `source`, in order.
pub fn outline(source: &str) -> Vec<OutlineHeading> {
    let mut headings = Vec::new();
    let mut current: Option<OutlineHeading> = None;

    for (event, range) in Parser::new_ext(source, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading(level, _, _)) => {
                let level = match level {
                    HeadingLevel::H1 => 1,
                    HeadingLevel::H2 => 2,
                    _ => continue,
                };
                current = Some(OutlineHeading {
                    level,
                    title: String::new(),
                    span: range,
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = current.as_mut() {
                    heading.title.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(heading) = current.as_mut() {
                    heading.title.push(' ');
                }
            }
            Event::End(Tag::Heading(..)) => {
                if let Some(heading) = current.take() {
                    headings.push(heading);
                }
            }
            _ => {}
        }
    }

    headings
}

/// Extractor for raw Markdown served as text.
#[derive(Debug, Clone)]
pub struct RawMarkdownExtractor {
    normalizer: ContentNormalizer,
    drop_empty_slides: bool,
}

impl Default for RawMarkdownExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RawMarkdownExtractor {
    pub fn new() -> Self {
        Self {
            normalizer: ContentNormalizer::new(),
            drop_empty_slides: true,
        }
    }

    /// Keep slides whose body and subslides are all empty.
    pub fn with_drop_empty_slides(mut self, drop: bool) -> Self {
        self.drop_empty_slides = drop;
        self
    }

    /// The Markdown source held by a document: the first `pre` (how
    /// browsers display text files), else all of the document's text.
    pub fn source_text(doc: &dyn DocumentTree) -> String {
        let root = doc.root();
        match doc.find_first(root, &[Marker::Tag("pre")]) {
            Some(pre) => doc.text(pre),
            None => doc.text(root),
        }
    }

    /// Extract slides straight from Markdown source.
    pub fn extract_text(&self, source: &str, url: &str, logger: &Logger) -> Result<Vec<Slide>> {
        let headings = outline(source);
        let slide_starts: Vec<usize> = headings
            .iter()
            .enumerate()
            .filter(|(_, h)| h.level == 1)
            .map(|(i, _)| i)
            .collect();

        if slide_starts.is_empty() {
            logger.info(
                "No slide boundaries found",
                Some(json!({ "url": url, "sourceType": SourceType::RawMarkdown.as_str() })),
            );
            return Ok(Vec::new());
        }

        let mut slides = Vec::with_capacity(slide_starts.len());
        for (k, &h1) in slide_starts.iter().enumerate() {
            let next_h1 = slide_starts.get(k + 1).copied().unwrap_or(headings.len());
            let region_end = headings
                .get(next_h1)
                .map_or(source.len(), |h| h.span.start);
            let heading = &headings[h1];
            let subs = &headings[h1 + 1..next_h1];

            let title = self.normalizer.normalize_title(&heading.title);
            if title.is_empty() {
                logger.warn(
                    "Skipping slide heading without text",
                    Some(json!({ "offset": heading.span.start })),
                );
                continue;
            }

            let body_end = subs.first().map_or(region_end, |h| h.span.start);
            let content = self.normalizer.normalize(&source[heading.span.end..body_end]);

            let mut subslides = Vec::with_capacity(subs.len());
            for (j, sub) in subs.iter().enumerate() {
                let end = subs.get(j + 1).map_or(region_end, |h| h.span.start);
                let sub_title = self.normalizer.normalize_title(&sub.title);
                let sub_content = self.normalizer.normalize(&source[sub.span.end..end]);
                if sub_title.is_empty() || (self.drop_empty_slides && sub_content.is_empty()) {
                    continue;
                }
                let index = subslides.len();
                subslides.push(
                    Slide::new(sub_title, sub_content, SourceType::RawMarkdown)
                        .with_metadata("subslideIndex", index),
                );
            }

            if self.drop_empty_slides && content.is_empty() && subslides.is_empty() {
                logger.debug("Dropping empty slide", Some(json!({ "slide": title })));
                continue;
            }

            let index = slides.len();
            slides.push(
                Slide::new(title, content, SourceType::RawMarkdown)
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
}

impl Extractor for RawMarkdownExtractor {
    fn source_type(&self) -> SourceType {
        SourceType::RawMarkdown
    }

    fn extract(&self, doc: &dyn DocumentTree, url: &str, logger: &Logger) -> Result<Vec<Slide>> {
        self.extract_text(&Self::source_text(doc), url, logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckify_core::Document;

    fn extract(source: &str) -> Vec<Slide> {
        RawMarkdownExtractor::new()
            .extract_text(source, "https://raw.githubusercontent.com/o/r/main/talk.md", &Logger::disabled())
            .unwrap()
    }

    #[test]
    fn test_outline() {
        let headings = outline("# One\n\ntext\n\n## Two\n\n### Three\n");
        let titles: Vec<(u8, &str)> = headings.iter().map(|h| (h.level, h.title.as_str())).collect();
        assert_eq!(titles, vec![(1, "One"), (2, "Two")]);
    }

    #[test]
    fn test_fenced_hash_is_not_a_heading() {
        let headings = outline("# Real\n\n```sh\n# comment\n```\n");
        assert_eq!(headings.len(), 1);
    }

    #[test]
    fn test_slides_and_subslides() {
        let slides = extract("Preamble\n\n# Title\n\nIntro\n\n## Sub\n\nDetail\n\n# Second\n\nMore\n");
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].title(), "Title");
        assert_eq!(slides[0].content(), "Intro");
        assert_eq!(slides[0].subslides()[0].title(), "Sub");
        assert_eq!(slides[0].subslides()[0].content(), "Detail");
        assert!(!slides[0].content().contains("Detail"));
        assert_eq!(slides[1].content(), "More");
        assert_eq!(slides[1].source_type(), SourceType::RawMarkdown);
    }

    #[test]
    fn test_body_kept_verbatim() {
        let slides = extract("# Code\n\n```python\n# not a heading\n```\n\nText\n\n---\n\n*  item\n");
        assert_eq!(
            slides[0].content(),
            "```python\n# not a heading\n```\n\nText\n\n---\n\n- item"
        );
    }

    #[test]
    fn test_indented_code_body_keeps_indentation() {
        let slides = extract("# Code\n\n    let x = 1;\n\nText\n");
        assert_eq!(slides[0].content(), "    let x = 1;\n\nText");
    }

    #[test]
    fn test_setext_headings() {
        let slides = extract("Title\n=====\n\nBody\n\nSub\n---\n\nx\n");
        assert_eq!(slides[0].title(), "Title");
        assert_eq!(slides[0].content(), "Body");
        assert_eq!(slides[0].subslides()[0].title(), "Sub");
        assert_eq!(slides[0].subslides()[0].content(), "x");
    }

    #[test]
    fn test_heading_prefix_removed_from_titles() {
        let slides = extract("# Plan\n\n## Heading 2: Budget\n\nnumbers\n");
        assert_eq!(slides[0].subslides()[0].title(), "Budget");
    }

    #[test]
    fn test_no_h1() {
        assert!(extract("## Only\n\ntext\n").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_extract_from_plain_text_document() {
        let doc = Document::from_plain_text("# A\n\nalpha\n");
        let slides = RawMarkdownExtractor::new()
            .extract(&doc, "file.md", &Logger::disabled())
            .unwrap();
        assert_eq!(slides[0].content(), "alpha");
        assert_eq!(slides[0].metadata()["sourceUrl"], json!("file.md"));
    }
}
