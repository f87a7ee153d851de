//! Domain types for representing extracted slides and presentations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Title used when neither the caller nor the first slide provides one.
pub const FALLBACK_PRESENTATION_TITLE: &str = "Untitled Presentation";

/// The origin of an extracted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    /// A rendered Notion page.
    Notion,
    /// Markdown of undetermined shape (rendered or raw).
    Markdown,
    /// A Markdown file rendered to HTML (e.g. a repository README view).
    RenderedMarkdown,
    /// Raw Markdown text.
    RawMarkdown,
    /// Origin could not be determined.
    Unknown,
    /// Placeholder for slides produced from a failed extraction.
    Error,
}

impl SourceType {
    /// Stable name used in serialized output and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notion => "notion",
            Self::Markdown => "markdown",
            Self::RenderedMarkdown => "rendered-markdown",
            Self::RawMarkdown => "raw-markdown",
            Self::Unknown => "unknown",
            Self::Error => "error",
        }
    }

    /// Parse a source type from its stable name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "notion" => Some(Self::Notion),
            "markdown" | "md" => Some(Self::Markdown),
            "rendered-markdown" | "rendered" => Some(Self::RenderedMarkdown),
            "raw-markdown" | "raw" => Some(Self::RawMarkdown),
            "unknown" => Some(Self::Unknown),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single slide with its Markdown body and nested subslides.
///
/// Subslides nest exactly one level deep: a subslide never carries
/// subslides of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SlideRecord")]
pub struct Slide {
    title: String,
    content: String,
    source_type: SourceType,
    metadata: Map<String, Value>,
    subslides: Vec<Slide>,
}

impl Slide {
    /// Create a slide without metadata or subslides.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        source_type: SourceType,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            source_type,
            metadata: Map::new(),
            subslides: Vec::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach subslides, discarding anything nested below them.
    pub fn with_subslides(mut self, subslides: Vec<Slide>) -> Self {
        self.subslides = subslides
            .into_iter()
            .map(|mut sub| {
                sub.subslides.clear();
                sub
            })
            .collect();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn subslides(&self) -> &[Slide] {
        &self.subslides
    }

    /// A slide is valid when its title is non-empty after trimming.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Whether the slide body holds any non-whitespace text.
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// Return a new slide whose title and content (and those of its
    /// subslides) are passed through the given functions.
    pub fn map_text<T, C>(&self, title_fn: T, content_fn: C) -> Slide
    where
        T: Fn(&str) -> String,
        C: Fn(&str) -> String,
    {
        Slide {
            title: title_fn(&self.title),
            content: content_fn(&self.content),
            source_type: self.source_type,
            metadata: self.metadata.clone(),
            subslides: self
                .subslides
                .iter()
                .map(|sub| Slide {
                    title: title_fn(&sub.title),
                    content: content_fn(&sub.content),
                    source_type: sub.source_type,
                    metadata: sub.metadata.clone(),
                    subslides: Vec::new(),
                })
                .collect(),
        }
    }
}

/// Wire shape of a slide; converted through [`Slide::with_subslides`] so
/// deserialized input obeys the same nesting rule.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlideRecord {
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default = "unknown_source")]
    source_type: SourceType,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default)]
    subslides: Vec<Slide>,
}

fn unknown_source() -> SourceType {
    SourceType::Unknown
}

impl From<SlideRecord> for Slide {
    fn from(record: SlideRecord) -> Self {
        Slide {
            title: record.title,
            content: record.content,
            source_type: record.source_type,
            metadata: record.metadata,
            subslides: Vec::new(),
        }
        .with_subslides(record.subslides)
    }
}

/// Creation and modification timestamps of a presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PresentationMetadata {
    fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}

/// Represents an entire presentation built from one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    /// Presentation title.
    pub title: String,

    /// Slides in document order.
    slides: Vec<Slide>,

    /// Origin of the document the slides came from.
    pub source_type: SourceType,

    /// Timestamps.
    pub metadata: PresentationMetadata,

    /// Whether `title` was supplied rather than derived.
    #[serde(skip)]
    explicit_title: bool,
}

impl Presentation {
    /// Create an empty presentation.
    ///
    /// Without an explicit (non-blank) title, the title follows the first
    /// slide added, falling back to [`FALLBACK_PRESENTATION_TITLE`].
    pub fn new(title: Option<String>, source_type: SourceType) -> Self {
        let title = title.filter(|t| !t.trim().is_empty());
        let explicit_title = title.is_some();
        Self {
            title: title.unwrap_or_else(|| FALLBACK_PRESENTATION_TITLE.to_string()),
            slides: Vec::new(),
            source_type,
            metadata: PresentationMetadata::now(),
            explicit_title,
        }
    }

    /// Create a presentation and add every valid slide.
    pub fn from_slides(
        title: Option<String>,
        slides: impl IntoIterator<Item = Slide>,
        source_type: SourceType,
    ) -> Self {
        let mut presentation = Self::new(title, source_type);
        for slide in slides {
            presentation.add_slide(slide);
        }
        presentation
    }

    /// Add a slide. Invalid slides (blank title) are ignored.
    ///
    /// Returns whether the slide was added.
    pub fn add_slide(&mut self, slide: Slide) -> bool {
        if !slide.is_valid() {
            log::debug!("Ignoring slide without a title");
            return false;
        }

        if self.slides.is_empty() && !self.explicit_title {
            self.title = slide.title().trim().to_string();
        }

        self.slides.push(slide);
        self.metadata.updated_at = Utc::now();
        true
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Number of slides including subslides.
    pub fn total_slide_count(&self) -> usize {
        self.slides.iter().map(|s| 1 + s.subslides().len()).sum()
    }
}

/// Result of one `extract()` call as seen by the host.
///
/// Serializes as `{"slides": [...]}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractResponse {
    Slides { slides: Vec<Slide> },
    Error { error: String },
}

impl ExtractResponse {
    pub fn slides(&self) -> Option<&[Slide]> {
        match self {
            Self::Slides { slides } => Some(slides),
            Self::Error { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_type_names() {
        assert_eq!(SourceType::RenderedMarkdown.as_str(), "rendered-markdown");
        assert_eq!(
            SourceType::from_name("raw-markdown"),
            Some(SourceType::RawMarkdown)
        );
        assert_eq!(SourceType::from_name("Notion"), Some(SourceType::Notion));
        assert_eq!(SourceType::from_name("slides"), None);

        let json = serde_json::to_string(&SourceType::RenderedMarkdown).unwrap();
        assert_eq!(json, "\"rendered-markdown\"");
    }

    #[test]
    fn test_subslides_are_flattened_to_one_level() {
        let inner = Slide::new("Inner", "deep", SourceType::Notion);
        let sub = Slide::new("Sub", "body", SourceType::Notion).with_subslides(vec![inner]);
        assert_eq!(sub.subslides().len(), 1);

        let slide = Slide::new("Top", "body", SourceType::Notion).with_subslides(vec![sub]);
        assert_eq!(slide.subslides().len(), 1);
        assert!(slide.subslides()[0].subslides().is_empty());
    }

    #[test]
    fn test_deserialized_slides_obey_nesting_rule() {
        let json = r#"{
            "title": "Top",
            "content": "",
            "sourceType": "notion",
            "subslides": [
                {"title": "Sub", "subslides": [{"title": "Deep"}]}
            ]
        }"#;
        let slide: Slide = serde_json::from_str(json).unwrap();
        assert_eq!(slide.subslides().len(), 1);
        assert!(slide.subslides()[0].subslides().is_empty());
        assert_eq!(slide.subslides()[0].source_type(), SourceType::Unknown);
    }

    #[test]
    fn test_slide_validity() {
        assert!(Slide::new("Title", "", SourceType::Notion).is_valid());
        assert!(!Slide::new("   ", "body", SourceType::Notion).is_valid());
        assert!(!Slide::new("T", " \n ", SourceType::Notion).has_content());
    }

    #[test]
    fn test_presentation_title_defaults_from_first_slide() {
        let mut presentation = Presentation::new(None, SourceType::Notion);
        assert_eq!(presentation.title, FALLBACK_PRESENTATION_TITLE);

        presentation.add_slide(Slide::new("Kickoff", "Agenda", SourceType::Notion));
        presentation.add_slide(Slide::new("Second", "More", SourceType::Notion));
        assert_eq!(presentation.title, "Kickoff");
        assert_eq!(presentation.slide_count(), 2);
    }

    #[test]
    fn test_presentation_explicit_title_is_kept() {
        let presentation = Presentation::from_slides(
            Some("Quarterly Review".to_string()),
            vec![Slide::new("Kickoff", "Agenda", SourceType::Notion)],
            SourceType::Notion,
        );
        assert_eq!(presentation.title, "Quarterly Review");
    }

    #[test]
    fn test_add_invalid_slide_is_noop() {
        let mut presentation = Presentation::new(None, SourceType::Notion);
        let before = presentation.metadata.updated_at;

        assert!(!presentation.add_slide(Slide::new("", "body", SourceType::Notion)));
        assert_eq!(presentation.slide_count(), 0);
        assert_eq!(presentation.slides().len(), presentation.slide_count());
        assert_eq!(presentation.metadata.updated_at, before);
        assert_eq!(presentation.title, FALLBACK_PRESENTATION_TITLE);
    }

    #[test]
    fn test_total_slide_count_includes_subslides() {
        let slide = Slide::new("Top", "a", SourceType::Notion).with_subslides(vec![
            Slide::new("One", "b", SourceType::Notion),
            Slide::new("Two", "c", SourceType::Notion),
        ]);
        let presentation = Presentation::from_slides(None, vec![slide], SourceType::Notion);
        assert_eq!(presentation.total_slide_count(), 3);
    }

    #[test]
    fn test_extract_response_shape() {
        let ok = ExtractResponse::Slides { slides: vec![] };
        assert_eq!(serde_json::to_string(&ok).unwrap(), r#"{"slides":[]}"#);

        let err = ExtractResponse::Error {
            error: "Unsupported source".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"error":"Unsupported source"}"#
        );
        assert!(err.is_error());
        assert!(err.slides().is_none());
    }
}
