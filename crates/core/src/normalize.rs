//! Markdown cleanup for assembled slide bodies.
//!
//! Decodes the handful of HTML entities that leak out of rendered pages,
//! normalizes heading and list markers, and collapses blank-line runs.
//! Normalization is idempotent: running it on its own output changes
//! nothing. Lines inside fenced code blocks are left alone apart from
//! entity decoding and blank-line collapsing.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use crate::classify::strip_heading_prefix;
use crate::dom::text::collapse_whitespace;
use crate::types::Slide;

/// The entities rendered pages leave behind.
static ENTITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(nbsp|lt|gt|quot|amp);").unwrap());

/// Three or more consecutive newlines.
static EXCESS_NEWLINES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// A run of `#` at line start followed by optional blanks and content.
static HEADING_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]*([^#\s])").unwrap());

/// A leading `*`, `+` or `-` list marker followed by blanks and content.
static LIST_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)[*+-][ \t]+(\S)").unwrap());

/// `---`, `* * *`, `___` and friends.
static THEMATIC_BREAK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap()
});

/// A code fence line: the backtick or tilde run and whatever follows it.
static FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(`{3,}|~{3,})(.*)$").unwrap());

/// The fence a code block was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    /// The fence opened by `line`, if it is a fence line.
    fn open(line: &str) -> Option<Self> {
        let caps = FENCE_REGEX.captures(line)?;
        let run = caps.get(1)?.as_str();
        let marker = run.chars().next()?;
        if marker == '`' && caps[2].contains('`') {
            return None;
        }
        Some(Self {
            marker,
            len: run.len(),
        })
    }

    /// Whether `line` closes this fence: same character, a run at least
    /// as long, nothing after it.
    fn is_closed_by(&self, line: &str) -> bool {
        FENCE_REGEX.captures(line).is_some_and(|caps| {
            let run = &caps[1];
            run.starts_with(self.marker) && run.len() >= self.len && caps[2].trim().is_empty()
        })
    }
}

/// Decode the supported entities until none remain, so `&amp;lt;`
/// ends up as `<` in a single pass.
pub fn decode_entities(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = ENTITY_REGEX
            .replace_all(&current, |caps: &Captures| match &caps[1] {
                "nbsp" => " ",
                "lt" => "<",
                "gt" => ">",
                "quot" => "\"",
                _ => "&",
            })
            .into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Text normalizer for slide Markdown.
#[derive(Debug, Clone)]
pub struct ContentNormalizer {
    /// Whether `*`/`+` list markers are rewritten to `-`.
    normalize_list_markers: bool,
}

impl Default for ContentNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentNormalizer {
    /// Create a normalizer with default settings.
    pub fn new() -> Self {
        Self {
            normalize_list_markers: true,
        }
    }

    /// Set whether list markers are normalized to `-`.
    pub fn with_list_marker_normalization(mut self, enabled: bool) -> Self {
        self.normalize_list_markers = enabled;
        self
    }

    /// Normalize a Markdown slide body.
    ///
    /// - Decodes `&nbsp;`, `&lt;`, `&gt;`, `&quot;` and `&amp;`
    /// - Puts exactly one space after a leading `#` run
    /// - Rewrites a leading `*`/`+`/`-` marker to `- `
    /// - Trims trailing whitespace outside code fences
    /// - Collapses 3+ newlines to a single blank line and strips leading
    ///   and trailing blank lines (indentation of the first line is kept)
    ///
    /// A fence closes only on the same character with a run at least as
    /// long as its opener, so a four-backtick block may hold ```` ``` ````.
    pub fn normalize(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let text = decode_entities(&text);
        let text = text.trim_matches('\n');

        let mut fence: Option<Fence> = None;
        let lines: Vec<String> = text
            .split('\n')
            .map(|line| match fence {
                Some(open) => {
                    if open.is_closed_by(line) {
                        fence = None;
                        line.trim_end().to_string()
                    } else {
                        line.to_string()
                    }
                }
                None => match Fence::open(line) {
                    Some(opened) => {
                        fence = Some(opened);
                        line.trim_end().to_string()
                    }
                    None => self.normalize_line(line),
                },
            })
            .collect();

        let joined = lines.join("\n");
        EXCESS_NEWLINES_REGEX
            .replace_all(&joined, "\n\n")
            .trim_matches('\n')
            .to_string()
    }

    fn normalize_line(&self, line: &str) -> String {
        let line = line.trim_end();
        if THEMATIC_BREAK_REGEX.is_match(line) {
            return line.to_string();
        }

        let line = HEADING_MARKER_REGEX.replace(line, "$1 $2");
        if self.normalize_list_markers {
            LIST_MARKER_REGEX.replace(&line, "${1}- $2").into_owned()
        } else {
            line.into_owned()
        }
    }

    /// Normalize a slide or subslide title: entities decoded, whitespace
    /// collapsed, any "Heading N:" prefix removed, NFC composed.
    pub fn normalize_title(&self, title: &str) -> String {
        let decoded = decode_entities(title);
        strip_heading_prefix(&collapse_whitespace(&decoded))
            .nfc()
            .collect()
    }

    /// Return a normalized copy of a slide and its subslides.
    pub fn normalize_slide(&self, slide: &Slide) -> Slide {
        slide.map_text(|t| self.normalize_title(t), |c| self.normalize(c))
    }

    /// Normalize every slide, returning new instances.
    pub fn normalize_slides(&self, slides: &[Slide]) -> Vec<Slide> {
        slides.iter().map(|s| self.normalize_slide(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceType;
    use proptest::prelude::*;

    #[test]
    fn test_collapse_blank_lines() {
        let normalizer = ContentNormalizer::new();
        assert_eq!(normalizer.normalize("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalizer.normalize("a\r\n\r\n\r\nb"), "a\n\nb");
    }

    #[test]
    fn test_decode_entities() {
        let normalizer = ContentNormalizer::new();
        assert_eq!(
            normalizer.normalize("a&nbsp;b &lt;tag&gt; &quot;q&quot; &amp;"),
            "a b <tag> \"q\" &"
        );
        assert_eq!(decode_entities("&amp;lt;"), "<");
        assert_eq!(decode_entities("&copy;"), "&copy;");
    }

    #[test]
    fn test_heading_markers() {
        let normalizer = ContentNormalizer::new();
        assert_eq!(normalizer.normalize("##Title"), "## Title");
        assert_eq!(normalizer.normalize("###    Deep"), "### Deep");
        assert_eq!(normalizer.normalize("# Fine"), "# Fine");
    }

    #[test]
    fn test_list_markers() {
        let normalizer = ContentNormalizer::new();
        assert_eq!(normalizer.normalize("* one\n+   two\n  -  three"), "- one\n- two\n  - three");
        // Emphasis is not a list marker.
        assert_eq!(normalizer.normalize("*emphasis*"), "*emphasis*");
    }

    #[test]
    fn test_list_marker_normalization_can_be_disabled() {
        let normalizer = ContentNormalizer::new().with_list_marker_normalization(false);
        assert_eq!(normalizer.normalize("* one"), "* one");
    }

    #[test]
    fn test_thematic_breaks_untouched() {
        let normalizer = ContentNormalizer::new();
        assert_eq!(normalizer.normalize("a\n\n* * *\n\nb"), "a\n\n* * *\n\nb");
        assert_eq!(normalizer.normalize("---"), "---");
    }

    #[test]
    fn test_code_fences_untouched() {
        let normalizer = ContentNormalizer::new();
        let text = "```bash\n#comment\n*  glob\n```\n#after";
        assert_eq!(
            normalizer.normalize(text),
            "```bash\n#comment\n*  glob\n```\n# after"
        );
    }

    #[test]
    fn test_longer_fence_holds_shorter_fence_lines() {
        let normalizer = ContentNormalizer::new();
        assert_eq!(
            normalizer.normalize("````\n```inner\n````\n\n* item\n##x"),
            "````\n```inner\n````\n\n- item\n## x"
        );
        // A tilde line does not close a backtick fence.
        assert_eq!(
            normalizer.normalize("```\n~~~\n* kept\n```\n* item"),
            "```\n~~~\n* kept\n```\n- item"
        );
    }

    #[test]
    fn test_leading_indentation_kept() {
        let normalizer = ContentNormalizer::new();
        assert_eq!(
            normalizer.normalize("\n\n    let x = 1;\n\nText\n\n"),
            "    let x = 1;\n\nText"
        );
        assert_eq!(normalizer.normalize("  #x"), "  #x");
    }

    #[test]
    fn test_normalize_title() {
        let normalizer = ContentNormalizer::new();
        assert_eq!(normalizer.normalize_title("  Heading 2:   Budget &amp; Plan "), "Budget & Plan");
        // Decomposed "é" composes to a single code point.
        assert_eq!(normalizer.normalize_title("Cafe\u{301}"), "Caf\u{e9}");
    }

    #[test]
    fn test_normalize_slide_returns_new_instance() {
        let normalizer = ContentNormalizer::new();
        let slide = Slide::new("Title", "*  a\n\n\n\nb", SourceType::Notion)
            .with_subslides(vec![Slide::new("Heading 2: Sub", "##x", SourceType::Notion)]);
        let normalized = normalizer.normalize_slide(&slide);

        assert_eq!(normalized.content(), "- a\n\nb");
        assert_eq!(normalized.subslides()[0].title(), "Sub");
        assert_eq!(normalized.subslides()[0].content(), "## x");
        // The input slide is untouched.
        assert_eq!(slide.content(), "*  a\n\n\n\nb");
    }

    #[test]
    fn test_idempotent_on_examples() {
        let normalizer = ContentNormalizer::new();
        for text in [
            "  #x\nbody",
            "* - -",
            "&amp;amp;nbsp;",
            "```\n\n\n\n```",
            "- a\n\n\n\n  *  b\n#######seven",
            "````\n```\n````\n* x",
            "~~~~\n~~~\n  \n",
        ] {
            let once = normalizer.normalize(text);
            assert_eq!(normalizer.normalize(&once), once, "input: {text:?}");
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_normalize_is_idempotent(text in "[a-z &;#*+`~_\\-\n\r\t]{0,120}") {
            let normalizer = ContentNormalizer::new();
            let once = normalizer.normalize(&text);
            prop_assert_eq!(normalizer.normalize(&once), once);
        }

        #[test]
        fn prop_normalize_is_idempotent_unicode(text in "\\PC{0,80}") {
            let normalizer = ContentNormalizer::new();
            let once = normalizer.normalize(&text);
            prop_assert_eq!(normalizer.normalize(&once), once);
        }
    }
}
