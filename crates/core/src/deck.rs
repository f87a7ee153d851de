//! Markdown deck output.
//!
//! Writes slides as a single Markdown document in the layout slide tools
//! such as reveal.js read: slides separated by `---`, subslides by `--`.

use crate::types::Slide;

/// Formatter for Markdown deck output.
#[derive(Debug, Clone)]
pub struct DeckFormatter {
    /// Separator line between top-level slides.
    slide_separator: String,
    /// Separator line between a slide and its subslides.
    subslide_separator: String,
}

impl Default for DeckFormatter {
    fn default() -> Self {
        Self {
            slide_separator: "---".to_string(),
            subslide_separator: "--".to_string(),
        }
    }
}

impl DeckFormatter {
    /// Create a formatter with `---` / `--` separators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom separator between slides.
    pub fn with_slide_separator(mut self, separator: impl Into<String>) -> Self {
        self.slide_separator = separator.into();
        self
    }

    /// Use a custom separator between subslides.
    pub fn with_subslide_separator(mut self, separator: impl Into<String>) -> Self {
        self.subslide_separator = separator.into();
        self
    }

    /// Format slides into one Markdown document.
    ///
    /// # Example output
    /// ```text
    /// # Intro
    ///
    /// Welcome text
    ///
    /// --
    ///
    /// ## Details
    ///
    /// More info
    ///
    /// ---
    ///
    /// # Next
    /// ```
    pub fn format(&self, slides: &[Slide]) -> String {
        let subslide_sep = format!("\n\n{}\n\n", self.subslide_separator);
        let slides: Vec<String> = slides
            .iter()
            .map(|slide| {
                let mut sections = vec![section("#", slide)];
                sections.extend(slide.subslides().iter().map(|sub| section("##", sub)));
                sections.join(&subslide_sep)
            })
            .collect();

        slides.join(&format!("\n\n{}\n\n", self.slide_separator))
    }

    /// Format with a trailing newline, leaving empty output empty.
    pub fn format_with_newline(&self, slides: &[Slide]) -> String {
        let formatted = self.format(slides);
        if formatted.is_empty() {
            formatted
        } else {
            format!("{}\n", formatted)
        }
    }
}

fn section(marker: &str, slide: &Slide) -> String {
    if slide.has_content() {
        format!("{} {}\n\n{}", marker, slide.title(), slide.content())
    } else {
        format!("{} {}", marker, slide.title())
    }
}
