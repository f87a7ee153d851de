//! Slide extraction from Markdown, either rendered to HTML (GitHub and
//! similar viewers) or served as raw text.
//!
//! The rendered extractor runs the shared DOM pipeline over the Markdown
//! container; the raw extractor outlines the source with pulldown-cmark
//! and keeps slide bodies as the author wrote them.

pub mod raw;
pub mod rendered;

pub use raw::RawMarkdownExtractor;
pub use rendered::{is_rendered_markdown, RenderedMarkdownExtractor};

/// File extensions served as Markdown.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "mkdn"];

/// Whether `path` ends in a Markdown extension (case-insensitive).
pub fn has_markdown_extension(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext.as_str()))
}
