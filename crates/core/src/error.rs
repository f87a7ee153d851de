//! Error types for page-to-slides extraction.

use thiserror::Error;

use crate::types::SourceType;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during slide extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// The document holds no level-1 headings to split slides on.
    ///
    /// Extractors report this as an empty slide list; the variant exists so
    /// callers that want an explicit signal can ask for one.
    #[error("No slide boundaries found in document")]
    NoBoundariesFound,

    /// No extractor is mapped to the requested source type.
    #[error("Unsupported source: {0}")]
    UnsupportedSource(SourceType),

    /// A single node could not be converted to Markdown.
    #[error("Failed to convert <{element}>: {reason}")]
    ElementConversion { element: String, reason: String },

    /// The extraction as a whole failed.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize or deserialize slides.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build an element conversion error.
    pub fn conversion(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ElementConversion {
            element: element.into(),
            reason: reason.into(),
        }
    }
}
