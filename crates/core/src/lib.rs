//! Core of page-to-slides extraction: the document tree, node
//! classification, per-node Markdown conversion, slide assembly, content
//! normalization, and the slide model shared by every source.

pub mod assemble;
pub mod classify;
pub mod convert;
pub mod deck;
pub mod dom;
pub mod error;
pub mod extract;
pub mod lists;
pub mod logging;
pub mod normalize;
pub mod store;
pub mod subslides;
pub mod types;

pub use classify::Classification;
pub use convert::DividerPolicy;
pub use deck::DeckFormatter;
pub use dom::{Document, DocumentTree, Marker, NodeId};
pub use error::{Error, Result};
pub use extract::{extract_slides, ExtractOptions, Extractor};
pub use logging::Logger;
pub use normalize::ContentNormalizer;
pub use store::{MemoryStore, SlideStore};
pub use types::{ExtractResponse, Presentation, PresentationMetadata, Slide, SourceType};
