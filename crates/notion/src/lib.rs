//! Slide extraction from rendered Notion pages.
//!
//! Notion renders every block as a `div` carrying a `notion-<type>-block`
//! class; the shared DOM pipeline in `deckify-core` understands those
//! classes, so this crate only scopes the walk and supplies the page title.

pub mod extractor;

pub use extractor::{is_notion_document, NotionExtractor};
