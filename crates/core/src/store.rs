//! Persistence seam for extracted slides.

use crate::error::Result;
use crate::types::Slide;

/// Somewhere extracted slides can be saved to.
///
/// The extraction pipeline never persists anything itself; front ends
/// hand their results to a store when the user asks for it.
pub trait SlideStore {
    /// Save `slides` extracted from `url`. Returns the number saved.
    fn save_slides(&mut self, url: &str, slides: &[Slide]) -> Result<usize>;
}

/// A store that keeps everything in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Vec<(String, Vec<Slide>)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved batches in insertion order.
    pub fn entries(&self) -> &[(String, Vec<Slide>)] {
        &self.entries
    }
}

impl SlideStore for MemoryStore {
    fn save_slides(&mut self, url: &str, slides: &[Slide]) -> Result<usize> {
        self.entries.push((url.to_string(), slides.to_vec()));
        Ok(slides.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceType;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        let slides = vec![Slide::new("A", "a", SourceType::Notion)];
        assert_eq!(store.save_slides("https://x", &slides).unwrap(), 1);
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.entries()[0].0, "https://x");
    }
}
