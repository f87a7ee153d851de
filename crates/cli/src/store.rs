//! JSON file storage for extracted slides.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use deckify::{Result, Slide, SlideStore};
use serde::{Deserialize, Serialize};

/// One saved extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSlides {
    pub url: String,
    pub saved_at: DateTime<Utc>,
    pub slides: Vec<Slide>,
}

/// Appends each saved extraction to a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Everything saved so far; empty when the file does not exist yet.
    pub fn load(&self) -> Result<Vec<StoredSlides>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&data)?)
    }
}

impl SlideStore for JsonFileStore {
    fn save_slides(&mut self, url: &str, slides: &[Slide]) -> Result<usize> {
        let mut entries = self.load()?;
        entries.push(StoredSlides {
            url: url.to_string(),
            saved_at: Utc::now(),
            slides: slides.to_vec(),
        });

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        log::debug!("Saved {} slides to {}", slides.len(), self.path.display());
        Ok(slides.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckify::SourceType;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested").join("slides.json"));

        let slides = vec![
            Slide::new("A", "a", SourceType::Notion)
                .with_subslides(vec![Slide::new("B", "b", SourceType::Notion)]),
        ];
        assert_eq!(store.save_slides("https://x", &slides).unwrap(), 1);
        assert_eq!(store.save_slides("https://y", &[]).unwrap(), 0);

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].url, "https://x");
        assert_eq!(loaded[0].slides, slides);
        assert!(loaded[1].slides.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("slides.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("slides.json");
        fs::write(&path, "  \n").unwrap();
        assert!(JsonFileStore::new(path).load().unwrap().is_empty());
    }
}
