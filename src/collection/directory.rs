//! Collections backed by a directory of image files.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::collection::ImageCollection;
use crate::error::{Error, Result};
use crate::review::ItemId;

/// A flat directory whose file names are item identifiers.
///
/// Only regular files directly inside the directory are listed; hidden
/// files (leading `.`) and subdirectories are skipped.
#[derive(Debug, Clone)]
pub struct DirectoryCollection {
    root: PathBuf,
    name: String,
}

impl DirectoryCollection {
    /// Create a collection rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root.display().to_string();
        Self { root, name }
    }

    /// Directory backing this collection.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of an item.
    #[must_use]
    pub fn item_path(&self, item: &ItemId) -> PathBuf {
        self.root.join(item.as_str())
    }

    fn unavailable(&self, reason: impl Into<String>) -> Error {
        Error::CollectionUnavailable {
            collection: self.name.clone(),
            reason: reason.into(),
        }
    }
}

impl ImageCollection for DirectoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_items(&self) -> Result<Vec<ItemId>> {
        if !self.root.is_dir() {
            return Err(self.unavailable("not a readable directory"));
        }

        let entries = fs::read_dir(&self.root)
            .map_err(|e| self.unavailable(format!("failed to read directory: {e}")))?;

        let mut items = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.unavailable(format!("failed to read entry: {e}")))?;

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            // Non-UTF-8 names cannot be exported as text, skip them
            let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }

            items.push(ItemId::new(file_name));
        }

        items.sort();
        Ok(items)
    }

    fn read_item(&self, item: &ItemId) -> Result<Vec<u8>> {
        let path = self.item_path(item);
        fs::read(&path).map_err(|e| Error::MissingImage {
            collection: self.name.clone(),
            item: item.to_string(),
            reason: match e.kind() {
                ErrorKind::NotFound => "file does not exist".to_string(),
                _ => e.to_string(),
            },
        })
    }
}
