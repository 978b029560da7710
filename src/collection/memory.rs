//! In-memory collections.

use std::collections::BTreeMap;

use crate::collection::ImageCollection;
use crate::error::{Error, Result};
use crate::review::ItemId;

/// A collection held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCollection {
    name: String,
    items: BTreeMap<ItemId, Vec<u8>>,
    unavailable: bool,
}

impl MemoryCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add an item.
    #[must_use]
    pub fn with_item(mut self, id: impl Into<ItemId>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(id, bytes);
        self
    }

    /// Add or replace an item.
    pub fn insert(&mut self, id: impl Into<ItemId>, bytes: impl Into<Vec<u8>>) {
        self.items.insert(id.into(), bytes.into());
    }

    /// Remove an item, keeping it out of later listings and reads.
    pub fn remove(&mut self, id: &ItemId) -> Option<Vec<u8>> {
        self.items.remove(id)
    }

    /// Make every listing fail, simulating an unreachable source.
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

impl ImageCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_items(&self) -> Result<Vec<ItemId>> {
        if self.unavailable {
            return Err(Error::CollectionUnavailable {
                collection: self.name.clone(),
                reason: "collection is offline".to_string(),
            });
        }
        Ok(self.items.keys().cloned().collect())
    }

    fn read_item(&self, item: &ItemId) -> Result<Vec<u8>> {
        self.items.get(item).cloned().ok_or_else(|| Error::MissingImage {
            collection: self.name.clone(),
            item: item.to_string(),
            reason: "no such item".to_string(),
        })
    }
}
