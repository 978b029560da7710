//! Image collections and the set of items eligible for review.
//!
//! A review compares one reference collection against several candidate
//! collections. Each collection only has to list its item identifiers and
//! return the bytes of an item; [`DirectoryCollection`] does this for a
//! directory of files and [`MemoryCollection`] for in-memory data.
//!
//! ## Example
//!
//! ```rust,ignore
//! use blind_review::collection::{CollectionSet, DirectoryCollection};
//!
//! let set = CollectionSet::new(DirectoryCollection::new("InputCD4"))
//!     .with_candidate("RealCD4", DirectoryCollection::new("RealCD4"))
//!     .with_candidate("OutputCD4", DirectoryCollection::new("OutputCD4"));
//!
//! let items = set.resolve_items()?;
//! ```

mod directory;
mod memory;

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, warn};

pub use directory::DirectoryCollection;
pub use memory::MemoryCollection;

use crate::error::{Error, Result};
use crate::review::{CandidateLabel, ItemId, ReviewUnit};

/// A source of images addressed by item identifier.
pub trait ImageCollection {
    /// Name used in errors and logs.
    fn name(&self) -> &str;

    /// List every item identifier in the collection.
    fn list_items(&self) -> Result<Vec<ItemId>>;

    /// Read the bytes of one item. Reads are idempotent and may be retried.
    fn read_item(&self, item: &ItemId) -> Result<Vec<u8>>;
}

/// Images shown for one review unit.
///
/// Each side is loaded independently so a missing file on one side does not
/// hide the other.
#[derive(Debug)]
pub struct UnitImages {
    /// Reference image bytes.
    pub reference: Result<Vec<u8>>,
    /// Candidate image bytes.
    pub candidate: Result<Vec<u8>>,
}

impl UnitImages {
    /// Whether both images loaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.reference.is_ok() && self.candidate.is_ok()
    }
}

struct Candidate {
    label: CandidateLabel,
    collection: Box<dyn ImageCollection>,
}

/// One reference collection plus labelled candidate collections.
pub struct CollectionSet {
    reference: Box<dyn ImageCollection>,
    candidates: Vec<Candidate>,
}

impl std::fmt::Debug for CollectionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionSet")
            .field("reference", &self.reference.name())
            .field("candidates", &self.labels())
            .finish()
    }
}

impl CollectionSet {
    /// Create a set with the given reference and no candidates.
    #[must_use]
    pub fn new(reference: impl ImageCollection + 'static) -> Self {
        Self {
            reference: Box::new(reference),
            candidates: Vec::new(),
        }
    }

    /// Add a candidate collection.
    #[must_use]
    pub fn with_candidate(
        mut self,
        label: impl Into<CandidateLabel>,
        collection: impl ImageCollection + 'static,
    ) -> Self {
        self.add_candidate(label, Box::new(collection));
        self
    }

    /// Add a boxed candidate collection.
    pub fn add_candidate(
        &mut self,
        label: impl Into<CandidateLabel>,
        collection: Box<dyn ImageCollection>,
    ) -> &mut Self {
        self.candidates.push(Candidate {
            label: label.into(),
            collection,
        });
        self
    }

    /// Candidate labels in registration order.
    #[must_use]
    pub fn labels(&self) -> Vec<CandidateLabel> {
        self.candidates.iter().map(|c| c.label.clone()).collect()
    }

    /// Check that there is at least one candidate and that every label is
    /// non-empty and unique, so each (item, label) pair names one unit.
    pub fn check_labels(&self) -> Result<()> {
        if self.candidates.is_empty() {
            return Err(Error::Config(
                "at least one candidate collection is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for candidate in &self.candidates {
            if candidate.label.as_str().trim().is_empty() {
                return Err(Error::Config(format!(
                    "candidate collection {} has an empty label",
                    candidate.collection.name()
                )));
            }
            if !seen.insert(&candidate.label) {
                return Err(Error::Config(format!(
                    "duplicate candidate label: {}",
                    candidate.label
                )));
            }
        }
        Ok(())
    }

    /// Items present in the reference and in every candidate, sorted.
    ///
    /// Fails with [`Error::CollectionUnavailable`] if any collection cannot
    /// be listed and with [`Error::NoEligibleItems`] if nothing is shared.
    pub fn resolve_items(&self) -> Result<Vec<ItemId>> {
        let mut shared: BTreeSet<ItemId> = self.reference.list_items()?.into_iter().collect();
        debug!(
            collection = self.reference.name(),
            items = shared.len(),
            "Listed reference collection"
        );

        for candidate in &self.candidates {
            let items: BTreeSet<ItemId> = candidate.collection.list_items()?.into_iter().collect();
            debug!(
                collection = candidate.collection.name(),
                label = %candidate.label,
                items = items.len(),
                "Listed candidate collection"
            );
            shared.retain(|item| items.contains(item));
        }

        if shared.is_empty() {
            return Err(Error::NoEligibleItems);
        }
        Ok(shared.into_iter().collect())
    }

    /// Read the reference and candidate images for `unit`.
    pub fn load_unit(&self, unit: &ReviewUnit) -> UnitImages {
        let reference = self.reference.read_item(&unit.item);
        let candidate = match self.candidates.iter().find(|c| c.label == unit.label) {
            Some(c) => c.collection.read_item(&unit.item),
            None => Err(Error::MissingImage {
                collection: unit.label.to_string(),
                item: unit.item.to_string(),
                reason: "unknown candidate label".to_string(),
            }),
        };

        for err in [reference.as_ref().err(), candidate.as_ref().err()].into_iter().flatten() {
            warn!(unit = %unit, error = %err, "Image unavailable");
        }

        UnitImages {
            reference,
            candidate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(name: &str, items: &[&str]) -> MemoryCollection {
        items
            .iter()
            .fold(MemoryCollection::new(name), |c, item| c.with_item(*item, item.as_bytes()))
    }

    #[test]
    fn test_resolve_items_intersection_sorted() {
        let set = CollectionSet::new(collection("ref", &["c.png", "a.png", "b.png", "d.png"]))
            .with_candidate("X", collection("x", &["b.png", "a.png", "c.png"]))
            .with_candidate("Y", collection("y", &["a.png", "c.png", "e.png"]));

        let items = set.resolve_items().unwrap();
        assert_eq!(items, vec![ItemId::new("a.png"), ItemId::new("c.png")]);
    }

    #[test]
    fn test_resolve_items_empty_intersection() {
        let set = CollectionSet::new(collection("ref", &["a.png"]))
            .with_candidate("X", collection("x", &["b.png"]));
        assert!(matches!(set.resolve_items(), Err(Error::NoEligibleItems)));
    }

    #[test]
    fn test_resolve_items_unavailable_candidate() {
        let set = CollectionSet::new(collection("ref", &["a.png"]))
            .with_candidate("X", collection("x", &["a.png"]).unavailable());
        assert!(matches!(
            set.resolve_items(),
            Err(Error::CollectionUnavailable { ref collection, .. }) if collection == "x"
        ));
    }

    #[test]
    fn test_resolve_items_unavailable_reference() {
        let set = CollectionSet::new(collection("ref", &["a.png"]).unavailable())
            .with_candidate("X", collection("x", &["a.png"]));
        assert!(matches!(
            set.resolve_items(),
            Err(Error::CollectionUnavailable { ref collection, .. }) if collection == "ref"
        ));
    }

    #[test]
    fn test_check_labels() {
        let set = CollectionSet::new(collection("ref", &["a.png"]))
            .with_candidate("X", collection("x", &["a.png"]))
            .with_candidate("Y", collection("y", &["a.png"]));
        assert!(set.check_labels().is_ok());

        let duplicate = CollectionSet::new(collection("ref", &["a.png"]))
            .with_candidate("X", collection("real", &["a.png"]))
            .with_candidate("X", collection("output", &["a.png"]));
        assert!(matches!(
            duplicate.check_labels(),
            Err(Error::Config(ref reason)) if reason.contains("duplicate")
        ));

        let blank = CollectionSet::new(collection("ref", &["a.png"]))
            .with_candidate(" ", collection("x", &["a.png"]));
        assert!(matches!(blank.check_labels(), Err(Error::Config(_))));

        let none = CollectionSet::new(collection("ref", &["a.png"]));
        assert!(matches!(none.check_labels(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_unit_reports_each_side() {
        let mut candidate = collection("x", &["a.png"]);
        candidate.remove(&ItemId::new("a.png"));
        let set = CollectionSet::new(collection("ref", &["a.png"])).with_candidate("X", candidate);

        let images = set.load_unit(&ReviewUnit::new("a.png", "X"));
        assert_eq!(images.reference.as_deref().unwrap(), b"a.png");
        assert!(matches!(images.candidate, Err(Error::MissingImage { .. })));
        assert!(!images.is_complete());

        let images = set.load_unit(&ReviewUnit::new("a.png", "Z"));
        assert!(images.candidate.is_err());
    }
}
