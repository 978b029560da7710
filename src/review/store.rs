//! In-memory ratings keyed by review unit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::review::rating::Rating;
use crate::review::unit::ReviewUnit;

/// A stored rating together with its unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Rated unit.
    pub unit: ReviewUnit,
    /// Last rating written for the unit.
    pub rating: Rating,
}

/// Ratings for the units of one session.
///
/// Entries are created on first write and never removed. Iteration follows
/// first-insertion order; overwriting a unit keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct ScoreStore {
    entries: Vec<ScoreEntry>,
    index: HashMap<ReviewUnit, usize>,
}

impl ScoreStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored rating for `unit`, or the default rating if it was never set.
    #[must_use]
    pub fn get(&self, unit: &ReviewUnit) -> Rating {
        self.stored(unit).unwrap_or_default()
    }

    /// Stored rating for `unit`, if any.
    #[must_use]
    pub fn stored(&self, unit: &ReviewUnit) -> Option<Rating> {
        self.index.get(unit).map(|&i| self.entries[i].rating)
    }

    /// Whether `unit` has a stored rating.
    #[must_use]
    pub fn contains(&self, unit: &ReviewUnit) -> bool {
        self.index.contains_key(unit)
    }

    /// Write all three scores for `unit` (last write wins).
    ///
    /// Every field must be in 1..=5; otherwise the store is left untouched.
    pub fn set(&mut self, unit: ReviewUnit, rating: Rating) -> Result<()> {
        rating.validate()?;

        match self.index.get(&unit) {
            Some(&i) => self.entries[i].rating = rating,
            None => {
                self.index.insert(unit.clone(), self.entries.len());
                self.entries.push(ScoreEntry { unit, rating });
            }
        }
        Ok(())
    }

    /// Number of units with a stored rating.
    #[must_use]
    pub fn completion_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate stored entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ScoreEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ScoreStore {
    type Item = &'a ScoreEntry;
    type IntoIter = std::slice::Iter<'a, ScoreEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_get_absent_returns_default() {
        let store = ScoreStore::new();
        let unit = ReviewUnit::new("a.png", "X");
        assert_eq!(store.get(&unit), Rating::default());
        assert_eq!(store.stored(&unit), None);
        assert_eq!(store.completion_count(), 0);
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let mut store = ScoreStore::new();
        let unit = ReviewUnit::new("a.png", "X");
        store.set(unit.clone(), Rating::new(1, 3, 4)).unwrap();
        assert_eq!(store.get(&unit), Rating::new(1, 3, 4));
        assert!(store.contains(&unit));
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut store = ScoreStore::new();
        let a = ReviewUnit::new("a.png", "X");
        let b = ReviewUnit::new("b.png", "X");
        store.set(a.clone(), Rating::new(1, 1, 1)).unwrap();
        store.set(b.clone(), Rating::new(2, 2, 2)).unwrap();
        store.set(a.clone(), Rating::new(4, 4, 4)).unwrap();

        assert_eq!(store.completion_count(), 2);
        let units: Vec<&ReviewUnit> = store.iter().map(|e| &e.unit).collect();
        assert_eq!(units, vec![&a, &b]);
        assert_eq!(store.get(&a), Rating::new(4, 4, 4));
    }

    #[test]
    fn test_invalid_score_leaves_store_unchanged() {
        let mut store = ScoreStore::new();
        let unit = ReviewUnit::new("a.png", "X");

        let err = store.set(unit.clone(), Rating::new(6, 5, 5)).unwrap_err();
        assert!(matches!(err, Error::InvalidScore { criterion: "score1", value: 6 }));
        assert!(!store.contains(&unit));

        store.set(unit.clone(), Rating::new(2, 2, 2)).unwrap();
        assert!(store.set(unit.clone(), Rating::new(2, 0, 2)).is_err());
        assert_eq!(store.get(&unit), Rating::new(2, 2, 2));
    }

    #[test]
    fn test_boundary_scores_accepted() {
        let mut store = ScoreStore::new();
        store.set(ReviewUnit::new("a.png", "X"), Rating::new(1, 5, 3)).unwrap();
        store.set(ReviewUnit::new("a.png", "Y"), Rating::new(5, 1, 1)).unwrap();
        assert_eq!(store.completion_count(), 2);
    }
}
