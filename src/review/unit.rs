//! Identifiers for review units.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one reviewable subject, shared by the reference and every
/// candidate collection (the common file name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create an item identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Tag of the candidate source that produced an image.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateLabel(String);

impl CandidateLabel {
    /// Create a candidate label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Get the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CandidateLabel {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CandidateLabel {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for CandidateLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One (item, candidate) pair to be rated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewUnit {
    /// Item shown to the reviewer.
    pub item: ItemId,
    /// Candidate source of the rated image.
    pub label: CandidateLabel,
}

impl ReviewUnit {
    /// Create a review unit.
    #[must_use]
    pub fn new(item: impl Into<ItemId>, label: impl Into<CandidateLabel>) -> Self {
        Self {
            item: item.into(),
            label: label.into(),
        }
    }
}

impl fmt::Display for ReviewUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.label, self.item)
    }
}
