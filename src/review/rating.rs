//! Ratings and the three review criteria.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lowest accepted score.
pub const MIN_SCORE: u8 = 1;

/// Highest accepted score.
pub const MAX_SCORE: u8 = 5;

/// Score used for any field that has not been set.
pub const DEFAULT_SCORE: u8 = 5;

/// One of the three rated criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Structural detail: contours complete and distinguishable.
    StructuralDetail,
    /// Pattern consistency with the expected appearance.
    PatternConsistency,
    /// Absence of artifacts: clean background, no non-specific signal.
    ArtifactFree,
}

impl Criterion {
    /// All criteria in column order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[
            Self::StructuralDetail,
            Self::PatternConsistency,
            Self::ArtifactFree,
        ]
    }

    /// Column name used in exports.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::StructuralDetail => "score1",
            Self::PatternConsistency => "score2",
            Self::ArtifactFree => "score3",
        }
    }

    /// Short human-readable name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::StructuralDetail => "Structural detail",
            Self::PatternConsistency => "Pattern consistency",
            Self::ArtifactFree => "No artifacts",
        }
    }

    /// Guidance shown to the reviewer.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::StructuralDetail => "Contours are complete and distinguishable",
            Self::PatternConsistency => {
                "Signal follows the expected pattern, with at most slight spill-over"
            }
            Self::ArtifactFree => "Clean background, no non-specific signal or artifacts",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::StructuralDetail => 0,
            Self::PatternConsistency => 1,
            Self::ArtifactFree => 2,
        }
    }

    /// Parse from string (case-insensitive, accepts column names and 1-3).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "score1" | "s1" | "1" | "detail" | "structural_detail" => Some(Self::StructuralDetail),
            "score2" | "s2" | "2" | "pattern" | "pattern_consistency" => {
                Some(Self::PatternConsistency)
            }
            "score3" | "s3" | "3" | "artifacts" | "artifact_free" => Some(Self::ArtifactFree),
            _ => None,
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

impl std::str::FromStr for Criterion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_str_loose(s).ok_or_else(|| format!("Unknown criterion: {s}"))
    }
}

/// Check that `value` is a valid score for `criterion`.
pub fn validate_score(criterion: Criterion, value: u8) -> Result<u8> {
    if (MIN_SCORE..=MAX_SCORE).contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidScore {
            criterion: criterion.column(),
            value,
        })
    }
}

/// Verbal meaning of a score.
#[must_use]
pub fn scale_label(score: u8) -> Option<&'static str> {
    match score {
        1 => Some("Unacceptable"),
        2 => Some("Acceptable"),
        3 => Some("Good"),
        4 => Some("Very good"),
        5 => Some("Excellent"),
        _ => None,
    }
}

/// The three scores given to one review unit.
///
/// A `Rating` is plain data; range checks happen when it is written to a
/// [`ScoreStore`](crate::review::ScoreStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rating {
    /// `score1`.
    pub structural_detail: u8,
    /// `score2`.
    pub pattern_consistency: u8,
    /// `score3`.
    pub artifact_free: u8,
}

impl Rating {
    /// Create a rating from the three scores in column order.
    #[must_use]
    pub fn new(structural_detail: u8, pattern_consistency: u8, artifact_free: u8) -> Self {
        Self {
            structural_detail,
            pattern_consistency,
            artifact_free,
        }
    }

    /// Get the score for one criterion.
    #[must_use]
    pub fn get(&self, criterion: Criterion) -> u8 {
        match criterion {
            Criterion::StructuralDetail => self.structural_detail,
            Criterion::PatternConsistency => self.pattern_consistency,
            Criterion::ArtifactFree => self.artifact_free,
        }
    }

    /// Return a copy with one criterion replaced.
    #[must_use]
    pub fn with(mut self, criterion: Criterion, value: u8) -> Self {
        match criterion {
            Criterion::StructuralDetail => self.structural_detail = value,
            Criterion::PatternConsistency => self.pattern_consistency = value,
            Criterion::ArtifactFree => self.artifact_free = value,
        }
        self
    }

    /// Check every field, reporting the first one out of range.
    pub fn validate(&self) -> Result<()> {
        for &criterion in Criterion::all() {
            validate_score(criterion, self.get(criterion))?;
        }
        Ok(())
    }

    /// Scores in column order.
    #[must_use]
    pub fn to_array(&self) -> [u8; 3] {
        [
            self.structural_detail,
            self.pattern_consistency,
            self.artifact_free,
        ]
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::new(DEFAULT_SCORE, DEFAULT_SCORE, DEFAULT_SCORE)
    }
}

/// Scores picked for the current unit but not yet persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagedRating {
    fields: [Option<u8>; 3],
}

impl StagedRating {
    /// Stage one score. Out-of-range values are rejected and nothing changes.
    pub fn stage(&mut self, criterion: Criterion, value: u8) -> Result<()> {
        self.fields[criterion.index()] = Some(validate_score(criterion, value)?);
        Ok(())
    }

    /// Staged score for a criterion, if any.
    #[must_use]
    pub fn get(&self, criterion: Criterion) -> Option<u8> {
        self.fields[criterion.index()]
    }

    /// Whether nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(Option::is_none)
    }

    /// Overlay the staged fields on `base`.
    #[must_use]
    pub fn resolve(&self, base: Rating) -> Rating {
        Criterion::all().iter().fold(base, |rating, &criterion| {
            match self.get(criterion) {
                Some(value) => rating.with(criterion, value),
                None => rating,
            }
        })
    }

    /// Drop all staged fields.
    pub fn clear(&mut self) {
        self.fields = [None; 3];
    }
}
