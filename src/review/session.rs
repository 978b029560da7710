//! Review session: the shuffled order, the cursor and the stored ratings.
//!
//! This module provides [`ReviewSession`], the state a reviewer works
//! through, and [`ReviewConfig`], which describes where the collections live.
//! All state is owned by the session and changed only through its methods.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::collection::{CollectionSet, DirectoryCollection};
use crate::error::{Error, Result};
use crate::review::cursor::{CursorState, SessionCursor};
use crate::review::rating::{Criterion, Rating, StagedRating};
use crate::review::report::{DEFAULT_EXPORT_FILE_NAME, ExportArtifact, ReportExporter};
use crate::review::shuffle::{DEFAULT_SEED, shuffled_units};
use crate::review::store::ScoreStore;
use crate::review::unit::{CandidateLabel, ReviewUnit};

/// A candidate collection in a [`ReviewConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSource {
    /// Label written to the `folder` column.
    pub label: CandidateLabel,
    /// Directory holding the candidate images.
    pub path: PathBuf,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_export_file_name() -> String {
    DEFAULT_EXPORT_FILE_NAME.to_string()
}

/// Configuration for a review session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Directory holding the reference images.
    pub reference: PathBuf,

    /// Candidate directories, in the order used for pairing.
    pub candidates: Vec<CandidateSource>,

    /// Shuffle seed.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// File name given to exports.
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,
}

impl ReviewConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ReviewConfigBuilder {
        ReviewConfigBuilder::default()
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ReviewConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Check candidate labels and the export file name.
    pub fn validate(&self) -> Result<()> {
        if self.candidates.is_empty() {
            return Err(Error::Config(
                "at least one candidate collection is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for candidate in &self.candidates {
            if candidate.label.as_str().trim().is_empty() {
                return Err(Error::Config(format!(
                    "candidate {} has an empty label",
                    candidate.path.display()
                )));
            }
            if !seen.insert(&candidate.label) {
                return Err(Error::Config(format!(
                    "duplicate candidate label: {}",
                    candidate.label
                )));
            }
        }

        if self.export_file_name.trim().is_empty() {
            return Err(Error::Config("export file name is empty".to_string()));
        }
        Ok(())
    }

    /// Directory-backed collections described by this configuration.
    #[must_use]
    pub fn collections(&self) -> CollectionSet {
        let mut set = CollectionSet::new(DirectoryCollection::new(&self.reference));
        for candidate in &self.candidates {
            set.add_candidate(
                candidate.label.clone(),
                Box::new(DirectoryCollection::new(&candidate.path)),
            );
        }
        set
    }

    /// Exporter producing [`export_file_name`](Self::export_file_name).
    #[must_use]
    pub fn exporter(&self) -> ReportExporter {
        ReportExporter::new(self.export_file_name.clone())
    }

    /// Open the collections and start a session over them.
    pub fn start_session(&self) -> Result<(CollectionSet, ReviewSession)> {
        let collections = self.collections();
        let session =
            ReviewSession::start(&collections, self.seed)?.with_exporter(self.exporter());
        Ok((collections, session))
    }
}

/// Builder for [`ReviewConfig`].
#[derive(Debug, Default)]
pub struct ReviewConfigBuilder {
    reference: Option<PathBuf>,
    candidates: Vec<CandidateSource>,
    seed: Option<u64>,
    export_file_name: Option<String>,
}

impl ReviewConfigBuilder {
    /// Set the reference directory.
    #[must_use]
    pub fn reference(mut self, path: impl Into<PathBuf>) -> Self {
        self.reference = Some(path.into());
        self
    }

    /// Add a candidate directory labelled with its directory name.
    #[must_use]
    pub fn candidate(self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        self.candidate_labeled(label, path)
    }

    /// Add a candidate directory with an explicit label.
    #[must_use]
    pub fn candidate_labeled(
        mut self,
        label: impl Into<CandidateLabel>,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.candidates.push(CandidateSource {
            label: label.into(),
            path: path.into(),
        });
        self
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the export file name.
    #[must_use]
    pub fn export_file_name(mut self, name: impl Into<String>) -> Self {
        self.export_file_name = Some(name.into());
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<ReviewConfig> {
        let reference = self
            .reference
            .ok_or_else(|| Error::Config("reference directory is required".to_string()))?;

        let config = ReviewConfig {
            reference,
            candidates: self.candidates,
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            export_file_name: self
                .export_file_name
                .unwrap_or_else(default_export_file_name),
        };
        config.validate()?;
        Ok(config)
    }
}

/// 1-based progress through a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// 1-based index of the current unit.
    pub current: usize,
    /// Number of units in the session.
    pub total: usize,
    /// Number of units with a stored rating.
    pub completed: usize,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

/// One reviewer's pass over the shuffled review units.
///
/// # Example
///
/// ```rust,ignore
/// use blind_review::{Criterion, ReviewConfig};
///
/// let config = ReviewConfig::builder()
///     .reference("InputCD4")
///     .candidate("RealCD4")
///     .candidate("OutputCD4")
///     .build()?;
///
/// let (collections, mut session) = config.start_session()?;
/// let images = collections.load_unit(session.current());
///
/// session.stage(Criterion::StructuralDetail, 4)?;
/// session.advance()?;
///
/// let artifact = session.export()?;
/// std::fs::write(&artifact.file_name, &artifact.bytes)?;
/// ```
#[derive(Debug)]
pub struct ReviewSession {
    units: Vec<ReviewUnit>,
    cursor: SessionCursor,
    store: ScoreStore,
    staged: StagedRating,
    exporter: ReportExporter,
    started_at: DateTime<Utc>,
}

impl ReviewSession {
    /// Resolve the eligible items and build the shuffled session.
    ///
    /// Candidate labels must be non-empty and unique ([`Error::Config`]).
    pub fn start(collections: &CollectionSet, seed: u64) -> Result<Self> {
        collections.check_labels()?;

        let items = collections.resolve_items()?;
        let labels = collections.labels();
        let units = shuffled_units(&items, &labels, seed);

        info!(
            items = items.len(),
            candidates = labels.len(),
            units = units.len(),
            seed,
            "Review session started"
        );
        Self::from_units(units)
    }

    /// Session over a prepared unit order.
    pub fn from_units(units: Vec<ReviewUnit>) -> Result<Self> {
        Self::resume(units, ScoreStore::new())
    }

    /// Session over a prepared unit order with previously stored ratings.
    ///
    /// The cursor starts on the first unit without a stored rating, or on the
    /// last unit if every unit is rated.
    pub fn resume(units: Vec<ReviewUnit>, store: ScoreStore) -> Result<Self> {
        if units.is_empty() {
            return Err(Error::NoEligibleItems);
        }

        let first_open = units
            .iter()
            .position(|unit| !store.contains(unit))
            .unwrap_or(units.len() - 1);
        if !store.is_empty() {
            let planned: HashSet<&ReviewUnit> = units.iter().collect();
            let foreign = store.iter().filter(|e| !planned.contains(&e.unit)).count();
            if foreign > 0 {
                // Kept so they are exported again, but never shown.
                warn!(foreign, "Stored ratings for units outside this session");
            }
            info!(
                rated = store.completion_count(),
                position = first_open,
                "Review session resumed"
            );
        }

        Ok(Self {
            cursor: SessionCursor::at(first_open, units.len()),
            units,
            store,
            staged: StagedRating::default(),
            exporter: ReportExporter::default(),
            started_at: Utc::now(),
        })
    }

    /// Replace the exporter used by [`export`](Self::export).
    #[must_use]
    pub fn with_exporter(mut self, exporter: ReportExporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// The full review order.
    #[must_use]
    pub fn units(&self) -> &[ReviewUnit] {
        &self.units
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Always `false`; sessions are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// 0-based index of the current unit.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Cursor state.
    #[must_use]
    pub fn cursor_state(&self) -> CursorState {
        self.cursor.state()
    }

    /// Whether the cursor is on the last unit.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.cursor.is_last()
    }

    /// The unit being reviewed.
    #[must_use]
    pub fn current(&self) -> &ReviewUnit {
        &self.units[self.cursor.position()]
    }

    /// Progress for display.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            current: self.cursor.position() + 1,
            total: self.units.len(),
            completed: self.store.completion_count(),
        }
    }

    /// When the session was created.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Stored ratings.
    #[must_use]
    pub fn store(&self) -> &ScoreStore {
        &self.store
    }

    /// Stage one score for the current unit.
    ///
    /// Out-of-range values fail with [`Error::InvalidScore`] and nothing
    /// changes.
    pub fn stage(&mut self, criterion: Criterion, value: u8) -> Result<()> {
        self.staged.stage(criterion, value)
    }

    /// Stage all three scores for the current unit at once.
    pub fn stage_rating(&mut self, rating: Rating) -> Result<()> {
        rating.validate()?;
        for &criterion in Criterion::all() {
            self.staged.stage(criterion, rating.get(criterion))?;
        }
        Ok(())
    }

    /// Scores staged for the current unit.
    #[must_use]
    pub fn staged(&self) -> &StagedRating {
        &self.staged
    }

    /// Rating shown for the current unit: staged fields over the stored
    /// rating, defaulting to 5.
    #[must_use]
    pub fn displayed_rating(&self) -> Rating {
        self.staged.resolve(self.store.get(self.current()))
    }

    /// Persist the current unit's rating without moving.
    pub fn record_and_stay(&mut self) -> Result<()> {
        let unit = self.current().clone();
        let rating = self.displayed_rating();
        debug!(unit = %unit, ?rating, "Rating recorded");
        self.store.set(unit, rating)
    }

    /// Persist the current unit's rating, then move to the next unit.
    ///
    /// On the last unit this does nothing and returns `false`.
    pub fn advance(&mut self) -> Result<bool> {
        if !self.cursor.can_advance() {
            debug!(position = self.cursor.position(), "Already on the last unit");
            return Ok(false);
        }

        self.record_and_stay()?;
        self.cursor.advance();
        self.staged.clear();
        debug!(position = self.cursor.position(), "Advanced");
        Ok(true)
    }

    /// Persist the current unit's rating and serialize every stored rating.
    ///
    /// A failed export leaves the stored ratings as they were, apart from
    /// the current unit having been recorded; it can be retried.
    pub fn export(&mut self) -> Result<ExportArtifact> {
        self.record_and_stay()?;
        self.exporter.export(&self.store)
    }
}
