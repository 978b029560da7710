//! Review sessions and report generation.
//!
//! This module provides the core review infrastructure:
//!
//! - [`shuffle`]: Reproducible pairing and ordering of review units
//! - [`store::ScoreStore`]: Ratings keyed by review unit
//! - [`cursor::SessionCursor`]: Forward-only position in the order
//! - [`session::ReviewSession`]: The state a reviewer works through
//! - [`report`]: Flattening ratings into an exported sheet

pub mod cursor;
pub mod rating;
pub mod report;
pub mod session;
pub mod shuffle;
pub mod store;
mod unit;

pub use cursor::{CursorState, SessionCursor};
pub use rating::{Criterion, Rating, StagedRating};
pub use report::{
    CsvSheet, ExportArtifact, ReportExporter, ReportRow, SheetWriter, XlsxSheet, sheet_writer_for,
};
pub use session::{CandidateSource, Progress, ReviewConfig, ReviewSession};
pub use shuffle::{DEFAULT_SEED, Mt19937};
pub use store::{ScoreEntry, ScoreStore};
pub use unit::{CandidateLabel, ItemId, ReviewUnit};
