//! # blind-review
//!
//! Blind image review sessions.
//!
//! A reviewer is shown a reference image next to one candidate image at a
//! time, in a shuffled but reproducible order, and gives each candidate three
//! scores from 1 to 5. This library owns that workflow: it finds the items
//! shared by every collection, builds the review order, keeps the ratings and
//! exports them as a sheet. Rendering is left to the caller.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use blind_review::{Criterion, ReviewConfig};
//!
//! let config = ReviewConfig::builder()
//!     .reference("InputCD4")
//!     .candidate("RealCD4")
//!     .candidate("OutputCD4")
//!     .build()?;
//!
//! let (collections, mut session) = config.start_session()?;
//!
//! let images = collections.load_unit(session.current());
//! session.stage(Criterion::StructuralDetail, 4)?;
//! session.advance()?;
//!
//! let artifact = session.export()?;
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`collection`]: Image collections and eligible item resolution
//! - [`review`]: Shuffling, ratings, session state and report export
//! - [`import`]: Reading a previous export back for resuming
//! - [`stats`]: Statistics over exported ratings

pub mod collection;
pub mod error;
pub mod import;
pub mod review;
pub mod stats;

// Re-export commonly used types
pub use collection::{CollectionSet, DirectoryCollection, ImageCollection, MemoryCollection, UnitImages};
pub use error::{Error, Result};
pub use import::ScoreImporter;
pub use review::{
    CandidateLabel, Criterion, ExportArtifact, ItemId, Progress, Rating, ReportExporter, ReportRow,
    ReviewConfig, ReviewSession, ReviewUnit, ScoreStore,
};
pub use stats::{LabelSummary, Summary};
