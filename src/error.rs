//! Error types for blind-review operations.

use thiserror::Error;

/// Result type alias for blind-review operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing, running or exporting a review session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An input collection could not be listed.
    #[error("Collection unavailable: {collection}: {reason}")]
    CollectionUnavailable {
        /// Name of the collection (directory path or label).
        collection: String,
        /// Reason for the failure.
        reason: String,
    },

    /// No item is present in the reference and every candidate collection.
    #[error("No eligible items: the reference and candidate collections share no item")]
    NoEligibleItems,

    /// A rating field is outside the closed range 1..=5.
    #[error("Invalid score for {criterion}: {value} (expected 1-5)")]
    InvalidScore {
        /// Column name of the rejected field.
        criterion: &'static str,
        /// Rejected value.
        value: u8,
    },

    /// The image bytes for an item could not be read.
    #[error("Missing image {item} in {collection}: {reason}")]
    MissingImage {
        /// Collection the image was read from.
        collection: String,
        /// Item identifier.
        item: String,
        /// Reason for the failure.
        reason: String,
    },

    /// The report could not be serialized.
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// Invalid review configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error reading back a previous export.
    #[error("Score import error at line {line}: {reason}")]
    Import {
        /// Line number where the error occurred.
        line: usize,
        /// Reason for the failure.
        reason: String,
    },

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A workbook could not be opened or read.
    #[error("Workbook error: {0}")]
    Workbook(String),
}
