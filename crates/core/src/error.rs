//! Error types for the web-to-deck conversion pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting markup content into a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// The selector matched nothing in the source document.
    #[error("No content found for selector '{0}'")]
    ContentNotFound(String),

    /// The source document itself could not be retrieved.
    #[error("Failed to fetch source document: {0}")]
    SourceFetch(String),

    /// A single image could not be fetched or decoded.
    #[error("Failed to fetch image '{url}': {reason}")]
    ImageFetch { url: String, reason: String },

    /// A computed value violated a layout invariant. This is a bug report,
    /// not a normal error path.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error (writing the deck package).
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML serialization error (writing the deck package).
    #[error("XML error: {0}")]
    Xml(String),
}
