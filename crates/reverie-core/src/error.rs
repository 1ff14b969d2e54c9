//! Error types for reverie-core

use thiserror::Error;

/// Result type alias using reverie-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in reverie-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry not found in any attempted backend
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Remote store could not be reached or refused the operation
    #[error("Remote store unavailable: {0}")]
    StoreUnavailable(String),

    /// Invalid calendar window or range bounds
    #[error("Invalid date range: {0}")]
    DateRange(String),

    /// Corrupt persisted payload
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// External analysis collaborator failed
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// Memory resurfacing requires an active entitlement
    #[error("Memory resurfacing requires an active entitlement")]
    EntitlementRequired,
}
