//! Error types for the banking support core

use thiserror::Error;

/// Result type alias for support-core operations
pub type Result<T> = std::result::Result<T, SupportError>;

#[derive(Error, Debug)]
pub enum SupportError {

    // =============================
    // Domain Errors
    // =============================

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ticket not found: {0}")]
    TicketNotFound(uuid::Uuid),

    #[error("Store error: {0}")]
    StoreError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
