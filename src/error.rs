//! Custom error types for clinic-ledger
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for clinic-ledger operations
#[derive(Error, Debug)]
pub enum ClinicError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Caller is not signed in or lacks the required role
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The log entry cannot be reversed
    #[error("Log entry cannot be undone: {0}")]
    NotUndoable(String),

    /// A delete/update undo was requested but no prior snapshot was stored
    #[error("Log entry has no previous-state snapshot")]
    MissingSnapshot,

    /// The log entry has already been undone
    #[error("Log entry has already been undone")]
    AlreadyUndone,

    /// The underlying business-entity mutation failed during an undo
    #[error("Entity mutation failed: {0}")]
    EntityMutation(String),

    /// A package has no sessions left to consume
    #[error("No remaining sessions in package '{package}'")]
    NoSessionsLeft { package: String },
}

impl ClinicError {
    /// Create a "not found" error for clients
    pub fn client_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Client",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for service packages
    pub fn service_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Service",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for payments
    pub fn payment_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Payment",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for appointments
    pub fn appointment_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Appointment",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for log entries
    pub fn log_entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "LogEntry",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for ClinicError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ClinicError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for clinic-ledger operations
pub type ClinicResult<T> = Result<T, ClinicError>;
