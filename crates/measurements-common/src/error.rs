//! Common error type used throughout the measurements store.
//!
//! Every failure funnels into [`Error`]. The variants separate input that was
//! rejected before touching storage, lookups that matched nothing, and
//! failures reported by the storage engine itself, so a handler layer can map
//! each to its own response via [`Error::http_status`].

use std::fmt;

/// Unified error type for the measurements store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input failed validation before any storage access.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "measurement", "experiment").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The storage engine or connection pool reported a failure.
    #[error("Database error ({context}): {source}")]
    Database {
        /// Operation and identifier the failure occurred in.
        context: String,
        /// The underlying engine error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to the HTTP status code a handler should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound { .. } => 404,
            Error::Database { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Database {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::Internal`].
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Whether this error reports a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Whether this error was raised by input validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
