//! Unified error type for the portal.
//!
//! Business logic in [`crate::core`] returns these variants; the HTTP layer maps
//! them onto status codes in `api::error`.

use thiserror::Error;

/// All errors produced by the portal.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Underlying ORM / database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A record was looked up by id and does not exist
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Entity kind (e.g. "Invoice")
        entity: &'static str,
        /// Identifier used for the lookup
        id: String,
    },

    /// Input failed a business rule
    #[error("{message}")]
    Validation {
        /// Message returned to the caller
        message: String,
    },

    /// Monetary or quantity value is negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected value
        amount: f64,
    },

    /// Missing or invalid session, or wrong role
    #[error("Unauthorized")]
    Unauthorized,

    /// Valid session that may not see the requested record
    #[error("Forbidden")]
    Forbidden,

    /// Session token could not be issued or decoded
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Password hashing failed
    #[error("Password hashing error: {0}")]
    Password(#[from] bcrypt::BcryptError),

    /// JSON column could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invoice document could not be rendered
    #[error("PDF rendering error: {message}")]
    Pdf {
        /// Renderer message
        message: String,
    },

    /// Blocking task (password hashing) panicked or was cancelled
    #[error("Background task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] keyed by a numeric id.
    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`Error::Validation`].
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
