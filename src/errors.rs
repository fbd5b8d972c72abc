//! Unified error types for `SubTrack`.
//!
//! Core operations return [`Error`]; the API layer maps each variant to an
//! HTTP status and the JSON response envelope.

use serde::Serialize;
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Request field the failure refers to, in its JSON spelling (e.g. `billingCycle`)
    pub field: String,
    /// Human-readable description of the problem
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application error type.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more request fields failed validation
    #[error("Validation failed: {} error(s)", .errors.len())]
    Validation {
        /// Every field error found, in field order
        errors: Vec<FieldError>,
    },

    /// The subscription does not exist, belongs to someone else, or is inactive
    #[error("Subscription not found: {id}")]
    SubscriptionNotFound {
        /// Requested subscription id, as given by the caller
        id: String,
    },

    /// Missing or unusable credentials on a protected request
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Reason, logged and returned to the caller
        message: String,
    },

    /// Login with an unknown email or a wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Password hashing or hash parsing failed
    #[error("Password hash error: {message}")]
    PasswordHash {
        /// Underlying error text
        message: String,
    },

    /// Database layer error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Token encoding error
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// I/O error (binding the listener, reading files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a validation error on a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldError::new(field, message)],
        }
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::PasswordHash {
            message: value.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
