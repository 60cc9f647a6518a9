//! Error types for the ConectAR marketplace.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// Unique-constraint violation (duplicate email, service type, ...).
    #[error("{reason}")]
    AlreadyExists { entity: String, reason: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Access denied: {reason}")]
    Forbidden { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn already_exists(entity: &str, reason: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            reason: reason.into(),
        }
    }
}

pub type MarketResult<T> = Result<T, MarketError>;
