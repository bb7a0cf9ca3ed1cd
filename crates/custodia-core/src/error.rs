//! Error types for the Custodia system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustodiaError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    /// The account has a second factor enabled and no code accompanied
    /// the request. Kept distinct from
    /// [`CustodiaError::AuthenticationFailed`] so callers can redirect
    /// to the second-factor flow instead of treating it as bad
    /// credentials.
    #[error("TOTP verification required")]
    TotpRequired,

    #[error("TOTP error: {reason}")]
    Totp { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CustodiaResult<T> = Result<T, CustodiaError>;
