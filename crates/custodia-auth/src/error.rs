//! Authentication error types.

use custodia_core::error::CustodiaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Generic credential failure. The same variant covers unknown
    /// identities and wrong passwords so the message cannot be used as
    /// a user-existence oracle.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user account is disabled")]
    AccountDisabled,

    #[error("tenant account is disabled")]
    TenantDisabled,

    #[error("TOTP verification required")]
    TotpRequired,

    #[error("invalid TOTP code")]
    TotpInvalidCode,

    #[error("TOTP is already enabled for this user")]
    TotpAlreadyEnabled,

    #[error("TOTP setup not initiated")]
    TotpNotInitiated,

    #[error("TOTP is not enabled for this user")]
    TotpNotEnabled,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for CustodiaError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountDisabled
            | AuthError::TenantDisabled
            | AuthError::TotpInvalidCode
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => CustodiaError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::TotpRequired => CustodiaError::TotpRequired,
            AuthError::TotpAlreadyEnabled
            | AuthError::TotpNotInitiated
            | AuthError::TotpNotEnabled => CustodiaError::Totp {
                reason: err.to_string(),
            },
            AuthError::Config(msg) => CustodiaError::Validation { message: msg },
            AuthError::Crypto(msg) => CustodiaError::Crypto(msg),
        }
    }
}
