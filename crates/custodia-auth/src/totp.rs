//! TOTP secret generation, provisioning URIs, and code verification.

use totp_rs::{Algorithm, Secret, TOTP};

use crate::error::AuthError;

// RFC 6238 defaults: SHA-1, 6 digits, 30-second step. A skew of one
// step tolerates adjacent-window codes for clock drift.
const DIGITS: usize = 6;
const SKEW: u8 = 1;
const STEP: u64 = 30;

fn build(secret_b32: &str, issuer: Option<&str>, account: &str) -> Result<TOTP, AuthError> {
    let secret_bytes = Secret::Encoded(secret_b32.to_string())
        .to_bytes()
        .map_err(|e| AuthError::Crypto(format!("invalid TOTP secret: {e:?}")))?;

    TOTP::new(
        Algorithm::SHA1,
        DIGITS,
        SKEW,
        STEP,
        secret_bytes,
        issuer.map(str::to_string),
        account.to_string(),
    )
    .map_err(|e| AuthError::Crypto(format!("TOTP init: {e}")))
}

/// Generate a fresh TOTP secret: 20 random bytes, base32-encoded to a
/// 32-character string over {A-Z, 2-7}.
pub fn generate_secret() -> String {
    Secret::generate_secret().to_encoded().to_string()
}

/// Build the `otpauth://totp/...` provisioning URI for authenticator
/// apps. Label and issuer are percent-encoded by the URI builder.
pub fn provisioning_uri(
    account: &str,
    secret_b32: &str,
    issuer: &str,
) -> Result<String, AuthError> {
    Ok(build(secret_b32, Some(issuer), account)?.get_url())
}

/// Current 6-digit code for a secret. Used by enrollment tests and
/// operator tooling, never by the login path.
pub fn current_code(secret_b32: &str) -> Result<String, AuthError> {
    build(secret_b32, None, "")?
        .generate_current()
        .map_err(|e| AuthError::Crypto(format!("TOTP clock: {e}")))
}

/// Verify a candidate code against the current time step (plus the
/// adjacent steps allowed by the skew).
///
/// A valid code may be presented again within its validity window;
/// there is no replay tracking.
pub fn verify_code(secret_b32: &str, code: &str) -> Result<bool, AuthError> {
    build(secret_b32, None, "")?
        .check_current(code)
        .map_err(|e| AuthError::Crypto(format!("TOTP check: {e}")))
}
