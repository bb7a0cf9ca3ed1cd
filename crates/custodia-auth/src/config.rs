//! Authentication configuration.

use jsonwebtoken::Algorithm;

use crate::error::AuthError;

/// Configuration for the authentication service.
///
/// Constructed once at startup and passed into each component; there is
/// no ambient global.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Symmetric JWT signing secret (minimum 32 characters).
    pub jwt_secret: String,
    /// JWT signing algorithm (default: HS256). Tokens signed with any
    /// other algorithm are rejected at decode time.
    pub jwt_algorithm: Algorithm,
    /// Access token lifetime in seconds (default: 900 = 15 minutes).
    pub access_token_lifetime_secs: u64,
    /// Refresh token lifetime in seconds (default: 2_592_000 = 30 days).
    pub refresh_token_lifetime_secs: u64,
    /// Issuer name shown in authenticator apps.
    pub totp_issuer: String,
    /// Whether the session gate cross-checks the token's tenant claim
    /// against the live user record.
    pub enforce_tenant_isolation: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_algorithm: Algorithm::HS256,
            access_token_lifetime_secs: 900,
            refresh_token_lifetime_secs: 2_592_000,
            totp_issuer: "Custodia".into(),
            enforce_tenant_isolation: true,
        }
    }
}

impl AuthConfig {
    /// Reject configurations with a weak signing secret.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < 32 {
            return Err(AuthError::Config(
                "jwt secret must be at least 32 characters".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_is_rejected() {
        let config = AuthConfig {
            jwt_secret: "too-short".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn long_secret_passes() {
        let config = AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".into(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
