//! JWT access token issuance/verification and opaque refresh token
//! generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use custodia_core::models::role::Role;
use custodia_core::models::user::User;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject — user ID (UUID string).
    pub sub: String,
    /// User email.
    pub email: String,
    /// Tenant ID (UUID string) for multi-tenant isolation.
    pub tenant_id: String,
    /// Role within the tenant.
    pub role: Role,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// OAuth2 scopes (possibly empty).
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Optional audience (resource indicator). Not enforced at decode
    /// time; callers check it where it matters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Issue a signed access token for a user.
///
/// Signature and expiry are the token's only integrity guarantees:
/// there is no revocation list, so a token stays valid until `exp`
/// regardless of later account changes.
pub fn issue_access_token(
    user: &User,
    scopes: Vec<String>,
    audience: Option<String>,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = AccessTokenClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        tenant_id: user.tenant_id.to_string(),
        role: user.role,
        iat: now,
        exp: now + config.access_token_lifetime_secs as i64,
        scopes,
        aud: audience,
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    let header = Header::new(config.jwt_algorithm);
    jsonwebtoken::encode(&header, &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify an access token.
///
/// Fails with [`AuthError::TokenExpired`] past expiry and
/// [`AuthError::TokenInvalid`] on signature mismatch, malformed
/// structure, or a header naming any other algorithm. The audience
/// claim is NOT enforced here.
pub fn decode_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(config.jwt_algorithm);
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["sub", "exp"]);

    jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Generate a cryptographically random opaque refresh token
/// (32 bytes → base64url-encoded, no padding).
///
/// Uniqueness is probabilistic; the store's unique index on the token
/// column is the backstop.
pub fn generate_refresh_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}
