//! Refresh token domain model.
//!
//! Refresh tokens are revoked, never deleted — revocation is monotonic
//! and a revoked or expired token is permanently unusable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Opaque random value presented by clients; globally unique.
    pub token: String,
    /// Optional OAuth2 client identifier, carried through rotation.
    pub client_id: Option<String>,
    /// Optional OAuth2 scope string, carried through rotation.
    pub scope: Option<String>,
    pub is_revoked: bool,
    /// UTC instant; values read from storage are UTC by convention.
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateRefreshToken {
    pub user_id: Uuid,
    pub token: String,
    pub client_id: Option<String>,
    pub scope: Option<String>,
    pub expires_at: DateTime<Utc>,
}
