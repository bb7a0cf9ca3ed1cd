//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Unique within the owning tenant.
    pub username: String,
    /// Globally unique across all tenants.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// Denormalized copy of `Tenant.name`, kept in sync by the rename
    /// cascade.
    pub tenant_name: Option<String>,
    /// Base32 TOTP secret. Set by enrollment setup; unverified until
    /// `is_totp_enabled` flips true.
    pub totp_secret: Option<String>,
    pub is_totp_enabled: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub tenant_id: Uuid,
    pub username: String,
    pub email: String,
    /// Already hashed — the auth layer owns the password hasher.
    pub password_hash: String,
    pub role: Role,
    /// Denormalized tenant name at creation time.
    pub tenant_name: Option<String>,
}
