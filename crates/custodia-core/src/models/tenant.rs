//! Tenant domain model.
//!
//! A tenant is an isolated account owning a set of users. Tenants
//! authenticate with their own email + password; the email is the
//! tenant's sole human-facing identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// Globally unique; normalized to lowercase at the repository
    /// boundary.
    pub email: String,
    /// Optional display name, denormalized onto member users and kept
    /// in sync by the rename cascade.
    pub name: Option<String>,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new tenant.
#[derive(Debug, Clone)]
pub struct CreateTenant {
    pub email: String,
    pub name: Option<String>,
    /// Already hashed — the auth layer owns the password hasher.
    pub password_hash: String,
}
