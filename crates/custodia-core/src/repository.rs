//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups return `Ok(None)` for
//! expected absence; `Err` is reserved for store failures. Multi-row
//! operations (tenant-with-owner creation, the two cascades, token
//! consumption) are transactional in the implementation.

use uuid::Uuid;

use crate::error::CustodiaResult;
use crate::models::refresh_token::{CreateRefreshToken, RefreshToken};
use crate::models::tenant::{CreateTenant, Tenant};
use crate::models::user::{CreateUser, User};

/// Read-only summary of how many users a tenant cascade would touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeImpact {
    pub total_users: u64,
    pub active_users: u64,
    pub inactive_users: u64,
}

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = CustodiaResult<Tenant>> + Send;

    /// Atomically create a tenant together with its OWNER user in one
    /// transaction. The owner's username and email are the tenant
    /// email; the password hash is shared.
    fn create_with_owner(
        &self,
        input: CreateTenant,
    ) -> impl Future<Output = CustodiaResult<(Tenant, User)>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CustodiaResult<Option<Tenant>>> + Send;

    /// Lookup by email. The argument may be any case; stored emails are
    /// lowercase.
    fn get_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = CustodiaResult<Option<Tenant>>> + Send;

    /// Rename cascade: set the tenant name and the denormalized
    /// `tenant_name` on every member user within one transaction.
    /// Returns the updated tenant and the number of users touched.
    /// A `None` name leaves every row unchanged (count 0).
    fn rename_cascade(
        &self,
        id: Uuid,
        name: Option<String>,
    ) -> impl Future<Output = CustodiaResult<(Tenant, u64)>> + Send;

    /// Status cascade: set `is_active` on the tenant and the same value
    /// on every member user within one transaction. Returns the updated
    /// tenant and the number of users touched.
    fn status_cascade(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> impl Future<Output = CustodiaResult<(Tenant, u64)>> + Send;
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = CustodiaResult<User>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CustodiaResult<Option<User>>> + Send;

    /// Global email lookup (emails are unique across tenants).
    fn get_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = CustodiaResult<Option<User>>> + Send;

    /// Tenant-scoped username lookup.
    fn get_by_tenant_and_username(
        &self,
        tenant_id: Uuid,
        username: &str,
    ) -> impl Future<Output = CustodiaResult<Option<User>>> + Send;

    /// First OWNER user of a tenant.
    fn get_tenant_owner(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = CustodiaResult<Option<User>>> + Send;

    /// Directly activate or deactivate a single user. Tenant-wide
    /// changes go through [`TenantRepository::status_cascade`].
    fn set_active(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> impl Future<Output = CustodiaResult<User>> + Send;

    /// Store an (unverified) TOTP secret for a user.
    fn set_totp_secret(
        &self,
        id: Uuid,
        secret: &str,
    ) -> impl Future<Output = CustodiaResult<User>> + Send;

    /// Flip `is_totp_enabled` after a successful verification step.
    fn enable_totp(&self, id: Uuid) -> impl Future<Output = CustodiaResult<User>> + Send;

    /// Total/active/inactive user counts for a tenant.
    fn cascade_impact(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = CustodiaResult<CascadeImpact>> + Send;
}

pub trait RefreshTokenRepository: Send + Sync {
    fn create(
        &self,
        input: CreateRefreshToken,
    ) -> impl Future<Output = CustodiaResult<RefreshToken>> + Send;

    /// Lookup by the opaque token value.
    fn get_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = CustodiaResult<Option<RefreshToken>>> + Send;

    /// Atomically revoke a live token. Returns `true` iff this call
    /// performed the revocation; `false` when the token was already
    /// revoked or never existed. Two concurrent calls for the same
    /// token cannot both observe `true`.
    fn consume(&self, token: &str) -> impl Future<Output = CustodiaResult<bool>> + Send;

    /// Revoke every live token belonging to a user. Returns the number
    /// of tokens newly revoked.
    fn revoke_all_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = CustodiaResult<u64>> + Send;
}
