//! Tenant cascade manager — coordinated tenant/user bulk updates.

use tracing::info;
use uuid::Uuid;

use custodia_core::error::CustodiaResult;
use custodia_core::models::tenant::Tenant;
use custodia_core::repository::{CascadeImpact, TenantRepository, UserRepository};

/// Administrative tenant operations whose effects propagate to every
/// member user within the same transaction.
pub struct TenantAdmin<T: TenantRepository, U: UserRepository> {
    tenant_repo: T,
    user_repo: U,
}

impl<T: TenantRepository, U: UserRepository> TenantAdmin<T, U> {
    pub fn new(tenant_repo: T, user_repo: U) -> Self {
        Self {
            tenant_repo,
            user_repo,
        }
    }

    /// Rename a tenant and cascade the new name to the denormalized
    /// `tenant_name` column of every member user. Returns the updated
    /// tenant and the number of users touched (0 for a zero-user tenant
    /// or when no name was supplied).
    pub async fn update_tenant(
        &self,
        tenant_id: Uuid,
        name: Option<String>,
    ) -> CustodiaResult<(Tenant, u64)> {
        let (tenant, users_affected) = self.tenant_repo.rename_cascade(tenant_id, name).await?;
        info!(tenant_id = %tenant.id, users_affected, "tenant rename cascade applied");
        Ok((tenant, users_affected))
    }

    /// Activate or deactivate a tenant and every member user with it.
    /// Reactivation restores all members; there is no partial form.
    pub async fn update_tenant_status(
        &self,
        tenant_id: Uuid,
        is_active: bool,
    ) -> CustodiaResult<(Tenant, u64)> {
        let (tenant, users_affected) =
            self.tenant_repo.status_cascade(tenant_id, is_active).await?;
        info!(tenant_id = %tenant.id, is_active, users_affected, "tenant status cascade applied");
        Ok((tenant, users_affected))
    }

    /// Read-only impact counts for pre-cascade confirmation.
    pub async fn cascade_impact(&self, tenant_id: Uuid) -> CustodiaResult<CascadeImpact> {
        self.user_repo.cascade_impact(tenant_id).await
    }
}
