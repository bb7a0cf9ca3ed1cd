//! Session gate — bearer-token validation and request-context guards.

use tracing::warn;
use uuid::Uuid;

use custodia_core::error::{CustodiaError, CustodiaResult};
use custodia_core::models::role::Role;
use custodia_core::models::user::User;
use custodia_core::repository::{TenantRepository, UserRepository};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token;

/// Exact, case-sensitive header prefix; `bearer ` is rejected.
const BEARER_PREFIX: &str = "Bearer ";

/// Validates inbound bearer tokens and resolves the acting user.
///
/// Every call re-reads the store — there is no in-process caching of
/// credentials, which is the correctness-over-latency tradeoff an auth
/// boundary wants.
pub struct SessionGate<T: TenantRepository, U: UserRepository> {
    tenant_repo: T,
    user_repo: U,
    config: AuthConfig,
}

impl<T: TenantRepository, U: UserRepository> SessionGate<T, U> {
    pub fn new(tenant_repo: T, user_repo: U, config: AuthConfig) -> Self {
        Self {
            tenant_repo,
            user_repo,
            config,
        }
    }

    /// Resolve the acting user from a raw `Authorization` header value.
    ///
    /// Validates the token signature and expiry, parses the subject and
    /// tenant claims, cross-checks the tenant claim against the live
    /// user record when tenant isolation is enabled, and enforces
    /// active status on the user and then its tenant.
    pub async fn authenticate(&self, authorization: &str) -> CustodiaResult<User> {
        let raw = authorization.strip_prefix(BEARER_PREFIX).ok_or_else(|| {
            AuthError::TokenInvalid("invalid authorization header format".into())
        })?;

        let claims = token::decode_access_token(raw, &self.config)?;

        let user_id: Uuid = claims
            .sub
            .parse()
            .map_err(|_| AuthError::TokenInvalid("invalid user id in token".into()))?;
        let token_tenant_id: Uuid = claims
            .tenant_id
            .parse()
            .map_err(|_| AuthError::TokenInvalid("invalid tenant id in token".into()))?;

        let user = self
            .user_repo
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| CustodiaError::AuthenticationFailed {
                reason: "user not found".into(),
            })?;

        // A tenant claim that disagrees with the live record signals
        // tampering or a cross-tenant attempt — authorization, not
        // authentication, fails.
        if self.config.enforce_tenant_isolation && user.tenant_id != token_tenant_id {
            warn!(user_id = %user.id, "tenant id mismatch between token and user record");
            return Err(CustodiaError::AuthorizationDenied {
                reason: "tenant mismatch between token and user record".into(),
            });
        }

        if !user.is_active {
            return Err(AuthError::AccountDisabled.into());
        }

        let tenant = self
            .tenant_repo
            .get_by_id(user.tenant_id)
            .await?
            .ok_or_else(|| CustodiaError::AuthenticationFailed {
                reason: "tenant not found".into(),
            })?;
        if !tenant.is_active {
            return Err(AuthError::TenantDisabled.into());
        }

        Ok(user)
    }

    /// Require the OWNER role.
    pub fn require_owner(&self, user: &User) -> CustodiaResult<()> {
        if user.role != Role::Owner {
            return Err(CustodiaError::AuthorizationDenied {
                reason: format!("requires OWNER role, current role is {}", user.role),
            });
        }
        Ok(())
    }

    /// Require ADMIN or OWNER (owner permissions cover admin).
    pub fn require_admin_or_owner(&self, user: &User) -> CustodiaResult<()> {
        if !user.role.is_at_least(Role::Admin) {
            return Err(CustodiaError::AuthorizationDenied {
                reason: format!(
                    "requires ADMIN or OWNER role, current role is {}",
                    user.role
                ),
            });
        }
        Ok(())
    }

    /// Guard (re-)enrollment: the user must not already have TOTP
    /// enabled.
    pub fn require_totp_disabled(&self, user: &User) -> CustodiaResult<()> {
        if user.is_totp_enabled {
            return Err(AuthError::TotpAlreadyEnabled.into());
        }
        Ok(())
    }
}
