//! Authentication service — registration, login, token rotation, and
//! TOTP flows.

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use custodia_core::error::{CustodiaError, CustodiaResult};
use custodia_core::models::refresh_token::CreateRefreshToken;
use custodia_core::models::role::Role;
use custodia_core::models::tenant::{CreateTenant, Tenant};
use custodia_core::models::user::{CreateUser, User};
use custodia_core::repository::{RefreshTokenRepository, TenantRepository, UserRepository};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;
use crate::totp;

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Result of the tenant-owner login flow.
#[derive(Debug)]
pub struct TenantLogin {
    pub tenant: Tenant,
    pub owner: User,
    /// True when the tenant was auto-provisioned by this call.
    pub is_new: bool,
    pub tokens: TokenPair,
}

/// TOTP enrollment material. QR rendering is the caller's collaborator;
/// the provisioning URI is the payload to encode.
#[derive(Debug)]
pub struct TotpSetup {
    pub secret: String,
    pub provisioning_uri: String,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer has
/// no dependency on the database crate. Every operation is
/// request-scoped: state lives only in the store.
pub struct AuthService<T, U, R>
where
    T: TenantRepository,
    U: UserRepository,
    R: RefreshTokenRepository,
{
    tenant_repo: T,
    user_repo: U,
    token_repo: R,
    config: AuthConfig,
}

impl<T, U, R> AuthService<T, U, R>
where
    T: TenantRepository,
    U: UserRepository,
    R: RefreshTokenRepository,
{
    pub fn new(tenant_repo: T, user_repo: U, token_repo: R, config: AuthConfig) -> Self {
        Self {
            tenant_repo,
            user_repo,
            token_repo,
            config,
        }
    }

    /// Register a new user within a tenant.
    ///
    /// Email is unique across all tenants; username within the tenant.
    /// The plaintext password is hashed before it reaches the store and
    /// is never logged.
    pub async fn register(
        &self,
        tenant_id: Uuid,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> CustodiaResult<User> {
        let email = email.to_lowercase();

        if self.user_repo.get_by_email(&email).await?.is_some() {
            return Err(CustodiaError::AlreadyExists {
                entity: format!("user with email {email}"),
            });
        }
        if self
            .user_repo
            .get_by_tenant_and_username(tenant_id, username)
            .await?
            .is_some()
        {
            return Err(CustodiaError::AlreadyExists {
                entity: format!("username {username} in tenant"),
            });
        }

        let tenant = self
            .tenant_repo
            .get_by_id(tenant_id)
            .await?
            .ok_or_else(|| CustodiaError::NotFound {
                entity: "tenant".into(),
                id: tenant_id.to_string(),
            })?;

        let password_hash = password::hash_password(password)?;

        let user = self
            .user_repo
            .create(CreateUser {
                tenant_id,
                username: username.to_string(),
                email,
                password_hash,
                role,
                tenant_name: tenant.name.clone(),
            })
            .await?;

        info!(user_id = %user.id, tenant_id = %tenant_id, role = %user.role, "registered user");
        Ok(user)
    }

    /// Authenticate by global email + password and issue tokens.
    ///
    /// Identity and password failures produce the same generic error so
    /// the endpoint cannot be used as a user-existence oracle.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        totp_code: Option<&str>,
        client_id: Option<String>,
        scope: Option<String>,
    ) -> CustodiaResult<TokenPair> {
        let user = self
            .user_repo
            .get_by_email(&email.to_lowercase())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.check_credentials(&user, password, totp_code).await?;
        self.issue_tokens(&user, client_id, scope).await
    }

    /// Authenticate a member user of a tenant by tenant email +
    /// username.
    pub async fn login_tenant_user(
        &self,
        tenant_email: &str,
        username: &str,
        password: &str,
        totp_code: Option<&str>,
    ) -> CustodiaResult<TokenPair> {
        let tenant = self
            .tenant_repo
            .get_by_email(&tenant_email.to_lowercase())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let user = self
            .user_repo
            .get_by_tenant_and_username(tenant.id, username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.check_credentials(&user, password, totp_code).await?;
        self.issue_tokens(&user, None, None).await
    }

    /// Tenant-owner login with auto-provisioning.
    ///
    /// An unknown tenant email atomically creates the tenant plus its
    /// OWNER user. The TOTP gate is skipped for a just-created tenant —
    /// it cannot have a second factor configured yet.
    pub async fn login_tenant_owner(
        &self,
        tenant_email: &str,
        password: &str,
        tenant_name: Option<String>,
        totp_code: Option<&str>,
    ) -> CustodiaResult<TenantLogin> {
        let (tenant, owner, is_new) = self
            .authenticate_or_create_tenant(tenant_email, password, tenant_name)
            .await?;

        if !is_new {
            self.totp_gate(&owner, totp_code)?;
        }

        let tokens = self.issue_tokens(&owner, None, None).await?;
        Ok(TenantLogin {
            tenant,
            owner,
            is_new,
            tokens,
        })
    }

    /// Authenticate a tenant by email + password, creating it (with an
    /// OWNER user, username = tenant email, shared password hash) when
    /// absent.
    pub async fn authenticate_or_create_tenant(
        &self,
        tenant_email: &str,
        password: &str,
        tenant_name: Option<String>,
    ) -> CustodiaResult<(Tenant, User, bool)> {
        let email = tenant_email.to_lowercase();

        let Some(tenant) = self.tenant_repo.get_by_email(&email).await? else {
            let password_hash = password::hash_password(password)?;
            let (tenant, owner) = self
                .tenant_repo
                .create_with_owner(CreateTenant {
                    email,
                    name: tenant_name,
                    password_hash,
                })
                .await?;
            info!(tenant_id = %tenant.id, owner_id = %owner.id, "auto-provisioned tenant with owner");
            return Ok((tenant, owner, true));
        };

        if !password::verify_password(password, &tenant.password_hash)? {
            warn!(tenant_id = %tenant.id, "tenant password verification failed");
            return Err(AuthError::InvalidCredentials.into());
        }
        if !tenant.is_active {
            return Err(AuthError::TenantDisabled.into());
        }

        let owner = self
            .user_repo
            .get_tenant_owner(tenant.id)
            .await?
            .ok_or_else(|| CustodiaError::AuthenticationFailed {
                reason: "tenant owner not found".into(),
            })?;

        if !owner.is_active {
            return Err(AuthError::AccountDisabled.into());
        }

        Ok((tenant, owner, false))
    }

    /// Rotate a refresh token: classify it, verify the owner is still
    /// active, atomically consume the old token, and mint a new pair
    /// carrying forward the original client/scope metadata. Rotation is
    /// mandatory and unconditional — there is no reuse window.
    pub async fn refresh(&self, refresh_token: &str) -> CustodiaResult<TokenPair> {
        let stored = self
            .token_repo
            .get_by_token(refresh_token)
            .await?
            .ok_or_else(|| CustodiaError::AuthenticationFailed {
                reason: "invalid refresh token".into(),
            })?;

        if stored.is_revoked {
            warn!(token_id = %stored.id, "refresh attempted with revoked token");
            return Err(CustodiaError::AuthenticationFailed {
                reason: "refresh token has been revoked".into(),
            });
        }

        // Stored expirations are UTC instants; a naive value read from
        // the store is UTC by convention (see the repository crate).
        if stored.expires_at <= Utc::now() {
            return Err(CustodiaError::AuthenticationFailed {
                reason: "refresh token has expired".into(),
            });
        }

        let user = self
            .user_repo
            .get_by_id(stored.user_id)
            .await?
            .ok_or_else(|| CustodiaError::AuthenticationFailed {
                reason: "user not found".into(),
            })?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled.into());
        }

        // Single-use rotation: the conditional update guarantees exactly
        // one concurrent caller consumes the token; losers see it as
        // revoked.
        if !self.token_repo.consume(refresh_token).await? {
            warn!(token_id = %stored.id, "lost refresh rotation race");
            return Err(CustodiaError::AuthenticationFailed {
                reason: "refresh token has been revoked".into(),
            });
        }

        self.issue_tokens(&user, stored.client_id.clone(), stored.scope.clone())
            .await
    }

    /// Revoke a refresh token. Idempotent: an unknown or already-revoked
    /// token is a successful no-op — logout always succeeds from the
    /// caller's perspective.
    pub async fn logout(&self, refresh_token: &str) -> CustodiaResult<()> {
        if self.token_repo.consume(refresh_token).await? {
            info!("refresh token revoked on logout");
        }
        Ok(())
    }

    /// Revoke every refresh token belonging to a user (password change,
    /// compromise response). Returns the number of tokens touched.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> CustodiaResult<u64> {
        let count = self.token_repo.revoke_all_for_user(user_id).await?;
        info!(user_id = %user_id, count, "revoked all refresh tokens for user");
        Ok(count)
    }

    /// Begin TOTP enrollment: generate and store an unverified secret.
    ///
    /// 2FA stays off until a code is verified via
    /// [`AuthService::totp_verify`].
    pub async fn totp_setup(&self, user_id: Uuid) -> CustodiaResult<TotpSetup> {
        let user = self
            .user_repo
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| CustodiaError::NotFound {
                entity: "user".into(),
                id: user_id.to_string(),
            })?;

        if user.is_totp_enabled {
            return Err(AuthError::TotpAlreadyEnabled.into());
        }

        let secret = totp::generate_secret();
        self.user_repo.set_totp_secret(user_id, &secret).await?;

        let provisioning_uri =
            totp::provisioning_uri(&user.email, &secret, &self.config.totp_issuer)?;

        info!(user_id = %user.id, "TOTP enrollment started");
        Ok(TotpSetup {
            secret,
            provisioning_uri,
        })
    }

    /// Complete TOTP enrollment: verify a code from the authenticator
    /// and enable the second factor.
    pub async fn totp_verify(&self, user_id: Uuid, code: &str) -> CustodiaResult<User> {
        let user = self
            .user_repo
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| CustodiaError::NotFound {
                entity: "user".into(),
                id: user_id.to_string(),
            })?;

        let Some(secret) = user.totp_secret.as_deref() else {
            return Err(AuthError::TotpNotInitiated.into());
        };

        // Enrollment-time rejection is a TOTP-domain error, not a
        // credential failure.
        if !totp::verify_code(secret, code)? {
            return Err(CustodiaError::Totp {
                reason: "invalid TOTP code".into(),
            });
        }

        let user = self.user_repo.enable_totp(user_id).await?;
        info!(user_id = %user.id, "TOTP enabled");
        Ok(user)
    }

    /// Login path for 2FA-enabled accounts: password proof plus a TOTP
    /// code in one call.
    pub async fn totp_validate(
        &self,
        email: &str,
        password: &str,
        code: &str,
    ) -> CustodiaResult<TokenPair> {
        let user = self
            .user_repo
            .get_by_email(&email.to_lowercase())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "password verification failed");
            return Err(AuthError::InvalidCredentials.into());
        }
        self.ensure_active(&user).await?;

        if !user.is_totp_enabled {
            return Err(AuthError::TotpNotEnabled.into());
        }
        let secret = user.totp_secret.as_deref().ok_or_else(|| {
            CustodiaError::Internal("TOTP enabled without a stored secret".into())
        })?;
        if !totp::verify_code(secret, code)? {
            warn!(user_id = %user.id, "TOTP code rejected");
            return Err(AuthError::TotpInvalidCode.into());
        }

        self.issue_tokens(&user, None, None).await
    }

    /// Steps 2–4 of the login pipeline: password proof, active-status
    /// checks, TOTP gate. Status checks run strictly after password
    /// verification so disabled-account state never leaks to an
    /// unauthenticated caller.
    async fn check_credentials(
        &self,
        user: &User,
        password: &str,
        totp_code: Option<&str>,
    ) -> CustodiaResult<()> {
        if !password::verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "password verification failed");
            return Err(AuthError::InvalidCredentials.into());
        }

        self.ensure_active(user).await?;
        self.totp_gate(user, totp_code)?;
        Ok(())
    }

    async fn ensure_active(&self, user: &User) -> CustodiaResult<()> {
        if !user.is_active {
            return Err(AuthError::AccountDisabled.into());
        }
        let tenant = self
            .tenant_repo
            .get_by_id(user.tenant_id)
            .await?
            .ok_or_else(|| CustodiaError::NotFound {
                entity: "tenant".into(),
                id: user.tenant_id.to_string(),
            })?;
        if !tenant.is_active {
            return Err(AuthError::TenantDisabled.into());
        }
        Ok(())
    }

    /// TOTP gate: an enabled second factor requires a valid code. A
    /// missing code surfaces as the distinct "TOTP required" signal so
    /// callers can redirect to the second-factor flow; a wrong code is
    /// a credential failure.
    fn totp_gate(&self, user: &User, code: Option<&str>) -> CustodiaResult<()> {
        if !user.is_totp_enabled {
            return Ok(());
        }
        let Some(code) = code else {
            return Err(AuthError::TotpRequired.into());
        };
        let secret = user.totp_secret.as_deref().ok_or_else(|| {
            CustodiaError::Internal("TOTP enabled without a stored secret".into())
        })?;
        if !totp::verify_code(secret, code)? {
            warn!(user_id = %user.id, "TOTP code rejected");
            return Err(AuthError::TotpInvalidCode.into());
        }
        Ok(())
    }

    /// Mint one access token and one refresh token, persisting the
    /// refresh token with its optional OAuth2 metadata.
    async fn issue_tokens(
        &self,
        user: &User,
        client_id: Option<String>,
        scope: Option<String>,
    ) -> CustodiaResult<TokenPair> {
        let scopes: Vec<String> = scope
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let access_token = token::issue_access_token(user, scopes, None, &self.config)?;

        let refresh = token::generate_refresh_token();
        let expires_at =
            Utc::now() + Duration::seconds(self.config.refresh_token_lifetime_secs as i64);

        self.token_repo
            .create(CreateRefreshToken {
                user_id: user.id,
                token: refresh.clone(),
                client_id,
                scope,
                expires_at,
            })
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token: refresh,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }
}
