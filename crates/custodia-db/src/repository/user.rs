//! SurrealDB implementation of [`UserRepository`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use custodia_core::error::CustodiaResult;
use custodia_core::models::role::Role;
use custodia_core::models::user::{CreateUser, User};
use custodia_core::repository::{CascadeImpact, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

pub(crate) fn parse_role(s: &str) -> Result<Role, DbError> {
    Role::from_str(s).map_err(|_| DbError::Decode(format!("unknown role: {s}")))
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
pub(crate) struct UserRow {
    pub(crate) tenant_id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) role: String,
    pub(crate) tenant_name: Option<String>,
    pub(crate) totp_secret: Option<String>,
    pub(crate) is_totp_enabled: bool,
    pub(crate) is_active: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_user(self, id: Uuid) -> Result<User, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Decode(format!("invalid tenant UUID: {e}")))?;
        Ok(User {
            id,
            tenant_id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            tenant_name: self.tenant_name,
            totp_secret: self.totp_secret,
            is_totp_enabled: self.is_totp_enabled,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    tenant_id: String,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    tenant_name: Option<String>,
    totp_secret: Option<String>,
    is_totp_enabled: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Decode(format!("invalid tenant UUID: {e}")))?;
        Ok(User {
            id,
            tenant_id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            tenant_name: self.tenant_name,
            totp_secret: self.totp_secret,
            is_totp_enabled: self.is_totp_enabled,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> CustodiaResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 tenant_id = $tenant_id, \
                 username = $username, \
                 email = $email, \
                 password_hash = $password_hash, \
                 role = $role, \
                 tenant_name = $tenant_name",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("username", input.username))
            .bind(("email", input.email.to_lowercase()))
            .bind(("password_hash", input.password_hash))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("tenant_name", input.tenant_name))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> CustodiaResult<Option<User>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_user(id)?)),
            None => Ok(None),
        }
    }

    async fn get_by_email(&self, email: &str) -> CustodiaResult<Option<User>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM user WHERE email = $email")
            .bind(("email", email.to_lowercase()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.try_into_user().map_err(Into::into))
            .transpose()
    }

    async fn get_by_tenant_and_username(
        &self,
        tenant_id: Uuid,
        username: &str,
    ) -> CustodiaResult<Option<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE tenant_id = $tenant_id AND username = $username",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("username", username.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.try_into_user().map_err(Into::into))
            .transpose()
    }

    async fn get_tenant_owner(&self, tenant_id: Uuid) -> CustodiaResult<Option<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE tenant_id = $tenant_id AND role = 'OWNER' \
                 ORDER BY created_at ASC LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.try_into_user().map_err(Into::into))
            .transpose()
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> CustodiaResult<User> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 is_active = $is_active, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("is_active", is_active))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn set_totp_secret(&self, id: Uuid, secret: &str) -> CustodiaResult<User> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 totp_secret = $secret, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("secret", secret.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn enable_totp(&self, id: Uuid) -> CustodiaResult<User> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 is_totp_enabled = true, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn cascade_impact(&self, tenant_id: Uuid) -> CustodiaResult<CascadeImpact> {
        let tenant_id_str = tenant_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM user \
                 WHERE tenant_id = $tenant_id GROUP ALL; \
                 SELECT count() AS total FROM user \
                 WHERE tenant_id = $tenant_id AND is_active = true GROUP ALL",
            )
            .bind(("tenant_id", tenant_id_str))
            .await
            .map_err(DbError::from)?;

        let total_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = total_rows.first().map(|r| r.total).unwrap_or(0);

        let active_rows: Vec<CountRow> = result.take(1).map_err(DbError::from)?;
        let active = active_rows.first().map(|r| r.total).unwrap_or(0);

        Ok(CascadeImpact {
            total_users: total,
            active_users: active,
            inactive_users: total - active,
        })
    }
}
