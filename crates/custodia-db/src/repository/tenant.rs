//! SurrealDB implementation of [`TenantRepository`].
//!
//! The multi-row operations (tenant-with-owner creation and the two
//! cascades) run as single multi-statement transactions so the tenant
//! update and the bulk user update commit or roll back together.

use chrono::{DateTime, Utc};
use custodia_core::error::CustodiaResult;
use custodia_core::models::tenant::{CreateTenant, Tenant};
use custodia_core::models::user::User;
use custodia_core::repository::TenantRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::user::UserRow;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TenantRow {
    email: String,
    name: Option<String>,
    password_hash: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_tenant(self, id: Uuid) -> Tenant {
        Tenant {
            id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    email: String,
    name: Option<String>,
    password_hash: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRowWithId {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(Tenant {
            id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> CustodiaResult<Tenant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('tenant', $id) SET \
                 email = $email, \
                 name = $name, \
                 password_hash = $password_hash",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email.to_lowercase()))
            .bind(("name", input.name))
            .bind(("password_hash", input.password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id))
    }

    async fn create_with_owner(&self, input: CreateTenant) -> CustodiaResult<(Tenant, User)> {
        let tenant_id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();
        let email = input.email.to_lowercase();

        // The owner carries the tenant's email as username and email and
        // shares its password hash. Both records commit or neither does.
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('tenant', $tenant_id) SET \
                 email = $email, \
                 name = $name, \
                 password_hash = $password_hash; \
                 CREATE type::record('user', $owner_id) SET \
                 tenant_id = $tenant_id, \
                 username = $email, \
                 email = $email, \
                 password_hash = $password_hash, \
                 role = 'OWNER', \
                 tenant_name = $name; \
                 COMMIT TRANSACTION;",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("owner_id", owner_id.to_string()))
            .bind(("email", email))
            .bind(("name", input.name))
            .bind(("password_hash", input.password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let tenant_rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let tenant = tenant_rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "tenant".into(),
                id: tenant_id.to_string(),
            })?
            .into_tenant(tenant_id);

        let user_rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let owner = user_rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "user".into(),
                id: owner_id.to_string(),
            })?
            .into_user(owner_id)?;

        Ok((tenant, owner))
    }

    async fn get_by_id(&self, id: Uuid) -> CustodiaResult<Option<Tenant>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(|row| row.into_tenant(id)))
    }

    async fn get_by_email(&self, email: &str) -> CustodiaResult<Option<Tenant>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM tenant WHERE email = $email")
            .bind(("email", email.to_lowercase()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.try_into_tenant().map_err(Into::into))
            .transpose()
    }

    async fn rename_cascade(
        &self,
        id: Uuid,
        name: Option<String>,
    ) -> CustodiaResult<(Tenant, u64)> {
        // No new name: the tenant is only read (existence check) and no
        // user rows are touched.
        let Some(name) = name else {
            let tenant = self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::NotFound {
                    entity: "tenant".into(),
                    id: id.to_string(),
                })?;
            return Ok((tenant, 0));
        };

        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 UPDATE type::record('tenant', $id) SET \
                 name = $name, updated_at = time::now(); \
                 UPDATE user SET tenant_name = $name, \
                 updated_at = time::now() \
                 WHERE tenant_id = $id RETURN VALUE meta::id(id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", name))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let tenant_rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let tenant = tenant_rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "tenant".into(),
                id: id_str,
            })?
            .into_tenant(id);

        let touched: Vec<String> = result.take(1).map_err(DbError::from)?;
        Ok((tenant, touched.len() as u64))
    }

    async fn status_cascade(&self, id: Uuid, is_active: bool) -> CustodiaResult<(Tenant, u64)> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 UPDATE type::record('tenant', $id) SET \
                 is_active = $is_active, updated_at = time::now(); \
                 UPDATE user SET is_active = $is_active, \
                 updated_at = time::now() \
                 WHERE tenant_id = $id RETURN VALUE meta::id(id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str.clone()))
            .bind(("is_active", is_active))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let tenant_rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let tenant = tenant_rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "tenant".into(),
                id: id_str,
            })?
            .into_tenant(id);

        let touched: Vec<String> = result.take(1).map_err(DbError::from)?;
        Ok((tenant, touched.len() as u64))
    }
}
