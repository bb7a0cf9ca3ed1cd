//! SurrealDB implementation of [`RefreshTokenRepository`].
//!
//! Revocation is monotonic: tokens flip to `is_revoked = true` and are
//! never deleted or un-revoked. Consumption is a single conditional
//! UPDATE so two concurrent rotations of one token cannot both succeed.

use chrono::{DateTime, Utc};
use custodia_core::error::CustodiaResult;
use custodia_core::models::refresh_token::{CreateRefreshToken, RefreshToken};
use custodia_core::repository::RefreshTokenRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TokenRow {
    user_id: String,
    token: String,
    client_id: Option<String>,
    scope: Option<String>,
    is_revoked: bool,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TokenRow {
    fn into_token(self, id: Uuid) -> Result<RefreshToken, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Decode(format!("invalid user UUID: {e}")))?;
        Ok(RefreshToken {
            id,
            user_id,
            token: self.token,
            client_id: self.client_id,
            scope: self.scope,
            is_revoked: self.is_revoked,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TokenRowWithId {
    record_id: String,
    user_id: String,
    token: String,
    client_id: Option<String>,
    scope: Option<String>,
    is_revoked: bool,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TokenRowWithId {
    fn try_into_token(self) -> Result<RefreshToken, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Decode(format!("invalid user UUID: {e}")))?;
        Ok(RefreshToken {
            id,
            user_id,
            token: self.token,
            client_id: self.client_id,
            scope: self.scope,
            is_revoked: self.is_revoked,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the RefreshToken repository.
#[derive(Clone)]
pub struct SurrealRefreshTokenRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRefreshTokenRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RefreshTokenRepository for SurrealRefreshTokenRepository<C> {
    async fn create(&self, input: CreateRefreshToken) -> CustodiaResult<RefreshToken> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('refresh_token', $id) SET \
                 user_id = $user_id, \
                 token = $token, \
                 client_id = $client_id, \
                 scope = $scope, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("token", input.token))
            .bind(("client_id", input.client_id))
            .bind(("scope", input.scope))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TokenRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "refresh_token".into(),
            id: id_str,
        })?;

        Ok(row.into_token(id)?)
    }

    async fn get_by_token(&self, token: &str) -> CustodiaResult<Option<RefreshToken>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM refresh_token \
                 WHERE token = $token",
            )
            .bind(("token", token.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TokenRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.try_into_token().map_err(Into::into))
            .transpose()
    }

    async fn consume(&self, token: &str) -> CustodiaResult<bool> {
        // Conditional update: only a live token matches, so exactly one
        // concurrent caller observes a touched row.
        let mut result = self
            .db
            .query(
                "UPDATE refresh_token SET is_revoked = true \
                 WHERE token = $token AND is_revoked = false \
                 RETURN VALUE meta::id(id)",
            )
            .bind(("token", token.to_string()))
            .await
            .map_err(DbError::from)?;

        let touched: Vec<String> = result.take(0).map_err(DbError::from)?;
        Ok(!touched.is_empty())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> CustodiaResult<u64> {
        let mut result = self
            .db
            .query(
                "UPDATE refresh_token SET is_revoked = true \
                 WHERE user_id = $user_id AND is_revoked = false \
                 RETURN VALUE meta::id(id)",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let touched: Vec<String> = result.take(0).map_err(DbError::from)?;
        Ok(touched.len() as u64)
    }
}
