//! Integration tests for the session gate.

use custodia_auth::config::AuthConfig;
use custodia_auth::gate::SessionGate;
use custodia_auth::service::AuthService;
use custodia_auth::{token, totp};
use custodia_core::error::CustodiaError;
use custodia_core::models::role::Role;
use custodia_core::models::user::User;
use custodia_db::repository::{
    SurrealRefreshTokenRepository, SurrealTenantRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type TestService = AuthService<
    SurrealTenantRepository<Db>,
    SurrealUserRepository<Db>,
    SurrealRefreshTokenRepository<Db>,
>;
type TestGate = SessionGate<SurrealTenantRepository<Db>, SurrealUserRepository<Db>>;

fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "0123456789abcdef0123456789abcdef".into(),
        ..Default::default()
    }
}

/// In-memory DB with one auto-provisioned tenant owner.
async fn setup() -> (TestService, TestGate, User, Surreal<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    custodia_db::run_migrations(&db).await.unwrap();

    let svc = AuthService::new(
        SurrealTenantRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        SurrealRefreshTokenRepository::new(db.clone()),
        test_config(),
    );
    let gate = SessionGate::new(
        SurrealTenantRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        test_config(),
    );

    let owner = svc
        .login_tenant_owner("co@x.com", "p12345678", None, None)
        .await
        .unwrap()
        .owner;

    (svc, gate, owner, db)
}

fn bearer(user: &User) -> String {
    let jwt = token::issue_access_token(user, vec![], None, &test_config()).unwrap();
    format!("Bearer {jwt}")
}

#[tokio::test]
async fn valid_token_resolves_user() {
    let (_svc, gate, owner, _db) = setup().await;

    let resolved = gate.authenticate(&bearer(&owner)).await.unwrap();
    assert_eq!(resolved.id, owner.id);
    assert_eq!(resolved.tenant_id, owner.tenant_id);
}

#[tokio::test]
async fn bearer_prefix_is_case_sensitive() {
    let (_svc, gate, owner, _db) = setup().await;
    let header = bearer(&owner);

    let lowercase = header.replacen("Bearer ", "bearer ", 1);
    let err = gate.authenticate(&lowercase).await.unwrap_err();
    assert!(matches!(err, CustodiaError::AuthenticationFailed { .. }));

    let err = gate.authenticate("Basic abc123").await.unwrap_err();
    assert!(matches!(err, CustodiaError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let (_svc, gate, owner, _db) = setup().await;
    let header = format!("{}x", bearer(&owner));

    let err = gate.authenticate(&header).await.unwrap_err();
    assert!(matches!(err, CustodiaError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn unparseable_subject_is_rejected() {
    let (_svc, gate, owner, _db) = setup().await;

    // Hand-roll claims whose subject is not a valid id.
    let config = test_config();
    let now = chrono::Utc::now().timestamp();
    let claims = custodia_auth::AccessTokenClaims {
        sub: "not-an-id".into(),
        email: owner.email.clone(),
        tenant_id: owner.tenant_id.to_string(),
        role: owner.role,
        iat: now,
        exp: now + 900,
        scopes: vec![],
        aud: None,
    };
    let key = jsonwebtoken::EncodingKey::from_secret(config.jwt_secret.as_bytes());
    let jwt = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(config.jwt_algorithm),
        &claims,
        &key,
    )
    .unwrap();

    let err = gate.authenticate(&format!("Bearer {jwt}")).await.unwrap_err();
    assert!(matches!(err, CustodiaError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn unknown_user_is_rejected() {
    let (_svc, gate, owner, _db) = setup().await;

    let mut ghost = owner.clone();
    ghost.id = Uuid::new_v4();

    let err = gate.authenticate(&bearer(&ghost)).await.unwrap_err();
    match err {
        CustodiaError::AuthenticationFailed { reason } => {
            assert!(reason.contains("not found"), "expected 'not found': {reason}");
        }
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn tenant_mismatch_is_an_authorization_error() {
    let (_svc, gate, owner, _db) = setup().await;

    // Token claims a different tenant than the live user record.
    let mut forged = owner.clone();
    forged.tenant_id = Uuid::new_v4();

    let err = gate.authenticate(&bearer(&forged)).await.unwrap_err();
    assert!(matches!(err, CustodiaError::AuthorizationDenied { .. }));
}

#[tokio::test]
async fn tenant_mismatch_passes_when_isolation_disabled() {
    let (_svc, _gate, owner, db) = setup().await;

    let lax = SessionGate::new(
        SurrealTenantRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        AuthConfig {
            enforce_tenant_isolation: false,
            ..test_config()
        },
    );

    let mut forged = owner.clone();
    forged.tenant_id = Uuid::new_v4();

    let resolved = lax.authenticate(&bearer(&forged)).await.unwrap();
    assert_eq!(resolved.id, owner.id);
}

#[tokio::test]
async fn inactive_user_is_rejected() {
    let (_svc, gate, owner, db) = setup().await;

    use custodia_core::repository::UserRepository;
    SurrealUserRepository::new(db.clone())
        .set_active(owner.id, false)
        .await
        .unwrap();

    let err = gate.authenticate(&bearer(&owner)).await.unwrap_err();
    assert!(matches!(err, CustodiaError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn inactive_tenant_is_rejected() {
    let (_svc, gate, owner, db) = setup().await;

    // Deactivate the tenant but leave the user active, bypassing the
    // cascade, to prove the gate checks the tenant row itself.
    db.query("UPDATE type::record('tenant', $id) SET is_active = false")
        .bind(("id", owner.tenant_id.to_string()))
        .await
        .unwrap()
        .check()
        .unwrap();

    let err = gate.authenticate(&bearer(&owner)).await.unwrap_err();
    match err {
        CustodiaError::AuthenticationFailed { reason } => {
            assert!(reason.contains("disabled"), "expected 'disabled': {reason}");
        }
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    }
}

// -----------------------------------------------------------------------
// Role and TOTP guards
// -----------------------------------------------------------------------

#[tokio::test]
async fn role_guards() {
    let (svc, gate, owner, _db) = setup().await;

    let admin = svc
        .register(owner.tenant_id, "adm", "adm@example.com", "s3cret-pw", Role::Admin)
        .await
        .unwrap();
    let member = svc
        .register(owner.tenant_id, "mem", "mem@example.com", "s3cret-pw", Role::Member)
        .await
        .unwrap();

    assert!(gate.require_owner(&owner).is_ok());
    assert!(gate.require_owner(&admin).is_err());
    assert!(gate.require_owner(&member).is_err());

    assert!(gate.require_admin_or_owner(&owner).is_ok());
    assert!(gate.require_admin_or_owner(&admin).is_ok());
    assert!(matches!(
        gate.require_admin_or_owner(&member).unwrap_err(),
        CustodiaError::AuthorizationDenied { .. }
    ));
}

#[tokio::test]
async fn totp_disabled_guard() {
    let (svc, gate, owner, _db) = setup().await;

    assert!(gate.require_totp_disabled(&owner).is_ok());

    let setup = svc.totp_setup(owner.id).await.unwrap();
    let code = totp::current_code(&setup.secret).unwrap();
    let enrolled = svc.totp_verify(owner.id, &code).await.unwrap();

    assert!(matches!(
        gate.require_totp_disabled(&enrolled).unwrap_err(),
        CustodiaError::Totp { .. }
    ));
}
