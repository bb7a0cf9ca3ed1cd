//! Integration tests for the tenant cascade manager.

use custodia_auth::cascade::TenantAdmin;
use custodia_auth::config::AuthConfig;
use custodia_auth::service::AuthService;
use custodia_core::error::CustodiaError;
use custodia_core::models::role::Role;
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
type TestAdmin = TenantAdmin<SurrealTenantRepository<Db>, SurrealUserRepository<Db>>;

fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "0123456789abcdef0123456789abcdef".into(),
        ..Default::default()
    }
}

/// One tenant with an owner and two registered members (3 users total).
async fn setup() -> (TestService, TestAdmin, Uuid, Surreal<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    custodia_db::run_migrations(&db).await.unwrap();

    let svc = AuthService::new(
        SurrealTenantRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        SurrealRefreshTokenRepository::new(db.clone()),
        test_config(),
    );
    let admin = TenantAdmin::new(
        SurrealTenantRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
    );

    let tenant = svc
        .login_tenant_owner("co@x.com", "p12345678", Some("Acme".into()), None)
        .await
        .unwrap()
        .tenant;
    for (username, email) in [("alice", "alice@example.com"), ("bob", "bob@example.com")] {
        svc.register(tenant.id, username, email, "s3cret-pw", Role::Member)
            .await
            .unwrap();
    }

    (svc, admin, tenant.id, db)
}

#[tokio::test]
async fn status_cascade_deactivates_and_blocks_logins() {
    let (svc, admin, tenant_id, _db) = setup().await;

    let (tenant, affected) = admin.update_tenant_status(tenant_id, false).await.unwrap();
    assert!(!tenant.is_active);
    assert_eq!(affected, 3);

    let impact = admin.cascade_impact(tenant_id).await.unwrap();
    assert_eq!(impact.total_users, 3);
    assert_eq!(impact.inactive_users, 3);

    // A deactivated member cannot log in any more.
    let err = svc
        .login("alice@example.com", "s3cret-pw", None, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CustodiaError::AuthenticationFailed { .. }));

    // Reactivation restores everyone.
    let (tenant, affected) = admin.update_tenant_status(tenant_id, true).await.unwrap();
    assert!(tenant.is_active);
    assert_eq!(affected, 3);
    svc.login("alice@example.com", "s3cret-pw", None, None, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn rename_cascade_propagates_to_members() {
    let (svc, admin, tenant_id, _db) = setup().await;

    let (tenant, affected) = admin
        .update_tenant(tenant_id, Some("Acme Renamed".into()))
        .await
        .unwrap();
    assert_eq!(tenant.name.as_deref(), Some("Acme Renamed"));
    assert_eq!(affected, 3);

    // Freshly registered users pick up the new denormalized name.
    let user = svc
        .register(tenant_id, "carol", "carol@example.com", "s3cret-pw", Role::Member)
        .await
        .unwrap();
    assert_eq!(user.tenant_name.as_deref(), Some("Acme Renamed"));
}

#[tokio::test]
async fn cascades_reject_unknown_tenant() {
    let (_svc, admin, _tenant_id, _db) = setup().await;

    assert!(matches!(
        admin.update_tenant(Uuid::new_v4(), Some("x".into())).await,
        Err(CustodiaError::NotFound { .. })
    ));
    assert!(matches!(
        admin.update_tenant_status(Uuid::new_v4(), false).await,
        Err(CustodiaError::NotFound { .. })
    ));
}
