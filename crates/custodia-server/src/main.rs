//! Custodia Server — application entry point.
//!
//! Bootstraps logging, configuration, the database connection, and
//! schema migrations. The HTTP transport is wired on top of the
//! `custodia-auth` services by the deployment.

use std::env;
use std::process::ExitCode;

use custodia_auth::AuthConfig;
use custodia_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64_or(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn auth_config_from_env() -> AuthConfig {
    AuthConfig {
        jwt_secret: env_or("CUSTODIA_JWT_SECRET", ""),
        access_token_lifetime_secs: env_u64_or("CUSTODIA_ACCESS_TOKEN_TTL_SECS", 900),
        refresh_token_lifetime_secs: env_u64_or("CUSTODIA_REFRESH_TOKEN_TTL_SECS", 2_592_000),
        totp_issuer: env_or("CUSTODIA_TOTP_ISSUER", "Custodia"),
        ..Default::default()
    }
}

fn db_config_from_env() -> DbConfig {
    DbConfig {
        url: env_or("CUSTODIA_DB_URL", "127.0.0.1:8000"),
        namespace: env_or("CUSTODIA_DB_NAMESPACE", "custodia"),
        database: env_or("CUSTODIA_DB_NAME", "main"),
        username: env_or("CUSTODIA_DB_USER", "root"),
        password: env_or("CUSTODIA_DB_PASSWORD", "root"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("custodia=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting Custodia server...");

    let auth_config = auth_config_from_env();
    if let Err(e) = auth_config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        return ExitCode::FAILURE;
    }

    let db_config = db_config_from_env();
    let manager = match DbManager::connect(&db_config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to SurrealDB");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = custodia_db::run_migrations(manager.client()).await {
        tracing::error!(error = %e, "failed to run migrations");
        return ExitCode::FAILURE;
    }

    tracing::info!("Custodia core ready; waiting for transport wiring.");

    ExitCode::SUCCESS
}
