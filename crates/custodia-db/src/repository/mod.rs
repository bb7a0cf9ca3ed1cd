//! SurrealDB repository implementations.

mod refresh_token;
mod tenant;
mod user;

pub use refresh_token::SurrealRefreshTokenRepository;
pub use tenant::SurrealTenantRepository;
pub use user::SurrealUserRepository;
