//! Custodia Core — domain models, repository traits, and shared error
//! types for the multi-tenant authentication service.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{CustodiaError, CustodiaResult};
