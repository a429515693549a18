//! # Warden Shared Library
//!
//! Authentication core and persistence used by the Warden API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, bearer tokens, login and identity resolution
//! - `store`: Credential store trait with Postgres and in-memory backends
//! - `models`: Database models
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the Warden shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
