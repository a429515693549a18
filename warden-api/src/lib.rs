//! # Warden API Server Library
//!
//! HTTP surface for the Warden credential service: registration, password
//! login that issues bearer tokens, and a token-protected current-user
//! endpoint.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
