/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Token issuance (login)
/// - `users`: Registration and the current-user endpoint

pub mod auth;
pub mod health;
pub mod users;
