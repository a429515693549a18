/// Middleware modules for the API server
///
/// - Security headers applied to every response
///
/// Bearer token resolution lives in `warden_shared::auth::middleware` so it
/// can be shared by any service built on the same credential store.

pub mod security;
