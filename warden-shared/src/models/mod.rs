/// Database models for Warden
///
/// - `user`: User accounts (the credential records read by the auth core)

pub mod user;
