/// Admin endpoints behind bearer authentication
pub mod admin;
/// Public booking endpoints
pub mod appointments;
/// Sign-in and current user
pub mod auth;
/// Liveness and version
pub mod health;
