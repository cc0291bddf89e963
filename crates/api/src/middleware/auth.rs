//! # Authentication Module
//!
//! This module provides authentication for the SlotBook admin API:
//! password hashing and verification, access token issuing, and the
//! middleware that guards every `/admin` route.
//!
//! Passwords are hashed with Argon2 and stored in PHC string format.
//! Access tokens are HS256 JWTs signed with `JWT_SECRET` and valid for
//! one hour.

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use eyre::{Result, eyre};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use slotbook_core::{errors::BookingError, models::user::User};
use tracing::debug;
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

/// Lifetime of an access token.
pub const TOKEN_TTL_SECONDS: i64 = 60 * 60;

/// JWT payload. `sub` is the user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// The signed-in admin, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Hashes a password using the Argon2 algorithm
///
/// A fresh random salt is generated for every call, so hashing the same
/// password twice yields different strings.
///
/// # Example
///
/// ```rust
/// use slotbook_api::middleware::auth::{hash_password, verify_password};
///
/// let hashed = hash_password("correct horse").expect("hashing works");
/// assert!(verify_password("correct horse", &hashed));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Checks a plain text password against a stored PHC hash.
///
/// A malformed hash never verifies.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            debug!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Issues an access token for `user_id`.
pub fn issue_token(user_id: Uuid, secret: &str) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(TOKEN_TTL_SECONDS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| eyre!("Error signing token: {}", e))
}

/// Validates signature and expiry, returning the claims.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, BookingError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        debug!("Rejected access token: {}", e);
        BookingError::Authentication("Invalid or expired token".to_string())
    })
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware guarding admin routes
///
/// Requires `Authorization: Bearer <token>` with a valid token whose subject
/// still exists. On success the user is available to handlers as
/// `Extension<AuthUser>`.
pub async fn require_auth(
    State(state): State<Arc<ApiState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or_else(|| BookingError::Authentication("Missing bearer token".to_string()))?;
    let claims = decode_token(token, &state.config.jwt_secret)?;

    let user = state
        .users
        .find(claims.sub)
        .await?
        .ok_or_else(|| BookingError::Authentication("User no longer exists".to_string()))?;

    request.extensions_mut().insert(AuthUser(user));
    Ok(next.run(request).await)
}
