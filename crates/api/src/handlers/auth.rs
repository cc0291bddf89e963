use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use slotbook_core::{
    errors::BookingError,
    models::user::{MeResponse, SignInRequest, SignInResponse, UserIdentity},
};
use tracing::info;

use crate::{
    ApiState,
    middleware::{
        auth::{AuthUser, issue_token, verify_password},
        error_handling::{AppError, AppJson},
    },
};

fn invalid_credentials() -> AppError {
    AppError(BookingError::Authentication(
        "Invalid email or password".to_string(),
    ))
}

/// Exchanges admin credentials for an access token
///
/// # Endpoint
///
/// ```text
/// POST /sign-in
/// ```
///
/// Unknown emails and wrong passwords get the same 401 response.
#[axum::debug_handler]
pub async fn sign_in(
    State(state): State<Arc<ApiState>>,
    AppJson(payload): AppJson<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(BookingError::validation("Email and password are required").into());
    }

    let user = state
        .users
        .find_by_email(email)
        .await?
        .ok_or_else(invalid_credentials)?;
    if !verify_password(&payload.password, &user.password_hash) {
        return Err(invalid_credentials());
    }

    let access_token = issue_token(user.id, &state.config.jwt_secret)?;
    info!("User {} signed in", user.email);

    Ok(Json(SignInResponse {
        message: "Sign in successfully".to_string(),
        access_token,
    }))
}

/// The user behind the bearer token
#[axum::debug_handler]
pub async fn me(Extension(AuthUser(user)): Extension<AuthUser>) -> Json<MeResponse> {
    Json(MeResponse {
        user: UserIdentity::from(&user),
    })
}
