//! # Error Handling Middleware
//!
//! This module provides a standardized way to handle errors in the SlotBook API.
//! It maps domain errors to HTTP status codes and JSON error responses, so every
//! handler reports failures with the same `{"error": message}` body.
//!
//! Server-side failures (database and internal errors) are logged in full and
//! answered with a generic message.

use axum::{
    Json,
    extract::{FromRequest, multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use slotbook_core::errors::BookingError;
use tracing::error;

/// Message returned in place of any 500 error detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application error wrapper that provides HTTP status code mapping
///
/// `AppError` wraps domain `BookingError` values and implements
/// `IntoResponse` to convert them into HTTP responses with appropriate
/// status codes and JSON payloads.
///
/// # Example
///
/// ```
/// use axum::Json;
/// use slotbook_api::middleware::error_handling::AppError;
/// use slotbook_core::errors::BookingError;
///
/// async fn handler(date: Option<String>) -> Result<Json<String>, AppError> {
///     let date = date.ok_or_else(|| BookingError::validation("Date parameter is required"))?;
///     Ok(Json(date))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub BookingError);

impl AppError {
    /// HTTP status for the wrapped error.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::InvalidTransition(_) => StatusCode::BAD_REQUEST,
            BookingError::Conflict(_) => StatusCode::CONFLICT,
            BookingError::Authentication(_) => StatusCode::UNAUTHORIZED,
            BookingError::Authorization(_) => StatusCode::FORBIDDEN,
            BookingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BookingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converts application errors to HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.0.to_string()
        };
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

/// Allows `?` on any `BookingResult` inside a handler.
impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

/// Infrastructure failures surface as database errors.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(BookingError::Database(err))
    }
}

/// A malformed multipart body is the caller's fault.
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError(BookingError::validation(format!("Invalid form data: {}", err.body_text())))
    }
}

/// JSON body extractor whose rejections carry the standard `{"error": ...}`
/// body with a 400 status instead of axum's plain-text 4xx.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(BookingError::validation(format!(
            "Invalid data: {}",
            rejection.body_text()
        )))
    }
}

/// Converts any error into a response, for use outside handler return types
pub fn map_error<E>(err: E) -> Response
where
    E: Into<AppError>,
{
    err.into().into_response()
}
