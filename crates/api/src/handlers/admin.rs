//! # Admin Appointment Handlers
//!
//! Review queue and state transitions for appointments, plus the monthly
//! calendar. Every route here sits behind
//! [`require_auth`](crate::middleware::auth::require_auth).
//!
//! Transitions return the updated appointment together with a message:
//!
//! | action | allowed from |
//! |---|---|
//! | approve | pending, approved, rejected (slot re-checked) |
//! | reject | pending, approved, rejected |
//! | done | approved |
//! | move | pending, approved, rejected |

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use slotbook_core::{
    errors::BookingError,
    models::appointment::{
        Appointment, AppointmentActionResponse, AppointmentDetail, AppointmentListResponse,
        ApproveRequest, CalendarResponse, ListAppointmentsQuery, MoveRequest, RejectRequest,
    },
};
use uuid::Uuid;

use crate::{
    ApiState,
    handlers::appointments::receipt_response,
    middleware::error_handling::{AppError, AppJson},
};

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    /// `YYYY-MM`
    #[serde(default)]
    pub month: String,
}

fn action_response(message: &str, appointment: Appointment) -> Json<AppointmentActionResponse> {
    Json(AppointmentActionResponse {
        message: message.to_string(),
        appointment,
    })
}

/// Lists appointments
///
/// # Endpoint
///
/// ```text
/// GET /admin/appointments?status=pending&month=2025-03&orderBy=created_at&orderDir=desc
/// ```
///
/// Every query parameter is optional. `orderBy` is one of `appointment_date`,
/// `appointment_hour`, `created_at`, `status`, `last_name`; anything else is
/// rejected with 400.
#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<Json<AppointmentListResponse>, AppError> {
    let appointments = state.appointments.list(&query).await?;
    Ok(Json(AppointmentListResponse { appointments }))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentDetail>, AppError> {
    let detail = state.appointments.detail(id).await?;
    Ok(Json(detail))
}

#[axum::debug_handler]
pub async fn get_receipt(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let appointment = state.appointments.find(id).await?;
    let file = state.receipts.read(&appointment.receipt_path).await?;
    Ok(receipt_response(file))
}

/// An empty body approves without a link or note; anything else must be a
/// valid `ApproveRequest`.
fn approve_request(body: &[u8]) -> Result<ApproveRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApproveRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| BookingError::validation(format!("Invalid data: {e}")).into())
}

/// Approves an appointment. The body is optional.
#[axum::debug_handler]
pub async fn approve_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<AppointmentActionResponse>, AppError> {
    let request = approve_request(&body)?;
    let appointment = state.appointments.approve(id, request).await?;
    Ok(action_response("Appointment approved successfully", appointment))
}

#[axum::debug_handler]
pub async fn reject_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<RejectRequest>,
) -> Result<Json<AppointmentActionResponse>, AppError> {
    let appointment = state.appointments.reject(id, payload).await?;
    Ok(action_response("Appointment rejected successfully", appointment))
}

#[axum::debug_handler]
pub async fn mark_done(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentActionResponse>, AppError> {
    let appointment = state.appointments.mark_done(id).await?;
    Ok(action_response("Appointment marked as done", appointment))
}

/// Moves an appointment to another slot
///
/// The target slot goes through the same checks as a public booking; the
/// appointment's own current slot does not count as taken.
#[axum::debug_handler]
pub async fn move_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<MoveRequest>,
) -> Result<Json<AppointmentActionResponse>, AppError> {
    let appointment = state.appointments.reschedule(id, payload).await?;
    Ok(action_response("Appointment moved successfully", appointment))
}

/// Appointments of a month grouped by day
///
/// # Endpoint
///
/// ```text
/// GET /admin/calendar?month=2025-03
/// ```
#[axum::debug_handler]
pub async fn calendar(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let calendar = state.appointments.calendar(&query.month).await?;
    Ok(Json(calendar))
}
