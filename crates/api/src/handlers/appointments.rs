//! # Public Booking Handlers
//!
//! Endpoints used by clients without an account: booking a slot with a
//! payment receipt, checking a booking by its short code, and the lookups
//! the booking form needs (free hours, visible types, active bank accounts).

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use slotbook_core::{
    errors::BookingError,
    models::{
        appointment::{
            AppointmentStatusResponse, AvailableHoursResponse, BookingForm,
            CreateAppointmentResponse,
        },
        appointment_type::AppointmentTypeListResponse,
        bank_account::BankAccountListResponse,
    },
};
use tracing::warn;

use crate::{ApiState, middleware::error_handling::AppError, storage::StoredFile};

#[derive(Debug, Default, Deserialize)]
pub struct AvailableHoursQuery {
    #[serde(default)]
    pub date: String,
}

/// An uploaded file as received in the multipart body.
struct Upload {
    file_name: String,
    bytes: Bytes,
}

fn set_form_field(form: &mut BookingForm, name: &str, value: String) {
    match name {
        "firstName" => form.first_name = value,
        "lastName" => form.last_name = value,
        "email" => form.email = value,
        "phoneNumber" => form.phone_number = value,
        "appointmentDate" => form.appointment_date = value,
        "appointmentHour" => form.appointment_hour = value,
        "appointmentTypeID" => form.appointment_type_id = value,
        "bankTransfer" => form.bank_transfer = value,
        _ => {}
    }
}

async fn read_booking_form(
    mut multipart: Multipart,
) -> Result<(BookingForm, Option<Upload>), AppError> {
    let mut form = BookingForm::default();
    let mut receipt = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "receipt" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            receipt = Some(Upload { file_name, bytes });
        } else {
            let value = field.text().await?;
            set_form_field(&mut form, &name, value);
        }
    }

    Ok((form, receipt))
}

/// Serves a stored receipt with a content type guessed from its extension.
pub fn receipt_response(file: StoredFile) -> Response {
    ([(header::CONTENT_TYPE, file.content_type)], file.bytes).into_response()
}

/// Books a slot
///
/// # Endpoint
///
/// ```text
/// POST /appointments (multipart/form-data)
/// ```
///
/// The form is validated in full before the receipt is written. If the
/// appointment cannot be stored the receipt is removed again.
///
/// # Errors
///
/// * 400 - missing fields, malformed values, hidden type, missing or
///   unsupported receipt
/// * 404 - unknown appointment type
/// * 409 - blocked, past or taken slot
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreateAppointmentResponse>), AppError> {
    let (form, receipt) = read_booking_form(multipart).await?;
    let draft = state.appointments.prepare(&form).await?;

    let receipt = receipt
        .filter(|upload| !upload.file_name.is_empty())
        .ok_or_else(|| BookingError::validation("Receipt file is required"))?;
    let receipt_path = state
        .receipts
        .save(&receipt.file_name, &receipt.bytes)
        .await?;

    let appointment = match state.appointments.create(draft, receipt_path.clone()).await {
        Ok(appointment) => appointment,
        Err(e) => {
            warn!("Booking failed after receipt upload, removing {}", receipt_path);
            state.receipts.remove(&receipt_path).await;
            return Err(e.into());
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateAppointmentResponse {
            message: "Appointment created successfully".to_string(),
            short_id: appointment.short_id,
            id: appointment.id,
            status: appointment.status,
        }),
    ))
}

/// Public status of a booking by its 8-character code
#[axum::debug_handler]
pub async fn get_by_short_id(
    State(state): State<Arc<ApiState>>,
    Path(short_id): Path<String>,
) -> Result<Json<AppointmentStatusResponse>, AppError> {
    let status = state.appointments.status(&short_id).await?;
    Ok(Json(status))
}

#[axum::debug_handler]
pub async fn get_receipt_by_short_id(
    State(state): State<Arc<ApiState>>,
    Path(short_id): Path<String>,
) -> Result<Response, AppError> {
    let appointment = state.appointments.find_by_short_id(&short_id).await?;
    let file = state.receipts.read(&appointment.receipt_path).await?;
    Ok(receipt_response(file))
}

/// Free hours of a date
///
/// # Endpoint
///
/// ```text
/// GET /appointments/available-hours?date=2025-03-10
/// ```
#[axum::debug_handler]
pub async fn available_hours(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<AvailableHoursQuery>,
) -> Result<Json<AvailableHoursResponse>, AppError> {
    let response = state.appointments.available_hours(&query.date).await?;
    Ok(Json(response))
}

/// Appointment types offered on the booking form
#[axum::debug_handler]
pub async fn list_types(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<AppointmentTypeListResponse>, AppError> {
    let appointment_types = state.catalog.visible_types().await?;
    Ok(Json(AppointmentTypeListResponse { appointment_types }))
}

/// Bank accounts clients can transfer to
#[axum::debug_handler]
pub async fn list_bank_accounts(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<BankAccountListResponse>, AppError> {
    let accounts = state.catalog.active_accounts().await?;
    Ok(Json(BankAccountListResponse { accounts }))
}
