//! Admin management of appointment types and bank accounts.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use slotbook_core::models::{
    appointment_type::{
        AppointmentTypeListResponse, AppointmentTypeResponse, CreateAppointmentTypeRequest,
        UpdateVisibilityRequest,
    },
    bank_account::{
        BankAccountListResponse, BankAccountResponse, CreateBankAccountRequest,
        UpdateBankAccountRequest,
    },
};
use uuid::Uuid;

use crate::{
    ApiState,
    handlers::MessageResponse,
    middleware::error_handling::{AppError, AppJson},
};

/// Every appointment type, hidden ones included
#[axum::debug_handler]
pub async fn list_types(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<AppointmentTypeListResponse>, AppError> {
    let appointment_types = state.catalog.all_types().await?;
    Ok(Json(AppointmentTypeListResponse { appointment_types }))
}

#[axum::debug_handler]
pub async fn create_type(
    State(state): State<Arc<ApiState>>,
    AppJson(payload): AppJson<CreateAppointmentTypeRequest>,
) -> Result<(StatusCode, Json<AppointmentTypeResponse>), AppError> {
    let appointment_type = state.catalog.create_type(&payload.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(AppointmentTypeResponse { appointment_type }),
    ))
}

/// Shows or hides a type on the public booking form
#[axum::debug_handler]
pub async fn update_type_visibility(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateVisibilityRequest>,
) -> Result<Json<AppointmentTypeResponse>, AppError> {
    let appointment_type = state
        .catalog
        .set_type_visibility(id, payload.visible)
        .await?;
    Ok(Json(AppointmentTypeResponse { appointment_type }))
}

/// Every bank account, inactive ones included
#[axum::debug_handler]
pub async fn list_bank_accounts(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<BankAccountListResponse>, AppError> {
    let accounts = state.catalog.all_accounts().await?;
    Ok(Json(BankAccountListResponse { accounts }))
}

#[axum::debug_handler]
pub async fn create_bank_account(
    State(state): State<Arc<ApiState>>,
    AppJson(payload): AppJson<CreateBankAccountRequest>,
) -> Result<(StatusCode, Json<BankAccountResponse>), AppError> {
    let account = state.catalog.create_account(&payload).await?;
    Ok((StatusCode::CREATED, Json(BankAccountResponse { account })))
}

#[axum::debug_handler]
pub async fn update_bank_account(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateBankAccountRequest>,
) -> Result<Json<BankAccountResponse>, AppError> {
    let account = state.catalog.update_account(id, &payload).await?;
    Ok(Json(BankAccountResponse { account }))
}

/// Deactivates an account. Past appointments keep referencing it.
#[axum::debug_handler]
pub async fn deactivate_bank_account(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    state.catalog.deactivate_account(id).await?;
    Ok(Json(MessageResponse::new("Bank account deactivated")))
}
