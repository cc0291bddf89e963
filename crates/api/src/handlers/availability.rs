//! # Availability Rule Handlers
//!
//! Admin management of the rules that block days or hours. A rule is keyed
//! either on a weekday (0 = Sunday) or on a specific date, and there is at
//! most one rule per key: creating a rule for a key that already has one
//! overwrites it.
//!
//! ## Status codes
//!
//! - `POST /weekday` and `POST /specific-date` answer 201 when a rule was
//!   created and 200 when an existing one was overwritten.
//! - Hours outside 0..=23 and weekdays outside 0..=6 are rejected with 400.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use slotbook_core::models::rule::{
    RuleListResponse, RuleMutationResponse, RuleResponse, SpecificDateRuleRequest,
    UpdateRuleRequest, Upserted, WeekdayRuleRequest,
};

use crate::{
    ApiState,
    handlers::MessageResponse,
    middleware::error_handling::{AppError, AppJson},
};

fn upsert_response(
    rule: RuleResponse,
    outcome: Upserted,
) -> (StatusCode, Json<RuleMutationResponse>) {
    let (status, message) = match outcome {
        Upserted::Created => (StatusCode::CREATED, "Rule created successfully"),
        Upserted::Updated => (StatusCode::OK, "Rule updated successfully"),
    };
    (
        status,
        Json(RuleMutationResponse {
            message: message.to_string(),
            rule,
        }),
    )
}

#[axum::debug_handler]
pub async fn list_rules(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<RuleListResponse>, AppError> {
    let rules = state.rules.list().await?;
    Ok(Json(RuleListResponse { rules }))
}

/// Creates or overwrites the rule of a weekday
#[axum::debug_handler]
pub async fn upsert_weekday_rule(
    State(state): State<Arc<ApiState>>,
    AppJson(payload): AppJson<WeekdayRuleRequest>,
) -> Result<(StatusCode, Json<RuleMutationResponse>), AppError> {
    let (rule, outcome) = state.rules.upsert_weekday(&payload).await?;
    Ok(upsert_response(rule, outcome))
}

/// Creates or overwrites the rule of a calendar date
#[axum::debug_handler]
pub async fn upsert_specific_date_rule(
    State(state): State<Arc<ApiState>>,
    AppJson(payload): AppJson<SpecificDateRuleRequest>,
) -> Result<(StatusCode, Json<RuleMutationResponse>), AppError> {
    let (rule, outcome) = state.rules.upsert_specific_date(&payload).await?;
    Ok(upsert_response(rule, outcome))
}

#[axum::debug_handler]
pub async fn update_rule(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateRuleRequest>,
) -> Result<Json<RuleMutationResponse>, AppError> {
    let rule = state.rules.update(id, &payload).await?;
    Ok(Json(RuleMutationResponse {
        message: "Rule updated successfully".to_string(),
        rule,
    }))
}

#[axum::debug_handler]
pub async fn delete_rule(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    state.rules.delete(id).await?;
    Ok(Json(MessageResponse::new("Rule deleted successfully")))
}

#[axum::debug_handler]
pub async fn delete_weekday_rule(
    State(state): State<Arc<ApiState>>,
    Path(day): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.rules.delete_weekday(&day).await?;
    Ok(Json(MessageResponse::new("Weekday rule deleted successfully")))
}

#[axum::debug_handler]
pub async fn delete_specific_date_rule(
    State(state): State<Arc<ApiState>>,
    Path(date): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.rules.delete_specific_date(&date).await?;
    Ok(Json(MessageResponse::new(
        "Specific date rule deleted successfully",
    )))
}
