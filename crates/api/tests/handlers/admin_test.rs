use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{TestContext, body_json};

async fn setup() -> (TestContext, String, i32) {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;
    let consultation = ctx.create_type("Consultation", true).await;
    (ctx, token, consultation.id)
}

async fn post_action(ctx: &TestContext, token: &str, id: Uuid, action: &str, body: Value) -> (StatusCode, Value) {
    let response = ctx
        .json(
            "POST",
            &format!("/admin/appointments/{id}/{action}"),
            Some(token),
            body,
        )
        .await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn move_to(ctx: &TestContext, token: &str, id: Uuid, date: &str, hour: u32) -> (StatusCode, Value) {
    let response = ctx
        .json(
            "PATCH",
            &format!("/admin/appointments/{id}/move"),
            Some(token),
            json!({ "newDate": date, "newHour": hour }),
        )
        .await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn send_raw(
    ctx: &TestContext,
    token: &str,
    method: &str,
    uri: &str,
    body: &'static str,
) -> (StatusCode, Value) {
    let response = ctx
        .send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .expect("Failed to build request"),
        )
        .await;
    let status = response.status();
    (status, body_json(response).await)
}

fn error_message(body: &Value) -> &str {
    body["error"].as_str().expect("error should be a string")
}

#[tokio::test]
async fn test_approve_sets_meeting_link_and_notifies() {
    let (mut ctx, token, type_id) = setup().await;
    let id = ctx.book_ok("2025-03-10", 10, type_id).await;
    ctx.drain_notifications();

    let (status, body) = post_action(
        &ctx,
        &token,
        id,
        "approve",
        json!({ "meetingLink": "https://meet.example.com/abc", "adminNote": "Bring ID" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Appointment approved successfully");
    assert_eq!(body["appointment"]["status"], "approved");
    assert_eq!(body["appointment"]["meetingLink"], "https://meet.example.com/abc");
    assert_eq!(body["appointment"]["adminNote"], "Bring ID");

    let notifications = ctx.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind(), "approved");
}

#[tokio::test]
async fn test_approve_accepts_empty_body() {
    let (ctx, token, type_id) = setup().await;
    let id = ctx.book_ok("2025-03-10", 10, type_id).await;

    let response = ctx
        .send(
            axum::http::Request::post(format!("/admin/appointments/{id}/approve"))
                .header(axum::http::header::AUTHORIZATION, format!("Bearer {token}"))
                .body(axum::body::Body::empty())
                .expect("Failed to build request"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["appointment"]["status"], "approved");
}

#[tokio::test]
async fn test_reject_requires_reason() {
    let (ctx, token, type_id) = setup().await;
    let id = ctx.book_ok("2025-03-10", 10, type_id).await;

    let (status, body) = post_action(&ctx, &token, id, "reject", json!({ "reason": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Rejection reason is required");

    let (status, body) = post_action(
        &ctx,
        &token,
        id,
        "reject",
        json!({ "reason": "Payment not received" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status"], "rejected");
    assert_eq!(body["appointment"]["rejectionReason"], "Payment not received");
}

#[tokio::test]
async fn test_reapproval_conflicts_when_slot_was_rebooked() {
    let (ctx, token, type_id) = setup().await;
    let first = ctx.book_ok("2025-03-10", 10, type_id).await;

    let (status, _) = post_action(
        &ctx,
        &token,
        first,
        "reject",
        json!({ "reason": "Payment not received" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    ctx.book_ok("2025-03-10", 10, type_id).await;

    let (status, body) = post_action(&ctx, &token, first, "approve", json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Time slot already taken");
}

#[tokio::test]
async fn test_reapproval_succeeds_when_slot_is_free() {
    let (ctx, token, type_id) = setup().await;
    let id = ctx.book_ok("2025-03-10", 10, type_id).await;

    post_action(&ctx, &token, id, "reject", json!({ "reason": "Wrong receipt" })).await;
    let (status, body) = post_action(&ctx, &token, id, "approve", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status"], "approved");
    assert_eq!(body["appointment"]["rejectionReason"], Value::Null);
}

#[tokio::test]
async fn test_done_requires_approval() {
    let (ctx, token, type_id) = setup().await;
    let id = ctx.book_ok("2025-03-10", 10, type_id).await;

    let (status, body) = post_action(&ctx, &token, id, "done", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only approved appointments can be marked as done");

    post_action(&ctx, &token, id, "approve", json!({})).await;
    let (status, body) = post_action(&ctx, &token, id, "done", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Appointment marked as done");
    assert_eq!(body["appointment"]["status"], "done");

    let (status, body) = post_action(&ctx, &token, id, "approve", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot modify completed appointment");
}

#[tokio::test]
async fn test_move_appointment() {
    let (mut ctx, token, type_id) = setup().await;
    let id = ctx.book_ok("2025-03-10", 10, type_id).await;
    ctx.drain_notifications();

    let (status, body) = move_to(&ctx, &token, id, "2025-03-11", 15).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Appointment moved successfully");
    assert_eq!(body["appointment"]["appointmentDate"], "2025-03-11");
    assert_eq!(body["appointment"]["appointmentHour"], 15);

    let notifications = ctx.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind(), "moved");

    // The old slot is free again.
    ctx.book_ok("2025-03-10", 10, type_id).await;
}

#[tokio::test]
async fn test_move_to_own_slot_is_allowed() {
    let (ctx, token, type_id) = setup().await;
    let id = ctx.book_ok("2025-03-10", 10, type_id).await;

    let (status, _) = move_to(&ctx, &token, id, "2025-03-10", 10).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_move_to_taken_slot_conflicts() {
    let (ctx, token, type_id) = setup().await;
    let id = ctx.book_ok("2025-03-10", 10, type_id).await;
    ctx.book_ok("2025-03-10", 11, type_id).await;

    let (status, body) = move_to(&ctx, &token, id, "2025-03-10", 11).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Time slot already taken");
}

#[tokio::test]
async fn test_move_done_appointment_fails() {
    let (ctx, token, type_id) = setup().await;
    let id = ctx.book_ok("2025-03-10", 10, type_id).await;
    post_action(&ctx, &token, id, "approve", json!({})).await;
    post_action(&ctx, &token, id, "done", json!({})).await;

    let (status, body) = move_to(&ctx, &token, id, "2025-03-12", 10).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot move completed appointment");
}

#[tokio::test]
async fn test_unknown_appointment_is_not_found() {
    let (ctx, token, _) = setup().await;

    let response = ctx
        .admin_get(&format!("/admin/appointments/{}", Uuid::new_v4()), &token)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_appointment_detail() {
    let (ctx, token, type_id) = setup().await;
    let account = ctx.create_bank_account("Banco Popular").await;
    let id = ctx.book_ok("2025-03-10", 10, type_id).await;

    // Point the booking at the account the way a client picking it would.
    let mut appointment = ctx
        .state
        .appointments
        .find(id)
        .await
        .expect("Failed to load appointment");
    appointment.bank_transfer = account.id.to_string();
    ctx.repos
        .appointments
        .save(&appointment)
        .await
        .expect("Failed to save appointment");

    let response = ctx
        .admin_get(&format!("/admin/appointments/{id}"), &token)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], id.to_string());
    assert_eq!(body["appointmentType"]["name"], "Consultation");
    assert_eq!(body["bankAccount"]["bankName"], "Banco Popular");
}

#[tokio::test]
async fn test_list_appointments_filters_and_sorts() {
    let (ctx, token, type_id) = setup().await;
    let early = ctx.book_ok("2025-03-10", 9, type_id).await;
    let late = ctx.book_ok("2025-03-20", 9, type_id).await;
    ctx.book_ok("2025-04-02", 9, type_id).await;
    post_action(&ctx, &token, late, "approve", json!({})).await;

    let body = body_json(
        ctx.admin_get(
            "/admin/appointments?month=2025-03&orderBy=appointment_date&orderDir=desc",
            &token,
        )
        .await,
    )
    .await;
    let ids: Vec<&str> = body["appointments"]
        .as_array()
        .expect("appointments should be an array")
        .iter()
        .filter_map(|a| a["id"].as_str())
        .collect();
    assert_eq!(ids, vec![late.to_string(), early.to_string()]);

    let body = body_json(ctx.admin_get("/admin/appointments?status=approved", &token).await).await;
    let listed = body["appointments"]
        .as_array()
        .expect("appointments should be an array");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], late.to_string());
}

#[tokio::test]
async fn test_list_appointments_rejects_unknown_sort_field() {
    let (ctx, token, _) = setup().await;

    let response = ctx
        .admin_get("/admin/appointments?orderBy=email;DROP", &token)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx.admin_get("/admin/appointments?month=March", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid month format");
}

#[tokio::test]
async fn test_calendar_groups_by_day() {
    let (ctx, token, type_id) = setup().await;
    ctx.book_ok("2025-03-10", 9, type_id).await;
    ctx.book_ok("2025-03-10", 15, type_id).await;
    ctx.book_ok("2025-03-12", 11, type_id).await;
    ctx.book_ok("2025-04-01", 11, type_id).await;

    let response = ctx.admin_get("/admin/calendar?month=2025-03", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["month"], "2025-03");
    let days = body["calendarData"]
        .as_object()
        .expect("calendarData should be an object");
    assert_eq!(
        days.keys().cloned().collect::<Vec<_>>(),
        vec!["2025-03-10".to_string(), "2025-03-12".to_string()]
    );

    let monday = days["2025-03-10"].as_array().expect("day should be an array");
    assert_eq!(monday.len(), 2);
    assert_eq!(monday[0]["date"], "Monday, March 10, 2025");
    assert_eq!(monday[0]["type"], "Consultation");
}

#[tokio::test]
async fn test_calendar_requires_month() {
    let (ctx, token, _) = setup().await;

    let response = ctx.admin_get("/admin/calendar", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid month format");
}

#[tokio::test]
async fn test_approve_rejects_malformed_body() {
    let (ctx, token, type_id) = setup().await;
    let id = ctx.book_ok("2025-03-10", 10, type_id).await;

    let (status, body) =
        post_action(&ctx, &token, id, "approve", json!({ "meetingLink": 42 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("Invalid data"));

    let uri = format!("/admin/appointments/{id}/approve");
    let (status, body) = send_raw(&ctx, &token, "POST", &uri, r#"{"meetingLink":"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("Invalid data"));

    let appointment = ctx
        .state
        .appointments
        .find(id)
        .await
        .expect("Failed to load appointment");
    assert_eq!(appointment.status.as_str(), "pending");
    assert_eq!(appointment.meeting_link, None);
}

#[tokio::test]
async fn test_move_with_mistyped_hour_is_bad_request() {
    let (ctx, token, type_id) = setup().await;
    let id = ctx.book_ok("2025-03-10", 10, type_id).await;

    let response = ctx
        .json(
            "PATCH",
            &format!("/admin/appointments/{id}/move"),
            Some(&token),
            json!({ "newDate": "2025-03-11", "newHour": "eleven" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let body = body_json(response).await;
    assert!(error_message(&body).starts_with("Invalid data"));
}

#[rstest]
#[case("POST", "/admin/appointment-types", r#"{"name": 5}"#)]
#[case("PATCH", "/admin/appointment-types/1/visibility", r#"{"visible": "yes"}"#)]
#[case("POST", "/admin/availability-rules/weekday", "not json")]
#[case("POST", "/admin/availability-rules/specific-date", "{")]
#[case("POST", "/admin/bank-accounts", "[]")]
#[case("POST", "/sign-in", r#"{"email": ["admin"]}"#)]
#[tokio::test]
async fn test_malformed_json_uses_error_body(
    #[case] method: &str,
    #[case] uri: &str,
    #[case] body: &'static str,
) {
    let (ctx, token, _) = setup().await;

    let (status, body) = send_raw(&ctx, &token, method, uri, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("Invalid data"));
}
