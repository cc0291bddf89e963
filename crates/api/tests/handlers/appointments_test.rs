use axum::http::{StatusCode, header};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;
use slotbook_api::storage::receipt_extension;
use slotbook_core::models::{
    appointment::RejectRequest,
    rule::{RuleBlock, RuleTarget},
};

use crate::test_utils::{BookingFormBody, TestContext, body_bytes, body_json, date};

fn hours(body: &Value) -> Vec<u64> {
    body["availableHours"]
        .as_array()
        .expect("availableHours should be an array")
        .iter()
        .filter_map(Value::as_u64)
        .collect()
}

#[tokio::test]
async fn test_create_then_fetch_by_short_id() {
    let mut ctx = TestContext::new();
    let consultation = ctx.create_type("Consultation", true).await;

    let response = ctx.book("2025-03-10", 10, consultation.id).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    assert_eq!(created["message"], "Appointment created successfully");
    assert_eq!(created["status"], "pending");
    let short_id = created["shortID"].as_str().expect("shortID should be a string");
    assert_eq!(short_id.len(), 8);

    let response = ctx.get(&format!("/appointments/short/{short_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let status = body_json(response).await;
    assert_eq!(status["firstName"], "Ana");
    assert_eq!(status["lastName"], "Perez");
    assert_eq!(status["appointmentDate"], "2025-03-10");
    assert_eq!(status["appointmentHour"], 10);
    assert_eq!(status["appointmentType"], "Consultation");
    assert_eq!(status["status"], "pending");
    assert_eq!(status["phoneNumber"], "+1 (809) 555-0101");

    let notifications = ctx.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind(), "received");
    assert_eq!(notifications[0].appointment().short_id, short_id);
}

#[tokio::test]
async fn test_unknown_short_id_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx.get("/appointments/short/deadbeef").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Appointment not found");
}

#[tokio::test]
async fn test_double_booking_conflicts() {
    let ctx = TestContext::new();
    let consultation = ctx.create_type("Consultation", true).await;
    ctx.book_ok("2025-03-10", 10, consultation.id).await;

    let response = ctx.book("2025-03-10", 10, consultation.id).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "Time slot already taken");

    // The rejected request never wrote its receipt.
    assert_eq!(ctx.stored_receipts(), 1);
}

#[tokio::test]
async fn test_rebooking_after_rejection_succeeds() {
    let ctx = TestContext::new();
    let consultation = ctx.create_type("Consultation", true).await;
    let id = ctx.book_ok("2025-03-10", 10, consultation.id).await;

    ctx.state
        .appointments
        .reject(
            id,
            RejectRequest {
                reason: "Payment not received".to_string(),
                admin_note: None,
            },
        )
        .await
        .expect("Failed to reject appointment");

    let response = ctx.book("2025-03-10", 10, consultation.id).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_invisible_type_is_rejected() {
    let ctx = TestContext::new();
    let hidden = ctx.create_type("Legacy", false).await;

    let response = ctx.book("2025-03-10", 10, hidden.id).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Appointment type not available"
    );
    assert_eq!(ctx.stored_receipts(), 0);
}

#[tokio::test]
async fn test_unknown_type_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx.book("2025-03-10", 10, 42).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        "Appointment type not found"
    );
}

#[rstest]
#[case("phoneNumber", "123-456-789", "Invalid phone format. Use ###-###-####")]
#[case("phoneNumber", "8095550101", "Invalid phone format. Use ###-###-####")]
#[case("email", "not-an-email", "Invalid email address")]
#[case("appointmentHour", "24", "Invalid hour")]
#[case("appointmentHour", "ten", "Invalid hour")]
#[case("appointmentDate", "2025-02-30", "Invalid date format")]
#[case("appointmentTypeID", "abc", "Invalid appointment type ID")]
#[case("firstName", "   ", "Missing required fields")]
#[tokio::test]
async fn test_invalid_form_fields(
    #[case] field: &str,
    #[case] value: &str,
    #[case] expected: &str,
) {
    let ctx = TestContext::new();
    let consultation = ctx.create_type("Consultation", true).await;

    let request = BookingFormBody::valid("2025-03-10", 10, consultation.id)
        .set(field, value)
        .into_request();
    let response = ctx.send(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], expected);
    assert_eq!(ctx.stored_receipts(), 0);
}

#[tokio::test]
async fn test_receipt_is_required() {
    let ctx = TestContext::new();
    let consultation = ctx.create_type("Consultation", true).await;

    let request = BookingFormBody::valid("2025-03-10", 10, consultation.id)
        .receipt(None)
        .into_request();
    let response = ctx.send(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Receipt file is required");
}

#[tokio::test]
async fn test_receipt_type_is_checked() {
    let ctx = TestContext::new();
    let consultation = ctx.create_type("Consultation", true).await;

    let request = BookingFormBody::valid("2025-03-10", 10, consultation.id)
        .receipt(Some(("receipt.exe", b"MZ")))
        .into_request();
    let response = ctx.send(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid file type. Only JPG, PNG, and PDF allowed"
    );
    assert_eq!(ctx.stored_receipts(), 0);
}

#[tokio::test]
async fn test_past_hour_today_conflicts() {
    let ctx = TestContext::new();
    let consultation = ctx.create_type("Consultation", true).await;

    // The test clock reads 2025-03-05 08:30.
    let response = ctx.book("2025-03-05", 8, consultation.id).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "Cannot book a past hour");

    let response = ctx.book("2025-03-05", 9, consultation.id).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_blocked_day_conflicts() {
    let ctx = TestContext::new();
    let consultation = ctx.create_type("Consultation", true).await;
    ctx.repos
        .rules
        .upsert(
            RuleTarget::Weekday(1),
            &RuleBlock {
                unavailable_hours: vec![],
                all_day: true,
            },
        )
        .await
        .expect("Failed to create rule");

    let response = ctx.book("2025-03-10", 10, consultation.id).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "This day is blocked");
}

#[tokio::test]
async fn test_receipt_download_by_short_id() {
    let ctx = TestContext::new();
    let consultation = ctx.create_type("Consultation", true).await;

    let created = body_json(ctx.book("2025-03-10", 10, consultation.id).await).await;
    let short_id = created["shortID"].as_str().expect("shortID should be a string");

    let response = ctx.get(&format!("/appointments/receipt/{short_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    assert_eq!(body_bytes(response).await, b"%PDF-1.4 test".to_vec());
}

#[tokio::test]
async fn test_available_hours_excludes_rules() {
    let ctx = TestContext::new();
    ctx.repos
        .rules
        .upsert(
            RuleTarget::Weekday(1),
            &RuleBlock {
                unavailable_hours: vec![9, 10],
                all_day: false,
            },
        )
        .await
        .expect("Failed to create weekday rule");
    ctx.repos
        .rules
        .upsert(
            RuleTarget::Date(date("2025-03-10")),
            &RuleBlock {
                unavailable_hours: vec![14],
                all_day: false,
            },
        )
        .await
        .expect("Failed to create date rule");

    let response = ctx.get("/appointments/available-hours?date=2025-03-10").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["date"], "2025-03-10");
    let expected: Vec<u64> = (0..24).filter(|h| ![9, 10, 14].contains(h)).collect();
    assert_eq!(hours(&body), expected);
}

#[tokio::test]
async fn test_available_hours_excludes_booked_and_past_hours() {
    let ctx = TestContext::new();
    let consultation = ctx.create_type("Consultation", true).await;
    ctx.book_ok("2025-03-05", 12, consultation.id).await;

    let body = body_json(ctx.get("/appointments/available-hours?date=2025-03-05").await).await;

    let expected: Vec<u64> = (9..24).filter(|h| *h != 12).collect();
    assert_eq!(hours(&body), expected);
}

#[tokio::test]
async fn test_available_hours_requires_valid_date() {
    let ctx = TestContext::new();

    let response = ctx.get("/appointments/available-hours").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx.get("/appointments/available-hours?date=10-03-2025").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid date format");
}

#[tokio::test]
async fn test_public_lists_hide_inactive_entries() {
    let ctx = TestContext::new();
    ctx.create_type("Consultation", true).await;
    ctx.create_type("Legacy", false).await;
    let mut closed = ctx.create_bank_account("Old Bank").await;
    ctx.create_bank_account("Banco Popular").await;

    closed.is_active = false;
    ctx.repos
        .bank_accounts
        .save(&closed)
        .await
        .expect("Failed to deactivate account");

    let types = body_json(ctx.get("/appointments/types").await).await;
    let names: Vec<&str> = types["appointmentTypes"]
        .as_array()
        .expect("appointmentTypes should be an array")
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Consultation"]);

    let accounts = body_json(ctx.get("/bank-accounts").await).await;
    let banks: Vec<&str> = accounts["accounts"]
        .as_array()
        .expect("accounts should be an array")
        .iter()
        .filter_map(|a| a["bankName"].as_str())
        .collect();
    assert_eq!(banks, vec!["Banco Popular"]);
}

#[rstest]
#[case("receipt.pdf", Some("pdf"))]
#[case("photo.JPG", Some("jpg"))]
#[case("scan.jpeg", Some("jpeg"))]
#[case("image.png", Some("png"))]
#[case("archive.zip", None)]
#[case("no-extension", None)]
fn test_receipt_extension(#[case] file_name: &str, #[case] expected: Option<&str>) {
    assert_eq!(receipt_extension(file_name).as_deref(), expected);
}

#[tokio::test]
async fn test_bank_account_reference_must_exist_and_be_active() {
    let ctx = TestContext::new();
    let consultation = ctx.create_type("Consultation", true).await;
    let account = ctx.create_bank_account("Banco Popular").await;

    let unknown = uuid::Uuid::new_v4().to_string();
    let request = BookingFormBody::valid("2025-03-10", 10, consultation.id)
        .set("bankTransfer", &unknown)
        .into_request();
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Bank account not found");
    assert_eq!(ctx.stored_receipts(), 0);

    let request = BookingFormBody::valid("2025-03-10", 10, consultation.id)
        .set("bankTransfer", &account.id.to_string())
        .into_request();
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("Response should carry the appointment id");
    let stored = ctx
        .state
        .appointments
        .find(id)
        .await
        .expect("Failed to load appointment");
    assert_eq!(stored.bank_account_id, Some(account.id));

    ctx.state
        .catalog
        .deactivate_account(account.id)
        .await
        .expect("Failed to deactivate account");
    let request = BookingFormBody::valid("2025-03-11", 10, consultation.id)
        .set("bankTransfer", &account.id.to_string())
        .into_request();
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Bank account not available");
}
