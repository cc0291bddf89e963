use axum::http::{Request, StatusCode, header};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::test_utils::{TestContext, body_json};

#[tokio::test]
async fn test_create_appointment_type() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;

    let response = ctx
        .json(
            "POST",
            "/admin/appointment-types",
            Some(&token),
            json!({ "name": "  Follow-up  " }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["appointmentType"]["name"], "Follow-up");
    assert_eq!(body["appointmentType"]["visible"], true);
}

#[tokio::test]
async fn test_appointment_type_validation() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;
    ctx.create_type("Consultation", true).await;

    let response = ctx
        .json("POST", "/admin/appointment-types", Some(&token), json!({ "name": "" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Name is required");

    let response = ctx
        .json(
            "POST",
            "/admin/appointment-types",
            Some(&token),
            json!({ "name": "Consultation" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "Appointment type already exists"
    );
}

#[tokio::test]
async fn test_toggle_type_visibility() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;
    let consultation = ctx.create_type("Consultation", true).await;

    let response = ctx
        .json(
            "PATCH",
            &format!("/admin/appointment-types/{}/visibility", consultation.id),
            Some(&token),
            json!({ "visible": false }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["appointmentType"]["visible"], false);

    let public = body_json(ctx.get("/appointments/types").await).await;
    assert_eq!(public["appointmentTypes"], json!([]));

    let admin = body_json(ctx.admin_get("/admin/appointment-types", &token).await).await;
    assert_eq!(admin["appointmentTypes"].as_array().map(Vec::len), Some(1));

    let response = ctx
        .json(
            "PATCH",
            "/admin/appointment-types/999/visibility",
            Some(&token),
            json!({ "visible": true }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bank_account_lifecycle() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;

    let response = ctx
        .json(
            "POST",
            "/admin/bank-accounts",
            Some(&token),
            json!({ "bankName": "Banco Popular", "accountNumber": "123456789" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["account"]["isActive"], true);
    let id = created["account"]["id"]
        .as_str()
        .expect("account id should be a string")
        .to_string();

    let response = ctx
        .json(
            "PATCH",
            &format!("/admin/bank-accounts/{id}"),
            Some(&token),
            json!({ "accountNumber": "987654321" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["account"]["accountNumber"], "987654321");
    assert_eq!(updated["account"]["bankName"], "Banco Popular");

    let response = ctx
        .send(
            Request::delete(format!("/admin/bank-accounts/{id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(axum::body::Body::empty())
                .expect("Failed to build request"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Bank account deactivated");

    let public = body_json(ctx.get("/bank-accounts").await).await;
    assert_eq!(public["accounts"], json!([]));

    let admin = body_json(ctx.admin_get("/admin/bank-accounts", &token).await).await;
    assert_eq!(admin["accounts"][0]["isActive"], false);
}

#[tokio::test]
async fn test_bank_account_validation() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;

    let response = ctx
        .json(
            "POST",
            "/admin/bank-accounts",
            Some(&token),
            json!({ "bankName": "Banco Popular" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Bank name and account number are required"
    );

    let response = ctx
        .json(
            "PATCH",
            &format!("/admin/bank-accounts/{}", uuid::Uuid::new_v4()),
            Some(&token),
            json!({ "isActive": false }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Bank account not found");
}
