use axum::http::{Request, StatusCode, header};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

use crate::test_utils::{TestContext, body_json};

async fn delete(ctx: &TestContext, uri: &str, token: &str) -> (StatusCode, Value) {
    let response = ctx
        .send(
            Request::delete(uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(axum::body::Body::empty())
                .expect("Failed to build request"),
        )
        .await;
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_weekday_rule_created_then_updated() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;

    let response = ctx
        .json(
            "POST",
            "/admin/availability-rules/weekday",
            Some(&token),
            json!({ "dayOfWeek": 1, "unavailableHours": [10, 9, 10] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["message"], "Rule created successfully");
    assert_eq!(created["rule"]["dayOfWeek"], 1);
    assert_eq!(created["rule"]["specificDate"], Value::Null);
    assert_eq!(created["rule"]["unavailableHours"], json!([9, 10]));

    let response = ctx
        .json(
            "POST",
            "/admin/availability-rules/weekday",
            Some(&token),
            json!({ "dayOfWeek": 1, "allDay": true }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["message"], "Rule updated successfully");
    assert_eq!(updated["rule"]["id"], created["rule"]["id"]);
    assert_eq!(updated["rule"]["allDay"], true);

    let rules = body_json(ctx.admin_get("/admin/availability-rules", &token).await).await;
    assert_eq!(rules["rules"].as_array().map(Vec::len), Some(1));

    // An all-day rule leaves nothing to book on that weekday.
    let hours = body_json(ctx.get("/appointments/available-hours?date=2025-03-10").await).await;
    assert_eq!(hours["availableHours"], json!([]));
}

#[tokio::test]
async fn test_specific_date_rule_created_then_updated() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;
    let body = json!({ "specificDate": "2025-12-25", "allDay": true });

    let response = ctx
        .json("POST", "/admin/availability-rules/specific-date", Some(&token), body.clone())
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["rule"]["specificDate"], "2025-12-25");

    let response = ctx
        .json("POST", "/admin/availability-rules/specific-date", Some(&token), body)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let hours = body_json(ctx.get("/appointments/available-hours?date=2025-12-25").await).await;
    assert_eq!(hours["availableHours"], json!([]));
}

#[rstest]
#[case(json!({ "dayOfWeek": 7 }), "Invalid day of week")]
#[case(json!({ "dayOfWeek": -1 }), "Invalid day of week")]
#[case(json!({ "dayOfWeek": 2, "unavailableHours": [24] }), "Invalid hour")]
#[case(json!({ "dayOfWeek": 2, "unavailableHours": [-1] }), "Invalid hour")]
#[tokio::test]
async fn test_weekday_rule_validation(#[case] body: Value, #[case] expected: &str) {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;

    let response = ctx
        .json("POST", "/admin/availability-rules/weekday", Some(&token), body)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], expected);
}

#[tokio::test]
async fn test_specific_date_rule_requires_valid_date() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;

    let response = ctx
        .json(
            "POST",
            "/admin/availability-rules/specific-date",
            Some(&token),
            json!({ "specificDate": "25/12/2025" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid date format");
}

#[tokio::test]
async fn test_update_rule_by_id() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;
    let created = body_json(
        ctx.json(
            "POST",
            "/admin/availability-rules/weekday",
            Some(&token),
            json!({ "dayOfWeek": 3, "unavailableHours": [12] }),
        )
        .await,
    )
    .await;
    let id = created["rule"]["id"].as_i64().expect("rule id should be a number");

    let response = ctx
        .json(
            "PUT",
            &format!("/admin/availability-rules/{id}"),
            Some(&token),
            json!({ "unavailableHours": [13, 14] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["rule"]["unavailableHours"], json!([13, 14]));
    assert_eq!(updated["rule"]["dayOfWeek"], 3);

    let response = ctx
        .json(
            "PUT",
            "/admin/availability-rules/9999",
            Some(&token),
            json!({ "unavailableHours": [] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Rule not found");
}

#[tokio::test]
async fn test_delete_rules() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;
    let created = body_json(
        ctx.json(
            "POST",
            "/admin/availability-rules/weekday",
            Some(&token),
            json!({ "dayOfWeek": 0, "allDay": true }),
        )
        .await,
    )
    .await;
    ctx.json(
        "POST",
        "/admin/availability-rules/weekday",
        Some(&token),
        json!({ "dayOfWeek": 6, "allDay": true }),
    )
    .await;
    ctx.json(
        "POST",
        "/admin/availability-rules/specific-date",
        Some(&token),
        json!({ "specificDate": "2025-12-25", "allDay": true }),
    )
    .await;

    let id = created["rule"]["id"].as_i64().expect("rule id should be a number");
    let (status, body) = delete(&ctx, &format!("/admin/availability-rules/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Rule deleted successfully");

    let (status, body) = delete(&ctx, "/admin/availability-rules/weekday/6", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Weekday rule deleted successfully");

    let (status, body) =
        delete(&ctx, "/admin/availability-rules/specific-date/2025-12-25", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Specific date rule deleted successfully");

    let rules = body_json(ctx.admin_get("/admin/availability-rules", &token).await).await;
    assert_eq!(rules["rules"], json!([]));

    let (status, _) = delete(&ctx, "/admin/availability-rules/weekday/6", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = delete(&ctx, "/admin/availability-rules/weekday/9", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid day of week");
}
