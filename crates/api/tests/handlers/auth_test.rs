use axum::http::{Request, StatusCode, header};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use slotbook_api::middleware::auth::{decode_token, issue_token};
use uuid::Uuid;

use crate::test_utils::{ADMIN_EMAIL, ADMIN_PASSWORD, JWT_SECRET, TestContext, body_json};

#[tokio::test]
async fn test_sign_in_issues_usable_token() {
    let ctx = TestContext::new();
    ctx.admin_token().await;

    let response = ctx
        .json(
            "POST",
            "/sign-in",
            None,
            json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Sign in successfully");
    let token = body["access_token"]
        .as_str()
        .expect("access_token should be a string");

    let claims = decode_token(token, JWT_SECRET).expect("Failed to decode token");
    assert_eq!(claims.exp - claims.iat, 3600);

    let response = ctx.admin_get("/me", token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["user"]["email"], ADMIN_EMAIL);
    assert_eq!(me["user"]["id"], claims.sub.to_string());
    assert!(me["user"].get("password_hash").is_none());
}

#[rstest]
#[case(ADMIN_EMAIL, "wrong password")]
#[case("nobody@example.com", ADMIN_PASSWORD)]
#[tokio::test]
async fn test_sign_in_rejects_bad_credentials(#[case] email: &str, #[case] password: &str) {
    let ctx = TestContext::new();
    ctx.admin_token().await;

    let response = ctx
        .json(
            "POST",
            "/sign-in",
            None,
            json!({ "email": email, "password": password }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "Authentication error: Invalid email or password"
    );
}

#[tokio::test]
async fn test_sign_in_requires_fields() {
    let ctx = TestContext::new();

    let response = ctx.json("POST", "/sign-in", None, json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[case("/admin/appointments")]
#[case("/admin/calendar?month=2025-03")]
#[case("/admin/availability-rules")]
#[case("/admin/appointment-types")]
#[case("/admin/bank-accounts")]
#[case("/me")]
#[tokio::test]
async fn test_protected_routes_require_token(#[case] uri: &str) {
    let ctx = TestContext::new();

    let response = ctx.get(uri).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "Authentication error: Missing bearer token"
    );
}

#[tokio::test]
async fn test_invalid_tokens_are_rejected() {
    let ctx = TestContext::new();
    ctx.admin_token().await;

    // Garbage
    let response = ctx.admin_get("/admin/appointments", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Signed with another secret
    let forged = issue_token(Uuid::new_v4(), "another-secret").expect("Failed to issue token");
    let response = ctx.admin_get("/admin/appointments", &forged).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Valid signature, unknown user
    let orphan = issue_token(Uuid::new_v4(), JWT_SECRET).expect("Failed to issue token");
    let response = ctx.admin_get("/admin/appointments", &orphan).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Wrong scheme
    let response = ctx
        .send(
            Request::get("/admin/appointments")
                .header(header::AUTHORIZATION, "Basic YWRtaW46YWRtaW4=")
                .body(axum::body::Body::empty())
                .expect("Failed to build request"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_routes_need_no_token() {
    let ctx = TestContext::new();

    assert_eq!(ctx.get("/health").await.status(), StatusCode::OK);
    assert_eq!(ctx.get("/version").await.status(), StatusCode::OK);
    assert_eq!(ctx.get("/appointments/types").await.status(), StatusCode::OK);
    assert_eq!(ctx.get("/bank-accounts").await.status(), StatusCode::OK);
}
