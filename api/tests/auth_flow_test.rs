//! End-to-end HTTP tests for the invitation and sign-in flow.

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::json;

use common::context;
use iam_api::app::create_app;

const ADMIN_HEADERS: [(&str, &str); 2] =
    [("X-User-Email", "ops@fleet.test"), ("X-User-Roles", "ADMIN")];

#[actix_rt::test]
async fn invited_user_activates_and_signs_in() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    // Admin invites a driver.
    let invite = test::TestRequest::post()
        .uri("/api/v1/users/invite")
        .insert_header(ADMIN_HEADERS[0])
        .insert_header(ADMIN_HEADERS[1])
        .set_json(json!({ "email": "driver@fleet.test", "role": "DRIVER" }))
        .to_request();
    let response = test::call_service(&app, invite).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Sign-in is rejected until the account is activated.
    let early = test::TestRequest::post()
        .uri("/api/v1/auth/sign-in")
        .set_json(json!({ "email": "driver@fleet.test", "password": "chosen-pass1" }))
        .to_request();
    let response = test::call_service(&app, early).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The captured token sets the password and activates.
    let token = ctx.last_activation_token().await;
    let reset = test::TestRequest::post()
        .uri("/api/v1/auth/reset-password")
        .set_json(json!({
            "token": token,
            "new_password": "chosen-pass1",
            "confirm_password": "chosen-pass1",
        }))
        .to_request();
    let response = test::call_service(&app, reset).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["status"], "ACTIVE");

    // Now sign-in succeeds and returns a session token.
    let sign_in = test::TestRequest::post()
        .uri("/api/v1/auth/sign-in")
        .set_json(json!({ "email": "driver@fleet.test", "password": "chosen-pass1" }))
        .to_request();
    let response = test::call_service(&app, sign_in).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["email"], "driver@fleet.test");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    // The token is spent.
    let token = ctx.last_activation_token().await;
    let replay = test::TestRequest::post()
        .uri("/api/v1/auth/reset-password")
        .set_json(json!({
            "token": token,
            "new_password": "other-pass12",
            "confirm_password": "other-pass12",
        }))
        .to_request();
    let response = test::call_service(&app, replay).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn mismatched_confirmation_is_a_validation_error() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let reset = test::TestRequest::post()
        .uri("/api/v1/auth/reset-password")
        .set_json(json!({
            "token": "whatever",
            "new_password": "chosen-pass1",
            "confirm_password": "different-pass1",
        }))
        .to_request();
    let response = test::call_service(&app, reset).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[actix_rt::test]
async fn wrong_password_and_unknown_email_share_status_and_message() {
    let ctx = context();
    ctx.service
        .ensure_admin(None, "admin@fleet.test", "sup3r-secret")
        .await
        .unwrap();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let wrong = test::TestRequest::post()
        .uri("/api/v1/auth/sign-in")
        .set_json(json!({ "email": "admin@fleet.test", "password": "nope-nope" }))
        .to_request();
    let wrong = test::call_service(&app, wrong).await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_body: serde_json::Value = test::read_body_json(wrong).await;

    let unknown = test::TestRequest::post()
        .uri("/api/v1/auth/sign-in")
        .set_json(json!({ "email": "ghost@fleet.test", "password": "nope-nope" }))
        .to_request();
    let unknown = test::call_service(&app, unknown).await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body: serde_json::Value = test::read_body_json(unknown).await;

    assert_eq!(wrong_body["message"], unknown_body["message"]);
    assert_eq!(wrong_body["error"], "INVALID_CREDENTIALS");
}

#[actix_rt::test]
async fn health_endpoint_is_open() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get().uri("/health").to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["status"], "healthy");
}
