//! Tests for the two-stage authentication resolver and endpoint guards.

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::json;

use common::context;
use iam_api::app::create_app;

fn invite_body() -> serde_json::Value {
    json!({ "email": "new@fleet.test", "role": "DRIVER" })
}

#[actix_rt::test]
async fn unauthenticated_requests_are_rejected_by_admin_endpoints() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/users/invite")
        .set_json(invite_body())
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn non_admin_trusted_identity_is_forbidden() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/users/invite")
        .insert_header(("X-User-Email", "driver@fleet.test"))
        .insert_header(("X-User-Roles", "DRIVER"))
        .set_json(invite_body())
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn trusted_headers_accept_the_gateway_role_prefix() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/users/invite")
        .insert_header(("X-User-Email", "ops@fleet.test"))
        .insert_header(("X-User-Roles", "ROLE_ADMIN"))
        .set_json(invite_body())
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn bearer_session_token_authenticates_an_admin() {
    let ctx = context();
    let admin = ctx
        .service
        .ensure_admin(None, "admin@fleet.test", "sup3r-secret")
        .await
        .unwrap();
    let token = ctx.state.sessions.issue(&admin.email).unwrap();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/users/invite")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(invite_body())
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn garbage_bearer_tokens_leave_the_request_unauthenticated() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/users/invite")
        .insert_header(("Authorization", "Bearer not-a-real-token"))
        .set_json(invite_body())
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn trusted_headers_win_over_a_bearer_token() {
    let ctx = context();
    let admin = ctx
        .service
        .ensure_admin(None, "admin@fleet.test", "sup3r-secret")
        .await
        .unwrap();
    let token = ctx.state.sessions.issue(&admin.email).unwrap();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    // The gateway-asserted DRIVER identity shadows the admin bearer token.
    let request = test::TestRequest::post()
        .uri("/api/v1/users/invite")
        .insert_header(("X-User-Email", "driver@fleet.test"))
        .insert_header(("X-User-Roles", "DRIVER"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(invite_body())
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn self_service_credential_change_needs_no_admin_role() {
    let ctx = context();
    ctx.service
        .ensure_admin(None, "admin@fleet.test", "sup3r-secret")
        .await
        .unwrap();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    // Admin creates a driver directly.
    let create = test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(("X-User-Email", "admin@fleet.test"))
        .insert_header(("X-User-Roles", "ADMIN"))
        .set_json(json!({
            "email": "self@fleet.test",
            "password": "first-pass12",
            "role": "DRIVER",
        }))
        .to_request();
    let response = test::call_service(&app, create).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: serde_json::Value = test::read_body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    // The driver signs in and changes their own password.
    let sign_in = test::TestRequest::post()
        .uri("/api/v1/auth/sign-in")
        .set_json(json!({ "email": "self@fleet.test", "password": "first-pass12" }))
        .to_request();
    let response = test::call_service(&app, sign_in).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();

    let change = test::TestRequest::post()
        .uri(&format!("/api/v1/users/{id}/change-password"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "current_password": "first-pass12",
            "new_password": "second-pass12",
        }))
        .to_request();
    let response = test::call_service(&app, change).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Another account cannot touch it.
    let foreign = test::TestRequest::post()
        .uri(&format!("/api/v1/users/{id}/change-password"))
        .insert_header(("X-User-Email", "other@fleet.test"))
        .insert_header(("X-User-Roles", "DRIVER"))
        .set_json(json!({
            "current_password": "second-pass12",
            "new_password": "third-pass123",
        }))
        .to_request();
    let response = test::call_service(&app, foreign).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
