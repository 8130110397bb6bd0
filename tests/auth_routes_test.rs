// ABOUTME: HTTP tests for registration, activation, login, refresh and admin registration
// ABOUTME: Runs the full router in-process against an in-memory database and outbox
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(missing_docs, clippy::unwrap_used)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{create_admin, create_root, create_test_server, create_user};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

fn activation_token(html: &str) -> String {
    let start = html.find("?token=").unwrap() + "?token=".len();
    let rest = &html[start..];
    let end = rest.find('"').unwrap();
    rest[..end].to_owned()
}

#[tokio::test]
async fn test_register_activate_and_login() {
    let server = create_test_server().await;

    let response = AxumTestRequest::post("/api/v1/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "password123"
        }))
        .send(server.router())
        .await
        .assert_status(StatusCode::CREATED);
    let user: Value = response.json();
    assert_eq!(user["username"], "alice");
    assert_eq!(user["role"], "USER");
    assert_eq!(user["is_active"], false);
    assert!(user.get("hashed_password").is_none());

    // Inactive accounts cannot log in
    let response = AxumTestRequest::post("/api/v1/auth/login")
        .form(&[("username", "alice@example.com"), ("password", "password123")])
        .send(server.router())
        .await;
    assert_eq!(response.status(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "USER_NOT_ACTIVATED");

    let sent = server.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "alice@example.com");
    let token = activation_token(&sent[0].html_content);

    let response = AxumTestRequest::get(&format!("/api/v1/auth/activate?token={token}"))
        .send(server.router())
        .await
        .assert_status(StatusCode::OK);
    let activated: Value = response.json();
    assert_eq!(activated["is_active"], true);

    // A second activation is a conflict
    let response = AxumTestRequest::get(&format!("/api/v1/auth/activate?token={token}"))
        .send(server.router())
        .await;
    assert_eq!(response.status(), 409);

    let response = AxumTestRequest::post("/api/v1/auth/login")
        .form(&[("username", "alice@example.com"), ("password", "password123")])
        .send(server.router())
        .await
        .assert_status(StatusCode::OK);
    let tokens: Value = response.json();
    assert_eq!(tokens["token_type"], "bearer");
    let access = tokens["access_token"].as_str().unwrap();

    let response = AxumTestRequest::get("/api/v1/users/me")
        .bearer(&format!("Bearer {access}"))
        .send(server.router())
        .await
        .assert_status(StatusCode::OK);
    let me: Value = response.json();
    assert_eq!(me["email"], "alice@example.com");
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let server = create_test_server().await;
    create_user(&server.resources, "alice").await;

    let response = AxumTestRequest::post("/api/v1/auth/register")
        .json(&json!({
            "username": "alice2",
            "email": "alice@example.com",
            "password": "password123"
        }))
        .send(server.router())
        .await;
    assert_eq!(response.status(), 409);

    let response = AxumTestRequest::post("/api/v1/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "password123"
        }))
        .send(server.router())
        .await;
    assert_eq!(response.status(), 409);

    let response = AxumTestRequest::post("/api/v1/auth/register")
        .json(&json!({
            "username": "carol",
            "email": "carol@example.com",
            "password": "short"
        }))
        .send(server.router())
        .await;
    assert_eq!(response.status(), 400);

    let response = AxumTestRequest::post("/api/v1/auth/register")
        .json(&json!({
            "username": "carol",
            "email": "not-an-email",
            "password": "password123"
        }))
        .send(server.router())
        .await;
    assert_eq!(response.status(), 400);

    assert!(server.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let server = create_test_server().await;
    create_user(&server.resources, "alice").await;

    let response = AxumTestRequest::post("/api/v1/auth/login")
        .form(&[("username", "alice@example.com"), ("password", "wrong-password")])
        .send(server.router())
        .await;
    assert_eq!(response.status(), 401);
    let wrong_password: Value = response.json();
    assert_eq!(wrong_password["error"]["code"], "AUTH_INVALID");

    // Unknown emails answer exactly like a wrong password
    let response = AxumTestRequest::post("/api/v1/auth/login")
        .form(&[("username", "nobody@example.com"), ("password", "password123")])
        .send(server.router())
        .await;
    assert_eq!(response.status(), 401);
    let unknown_email: Value = response.json();
    assert_eq!(unknown_email, wrong_password);
}

#[tokio::test]
async fn test_refresh_requires_refresh_token() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;

    let response = AxumTestRequest::post("/api/v1/auth/refresh")
        .json(&json!({ "refresh_token": alice.access_token }))
        .send(server.router())
        .await;
    assert_eq!(response.status(), 401);

    let pair = server
        .resources
        .auth_manager
        .generate_token_pair(&alice.user)
        .unwrap();
    let response = AxumTestRequest::post("/api/v1/auth/refresh")
        .json(&json!({ "refresh_token": pair.refresh_token }))
        .send(server.router())
        .await
        .assert_status(StatusCode::OK);
    let tokens: Value = response.json();
    assert!(tokens["access_token"].as_str().is_some());
    assert!(tokens["refresh_token"].as_str().is_some());
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;
    let pair = server
        .resources
        .auth_manager
        .generate_token_pair(&alice.user)
        .unwrap();

    let response = AxumTestRequest::get("/api/v1/users/me")
        .bearer(&format!("Bearer {}", pair.refresh_token))
        .send(server.router())
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_missing_and_malformed_authorization() {
    let server = create_test_server().await;

    let response = AxumTestRequest::get("/api/v1/users/me")
        .send(server.router())
        .await;
    assert_eq!(response.status(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");

    let response = AxumTestRequest::get("/api/v1/users/me")
        .bearer("Basic dXNlcjpwYXNz")
        .send(server.router())
        .await;
    assert_eq!(response.status(), 401);

    let response = AxumTestRequest::get("/api/v1/users/me")
        .bearer("Bearer not-a-jwt")
        .send(server.router())
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_register_admin_is_root_only() {
    let server = create_test_server().await;
    let root = create_root(&server.resources).await;
    let admin = create_admin(&server.resources, "admin").await;
    let alice = create_user(&server.resources, "alice").await;

    let body = json!({
        "username": "curator",
        "email": "curator@example.com",
        "password": "password123"
    });

    for caller in [&admin, &alice] {
        let response = AxumTestRequest::post("/api/v1/auth/register-admin")
            .bearer(&caller.bearer())
            .json(&body)
            .send(server.router())
            .await;
        assert_eq!(response.status(), 403);
    }

    let response = AxumTestRequest::post("/api/v1/auth/register-admin")
        .bearer(&root.bearer())
        .json(&body)
        .send(server.router())
        .await
        .assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["role"], "ADMIN");
    assert_eq!(created["is_active"], true);

    // Admins are active immediately, no activation email
    assert!(server.mailer.sent().is_empty());
    let response = AxumTestRequest::post("/api/v1/auth/login")
        .form(&[("username", "curator@example.com"), ("password", "password123")])
        .send(server.router())
        .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_ensure_root_user_is_idempotent() {
    let server = create_test_server().await;
    let registration = giftminder_server::services::Registration {
        username: "root".to_owned(),
        email: "root@example.com".to_owned(),
        password: "12345678".to_owned(),
    };

    let (first, created) = server
        .resources
        .auth_service()
        .ensure_root_user(&registration)
        .await
        .unwrap();
    assert!(created);
    assert!(first.is_active);

    let (second, created) = server
        .resources
        .auth_service()
        .ensure_root_user(&registration)
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_login_form_missing_password() {
    let server = create_test_server().await;
    create_user(&server.resources, "alice").await;

    let body: Value = AxumTestRequest::post("/api/v1/auth/login")
        .form(&[("username", "alice@example.com")])
        .send(server.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}
