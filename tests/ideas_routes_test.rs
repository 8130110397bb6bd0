// ABOUTME: HTTP tests for gift ideas: own and global listings, updates, archiving and deletion
// ABOUTME: Verifies role rules for global ideas and price and URL validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(missing_docs, clippy::unwrap_used)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{create_admin, create_test_server, create_user, TestServer, TestUser};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

async fn create_idea(server: &TestServer, caller: &TestUser, body: &Value) -> Value {
    AxumTestRequest::post("/api/v1/ideas")
        .bearer(&caller.bearer())
        .json(body)
        .send(server.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json()
}

async fn list(server: &TestServer, caller: &TestUser, uri: &str) -> Vec<Value> {
    AxumTestRequest::get(uri)
        .bearer(&caller.bearer())
        .send(server.router())
        .await
        .assert_status(StatusCode::OK)
        .json()
}

#[tokio::test]
async fn test_create_idea_rounds_price() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;

    let idea = create_idea(
        &server,
        &alice,
        &json!({
            "title": "Tea set",
            "tags": ["kitchen"],
            "view_url": "https://shop.example.com/tea",
            "estimated_price": 19.999
        }),
    )
    .await;

    assert_eq!(idea["title"], "Tea set");
    assert_eq!(idea["is_global"], false);
    assert_eq!(idea["user_id"], alice.user.id.to_string());
    assert!(idea["archived_at"].is_null());
    let price = idea["estimated_price"].as_f64().unwrap();
    assert!((price - 20.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_create_idea_validation() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;

    for body in [
        json!({ "title": "x" }),
        json!({ "title": "Book", "estimated_price": -1.0 }),
        json!({ "title": "Book", "view_url": "ftp://example.com/book" }),
        json!({ "title": "Book", "view_url": "not a url" }),
    ] {
        let response = AxumTestRequest::post("/api/v1/ideas")
            .bearer(&alice.bearer())
            .json(&body)
            .send(server.router())
            .await;
        assert_eq!(response.status(), 400, "body: {body}");
    }
}

#[tokio::test]
async fn test_global_ideas_are_admin_only() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;
    let admin = create_admin(&server.resources, "admin").await;

    let response = AxumTestRequest::post("/api/v1/ideas")
        .bearer(&alice.bearer())
        .json(&json!({ "title": "Flowers", "is_global": true }))
        .send(server.router())
        .await;
    assert_eq!(response.status(), 403);

    let response = AxumTestRequest::post("/api/v1/ideas")
        .bearer(&admin.bearer())
        .json(&json!({ "title": "Flowers" }))
        .send(server.router())
        .await;
    assert_eq!(response.status(), 403);

    let global = create_idea(
        &server,
        &admin,
        &json!({ "title": "Flowers", "is_global": true }),
    )
    .await;
    let own = create_idea(&server, &alice, &json!({ "title": "Tea set" })).await;

    let globals = list(&server, &alice, "/api/v1/ideas/global").await;
    assert_eq!(globals.len(), 1);
    assert_eq!(globals[0]["id"], global["id"]);

    let mine = list(&server, &alice, "/api/v1/ideas/my").await;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["id"], own["id"]);

    // Global ideas are readable by every user but not editable
    let global_id = global["id"].as_str().unwrap();
    let response = AxumTestRequest::get(&format!("/api/v1/ideas/{global_id}"))
        .bearer(&alice.bearer())
        .send(server.router())
        .await;
    assert_eq!(response.status(), 200);

    let response = AxumTestRequest::patch(&format!("/api/v1/ideas/{global_id}"))
        .bearer(&alice.bearer())
        .json(&json!({ "title": "Weeds" }))
        .send(server.router())
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_private_ideas_are_hidden_from_others() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;
    let mallory = create_user(&server.resources, "mallory").await;

    let idea = create_idea(&server, &alice, &json!({ "title": "Tea set" })).await;
    let id = idea["id"].as_str().unwrap();

    let response = AxumTestRequest::get(&format!("/api/v1/ideas/{id}"))
        .bearer(&mallory.bearer())
        .send(server.router())
        .await;
    assert_eq!(response.status(), 403);

    let response = AxumTestRequest::delete(&format!("/api/v1/ideas/{id}"))
        .bearer(&mallory.bearer())
        .send(server.router())
        .await;
    assert_eq!(response.status(), 403);

    assert!(list(&server, &mallory, "/api/v1/ideas/my").await.is_empty());
}

#[tokio::test]
async fn test_update_archive_and_delete() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;
    let idea = create_idea(&server, &alice, &json!({ "title": "Tea set" })).await;
    let id = idea["id"].as_str().unwrap();

    let updated: Value = AxumTestRequest::patch(&format!("/api/v1/ideas/{id}"))
        .bearer(&alice.bearer())
        .json(&json!({ "description": "Green porcelain", "estimated_price": 42.5 }))
        .send(server.router())
        .await
        .assert_status(StatusCode::ACCEPTED)
        .json();
    assert_eq!(updated["title"], "Tea set");
    assert_eq!(updated["description"], "Green porcelain");

    let archived: Value = AxumTestRequest::post(&format!("/api/v1/ideas/{id}/archive"))
        .bearer(&alice.bearer())
        .send(server.router())
        .await
        .assert_status(StatusCode::ACCEPTED)
        .json();
    let archived_at = archived["archived_at"].as_str().unwrap().to_owned();

    // Archiving again keeps the original timestamp
    let again: Value = AxumTestRequest::post(&format!("/api/v1/ideas/{id}/archive"))
        .bearer(&alice.bearer())
        .send(server.router())
        .await
        .assert_status(StatusCode::ACCEPTED)
        .json();
    assert_eq!(again["archived_at"], archived_at.as_str());

    assert!(list(&server, &alice, "/api/v1/ideas/my").await.is_empty());
    let archived_list = list(&server, &alice, "/api/v1/ideas/my?archived=true").await;
    assert_eq!(archived_list.len(), 1);

    AxumTestRequest::delete(&format!("/api/v1/ideas/{id}"))
        .bearer(&alice.bearer())
        .send(server.router())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = AxumTestRequest::get(&format!("/api/v1/ideas/{id}"))
        .bearer(&alice.bearer())
        .send(server.router())
        .await;
    assert_eq!(response.status(), 404);
    assert!(list(&server, &alice, "/api/v1/ideas/my?archived=true")
        .await
        .is_empty());
}

#[tokio::test]
async fn test_list_ideas_by_price() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;
    for (title, price) in [("Mug", 8.0), ("Lamp", 35.0), ("Scarf", 20.0)] {
        create_idea(
            &server,
            &alice,
            &json!({ "title": title, "estimated_price": price }),
        )
        .await;
    }

    let ideas = list(
        &server,
        &alice,
        "/api/v1/ideas/my?order_by=estimated_price&desc=true&limit=2",
    )
    .await;
    let titles: Vec<&str> = ideas.iter().map(|i| i["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["Lamp", "Scarf"]);
}

#[tokio::test]
async fn test_patch_null_clears_optional_fields() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;
    let idea = create_idea(
        &server,
        &alice,
        &json!({
            "title": "Tea set",
            "description": "Green porcelain",
            "view_url": "https://shop.example.com/tea",
            "estimated_price": 42.5
        }),
    )
    .await;
    let id = idea["id"].as_str().unwrap();

    let cleared: Value = AxumTestRequest::patch(&format!("/api/v1/ideas/{id}"))
        .bearer(&alice.bearer())
        .json(&json!({ "description": null, "view_url": null, "estimated_price": null }))
        .send(server.router())
        .await
        .assert_status(StatusCode::ACCEPTED)
        .json();
    assert_eq!(cleared["title"], "Tea set");
    assert!(cleared["description"].is_null());
    assert!(cleared["view_url"].is_null());
    assert!(cleared["estimated_price"].is_null());
}
