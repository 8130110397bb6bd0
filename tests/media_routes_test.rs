// ABOUTME: HTTP tests for multipart avatar and content uploads
// ABOUTME: Checks format sniffing, shape rules, hash deduplication and avatar assignment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(missing_docs, clippy::unwrap_used)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{create_test_server, create_user, png};
use helpers::axum_test::{AxumTestRequest, MultipartPart};
use serde_json::{json, Value};

#[tokio::test]
async fn test_upload_avatar() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;

    let media: Value = AxumTestRequest::post("/api/v1/media/upload/avatar")
        .bearer(&alice.bearer())
        .multipart(vec![
            MultipartPart::file("file", "me.png", "image/png", png(64, 64, 1)),
            MultipartPart::text("alt", "Alice smiling"),
        ])
        .send(server.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(media["type"], "AVATAR");
    assert_eq!(media["mime_type"], "image/png");
    assert_eq!(media["width"], 64);
    assert_eq!(media["height"], 64);
    assert_eq!(media["alt"], "Alice smiling");
    let hash = media["hash"].as_str().unwrap();
    assert_eq!(hash.len(), 64);
    assert_eq!(
        media["url"],
        format!("http://media.test/avatar/{hash}.png").as_str()
    );
    assert_eq!(server.storage.len().await, 1);
}

#[tokio::test]
async fn test_upload_requires_authentication() {
    let server = create_test_server().await;

    let response = AxumTestRequest::post("/api/v1/media/upload/avatar")
        .multipart(vec![MultipartPart::file(
            "file",
            "me.png",
            "image/png",
            png(64, 64, 1),
        )])
        .send(server.router())
        .await;
    assert_eq!(response.status(), 401);
    assert!(server.storage.is_empty().await);
}

#[tokio::test]
async fn test_avatar_rejections() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;

    let cases = vec![
        // Not square
        MultipartPart::file("file", "wide.png", "image/png", png(200, 100, 1)),
        // Declared type does not match the bytes
        MultipartPart::file("file", "me.jpg", "image/jpeg", png(64, 64, 2)),
        // Not an image at all
        MultipartPart::file("file", "notes.txt", "image/png", b"hello there".to_vec()),
        // Unsupported type
        MultipartPart::file("file", "me.gif", "image/gif", png(64, 64, 3)),
    ];

    for part in cases {
        let response = AxumTestRequest::post("/api/v1/media/upload/avatar")
            .bearer(&alice.bearer())
            .multipart(vec![part])
            .send(server.router())
            .await;
        assert_eq!(response.status(), 400);
    }

    // Missing file part
    let response = AxumTestRequest::post("/api/v1/media/upload/avatar")
        .bearer(&alice.bearer())
        .multipart(vec![MultipartPart::text("alt", "nothing")])
        .send(server.router())
        .await;
    assert_eq!(response.status(), 400);

    assert!(server.storage.is_empty().await);
}

#[tokio::test]
async fn test_upload_content_batch() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;

    let media: Vec<Value> = AxumTestRequest::post("/api/v1/media/upload/content")
        .bearer(&alice.bearer())
        .multipart(vec![
            MultipartPart::file("files", "a.png", "image/png", png(300, 200, 1)),
            MultipartPart::file("files", "b.png", "image/png", png(200, 300, 2)),
        ])
        .send(server.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(media.len(), 2);
    assert!(media.iter().all(|m| m["type"] == "CONTENT"));
    let ratio = media[0]["ratio"].as_f64().unwrap();
    assert!((ratio - 1.5).abs() < 1e-9);
    assert_eq!(server.storage.len().await, 2);
}

#[tokio::test]
async fn test_content_batch_is_all_or_nothing() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;

    // The second image is far too wide
    let response = AxumTestRequest::post("/api/v1/media/upload/content")
        .bearer(&alice.bearer())
        .multipart(vec![
            MultipartPart::file("files", "a.png", "image/png", png(300, 200, 1)),
            MultipartPart::file("files", "b.png", "image/png", png(900, 100, 2)),
        ])
        .send(server.router())
        .await;
    assert_eq!(response.status(), 400);
    assert!(server.storage.is_empty().await);

    let too_many: Vec<MultipartPart> = (0..11u8)
        .map(|i| MultipartPart::file("files", "x.png", "image/png", png(100, 100, i)))
        .collect();
    let response = AxumTestRequest::post("/api/v1/media/upload/content")
        .bearer(&alice.bearer())
        .multipart(too_many)
        .send(server.router())
        .await;
    assert_eq!(response.status(), 400);
    assert!(server.storage.is_empty().await);
}

#[tokio::test]
async fn test_identical_bytes_are_stored_once() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;
    let bytes = png(128, 128, 7);

    let first: Value = AxumTestRequest::post("/api/v1/media/upload/avatar")
        .bearer(&alice.bearer())
        .multipart(vec![MultipartPart::file("file", "a.png", "image/png", bytes.clone())])
        .send(server.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let second: Value = AxumTestRequest::post("/api/v1/media/upload/avatar")
        .bearer(&alice.bearer())
        .multipart(vec![MultipartPart::file("file", "b.png", "image/png", bytes)])
        .send(server.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(first["id"], second["id"]);
    assert_eq!(server.storage.len().await, 1);
}

#[tokio::test]
async fn test_set_uploaded_avatar_on_profile() {
    let server = create_test_server().await;
    let alice = create_user(&server.resources, "alice").await;

    let avatar: Value = AxumTestRequest::post("/api/v1/media/upload/avatar")
        .bearer(&alice.bearer())
        .multipart(vec![MultipartPart::file("file", "me.png", "image/png", png(64, 64, 1))])
        .send(server.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let content: Vec<Value> = AxumTestRequest::post("/api/v1/media/upload/content")
        .bearer(&alice.bearer())
        .multipart(vec![MultipartPart::file("files", "c.png", "image/png", png(300, 200, 2))])
        .send(server.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    let me: Value = AxumTestRequest::patch("/api/v1/users/me")
        .bearer(&alice.bearer())
        .json(&json!({ "ava_id": avatar["id"], "bio": "Gift enthusiast" }))
        .send(server.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(me["ava_id"], avatar["id"]);
    assert_eq!(me["bio"], "Gift enthusiast");

    let response = AxumTestRequest::patch("/api/v1/users/me")
        .bearer(&alice.bearer())
        .json(&json!({ "ava_id": content[0]["id"] }))
        .send(server.router())
        .await;
    assert_eq!(response.status(), 400);

    let response = AxumTestRequest::patch("/api/v1/users/me")
        .bearer(&alice.bearer())
        .json(&json!({ "ava_id": uuid::Uuid::new_v4() }))
        .send(server.router())
        .await;
    assert_eq!(response.status(), 404);
}
