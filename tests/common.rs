// ABOUTME: Shared fixtures for integration tests
// ABOUTME: Builds in-memory server resources and seeds users with ready-to-use tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

use std::collections::HashMap;
use std::sync::{Arc, Once};

use giftminder_server::{
    config::ServerConfig,
    database::Database,
    mail::LogMailSender,
    models::{User, UserRole},
    resources::ServerResources,
    services::Registration,
    storage::InMemoryMediaStorage,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests; set `TEST_LOG=debug` for more output
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") | Ok("trace") => tracing::Level::TRACE,
            Ok("DEBUG") | Ok("debug") => tracing::Level::DEBUG,
            Ok("INFO") | Ok("info") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Environment used by every test server
pub fn test_env() -> HashMap<String, String> {
    [
        ("JWT_SECRET_KEY", "integration-test-secret"),
        ("DATABASE_URL", "sqlite::memory:"),
        ("STORAGE_BACKEND", "memory"),
        ("MEDIA_PUBLIC_BASE_URL", "http://media.test"),
        ("BCRYPT_COST", "4"),
        ("APP_NAME", "Giftminder Test"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect()
}

/// Resources plus handles on the test doubles behind them
pub struct TestServer {
    pub resources: Arc<ServerResources>,
    pub mailer: Arc<LogMailSender>,
    pub storage: Arc<InMemoryMediaStorage>,
}

impl TestServer {
    pub fn router(&self) -> axum::Router {
        giftminder_server::routes::router(Arc::clone(&self.resources))
    }
}

/// Fresh in-memory database, storage and outbox
pub async fn create_test_server() -> TestServer {
    init_test_logging();

    let config = ServerConfig::from_map(&test_env()).unwrap();
    let database = Database::new(&config.database.url, config.database.max_connections)
        .await
        .unwrap();
    let mailer = Arc::new(LogMailSender::default());
    let storage = Arc::new(InMemoryMediaStorage::new("http://media.test".to_owned()));

    let resources = Arc::new(ServerResources::new(
        config,
        database,
        Arc::clone(&storage) as _,
        Arc::clone(&mailer) as _,
    ));

    TestServer {
        resources,
        mailer,
        storage,
    }
}

/// A seeded account and its bearer token
pub struct TestUser {
    pub user: User,
    pub password: String,
    pub access_token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Register an already active account with the given role
pub async fn create_active_user(
    resources: &ServerResources,
    username: &str,
    role: UserRole,
) -> TestUser {
    let password = "password123".to_owned();
    let registration = Registration {
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        password: password.clone(),
    };
    let user = resources
        .auth_service()
        .register(&registration, role, true)
        .await
        .unwrap();
    let access_token = resources
        .auth_manager
        .generate_token_pair(&user)
        .unwrap()
        .access_token;

    TestUser {
        user,
        password,
        access_token,
    }
}

pub async fn create_user(resources: &ServerResources, username: &str) -> TestUser {
    create_active_user(resources, username, UserRole::User).await
}

pub async fn create_admin(resources: &ServerResources, username: &str) -> TestUser {
    create_active_user(resources, username, UserRole::Admin).await
}

pub async fn create_root(resources: &ServerResources) -> TestUser {
    create_active_user(resources, "root", UserRole::Root).await
}

/// Minimal PNG: signature plus an IHDR chunk carrying the dimensions
pub fn png(width: u32, height: u32, salt: u8) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 6, 0, 0, 0]);
    data.extend_from_slice(&[0, 0, 0, 0]);
    data.push(salt);
    data
}
