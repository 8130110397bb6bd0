// ABOUTME: Welcome and health check endpoints
// ABOUTME: Served at the root, outside the versioned API prefix
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the welcome and health routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        async fn welcome_handler(
            State(resources): State<Arc<ServerResources>>,
        ) -> Json<serde_json::Value> {
            Json(serde_json::json!({
                "message": "Welcome!",
                "app_name": resources.config.app_name,
            }))
        }

        async fn health_handler(
            State(resources): State<Arc<ServerResources>>,
        ) -> Json<serde_json::Value> {
            let database = match sqlx::query("SELECT 1")
                .execute(resources.database.pool())
                .await
            {
                Ok(_) => "ok",
                Err(e) => {
                    tracing::warn!(error = %e, "Health check database probe failed");
                    "unavailable"
                }
            };
            Json(serde_json::json!({
                "status": if database == "ok" { "healthy" } else { "degraded" },
                "database": database,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))
        }

        Router::new()
            .route("/", get(welcome_handler))
            .route("/health", get(health_handler))
            .with_state(resources)
    }
}
