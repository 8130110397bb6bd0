// ABOUTME: HTTP server binary for the Giftminder API
// ABOUTME: Loads configuration, starts the occurrence scheduler and serves until SIGINT or SIGTERM
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Giftminder Server Binary
//!
//! Starts the REST API with the daily occurrence generator running in the
//! background. Shutdown stops accepting connections, drains in-flight
//! requests and stops the scheduler loop.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use giftminder_server::{config::ServerConfig, logging, resources::ServerResources, routes};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "giftminder-server")]
#[command(about = "Giftminder API - recipients, recurring events and gift ideas")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Do not start the daily occurrence generator
    #[arg(long)]
    no_scheduler: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if args.no_scheduler {
        config.scheduler.enabled = false;
    }

    logging::init_from_env()?;
    info!("Starting Giftminder API");
    info!("{}", config.summary());

    let addr: SocketAddr = format!("{}:{}", config.host, config.http_port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.http_port))?;
    let scheduler_config = config.scheduler;

    let resources = Arc::new(ServerResources::from_config(config).await?);

    let scheduler = scheduler_config.enabled.then(|| {
        Arc::clone(&resources.scheduler).start(scheduler_config.run_on_startup)
    });
    if scheduler.is_none() {
        info!("Occurrence scheduler disabled");
    }

    let app = routes::router(Arc::clone(&resources));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    if let Some(handle) = scheduler {
        handle.shutdown().await;
    }
    info!("Giftminder API stopped");
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
