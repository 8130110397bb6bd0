// ABOUTME: Daily background job that materialises yearly event occurrences
// ABOUTME: Fires at 00:00 UTC, skips a run while the previous one is still going, stops on shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Occurrence Scheduler
//!
//! The loop sleeps until the next UTC midnight, then triggers a generator run
//! in its own task. A run holds a mutex for its whole duration; a trigger that
//! cannot take it is skipped, so at most one run is ever in flight. Missed
//! midnights (suspended host, long run) coalesce into the next trigger since
//! every run catches up to today.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::database::EventsManager;
use crate::errors::AppResult;

/// Runs the occurrence generator with a single-instance guard
pub struct OccurrenceScheduler {
    events: EventsManager,
    running: Mutex<()>,
}

impl OccurrenceScheduler {
    /// Create a scheduler over the given events manager
    #[must_use]
    pub fn new(events: EventsManager) -> Self {
        Self {
            events,
            running: Mutex::new(()),
        }
    }

    /// Run the generator for `today` unless a run is already in progress
    ///
    /// Returns `None` when the run was skipped, otherwise the number of
    /// occurrences created.
    ///
    /// # Errors
    ///
    /// Returns an error if the generator fails
    pub async fn run_once(&self, today: NaiveDate) -> AppResult<Option<u64>> {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::warn!(%today, "Occurrence generation already running, skipping");
            return Ok(None);
        };

        let started = std::time::Instant::now();
        let created = self.events.generate_missing_occurrences(today).await?;
        tracing::info!(
            %today,
            created,
            elapsed_ms = started.elapsed().as_millis(),
            "Occurrence generation finished"
        );
        Ok(Some(created))
    }

    async fn run_logged(self: Arc<Self>) {
        let today = Utc::now().date_naive();
        if let Err(e) = self.run_once(today).await {
            tracing::error!(%today, error = %e, "Occurrence generation failed");
        }
    }

    /// Start the daily loop
    ///
    /// With `run_on_startup` a catch-up run is triggered immediately.
    #[must_use]
    pub fn start(self: Arc<Self>, run_on_startup: bool) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let join = tokio::spawn(async move {
            if run_on_startup {
                tokio::spawn(Arc::clone(&self).run_logged());
            }

            loop {
                let wait = until_next_midnight(Utc::now());
                tracing::debug!(wait_secs = wait.as_secs(), "Next occurrence generation scheduled");

                tokio::select! {
                    () = tokio::time::sleep(wait) => {
                        tokio::spawn(Arc::clone(&self).run_logged());
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::debug!("Occurrence scheduler received shutdown signal");
                        break;
                    }
                }
            }
        });

        tracing::info!(run_on_startup, "Occurrence scheduler started");
        SchedulerHandle { shutdown_tx, join }
    }
}

/// Handle to a running scheduler loop
pub struct SchedulerHandle {
    shutdown_tx: mpsc::Sender<()>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the loop and wait for it to exit; an in-flight run finishes on its own
    pub async fn shutdown(self) {
        // The loop may already be gone, in which case there is nobody to tell.
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.join.await {
            tracing::warn!(error = %e, "Occurrence scheduler task ended abnormally");
        }
    }
}

/// Time from `now` until the next 00:00 UTC, never zero
#[must_use]
pub fn until_next_midnight(now: DateTime<Utc>) -> Duration {
    let next_midnight = (now.date_naive() + TimeDelta::days(1))
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc());

    next_midnight
        .and_then(|midnight| (midnight - now).to_std().ok())
        .filter(|wait| !wait.is_zero())
        .unwrap_or(Duration::from_secs(24 * 60 * 60))
}
