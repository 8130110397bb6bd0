// ABOUTME: Integration tests for the daily occurrence generator and its scheduler loop
// ABOUTME: Seeds events with past start dates and checks catch-up, leap days and idempotence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use common::init_test_logging;
use giftminder_server::{
    database::Database,
    models::{Event, EventType},
    scheduler::OccurrenceScheduler,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn event(start_date: NaiveDate, is_repeating: bool) -> Event {
    Event {
        id: Uuid::new_v4(),
        title: "Anniversary".to_owned(),
        event_type: EventType::Anniversary,
        is_global: false,
        is_repeating,
        start_date,
        user_id: None,
        recipient_id: None,
        created_at: Utc::now(),
        updated_at: None,
        deleted_at: None,
    }
}

async fn database() -> Database {
    init_test_logging();
    Database::new("sqlite::memory:", 1).await.unwrap()
}

async fn dates(db: &Database, event_id: Uuid) -> Vec<NaiveDate> {
    db.events()
        .occurrences(event_id, None)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.occurrence_date)
        .collect()
}

#[tokio::test]
async fn test_leap_day_series_across_years() {
    let db = database().await;
    let leap = event(date(2024, 2, 29), true);
    db.events().create(&leap).await.unwrap();

    let scheduler = OccurrenceScheduler::new(db.events());
    let created = scheduler.run_once(date(2029, 3, 1)).await.unwrap();
    assert_eq!(created, Some(6));

    assert_eq!(
        dates(&db, leap.id).await,
        vec![
            date(2024, 2, 29),
            date(2025, 2, 28),
            date(2026, 2, 28),
            date(2027, 2, 28),
            date(2028, 2, 29),
            date(2029, 2, 28),
            date(2030, 2, 28),
        ]
    );
}

#[tokio::test]
async fn test_repeated_runs_do_not_duplicate() {
    let db = database().await;
    let yearly = event(date(2020, 6, 15), true);
    db.events().create(&yearly).await.unwrap();
    let scheduler = OccurrenceScheduler::new(db.events());
    let today = date(2023, 1, 10);

    assert_eq!(scheduler.run_once(today).await.unwrap(), Some(3));
    assert_eq!(scheduler.run_once(today).await.unwrap(), Some(0));

    // The next day only extends the series once the upcoming date has passed
    assert_eq!(scheduler.run_once(date(2023, 6, 15)).await.unwrap(), Some(0));
    assert_eq!(scheduler.run_once(date(2023, 6, 16)).await.unwrap(), Some(1));

    assert_eq!(
        dates(&db, yearly.id).await,
        vec![
            date(2020, 6, 15),
            date(2021, 6, 15),
            date(2022, 6, 15),
            date(2023, 6, 15),
            date(2024, 6, 15),
        ]
    );
}

#[tokio::test]
async fn test_one_off_and_deleted_events_are_left_alone() {
    let db = database().await;
    let one_off = event(date(2020, 1, 1), false);
    let deleted = event(date(2020, 1, 1), true);
    db.events().create(&one_off).await.unwrap();
    db.events().create(&deleted).await.unwrap();
    db.events().soft_delete(deleted.id).await.unwrap();

    let scheduler = OccurrenceScheduler::new(db.events());
    assert_eq!(scheduler.run_once(date(2025, 1, 1)).await.unwrap(), Some(0));

    assert_eq!(dates(&db, one_off.id).await, vec![date(2020, 1, 1)]);
    assert_eq!(dates(&db, deleted.id).await, vec![date(2020, 1, 1)]);
}

#[tokio::test]
async fn test_scheduler_catch_up_run_on_startup() {
    let db = database().await;
    let yearly = event(date(2015, 9, 1), true);
    db.events().create(&yearly).await.unwrap();

    let scheduler = Arc::new(OccurrenceScheduler::new(db.events()));
    let handle = Arc::clone(&scheduler).start(true);

    let today = Utc::now().date_naive();
    let mut caught_up = false;
    for _ in 0..50 {
        let latest = dates(&db, yearly.id).await.last().copied().unwrap();
        if latest >= today {
            caught_up = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    handle.shutdown().await;

    assert!(caught_up);
    let series = dates(&db, yearly.id).await;
    assert!(series.windows(2).all(|w| w[0] < w[1]));
}
