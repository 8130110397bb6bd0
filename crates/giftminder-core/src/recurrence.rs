// ABOUTME: Yearly recurrence arithmetic for repeating events
// ABOUTME: Computes anniversaries of a start date and the occurrences still missing up to today
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Yearly recurrence.
//!
//! The `k`-th occurrence of an event is its start date moved `k` years
//! forward. February 29 has no counterpart in common years and falls back to
//! February 28. Offsets are always computed from the start date, so an event
//! starting on a leap day returns to February 29 in the next leap year.

use chrono::{Datelike, NaiveDate};

/// The occurrence `years` after `start`
///
/// Returns `None` only when the target year is outside chrono's range.
#[must_use]
pub fn yearly_occurrence(start: NaiveDate, years: u32) -> Option<NaiveDate> {
    let year = start.year().checked_add(i32::try_from(years).ok()?)?;
    NaiveDate::from_ymd_opt(year, start.month(), start.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, start.month(), start.day() - 1))
}

/// Occurrences that must be created so the event has one on or after `today`
///
/// `latest` is the most recent occurrence already stored. When nothing is
/// stored the start date itself is due. Dates are returned in ascending order
/// and the last one is the first occurrence not before `today`.
#[must_use]
pub fn missing_occurrences(
    start: NaiveDate,
    latest: Option<NaiveDate>,
    today: NaiveDate,
) -> Vec<NaiveDate> {
    let mut due = Vec::new();

    let (mut offset, mut last) = match latest {
        Some(latest) => (years_between(start, latest), latest),
        None => {
            due.push(start);
            (0, start)
        }
    };

    while last < today {
        offset += 1;
        let Some(next) = yearly_occurrence(start, offset) else {
            break;
        };
        if next > last {
            due.push(next);
            last = next;
        }
    }

    due
}

/// Whole-year offset of `date` relative to `start`, never negative
fn years_between(start: NaiveDate, date: NaiveDate) -> u32 {
    u32::try_from(date.year() - start.year()).unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_yearly_occurrence_plain_date() {
        assert_eq!(yearly_occurrence(date(2020, 6, 15), 0), Some(date(2020, 6, 15)));
        assert_eq!(yearly_occurrence(date(2020, 6, 15), 3), Some(date(2023, 6, 15)));
    }

    #[test]
    fn test_leap_day_clamps_and_returns() {
        let start = date(2024, 2, 29);
        assert_eq!(yearly_occurrence(start, 1), Some(date(2025, 2, 28)));
        assert_eq!(yearly_occurrence(start, 3), Some(date(2027, 2, 28)));
        assert_eq!(yearly_occurrence(start, 4), Some(date(2028, 2, 29)));
    }

    #[test]
    fn test_nothing_stored_start_in_future() {
        let due = missing_occurrences(date(2030, 1, 1), None, date(2026, 5, 1));
        assert_eq!(due, vec![date(2030, 1, 1)]);
    }

    #[test]
    fn test_upcoming_occurrence_already_stored() {
        let due = missing_occurrences(date(2020, 9, 1), Some(date(2026, 9, 1)), date(2026, 5, 1));
        assert!(due.is_empty());
    }

    #[test]
    fn test_occurrence_today_counts_as_upcoming() {
        let due = missing_occurrences(date(2020, 5, 1), Some(date(2026, 5, 1)), date(2026, 5, 1));
        assert!(due.is_empty());
    }

    #[test]
    fn test_next_year_generated_once_passed() {
        let due = missing_occurrences(date(2024, 3, 10), Some(date(2024, 3, 10)), date(2024, 3, 11));
        assert_eq!(due, vec![date(2025, 3, 10)]);
    }

    #[test]
    fn test_catch_up_across_missed_years() {
        let due = missing_occurrences(date(2020, 12, 24), Some(date(2021, 12, 24)), date(2025, 1, 5));
        assert_eq!(
            due,
            vec![date(2022, 12, 24), date(2023, 12, 24), date(2024, 12, 24), date(2025, 12, 24)]
        );
    }

    #[test]
    fn test_catch_up_from_start_when_nothing_stored() {
        let due = missing_occurrences(date(2023, 7, 4), None, date(2024, 8, 1));
        assert_eq!(due, vec![date(2023, 7, 4), date(2024, 7, 4), date(2025, 7, 4)]);
    }

    #[test]
    fn test_leap_day_series_keeps_anchor() {
        let due = missing_occurrences(date(2024, 2, 29), Some(date(2024, 2, 29)), date(2028, 1, 1));
        assert_eq!(
            due,
            vec![date(2025, 2, 28), date(2026, 2, 28), date(2027, 2, 28), date(2028, 2, 29)]
        );
    }
}
