// ABOUTME: Offset pagination and whitelisted ordering for list endpoints
// ABOUTME: Validates limit/offset bounds and maps order_by names to SQL columns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::Deserialize;

use crate::constants::pagination::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::errors::{AppError, AppResult};

/// Raw pagination query parameters as sent by clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationQuery {
    /// Page size, 1..=100
    pub limit: Option<i64>,
    /// Number of rows to skip, >= 0
    pub offset: Option<i64>,
    /// Field to sort by
    pub order_by: Option<String>,
    /// Sort descending
    #[serde(default)]
    pub desc: bool,
}

/// Validated pagination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Page size
    pub limit: u32,
    /// Rows to skip
    pub offset: u32,
    /// Requested sort field, trimmed, `None` when blank
    pub order_by: Option<String>,
    /// Sort descending
    pub desc: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            order_by: None,
            desc: false,
        }
    }
}

impl TryFrom<PaginationQuery> for Pagination {
    type Error = AppError;

    fn try_from(query: PaginationQuery) -> AppResult<Self> {
        let limit = match query.limit {
            None => DEFAULT_LIMIT,
            Some(limit) => u32::try_from(limit)
                .ok()
                .filter(|l| (1..=MAX_LIMIT).contains(l))
                .ok_or_else(|| {
                    AppError::out_of_range(format!("limit must be between 1 and {MAX_LIMIT}"))
                })?,
        };

        let offset = match query.offset {
            None => 0,
            Some(offset) => u32::try_from(offset)
                .map_err(|_| AppError::out_of_range("offset must be greater than or equal to 0"))?,
        };

        let order_by = query
            .order_by
            .map(|o| o.trim().to_owned())
            .filter(|o| !o.is_empty());

        Ok(Self {
            limit,
            offset,
            order_by,
            desc: query.desc,
        })
    }
}

impl Pagination {
    /// Build an `ORDER BY` clause from the requested field
    ///
    /// `allowed` maps public field names to SQL columns; the first entry is
    /// the default when the client did not ask for an ordering.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `order_by` names a field outside `allowed`
    pub fn order_clause(&self, allowed: &[(&str, &str)]) -> AppResult<String> {
        let column = match &self.order_by {
            None => allowed.first().map(|(_, column)| *column),
            Some(field) => allowed
                .iter()
                .find(|(name, _)| name == field)
                .map(|(_, column)| *column),
        }
        .ok_or_else(|| {
            let names: Vec<&str> = allowed.iter().map(|(name, _)| *name).collect();
            AppError::invalid_input(format!(
                "order_by must be one of: {}",
                names.join(", ")
            ))
        })?;

        let direction = if self.desc { "DESC" } else { "ASC" };
        Ok(format!("ORDER BY {column} {direction}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const FIELDS: &[(&str, &str)] = &[("created_at", "created_at"), ("name", "name")];

    #[test]
    fn test_defaults() {
        let page = Pagination::try_from(PaginationQuery::default()).unwrap();
        assert_eq!(page, Pagination::default());
        assert_eq!(page.limit, 20);
        assert_eq!(
            page.order_clause(FIELDS).unwrap(),
            "ORDER BY created_at ASC"
        );
    }

    #[test]
    fn test_limit_bounds() {
        for bad in [0, 101, -1] {
            let query = PaginationQuery {
                limit: Some(bad),
                ..PaginationQuery::default()
            };
            assert_eq!(Pagination::try_from(query).unwrap_err().http_status(), 400);
        }
        let query = PaginationQuery {
            limit: Some(100),
            ..PaginationQuery::default()
        };
        assert_eq!(Pagination::try_from(query).unwrap().limit, 100);
    }

    #[test]
    fn test_negative_offset_rejected() {
        let query = PaginationQuery {
            offset: Some(-5),
            ..PaginationQuery::default()
        };
        assert!(Pagination::try_from(query).is_err());
    }

    #[test]
    fn test_order_by_trimmed_and_whitelisted() {
        let query = PaginationQuery {
            order_by: Some("  name ".to_owned()),
            desc: true,
            ..PaginationQuery::default()
        };
        let page = Pagination::try_from(query).unwrap();
        assert_eq!(page.order_by.as_deref(), Some("name"));
        assert_eq!(page.order_clause(FIELDS).unwrap(), "ORDER BY name DESC");

        let query = PaginationQuery {
            order_by: Some("password; DROP TABLE users".to_owned()),
            ..PaginationQuery::default()
        };
        let page = Pagination::try_from(query).unwrap();
        assert!(page.order_clause(FIELDS).is_err());
    }

    #[test]
    fn test_blank_order_by_uses_default() {
        let query = PaginationQuery {
            order_by: Some("   ".to_owned()),
            ..PaginationQuery::default()
        };
        let page = Pagination::try_from(query).unwrap();
        assert!(page.order_by.is_none());
    }
}
