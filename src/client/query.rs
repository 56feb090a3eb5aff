//! PostgREST query parameters.
//!
//! Only the handful of operators the bug tracker needs. Values are rendered
//! as PostgREST expects (`status=eq.open`, `order=created_at.desc`) and left
//! for reqwest to URL-encode.

use std::fmt;

use crate::schema::{BugPriority, BugStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Filters, ordering and paging for a `select`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<(String, String)>,
    order: Option<(String, Direction)>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl fmt::Display) -> Self {
        self.filters.push((column.into(), format!("eq.{value}")));
        self
    }

    /// `column IS NULL`.
    pub fn is_null(mut self, column: impl Into<String>) -> Self {
        self.filters.push((column.into(), "is.null".to_string()));
        self
    }

    /// Replaces any previous ordering.
    pub fn order(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((column.into(), direction));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    /// Render as query-string pairs, filters first.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = self.filters.clone();
        if let Some((column, direction)) = &self.order {
            params.push(("order".into(), format!("{column}.{}", direction.as_str())));
        }
        if let Some(n) = self.limit {
            params.push(("limit".into(), n.to_string()));
        }
        if let Some(n) = self.offset {
            params.push(("offset".into(), n.to_string()));
        }
        params
    }
}

/// Common `bugs` listing filter. Newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugFilter {
    pub status: Option<BugStatus>,
    pub priority: Option<BugPriority>,
    pub assigned_to: Option<String>,
    pub limit: Option<usize>,
}

impl From<&BugFilter> for Query {
    fn from(filter: &BugFilter) -> Self {
        let mut query = Query::new();
        if let Some(status) = filter.status {
            query = query.eq("status", status);
        }
        if let Some(priority) = filter.priority {
            query = query.eq("priority", priority);
        }
        if let Some(user) = &filter.assigned_to {
            query = query.eq("assigned_to", user);
        }
        query = query.order("created_at", Direction::Desc);
        if let Some(n) = filter.limit {
            query = query.limit(n);
        }
        query
    }
}
