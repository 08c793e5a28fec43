//! The data-store capability the verifier consumes.
//!
//! A store answers projected, optionally ordered and limited reads against a
//! named table in an explicitly named schema namespace.

mod postgrest;
mod sqlite;

pub use postgrest::PostgrestStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// One returned row, column name to JSON value.
pub type Record = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// `select <columns> [order by <column>] [limit <n>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub select: Vec<String>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn select<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            select: columns.into_iter().map(Into::into).collect(),
            order_by: None,
            limit: None,
        }
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(OrderBy {
            column: column.into(),
            direction: Direction::Ascending,
        });
        self
    }

    pub fn order_by_desc(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(OrderBy {
            column: column.into(),
            direction: Direction::Descending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "select {}", self.select.join(", "))?;
        if let Some(order) = &self.order_by {
            let direction = match order.direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            write!(f, " order by {} {}", order.column, direction)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " limit {}", limit)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered with a structured error (missing table, denied by
    /// policy, unknown column, ...).
    #[error("{message} (code {code})")]
    Api {
        code: String,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Api {
            code: code.into(),
            message: message.into(),
            details: None,
            hint: None,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

#[async_trait]
pub trait DataStore: Send + Sync {
    async fn query(
        &self,
        schema: &str,
        table: &str,
        query: &Query,
    ) -> Result<Vec<Record>, StoreError>;
}

/// Plain lowercase SQL identifiers only: `[a-z_][a-z0-9_]*`.
pub fn validate_identifier(name: &str) -> Result<&str, StoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_lowercase() || first == '_')
                && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}
