//! Scripted in-memory `DataStore` that records every read.

use async_trait::async_trait;
use invite_schema::{DataStore, Query, Record, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;

/// One read issued against the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub schema: String,
    pub table: String,
    pub query: Query,
}

/// Answers reads from fixtures. Tables listed as failing answer with the
/// PostgREST "relation does not exist" error; unknown tables answer with no
/// rows.
#[derive(Default)]
pub struct RecordingStore {
    rows: HashMap<String, Vec<Record>>,
    failing: Vec<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[allow(dead_code)]
impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, table: &str, rows: Vec<Record>) -> Self {
        self.rows.insert(table.to_string(), rows);
        self
    }

    pub fn failing(mut self, tables: &[&str]) -> Self {
        self.failing.extend(tables.iter().map(|t| t.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn tables_read(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.table).collect()
    }

    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

pub fn missing_relation(schema: &str, table: &str) -> StoreError {
    StoreError::api(
        "42P01",
        format!("relation \"{}.{}\" does not exist", schema, table),
    )
}

#[async_trait]
impl DataStore for RecordingStore {
    async fn query(
        &self,
        schema: &str,
        table: &str,
        query: &Query,
    ) -> Result<Vec<Record>, StoreError> {
        self.calls.lock().unwrap().push(RecordedCall {
            schema: schema.to_string(),
            table: table.to_string(),
            query: query.clone(),
        });

        if self.failing.iter().any(|t| t == table) {
            return Err(missing_relation(schema, table));
        }
        let mut rows = self.rows.get(table).cloned().unwrap_or_default();
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }
}
