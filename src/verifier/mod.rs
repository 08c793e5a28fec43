//! Schema-accessibility verification.
//!
//! A run first reads a small projection of the catalog table. That read
//! proves the connection and credentials work; if it fails the run stops
//! with [`VerifyError::CatalogUnreachable`] before any table is probed.
//! Then every table of the roster gets exactly one single-row read of its
//! probe column, strictly in roster order. Probe failures are recorded
//! against their table and never stop the loop.

mod report;

pub use report::{cell_text, CatalogListing, TableOutcome, TableStatus, VerificationReport};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::schema::{DatabaseSchema, TableDef};
use crate::store::{DataStore, Query, StoreError};

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("table {0:?} is not declared in the schema")]
    UnknownTable(String),

    #[error("no tables left to probe once catalog tables are skipped")]
    EmptyRoster,

    #[error("catalog table {table} is unreachable: {source}")]
    CatalogUnreachable {
        table: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Which catalog table to list and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCheck {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub order_by: &'static str,
}

impl CatalogCheck {
    pub const THEMES: CatalogCheck = CatalogCheck {
        table: "themes",
        columns: &["slug", "name", "is_premium"],
        order_by: "name",
    };

    pub fn query(&self) -> Query {
        Query::select(self.columns.iter().copied()).order_by(self.order_by)
    }
}

/// The one-row read that proves `table` is reachable.
pub fn probe_query(table: &TableDef) -> Query {
    Query::select([table.probe_column()]).limit(1)
}

pub struct SchemaVerifier<'a> {
    store: &'a dyn DataStore,
    schema: &'static DatabaseSchema,
    namespace: String,
    catalog: CatalogCheck,
    roster: Vec<&'static TableDef>,
}

impl<'a> SchemaVerifier<'a> {
    /// Verifies every non-catalog table of `schema`, in declaration order.
    pub fn new(store: &'a dyn DataStore, schema: &'static DatabaseSchema) -> Self {
        Self {
            store,
            schema,
            namespace: schema.name.to_string(),
            catalog: CatalogCheck::THEMES,
            roster: schema.accessibility_roster(),
        }
    }

    /// Restricts the accessibility loop to `names`, in the given order.
    /// Catalog tables are dropped from the loop since the catalog check
    /// already covers them, and a repeated name keeps its first position.
    pub fn with_roster<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self, VerifyError> {
        let mut roster: Vec<&'static TableDef> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let table = self
                .schema
                .table(name)
                .ok_or_else(|| VerifyError::UnknownTable(name.to_string()))?;
            if table.is_catalog() || roster.iter().any(|t| t.name == table.name) {
                continue;
            }
            roster.push(table);
        }
        if roster.is_empty() {
            return Err(VerifyError::EmptyRoster);
        }
        self.roster = roster;
        Ok(self)
    }

    /// Issues reads against `namespace` instead of the schema's own name,
    /// e.g. a staging copy of the same tables.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_catalog(mut self, catalog: CatalogCheck) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn roster(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.roster.iter().map(|t| t.name)
    }

    pub async fn run(&self) -> Result<VerificationReport, VerifyError> {
        if self.roster.is_empty() {
            return Err(VerifyError::EmptyRoster);
        }
        info!(
            "Reading catalog table {} in schema {}...",
            self.catalog.table, self.namespace
        );
        let query = self.catalog.query();
        debug!(table = self.catalog.table, %query, "issuing catalog read");
        let rows = self
            .store
            .query(&self.namespace, self.catalog.table, &query)
            .await
            .map_err(|source| {
                error!("Catalog read failed: {}", source);
                VerifyError::CatalogUnreachable {
                    table: self.catalog.table,
                    source,
                }
            })?;
        info!("Catalog table {} returned {} rows", self.catalog.table, rows.len());

        let catalog = CatalogListing {
            table: self.catalog.table,
            columns: self.catalog.columns.iter().map(|c| c.to_string()).collect(),
            rows,
        };

        info!("Probing {} tables...", self.roster.len());
        let mut outcomes = Vec::with_capacity(self.roster.len());
        for table in &self.roster {
            let query = probe_query(table);
            debug!(table = table.name, %query, "issuing probe");
            let status = match self.store.query(&self.namespace, table.name, &query).await {
                Ok(_) => TableStatus::Reachable,
                Err(e) => {
                    warn!("Table {} is unreachable: {}", table.name, e);
                    TableStatus::Unreachable(e.to_string())
                }
            };
            outcomes.push(TableOutcome {
                table: table.name,
                probe_column: table.probe_column(),
                status,
            });
        }

        let report = VerificationReport {
            schema: self.namespace.clone(),
            catalog,
            outcomes,
        };
        info!("{}", report.summary());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PUBLIC_SCHEMA;
    use crate::store::Record;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers every read with no rows, failing the listed tables.
    struct StubStore {
        failing: Vec<&'static str>,
        calls: Mutex<Vec<(String, Query)>>,
    }

    impl StubStore {
        fn failing(tables: &[&'static str]) -> Self {
            Self {
                failing: tables.to_vec(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DataStore for StubStore {
        async fn query(
            &self,
            _schema: &str,
            table: &str,
            query: &Query,
        ) -> Result<Vec<Record>, StoreError> {
            self.calls
                .lock()
                .unwrap()
                .push((table.to_string(), query.clone()));
            if self.failing.iter().any(|t| *t == table) {
                Err(StoreError::api("42501", "permission denied"))
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[test]
    fn test_catalog_query_shape() {
        let query = CatalogCheck::THEMES.query();
        assert_eq!(query.to_string(), "select slug, name, is_premium order by name asc");
    }

    #[test]
    fn test_probe_query_uses_probe_column() {
        let table = PUBLIC_SCHEMA.table("event_details").unwrap();
        assert_eq!(probe_query(table).to_string(), "select event_id limit 1");
    }

    #[test]
    fn test_with_roster_rejects_unknown_tables() {
        let store = StubStore::failing(&[]);
        let result = SchemaVerifier::new(&store, &PUBLIC_SCHEMA).with_roster(&["users", "payments"]);
        assert!(matches!(result, Err(VerifyError::UnknownTable(name)) if name == "payments"));
        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_with_roster_skips_catalog_tables() {
        let store = StubStore::failing(&[]);
        let verifier = SchemaVerifier::new(&store, &PUBLIC_SCHEMA)
            .with_roster(&["users", "themes", "donations"])
            .unwrap();
        assert_eq!(verifier.roster().collect::<Vec<_>>(), vec!["users", "donations"]);
    }

    #[test]
    fn test_with_roster_keeps_first_occurrence_of_repeats() {
        let store = StubStore::failing(&[]);
        let verifier = SchemaVerifier::new(&store, &PUBLIC_SCHEMA)
            .with_roster(&["guests", "users", "guests", "rsvps", "users"])
            .unwrap();
        assert_eq!(
            verifier.roster().collect::<Vec<_>>(),
            vec!["guests", "users", "rsvps"]
        );
    }

    #[test]
    fn test_with_roster_rejects_empty_rosters() {
        let store = StubStore::failing(&[]);
        let empty: Vec<String> = Vec::new();
        assert!(matches!(
            SchemaVerifier::new(&store, &PUBLIC_SCHEMA).with_roster(&empty),
            Err(VerifyError::EmptyRoster)
        ));
        assert!(matches!(
            SchemaVerifier::new(&store, &PUBLIC_SCHEMA).with_roster(&["themes", "themes"]),
            Err(VerifyError::EmptyRoster)
        ));
        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_custom_catalog_check() {
        let store = StubStore::failing(&[]);
        let catalog = CatalogCheck {
            table: "themes",
            columns: &["slug", "preview_url"],
            order_by: "slug",
        };
        let report = SchemaVerifier::new(&store, &PUBLIC_SCHEMA)
            .with_catalog(catalog)
            .with_roster(&["users"])
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.catalog.columns, vec!["slug", "preview_url"]);
        let calls = store.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "themes");
        assert_eq!(calls[0].1.to_string(), "select slug, preview_url order by slug asc");
    }

    #[tokio::test]
    async fn test_catalog_failure_is_fatal() {
        let store = StubStore::failing(&["themes"]);
        let result = SchemaVerifier::new(&store, &PUBLIC_SCHEMA).run().await;
        assert!(matches!(
            result,
            Err(VerifyError::CatalogUnreachable { table: "themes", .. })
        ));
        assert_eq!(store.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_probe_failure_is_recorded_and_loop_continues() {
        let store = StubStore::failing(&["orgs"]);
        let report = SchemaVerifier::new(&store, &PUBLIC_SCHEMA).run().await.unwrap();
        assert_eq!(report.outcomes.len(), 13);
        let failures: Vec<&str> = report.failures().map(|o| o.table).collect();
        assert_eq!(failures, vec!["orgs"]);
        assert_eq!(store.calls.lock().unwrap().len(), 14);
    }
}
