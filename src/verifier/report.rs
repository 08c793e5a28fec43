use serde_json::Value;
use std::fmt;

use crate::store::Record;

/// Rows returned by the catalog read, for operator inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogListing {
    pub table: &'static str,
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl CatalogListing {
    /// Each row rendered as text cells in column order.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| row.get(c).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

/// Text form of a JSON cell: strings unquoted, null empty.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Reachable,
    /// The store error, as text.
    Unreachable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOutcome {
    pub table: &'static str,
    pub probe_column: &'static str,
    pub status: TableStatus,
}

impl TableOutcome {
    pub fn is_reachable(&self) -> bool {
        self.status == TableStatus::Reachable
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            TableStatus::Reachable => None,
            TableStatus::Unreachable(e) => Some(e),
        }
    }
}

/// Result of a completed run. Outcomes are in roster order.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    /// Namespace the reads were issued against.
    pub schema: String,
    pub catalog: CatalogListing,
    pub outcomes: Vec<TableOutcome>,
}

impl VerificationReport {
    pub fn failures(&self) -> impl Iterator<Item = &TableOutcome> {
        self.outcomes.iter().filter(|o| !o.is_reachable())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    pub fn summary(&self) -> String {
        match self.failure_count() {
            0 => "verification completed successfully".to_string(),
            1 => "verification completed with 1 failure".to_string(),
            n => format!("verification completed with {} failures", n),
        }
    }

    /// Process exit code for a completed run. Unreachable tables only fail
    /// the process in strict mode.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if strict && !self.is_success() {
            2
        } else {
            0
        }
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "catalog {}.{}: {} row(s)",
            self.schema,
            self.catalog.table,
            self.catalog.rows.len()
        )?;
        writeln!(f, "  {}", self.catalog.columns.join(" | "))?;
        for row in self.catalog.text_rows() {
            writeln!(f, "  {}", row.join(" | "))?;
        }
        for outcome in &self.outcomes {
            match &outcome.status {
                TableStatus::Reachable => writeln!(f, "[ok]   {}", outcome.table)?,
                TableStatus::Unreachable(e) => writeln!(f, "[FAIL] {}: {}", outcome.table, e)?,
            }
        }
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_report(statuses: &[(&'static str, TableStatus)]) -> VerificationReport {
        VerificationReport {
            schema: "public".to_string(),
            catalog: CatalogListing {
                table: "themes",
                columns: vec!["slug".to_string(), "name".to_string(), "is_premium".to_string()],
                rows: vec![json!({ "slug": "gold", "name": "Gold Leaf", "is_premium": true })
                    .as_object()
                    .cloned()
                    .unwrap()],
            },
            outcomes: statuses
                .iter()
                .map(|(table, status)| TableOutcome {
                    table: *table,
                    probe_column: "id",
                    status: status.clone(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_summary_wording() {
        let ok = make_report(&[("users", TableStatus::Reachable)]);
        assert_eq!(ok.summary(), "verification completed successfully");
        assert!(ok.is_success());

        let one = make_report(&[
            ("users", TableStatus::Reachable),
            ("donations", TableStatus::Unreachable("denied".into())),
        ]);
        assert_eq!(one.summary(), "verification completed with 1 failure");

        let two = make_report(&[
            ("users", TableStatus::Unreachable("denied".into())),
            ("donations", TableStatus::Unreachable("denied".into())),
        ]);
        assert_eq!(two.summary(), "verification completed with 2 failures");
    }

    #[test]
    fn test_exit_code_only_fails_in_strict_mode() {
        let report = make_report(&[("donations", TableStatus::Unreachable("denied".into()))]);
        assert_eq!(report.exit_code(false), 0);
        assert_eq!(report.exit_code(true), 2);
        let report = make_report(&[("users", TableStatus::Reachable)]);
        assert_eq!(report.exit_code(true), 0);
    }

    #[test]
    fn test_display_lists_catalog_then_tables() {
        let report = make_report(&[
            ("users", TableStatus::Reachable),
            ("donations", TableStatus::Unreachable("permission denied".into())),
        ]);
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "catalog public.themes: 1 row(s)",
                "  slug | name | is_premium",
                "  gold | Gold Leaf | true",
                "[ok]   users",
                "[FAIL] donations: permission denied",
                "verification completed with 1 failure",
            ]
        );
    }

    #[test]
    fn test_missing_and_null_cells_render_empty() {
        let mut listing = make_report(&[]).catalog;
        listing.rows = vec![json!({ "slug": "plain", "name": null })
            .as_object()
            .cloned()
            .unwrap()];
        assert_eq!(listing.text_rows(), vec![vec!["plain", "", ""]]);
    }
}
