//! Local SQLite mirror of the declared schema.
//!
//! DDL is generated from the [`TableDef`] declarations. SQLite has no uuid,
//! boolean, timestamptz or jsonb types, so those are stored as TEXT/INTEGER
//! and converted back to JSON using the declaration of each created table.

use async_trait::async_trait;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use super::{validate_identifier, DataStore, Direction, Query, Record, StoreError};
use crate::schema::{Column, ColumnDefault, ColumnType, DatabaseSchema, TableDef};

const UUID_V4_EXPR: &str = "(lower(hex(randomblob(4))) || '-' || lower(hex(randomblob(2))) \
    || '-4' || substr(lower(hex(randomblob(2))), 2) || '-' \
    || substr('89ab', 1 + (abs(random()) % 4), 1) || substr(lower(hex(randomblob(2))), 2) \
    || '-' || lower(hex(randomblob(6))))";

const NOW_EXPR: &str = "(strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))";

pub struct SqliteStore {
    conn: Mutex<Connection>,
    tables: Mutex<HashMap<&'static str, &'static TableDef>>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
            tables: Mutex::new(HashMap::new()),
        })
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Transport("sqlite connection lock poisoned".to_string()))
    }

    fn lock_tables(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<&'static str, &'static TableDef>>, StoreError>
    {
        self.tables
            .lock()
            .map_err(|_| StoreError::Transport("sqlite table registry lock poisoned".to_string()))
    }

    /// Creates every table of `schema` in one transaction.
    pub fn create_schema(&self, schema: &'static DatabaseSchema) -> Result<(), StoreError> {
        let tables: Vec<&'static TableDef> = schema.tables.iter().collect();
        self.create_tables(&tables)
    }

    /// Creates the given tables in one transaction, in order.
    pub fn create_tables(&self, tables: &[&'static TableDef]) -> Result<(), StoreError> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        for table in tables {
            let sql = create_table_sql(table)?;
            debug!(table = table.name, "creating table");
            tx.execute(&sql, [])?;
        }
        tx.commit()?;

        self.register(tables)?;
        info!("Created {} tables", tables.len());
        Ok(())
    }

    /// Makes the store decode reads of already existing tables by their
    /// declared column types (booleans, JSON) instead of raw SQLite values.
    pub fn register_schema(&self, schema: &'static DatabaseSchema) -> Result<(), StoreError> {
        let tables: Vec<&'static TableDef> = schema.tables.iter().collect();
        self.register(&tables)
    }

    fn register(&self, tables: &[&'static TableDef]) -> Result<(), StoreError> {
        let mut registry = self.lock_tables()?;
        for table in tables {
            registry.insert(table.name, *table);
        }
        Ok(())
    }

    /// Inserts one row. JSON objects and arrays are stored as their text
    /// encoding, booleans as 0/1.
    pub fn insert_record(&self, table: &str, record: &Record) -> Result<(), StoreError> {
        let table = validate_identifier(table)?;
        let mut columns = Vec::with_capacity(record.len());
        let mut values = Vec::with_capacity(record.len());
        for (column, value) in record {
            columns.push(quote(validate_identifier(column)?));
            values.push(to_sql_value(value));
        }
        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(table),
            columns.join(", "),
            placeholders.join(", ")
        );
        let conn = self.lock_conn()?;
        conn.execute(&sql, params_from_iter(values))?;
        Ok(())
    }

    /// Names of the tables present in the database file.
    pub fn existing_tables(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

fn sqlite_type(column_type: &ColumnType) -> &'static str {
    match column_type {
        ColumnType::Integer | ColumnType::Boolean => "INTEGER",
        ColumnType::Numeric => "NUMERIC",
        ColumnType::Double => "REAL",
        ColumnType::Uuid
        | ColumnType::Text
        | ColumnType::Timestamptz
        | ColumnType::Json
        | ColumnType::Enum(_) => "TEXT",
    }
}

fn column_sql(column: &Column) -> String {
    let mut sql = format!("{} {}", quote(column.name), sqlite_type(&column.column_type));
    if column.non_null {
        sql.push_str(" NOT NULL");
    }
    if column.is_unique {
        sql.push_str(" UNIQUE");
    }
    if let Some(default_value) = column.default_value {
        let expr = match default_value {
            ColumnDefault::GeneratedUuid => UUID_V4_EXPR,
            ColumnDefault::Now => NOW_EXPR,
            ColumnDefault::Literal(literal) => literal,
        };
        sql.push_str(&format!(" DEFAULT {}", expr));
    }
    if let Some(domain) = column.enum_domain() {
        let values: Vec<String> = domain.values.iter().map(|v| format!("'{}'", v)).collect();
        sql.push_str(&format!(
            " CHECK ({} IN ({}))",
            quote(column.name),
            values.join(", ")
        ));
    }
    sql
}

fn quoted_list(names: &[&str]) -> Result<String, StoreError> {
    let quoted = names
        .iter()
        .map(|name| validate_identifier(name).map(quote))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(quoted.join(", "))
}

/// `CREATE TABLE` statement for one declaration.
pub fn create_table_sql(table: &TableDef) -> Result<String, StoreError> {
    validate_identifier(table.name)?;
    let mut parts = Vec::new();
    for column in table.columns {
        validate_identifier(column.name)?;
        parts.push(column_sql(column));
    }
    if !table.primary_key.is_empty() {
        parts.push(format!("PRIMARY KEY ({})", quoted_list(table.primary_key)?));
    }
    for unique in table.unique_constraints {
        parts.push(format!("UNIQUE ({})", quoted_list(unique)?));
    }
    for relationship in table.relationships {
        parts.push(format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {}",
            quote(validate_identifier(relationship.foreign_key_name)?),
            quoted_list(relationship.columns)?,
            quote(validate_identifier(relationship.referenced_relation)?),
            quoted_list(relationship.referenced_columns)?,
            relationship.on_delete.sql()
        ));
    }
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        quote(table.name),
        parts.join(",\n    ")
    ))
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

fn from_sql_value(value: ValueRef<'_>, column: Option<&Column>) -> Value {
    let column_type = column.map(|c| c.column_type);
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => match column_type {
            Some(ColumnType::Boolean) => Value::Bool(i != 0),
            Some(ColumnType::Numeric) | Some(ColumnType::Double) => {
                serde_json::Number::from_f64(i as f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
            _ => Value::from(i),
        },
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            match column_type {
                Some(ColumnType::Json) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
                _ => Value::String(text),
            }
        }
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}

#[async_trait]
impl DataStore for SqliteStore {
    async fn query(
        &self,
        schema: &str,
        table: &str,
        query: &Query,
    ) -> Result<Vec<Record>, StoreError> {
        let database = match schema {
            "public" => "main",
            other => validate_identifier(other)?,
        };
        let table = validate_identifier(table)?;
        let columns = query
            .select
            .iter()
            .map(|c| validate_identifier(c))
            .collect::<Result<Vec<_>, _>>()?;

        let mut sql = format!(
            "SELECT {} FROM {}.{}",
            columns.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", "),
            quote(database),
            quote(table)
        );
        if let Some(order) = &query.order_by {
            let direction = match order.direction {
                Direction::Ascending => "ASC",
                Direction::Descending => "DESC",
            };
            sql.push_str(&format!(
                " ORDER BY {} {}",
                quote(validate_identifier(&order.column)?),
                direction
            ));
        }
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        debug!(%sql, "querying sqlite");

        let declaration = self.lock_tables()?.get(table).copied();
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let mut record = Record::new();
            for (index, name) in columns.iter().enumerate() {
                let column = declaration.and_then(|t| t.column(name));
                record.insert(name.to_string(), from_sql_value(row.get_ref(index)?, column));
            }
            Ok(record)
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
