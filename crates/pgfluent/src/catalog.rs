//! In-memory mirror of the tables and columns of one schema.
//!
//! The catalog is loaded from `information_schema` when a client connects and is kept in
//! step with the structural changes made through the client afterwards: table shells
//! register an empty entry, column additions append, drops remove. It is never refreshed
//! lazily; [`Catalog::load`] always replaces the whole mapping.

use crate::connection::Connection;
use crate::error::{DbError, DbResult};
use crate::value::Value;
use std::collections::BTreeMap;

const TABLES_SQL: &str = "SELECT table_name::text AS table_name \
     FROM information_schema.tables \
     WHERE table_schema = $1";

const COLUMNS_SQL: &str = "SELECT column_name::text AS column_name \
     FROM information_schema.columns \
     WHERE table_schema = $1 AND table_name = $2 \
     ORDER BY ordinal_position";

/// Table name → column names, keyed by the names PostgreSQL stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tables: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload every table of `schema` and its columns, replacing the cached mapping.
    ///
    /// The mapping is only replaced once all queries succeeded.
    pub async fn load<C: Connection>(&mut self, conn: &C, schema: &str) -> DbResult<()> {
        let schema_param = [Value::from(schema)];
        let table_rows = conn.query(TABLES_SQL, &schema_param).await?;

        let mut tables = BTreeMap::new();
        for row in table_rows {
            let table = text_field(&row, "table_name")?;
            let column_rows = conn
                .query(COLUMNS_SQL, &[Value::from(schema), Value::from(table.as_str())])
                .await?;
            let columns = column_rows
                .iter()
                .map(|r| text_field(r, "column_name"))
                .collect::<DbResult<Vec<_>>>()?;
            tables.insert(table, columns);
        }

        tracing::debug!(target: "pgfluent", schema, tables = tables.len(), "catalog loaded");
        self.tables = tables;
        Ok(())
    }

    /// Whether the table is known.
    pub fn has(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Columns of a known table, in the order they were loaded or added.
    pub fn columns_of(&self, table: &str) -> DbResult<&[String]> {
        self.tables
            .get(table)
            .map(Vec::as_slice)
            .ok_or_else(|| DbError::not_found(format!("table '{table}' is not in the catalog")))
    }

    /// Whether the table is known and has the column.
    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.tables
            .get(table)
            .is_some_and(|cols| cols.iter().any(|c| c == column))
    }

    /// Add an empty entry for a table if it is not already known.
    pub fn register_table(&mut self, table: &str) {
        self.tables.entry(table.to_string()).or_default();
    }

    /// Append a column to a table entry (creating the entry if needed). Idempotent.
    pub fn register_column(&mut self, table: &str, column: &str) {
        let columns = self.tables.entry(table.to_string()).or_default();
        if !columns.iter().any(|c| c == column) {
            columns.push(column.to_string());
        }
    }

    /// Forget a table, returning its columns if it was known.
    pub fn remove(&mut self, table: &str) -> Option<Vec<String>> {
        self.tables.remove(table)
    }

    /// Known table names, sorted.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn text_field(row: &crate::record::Record, column: &str) -> DbResult<String> {
    match row.get(column) {
        Some(Value::Text(s)) => Ok(s.clone()),
        Some(other) => Err(DbError::decode(
            column,
            format!("expected text, got {}", other.kind_name()),
        )),
        None => Err(DbError::decode(column, "column missing from result")),
    }
}
