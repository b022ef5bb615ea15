//! In-memory `Connection` used by the unit tests.
//!
//! It records every statement, serves `information_schema` queries from a small table map,
//! and applies the DDL the builders emit to that map so reloads observe it.

use crate::connection::Connection;
use crate::error::{DbError, DbResult};
use crate::record::Record;
use crate::value::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Query,
    Execute,
    Commit,
    Rollback,
}

#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub kind: Kind,
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Default)]
pub(crate) struct RecordingConnection {
    tables: Mutex<BTreeMap<String, Vec<String>>>,
    rows: Mutex<BTreeMap<String, Vec<Record>>>,
    log: Mutex<Vec<Recorded>>,
    fail_on: Option<String>,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, table: &str, columns: &[&str]) -> Self {
        self.tables.lock().unwrap().insert(
            table.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    /// Rows returned by any non-catalog SELECT against `table`.
    pub fn with_rows(self, table: &str, rows: Vec<Record>) -> Self {
        self.rows.lock().unwrap().insert(table.to_string(), rows);
        self
    }

    /// Fail every statement whose SQL contains `needle`.
    pub fn fail_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub fn statements(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    /// SQL of everything except catalog queries, in order.
    pub fn sql_log(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|s| !s.sql.contains("information_schema"))
            .map(|s| s.sql)
            .collect()
    }

    pub fn count_matching(&self, needle: &str) -> usize {
        self.statements()
            .iter()
            .filter(|s| s.sql.contains(needle))
            .count()
    }

    pub fn clear_log(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn live_columns(&self, table: &str) -> Option<Vec<String>> {
        self.tables.lock().unwrap().get(table).cloned()
    }

    fn record(&self, kind: Kind, sql: &str, params: &[Value]) -> DbResult<()> {
        self.log.lock().unwrap().push(Recorded {
            kind,
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        match &self.fail_on {
            Some(needle) if sql.contains(needle.as_str()) => {
                Err(DbError::Other(format!("scripted failure: {sql}")))
            }
            _ => Ok(()),
        }
    }

    fn apply_ddl(&self, sql: &str) {
        let words: Vec<&str> = sql.split_whitespace().collect();
        let mut tables = self.tables.lock().unwrap();
        match words.as_slice() {
            ["CREATE", "TABLE", name, rest @ ..] => {
                let column = rest.first().map(|c| stored_name(c.trim_start_matches('(')));
                tables.insert(stored_name(name), column.into_iter().collect());
            }
            ["DROP", "TABLE", name, ..] => {
                tables.remove(&stored_name(name));
            }
            ["ALTER", "TABLE", name, "ADD", column, ..] if *column != "CONSTRAINT" => {
                tables
                    .entry(stored_name(name))
                    .or_default()
                    .push(stored_name(column));
            }
            ["ALTER", "TABLE", name, "DROP", "COLUMN", column, ..] => {
                let column = stored_name(column);
                if let Some(cols) = tables.get_mut(&stored_name(name)) {
                    cols.retain(|c| *c != column);
                }
            }
            _ => {}
        }
    }
}

/// Fold a rendered identifier the way the server stores it.
fn stored_name(rendered: &str) -> String {
    match rendered.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => rendered.to_ascii_lowercase(),
    }
}

fn text_record(column: &str, value: &str) -> Record {
    Record::new().set(column, value)
}

impl Connection for RecordingConnection {
    async fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Record>> {
        self.record(Kind::Query, sql, params)?;
        let tables = self.tables.lock().unwrap();
        if sql.contains("information_schema.tables") {
            return Ok(tables.keys().map(|t| text_record("table_name", t)).collect());
        }
        if sql.contains("information_schema.columns") {
            let table = match params.get(1) {
                Some(Value::Text(t)) => t.as_str(),
                _ => return Ok(Vec::new()),
            };
            return Ok(tables
                .get(table)
                .map(|cols| cols.iter().map(|c| text_record("column_name", c)).collect())
                .unwrap_or_default());
        }
        let rows = self.rows.lock().unwrap();
        let target = sql
            .split_whitespace()
            .skip_while(|w| *w != "FROM")
            .nth(1)
            .unwrap_or_default();
        Ok(rows.get(target).cloned().unwrap_or_default())
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<u64> {
        self.record(Kind::Execute, sql, params)?;
        self.apply_ddl(sql);
        Ok(1)
    }

    async fn commit(&self) -> DbResult<()> {
        self.record(Kind::Commit, "COMMIT", &[])
    }

    async fn rollback(&self) -> DbResult<()> {
        self.record(Kind::Rollback, "ROLLBACK", &[])
    }
}
