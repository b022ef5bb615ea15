//! Query builder: reads and writes against one table.
//!
//! Clause setters ([`select`](QueryBuilder::select), [`filter`](QueryBuilder::filter), ...)
//! take the builder by value and return it, and each terminal operation consumes it. Writes
//! commit before returning; reads never commit.
//!
//! Record values are always bound as `$n` parameters. WHERE values are rendered inline as
//! SQL literals, so filters must only be built from trusted input.
//!
//! # Example
//!
//! ```ignore
//! use pgfluent::Record;
//!
//! client
//!     .table("users").await?
//!     .insert(Record::new().set("username", "ada").set("age", 36))
//!     .await?;
//!
//! let adults = client
//!     .table("users").await?
//!     .select_columns(&["id", "username"])
//!     .filter("age", ">=", 18)
//!     .get_all()
//!     .await?;
//! ```

mod condition;

pub use condition::Condition;

use crate::client::Client;
use crate::config::MutationPolicy;
use crate::connection::Connection;
use crate::error::{DbError, DbResult};
use crate::ident::{self, Ident};
use crate::record::Record;
use crate::value::Value;

/// Fluent DML session bound to one table.
pub struct QueryBuilder<'a, C: Connection> {
    client: &'a mut Client<C>,
    table: Ident,
    projection: Vec<String>,
    conditions: Vec<Condition>,
}

impl<'a, C: Connection> QueryBuilder<'a, C> {
    pub(crate) fn new(client: &'a mut Client<C>, table: Ident) -> Self {
        Self {
            client,
            table,
            projection: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Select a single column (or `*`).
    pub fn select(mut self, column: impl Into<String>) -> Self {
        self.projection = vec![column.into()];
        self
    }

    /// Select a list of columns, replacing any previous projection.
    pub fn select_columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.projection = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    /// Replace the WHERE clause with a single condition.
    pub fn filter(
        self,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.filter_all([Condition::new(column, op, value)])
    }

    /// Replace the WHERE clause with `column = value`.
    pub fn filter_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter_all([Condition::eq(column, value)])
    }

    /// Replace the WHERE clause with all of `conditions` joined by `AND`.
    ///
    /// An empty list clears the clause.
    pub fn filter_all<I>(mut self, conditions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Condition>,
    {
        self.conditions = conditions.into_iter().map(Into::into).collect();
        self
    }

    /// The SELECT statement `get`/`get_all` would run.
    pub fn to_sql(&self) -> DbResult<String> {
        Ok(format!(
            "SELECT {} FROM {}{}",
            self.render_projection()?,
            self.table,
            condition::where_clause(&self.conditions)?
        ))
    }

    fn render_projection(&self) -> DbResult<String> {
        match self.projection.as_slice() {
            [] => Ok("*".to_string()),
            [only] if only.trim() == "*" => Ok("*".to_string()),
            columns => ident::render_list(columns),
        }
    }

    /// First row matching the current clauses, if any.
    pub async fn get(self) -> DbResult<Option<Record>> {
        let sql = self.to_sql()?;
        Ok(self.client.query(&sql, &[]).await?.into_iter().next())
    }

    /// All rows matching the current clauses.
    pub async fn get_all(self) -> DbResult<Vec<Record>> {
        let sql = self.to_sql()?;
        self.client.query(&sql, &[]).await
    }

    /// Insert one record and commit. Returns the affected row count.
    pub async fn insert(self, record: Record) -> DbResult<u64> {
        self.insert_many([record]).await
    }

    /// Insert each record with its own statement, then commit once.
    ///
    /// Records may have different columns. An empty record inserts a row of defaults. Every
    /// statement is built before the first one is sent, so an invalid record sends nothing.
    pub async fn insert_many<I>(self, records: I) -> DbResult<u64>
    where
        I: IntoIterator<Item = Record>,
    {
        let statements = records
            .into_iter()
            .map(|record| {
                let sql = if record.is_empty() {
                    format!("INSERT INTO {} DEFAULT VALUES", self.table)
                } else {
                    let (columns, placeholders) = column_lists(&record)?;
                    format!(
                        "INSERT INTO {} ({}) VALUES ({})",
                        self.table, columns, placeholders
                    )
                };
                Ok((sql, bind_values(&record)))
            })
            .collect::<DbResult<Vec<_>>>()?;
        self.execute_batch(statements).await
    }

    /// Insert a record, or update the conflicting row with the same values, then commit.
    ///
    /// `conflict` is the `ON CONFLICT` target, e.g. `"id"` or `"tenant_id, slug"`. It is
    /// inlined as given.
    pub async fn update_or_insert(self, record: Record, conflict: &str) -> DbResult<u64> {
        self.update_or_insert_many([record], conflict).await
    }

    /// Upsert each record with its own statement, then commit once.
    pub async fn update_or_insert_many<I>(self, records: I, conflict: &str) -> DbResult<u64>
    where
        I: IntoIterator<Item = Record>,
    {
        let target = conflict.trim();
        if target.is_empty() {
            return Err(DbError::validation(format!(
                "upsert into {} needs a conflict target",
                self.table
            )));
        }

        let statements = records
            .into_iter()
            .map(|record| {
                if record.is_empty() {
                    return Err(DbError::validation(format!(
                        "upsert into {} needs at least one column",
                        self.table
                    )));
                }
                let (columns, placeholders) = column_lists(&record)?;
                // A one-element parenthesized SET list is rejected by the server.
                let set = if record.len() == 1 {
                    format!("{columns} = {placeholders}")
                } else {
                    format!("({columns}) = ({placeholders})")
                };
                let sql = format!(
                    "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {}",
                    self.table, columns, placeholders, target, set
                );
                Ok((sql, bind_values(&record)))
            })
            .collect::<DbResult<Vec<_>>>()?;
        self.execute_batch(statements).await
    }

    /// Run prepared statements in order and commit once.
    ///
    /// A failing statement rolls back the ones before it.
    async fn execute_batch(self, statements: Vec<(String, Vec<Value>)>) -> DbResult<u64> {
        let mut affected = 0;
        for (sql, params) in &statements {
            match self.client.execute(sql, params).await {
                Ok(n) => affected += n,
                Err(e) => {
                    if let Err(rollback) = self.client.rollback().await {
                        tracing::warn!(target: "pgfluent", table = %self.table, error = %rollback, "rollback after failed batch failed");
                    }
                    return Err(e);
                }
            }
        }
        self.client.commit().await?;
        Ok(affected)
    }

    /// Update the rows matching the current WHERE clause (or every row) and commit.
    pub async fn update(self, record: Record) -> DbResult<u64> {
        if record.is_empty() {
            return Err(DbError::validation(format!(
                "update of {} needs at least one column",
                self.table
            )));
        }
        let assignments = record
            .columns()
            .enumerate()
            .map(|(i, column)| Ok(format!("{} = ${}", Ident::parse(column)?, i + 1)))
            .collect::<DbResult<Vec<_>>>()?;
        let sql = format!(
            "UPDATE {} SET {}{}",
            self.table,
            assignments.join(", "),
            condition::where_clause(&self.conditions)?
        );
        self.check_scope("UPDATE", &sql)?;

        let affected = self.client.execute(&sql, &bind_values(&record)).await?;
        self.client.commit().await?;
        Ok(affected)
    }

    /// Delete the rows matching the current WHERE clause (or every row) and commit.
    pub async fn delete(self) -> DbResult<u64> {
        let sql = format!(
            "DELETE FROM {}{}",
            self.table,
            condition::where_clause(&self.conditions)?
        );
        self.check_scope("DELETE", &sql)?;

        let affected = self.client.execute(&sql, &[]).await?;
        self.client.commit().await?;
        Ok(affected)
    }

    /// Remove every row and commit.
    pub async fn truncate(self) -> DbResult<()> {
        self.client
            .execute(&format!("TRUNCATE {}", self.table), &[])
            .await?;
        self.client.commit().await
    }

    /// Drop the table, forget it in the catalog and commit.
    pub async fn drop(self) -> DbResult<()> {
        self.client
            .execute(&format!("DROP TABLE {}", self.table), &[])
            .await?;
        let key = self.table.catalog_name();
        self.client.catalog_mut().remove(&key);
        tracing::info!(target: "pgfluent", table = %key, "table dropped");
        self.client.commit().await
    }

    fn check_scope(&self, verb: &str, sql: &str) -> DbResult<()> {
        if !self.conditions.is_empty() {
            return Ok(());
        }
        match self.client.config().unscoped_mutation {
            MutationPolicy::Allow => Ok(()),
            MutationPolicy::Warn => {
                tracing::warn!(target: "pgfluent", table = %self.table, verb, "{verb} without WHERE affects every row");
                Ok(())
            }
            MutationPolicy::Error => Err(DbError::validation(format!(
                "{verb} without WHERE refused: {sql}"
            ))),
        }
    }
}

/// `("a, b", "$1, $2")` for a record's columns, validating every name.
fn column_lists(record: &Record) -> DbResult<(String, String)> {
    let columns: Vec<&str> = record.columns().collect();
    let placeholders = (1..=columns.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    Ok((ident::render_list(&columns)?, placeholders))
}

fn bind_values(record: &Record) -> Vec<Value> {
    record.values().cloned().collect()
}
