//! Schema builder: DDL for one table.
//!
//! Every call sends its `ALTER TABLE` statement right away; [`SchemaBuilder::commit`] closes
//! the transaction so the changes become visible. Column additions are checked against the
//! client's catalog first, which makes re-running a schema definition harmless.
//!
//! # Example
//!
//! ```ignore
//! let mut users = client.schema("users").await?;
//! users
//!     .increments("id").await?
//!     .string("username", Some(64), None).await?
//!     .jsonb("settings", Some(serde_json::json!({}))).await?
//!     .primary(&["id"]).await?
//!     .commit().await?;
//! ```

mod column_type;

pub use column_type::ColumnType;

use crate::client::Client;
use crate::connection::Connection;
use crate::error::{DbError, DbResult};
use crate::ident::{self, Ident};
use crate::value::Value;

/// Fluent DDL session bound to one table.
pub struct SchemaBuilder<'a, C: Connection> {
    client: &'a mut Client<C>,
    table: Ident,
}

impl<'a, C: Connection> SchemaBuilder<'a, C> {
    pub(crate) fn new(client: &'a mut Client<C>, table: Ident) -> Self {
        Self { client, table }
    }

    /// The table name as stored in the catalog.
    pub fn table_name(&self) -> String {
        self.table.catalog_name()
    }

    /// Columns the catalog currently knows for this table.
    pub fn columns(&self) -> &[String] {
        self.client
            .catalog()
            .columns_of(&self.table.catalog_name())
            .unwrap_or(&[])
    }

    /// Add a column of an arbitrary SQL type unless the catalog already lists it.
    pub async fn add_column(
        &mut self,
        name: &str,
        sql_type: &str,
        default: Option<Value>,
    ) -> DbResult<&mut Self> {
        let column = Ident::parse(name)?;
        let table_key = self.table.catalog_name();
        let column_key = column.catalog_name();

        if self.client.catalog().has_column(&table_key, &column_key) {
            tracing::debug!(
                target: "pgfluent",
                table = %table_key,
                column = %column_key,
                "column already present, skipping"
            );
            return Ok(self);
        }

        let mut sql = format!("ALTER TABLE {} ADD {} {}", self.table, column, sql_type);
        if let Some(default) = default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&default.to_sql_literal());
        }
        self.client.execute(&sql, &[]).await?;
        self.client
            .catalog_mut()
            .register_column(&table_key, &column_key);

        tracing::info!(target: "pgfluent", table = %table_key, column = %column_key, sql_type, "column added");
        Ok(self)
    }

    async fn typed(
        &mut self,
        name: &str,
        ty: ColumnType,
        default: Option<Value>,
    ) -> DbResult<&mut Self> {
        self.add_column(name, &ty.to_string(), default).await
    }

    pub async fn big_integer(&mut self, name: &str, default: Option<i64>) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::BigInteger, default.map(Value::from))
            .await
    }

    pub async fn binary(&mut self, name: &str, default: Option<Vec<u8>>) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::Binary, default.map(Value::from))
            .await
    }

    pub async fn char(
        &mut self,
        name: &str,
        size: u32,
        default: Option<&str>,
    ) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::Char(size), default.map(Value::from))
            .await
    }

    /// `DATE` column. Defaults are passed as text, e.g. `"2024-01-01"`.
    pub async fn date(&mut self, name: &str, default: Option<&str>) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::Date, default.map(Value::from))
            .await
    }

    pub async fn decimal(
        &mut self,
        name: &str,
        precision: u32,
        scale: u32,
        default: Option<f64>,
    ) -> DbResult<&mut Self> {
        self.typed(
            name,
            ColumnType::Decimal { precision, scale },
            default.map(Value::from),
        )
        .await
    }

    pub async fn double(&mut self, name: &str, default: Option<f64>) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::Double, default.map(Value::from))
            .await
    }

    pub async fn float(&mut self, name: &str, default: Option<f64>) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::Float, default.map(Value::from))
            .await
    }

    /// Auto-incrementing integer column.
    pub async fn increments(&mut self, name: &str) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::Increments, None).await
    }

    pub async fn integer(&mut self, name: &str, default: Option<i64>) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::Integer, default.map(Value::from))
            .await
    }

    pub async fn json(
        &mut self,
        name: &str,
        default: Option<serde_json::Value>,
    ) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::Json, default.map(Value::Json))
            .await
    }

    pub async fn jsonb(
        &mut self,
        name: &str,
        default: Option<serde_json::Value>,
    ) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::Jsonb, default.map(Value::Json))
            .await
    }

    pub async fn small_integer(&mut self, name: &str, default: Option<i16>) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::SmallInteger, default.map(Value::from))
            .await
    }

    /// `VARCHAR` column, bounded when `size` is given.
    pub async fn string(
        &mut self,
        name: &str,
        size: Option<u32>,
        default: Option<&str>,
    ) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::String(size), default.map(Value::from))
            .await
    }

    pub async fn text(&mut self, name: &str, default: Option<&str>) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::Text, default.map(Value::from))
            .await
    }

    pub async fn time(&mut self, name: &str, default: Option<&str>) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::Time, default.map(Value::from))
            .await
    }

    pub async fn timestamp(&mut self, name: &str, default: Option<&str>) -> DbResult<&mut Self> {
        self.typed(name, ColumnType::Timestamp, default.map(Value::from))
            .await
    }

    /// Drop the NOT NULL constraint of a column.
    pub async fn nullable(&mut self, name: &str) -> DbResult<&mut Self> {
        let column = Ident::parse(name)?;
        let sql = format!(
            "ALTER TABLE {} ALTER COLUMN {} DROP NOT NULL",
            self.table, column
        );
        self.client.execute(&sql, &[]).await?;
        Ok(self)
    }

    /// Replace the table's primary key (constraint `<table>_pk`) with one over `columns`.
    pub async fn primary<S: AsRef<str>>(&mut self, columns: &[S]) -> DbResult<&mut Self> {
        if columns.is_empty() {
            return Err(DbError::validation(format!(
                "primary key on {} needs at least one column",
                self.table
            )));
        }
        let column_list = ident::render_list(columns)?;
        let constraint = self.table.with_suffix("_pk");

        self.client
            .execute(
                &format!(
                    "ALTER TABLE {} DROP CONSTRAINT IF EXISTS {}",
                    self.table, constraint
                ),
                &[],
            )
            .await?;
        self.client
            .execute(
                &format!(
                    "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({})",
                    self.table, constraint, column_list
                ),
                &[],
            )
            .await?;
        Ok(self)
    }

    /// Commit the structural changes sent so far.
    pub async fn commit(&mut self) -> DbResult<()> {
        self.client.commit().await
    }
}

#[cfg(test)]
mod tests;
