//! The client façade.
//!
//! A [`Client`] owns one connection and the [`Catalog`] of its schema, and hands out
//! [`SchemaBuilder`] and [`QueryBuilder`] sessions bound to a table. Asking for a table the
//! catalog does not know creates an empty table shell first, so
//!
//! ```ignore
//! let mut client = Client::connect(&database_url, SslMode::Require).await?;
//! client.schema("events").await?.text("payload", None).await?.commit().await?;
//! client.table("events").await?.insert(Record::new().set("payload", "hello")).await?;
//! ```
//!
//! works against an empty database.

use crate::catalog::Catalog;
use crate::config::{ClientConfig, SslMode};
use crate::connection::{Connection, PgConnection};
use crate::error::DbResult;
use crate::ident::Ident;
use crate::query::QueryBuilder;
use crate::record::Record;
use crate::schema::SchemaBuilder;
use crate::value::Value;

/// Name of the throwaway column used to create a table shell.
const SHELL_COLUMN: &str = "dummy";

/// Owns a connection and the catalog mirroring its schema.
pub struct Client<C: Connection = PgConnection> {
    conn: C,
    catalog: Catalog,
    config: ClientConfig,
}

impl Client<PgConnection> {
    /// Connect to PostgreSQL and load the catalog of the `public` schema.
    pub async fn connect(database_url: &str, ssl_mode: SslMode) -> DbResult<Self> {
        Self::connect_with_config(database_url, ClientConfig::new().ssl_mode(ssl_mode)).await
    }

    /// Connect with a full configuration.
    pub async fn connect_with_config(database_url: &str, config: ClientConfig) -> DbResult<Self> {
        let conn = PgConnection::connect_with_config(database_url, &config).await?;
        Self::with_connection(conn, config).await
    }
}

impl<C: Connection> Client<C> {
    /// Wrap any [`Connection`] and load the catalog through it.
    pub async fn with_connection(conn: C, config: ClientConfig) -> DbResult<Self> {
        let mut client = Self {
            conn,
            catalog: Catalog::new(),
            config,
        };
        client.reload().await?;
        tracing::info!(
            target: "pgfluent",
            schema = %client.config.schema,
            tables = client.catalog.len(),
            "client ready"
        );
        Ok(client)
    }

    /// Re-read the whole catalog from `information_schema`.
    pub async fn reload(&mut self) -> DbResult<()> {
        self.catalog.load(&self.conn, &self.config.schema).await
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub(crate) fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether the catalog knows the table (name folded like PostgreSQL does).
    pub fn has_table(&self, name: &str) -> DbResult<bool> {
        Ok(self.catalog.has(&Ident::parse(name)?.catalog_name()))
    }

    /// Create a table with no columns, then reload the catalog.
    ///
    /// PostgreSQL gets a single throwaway key column which is dropped right away, leaving a
    /// shell that `add_column` can populate.
    pub async fn create_table(&mut self, name: &str) -> DbResult<()> {
        let table = Ident::parse(name)?;
        tracing::info!(target: "pgfluent", table = %table, "creating table shell");

        self.execute(
            &format!("CREATE TABLE {table} ({SHELL_COLUMN} SERIAL PRIMARY KEY)"),
            &[],
        )
        .await?;
        self.execute(&format!("ALTER TABLE {table} DROP COLUMN {SHELL_COLUMN}"), &[])
            .await?;
        self.commit().await?;
        self.reload().await?;

        // The shell lands in the first schema of search_path, which may not be the one the
        // catalog mirrors.
        let key = table.catalog_name();
        if !self.catalog.has(&key) {
            tracing::warn!(
                target: "pgfluent",
                table = %key,
                schema = %self.config.schema,
                "created table not visible in catalog schema"
            );
            self.catalog.register_table(&key);
        }
        Ok(())
    }

    /// Schema builder for `name`, creating the table shell if it is unknown.
    pub async fn schema(&mut self, name: &str) -> DbResult<SchemaBuilder<'_, C>> {
        let table = self.ensure_table(name).await?;
        Ok(SchemaBuilder::new(self, table))
    }

    /// Query builder for `name`, creating the table shell if it is unknown.
    pub async fn table(&mut self, name: &str) -> DbResult<QueryBuilder<'_, C>> {
        let table = self.ensure_table(name).await?;
        Ok(QueryBuilder::new(self, table))
    }

    async fn ensure_table(&mut self, name: &str) -> DbResult<Ident> {
        let table = Ident::parse(name)?;
        if !self.catalog.has(&table.catalog_name()) {
            self.create_table(name).await?;
        }
        Ok(table)
    }

    /// Run a statement through the logged execution path.
    pub async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<u64> {
        self.log_sql("execute", sql, params.len());
        self.conn.execute(sql, params).await.inspect_err(|e| {
            tracing::error!(target: "pgfluent.sql", error = %e, sql = %self.shorten(sql), "statement failed");
        })
    }

    /// Run a query through the logged execution path.
    pub async fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Record>> {
        self.log_sql("query", sql, params.len());
        self.conn.query(sql, params).await.inspect_err(|e| {
            tracing::error!(target: "pgfluent.sql", error = %e, sql = %self.shorten(sql), "query failed");
        })
    }

    /// Commit the connection's current transaction.
    pub async fn commit(&self) -> DbResult<()> {
        tracing::debug!(target: "pgfluent.sql", "commit");
        self.conn.commit().await
    }

    /// Roll back the connection's current transaction.
    ///
    /// Needed after a failed statement, since PostgreSQL rejects everything else in an
    /// aborted transaction.
    pub async fn rollback(&self) -> DbResult<()> {
        tracing::debug!(target: "pgfluent.sql", "rollback");
        self.conn.rollback().await
    }

    fn log_sql(&self, kind: &'static str, sql: &str, param_count: usize) {
        tracing::debug!(
            target: "pgfluent.sql",
            kind,
            param_count,
            sql = %self.shorten(sql),
        );
    }

    fn shorten(&self, sql: &str) -> String {
        match self.config.max_logged_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
