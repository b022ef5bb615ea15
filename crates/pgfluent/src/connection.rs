//! The driver boundary.
//!
//! The builders only ever need four things from a database: run a statement with positional
//! parameters, run a query returning rows, commit, and roll back. [`Connection`] captures
//! exactly that, and [`PgConnection`] implements it over `tokio-postgres`.
//!
//! `PgConnection` mirrors the implicit-transaction behavior of classic DB-API drivers: the
//! first statement after a commit (or after connecting) opens a transaction, and nothing is
//! visible to other sessions until [`Connection::commit`] runs.

use crate::config::{ClientConfig, SslMode};
use crate::error::{DbError, DbResult};
use crate::record::Record;
use crate::value::Value;
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use postgres_openssl::MakeTlsConnector;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_postgres::NoTls;
use tokio_postgres::types::ToSql;

/// A trait over anything that can execute SQL for the builders.
pub trait Connection: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = DbResult<Vec<Record>>> + Send;

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = DbResult<u64>> + Send;

    /// Commit the current transaction. A no-op when none is open.
    fn commit(&self) -> impl std::future::Future<Output = DbResult<()>> + Send;

    /// Roll back the current transaction. A no-op when none is open.
    fn rollback(&self) -> impl std::future::Future<Output = DbResult<()>> + Send;
}

/// A single PostgreSQL connection with an implicit transaction.
pub struct PgConnection {
    client: tokio_postgres::Client,
    in_transaction: AtomicBool,
}

impl PgConnection {
    /// Connect using a PostgreSQL URL and TLS mode.
    pub async fn connect(database_url: &str, ssl_mode: SslMode) -> DbResult<Self> {
        Self::connect_with_config(database_url, &ClientConfig::new().ssl_mode(ssl_mode)).await
    }

    /// Connect using the TLS settings of `config`.
    pub async fn connect_with_config(database_url: &str, config: &ClientConfig) -> DbResult<Self> {
        let mut pg_config: tokio_postgres::Config = database_url
            .parse()
            .map_err(|e: tokio_postgres::Error| DbError::Connection(e.to_string()))?;

        let client = match config.ssl_mode {
            SslMode::Disable => {
                pg_config.ssl_mode(tokio_postgres::config::SslMode::Disable);
                let (client, connection) = pg_config
                    .connect(NoTls)
                    .await
                    .map_err(|e| DbError::Connection(e.to_string()))?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await
                        && !e.is_closed()
                    {
                        tracing::error!(target: "pgfluent", error = %e, "postgres connection error");
                    }
                });
                client
            }
            mode => {
                let mut builder = SslConnector::builder(SslMethod::tls())?;
                if let Some(path) = &config.ca_file {
                    builder.set_ca_file(path)?;
                }
                builder.set_verify(if mode.verifies_peer() {
                    SslVerifyMode::PEER
                } else {
                    SslVerifyMode::NONE
                });
                let mut connector = MakeTlsConnector::new(builder.build());
                if mode != SslMode::VerifyFull {
                    connector.set_callback(|cfg, _domain| {
                        cfg.set_verify_hostname(false);
                        Ok(())
                    });
                }
                pg_config.ssl_mode(if mode == SslMode::Prefer {
                    tokio_postgres::config::SslMode::Prefer
                } else {
                    tokio_postgres::config::SslMode::Require
                });
                let (client, connection) = pg_config
                    .connect(connector)
                    .await
                    .map_err(|e| DbError::Connection(e.to_string()))?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await
                        && !e.is_closed()
                    {
                        tracing::error!(target: "pgfluent", error = %e, "postgres connection error");
                    }
                });
                client
            }
        };

        tracing::debug!(target: "pgfluent", ssl_mode = %config.ssl_mode, "connected");
        Ok(Self::from_client(client))
    }

    /// Wrap an already connected `tokio-postgres` client.
    pub fn from_client(client: tokio_postgres::Client) -> Self {
        Self {
            client,
            in_transaction: AtomicBool::new(false),
        }
    }

    /// Whether a transaction is currently open on this connection.
    pub fn in_transaction(&self) -> bool {
        self.in_transaction.load(Ordering::Acquire)
    }

    async fn begin_if_needed(&self) -> DbResult<()> {
        if !self.in_transaction.swap(true, Ordering::AcqRel)
            && let Err(e) = self.client.batch_execute("BEGIN").await
        {
            self.in_transaction.store(false, Ordering::Release);
            return Err(e.into());
        }
        Ok(())
    }
}

fn param_refs(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

impl Connection for PgConnection {
    async fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Record>> {
        self.begin_if_needed().await?;
        let rows = self.client.query(sql, &param_refs(params)).await?;
        rows.iter().map(Record::from_row).collect()
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<u64> {
        self.begin_if_needed().await?;
        Ok(self.client.execute(sql, &param_refs(params)).await?)
    }

    async fn commit(&self) -> DbResult<()> {
        if self.in_transaction.swap(false, Ordering::AcqRel) {
            self.client.batch_execute("COMMIT").await?;
        }
        Ok(())
    }

    async fn rollback(&self) -> DbResult<()> {
        if self.in_transaction.swap(false, Ordering::AcqRel) {
            self.client.batch_execute("ROLLBACK").await?;
        }
        Ok(())
    }
}
