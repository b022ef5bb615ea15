//! # pgfluent
//!
//! A fluent PostgreSQL schema and query builder with a self-maintaining table catalog.
//!
//! ## Features
//!
//! - **Catalog aware**: the client mirrors `information_schema` for one schema and keeps the
//!   mirror in step with the DDL it sends
//! - **Tables on demand**: asking for an unknown table creates an empty shell first
//! - **Idempotent schema definitions**: adding a column the catalog already lists is a no-op
//! - **Bound record values**: INSERT, UPDATE and upsert values always travel as `$n` parameters
//! - **Implicit transactions**: statements share one transaction until a write commits it
//!
//! ## Example
//!
//! ```ignore
//! use pgfluent::{Client, Record, SslMode};
//!
//! let mut client = Client::connect(&database_url, SslMode::Require).await?;
//!
//! // Schema
//! client
//!     .schema("users").await?
//!     .increments("id").await?
//!     .string("username", Some(64), None).await?
//!     .integer("age", Some(0)).await?
//!     .primary(&["id"]).await?
//!     .commit().await?;
//!
//! // Writes
//! client
//!     .table("users").await?
//!     .update_or_insert(Record::new().set("id", 1).set("username", "ada"), "id")
//!     .await?;
//!
//! // Reads
//! let ada = client
//!     .table("users").await?
//!     .filter_eq("username", "ada")
//!     .get()
//!     .await?;
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod ident;
pub mod query;
pub mod record;
pub mod schema;
pub mod value;

#[cfg(test)]
mod testing;

pub use catalog::Catalog;
pub use client::Client;
pub use config::{ClientConfig, MutationPolicy, SslMode};
pub use connection::{Connection, PgConnection};
pub use error::{DbError, DbResult};
pub use ident::Ident;
pub use query::{Condition, QueryBuilder};
pub use record::Record;
pub use schema::{ColumnType, SchemaBuilder};
pub use value::Value;
