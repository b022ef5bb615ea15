//! Client configuration.

use crate::error::DbError;
use std::path::PathBuf;
use std::str::FromStr;

/// TLS negotiation mode, spelled like libpq's `sslmode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    /// Plain TCP, no TLS.
    Disable,
    /// Use TLS if the server supports it, without certificate verification.
    Prefer,
    /// Require TLS, without certificate verification.
    #[default]
    Require,
    /// Require TLS and verify the server certificate chain.
    VerifyCa,
    /// Require TLS and verify the certificate chain and host name.
    VerifyFull,
}

impl SslMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        }
    }

    /// Whether the server certificate must be verified.
    pub fn verifies_peer(&self) -> bool {
        matches!(self, SslMode::VerifyCa | SslMode::VerifyFull)
    }
}

impl FromStr for SslMode {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            "prefer" | "allow" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            "verify-ca" => Ok(SslMode::VerifyCa),
            "verify-full" => Ok(SslMode::VerifyFull),
            other => Err(DbError::validation(format!("Unknown sslmode '{other}'"))),
        }
    }
}

impl std::fmt::Display for SslMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How UPDATE/DELETE without a WHERE clause is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationPolicy {
    /// Run against the whole table silently.
    Allow,
    /// Run against the whole table and emit a warning event.
    #[default]
    Warn,
    /// Refuse with a validation error before anything is sent.
    Error,
}

/// Configuration for [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// TLS mode used by `Client::connect_with_config`.
    pub ssl_mode: SslMode,
    /// CA bundle used to verify the server in `verify-*` modes.
    pub ca_file: Option<PathBuf>,
    /// Schema whose tables the catalog mirrors.
    pub schema: String,
    /// Policy for unscoped UPDATE/DELETE.
    pub unscoped_mutation: MutationPolicy,
    /// Truncate logged SQL to this many bytes. `None` logs statements in full.
    pub max_logged_sql_length: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ssl_mode: SslMode::Require,
            ca_file: None,
            schema: "public".to_string(),
            unscoped_mutation: MutationPolicy::Warn,
            max_logged_sql_length: Some(200),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `PGSSLMODE`, `PGSSLROOTCERT` and `PGFLUENT_SCHEMA`.
    pub fn from_env() -> Result<Self, DbError> {
        let mut config = Self::default();
        if let Ok(mode) = std::env::var("PGSSLMODE") {
            config.ssl_mode = mode.parse()?;
        }
        if let Ok(path) = std::env::var("PGSSLROOTCERT") {
            config.ca_file = Some(PathBuf::from(path));
        }
        if let Ok(schema) = std::env::var("PGFLUENT_SCHEMA") {
            config.schema = schema;
        }
        Ok(config)
    }

    /// Set the TLS mode.
    pub fn ssl_mode(mut self, mode: SslMode) -> Self {
        self.ssl_mode = mode;
        self
    }

    /// Set the CA bundle for `verify-*` modes.
    pub fn ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_file = Some(path.into());
        self
    }

    /// Set the schema mirrored by the catalog.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Configure how UPDATE/DELETE without WHERE is handled.
    pub fn unscoped_mutation(mut self, policy: MutationPolicy) -> Self {
        self.unscoped_mutation = policy;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_logged_sql_length(mut self, len: usize) -> Self {
        self.max_logged_sql_length = Some(len);
        self
    }

    /// Log statements without truncation.
    pub fn no_sql_truncation(mut self) -> Self {
        self.max_logged_sql_length = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ClientConfig::default();
        assert_eq!(c.ssl_mode, SslMode::Require);
        assert_eq!(c.schema, "public");
        assert_eq!(c.unscoped_mutation, MutationPolicy::Warn);
        assert_eq!(c.max_logged_sql_length, Some(200));
    }

    #[test]
    fn sslmode_parses_libpq_spellings() {
        assert_eq!("disable".parse::<SslMode>().unwrap(), SslMode::Disable);
        assert_eq!("VERIFY-FULL".parse::<SslMode>().unwrap(), SslMode::VerifyFull);
        assert_eq!("verify-ca".parse::<SslMode>().unwrap().to_string(), "verify-ca");
        assert!("sometimes".parse::<SslMode>().is_err());
    }

    #[test]
    fn builder_methods_chain() {
        let c = ClientConfig::new()
            .ssl_mode(SslMode::Disable)
            .schema("app")
            .unscoped_mutation(MutationPolicy::Error)
            .no_sql_truncation();
        assert_eq!(c.ssl_mode, SslMode::Disable);
        assert_eq!(c.schema, "app");
        assert_eq!(c.unscoped_mutation, MutationPolicy::Error);
        assert_eq!(c.max_logged_sql_length, None);
    }
}
