use std::fmt;

/// Semantic column types understood by the typed [`SchemaBuilder`](super::SchemaBuilder)
/// helpers, and the PostgreSQL type each one renders to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    BigInteger,
    Binary,
    Char(u32),
    Date,
    Decimal { precision: u32, scale: u32 },
    Double,
    Float,
    /// Auto-incrementing integer.
    Increments,
    Integer,
    Json,
    Jsonb,
    SmallInteger,
    /// `VARCHAR`, optionally with a maximum length.
    String(Option<u32>),
    Text,
    Time,
    Timestamp,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::BigInteger => f.write_str("BIGINT"),
            ColumnType::Binary => f.write_str("BYTEA"),
            ColumnType::Char(size) => write!(f, "CHAR({size})"),
            ColumnType::Date => f.write_str("DATE"),
            ColumnType::Decimal { precision, scale } => write!(f, "NUMERIC({precision}, {scale})"),
            ColumnType::Double => f.write_str("DOUBLE PRECISION"),
            ColumnType::Float => f.write_str("FLOAT"),
            ColumnType::Increments => f.write_str("SERIAL"),
            ColumnType::Integer => f.write_str("INTEGER"),
            ColumnType::Json => f.write_str("JSON"),
            ColumnType::Jsonb => f.write_str("JSONB"),
            ColumnType::SmallInteger => f.write_str("SMALLINT"),
            ColumnType::String(None) => f.write_str("VARCHAR"),
            ColumnType::String(Some(size)) => write!(f, "VARCHAR({size})"),
            ColumnType::Text => f.write_str("TEXT"),
            ColumnType::Time => f.write_str("TIME"),
            ColumnType::Timestamp => f.write_str("TIMESTAMP"),
        }
    }
}
