//! Dynamically typed column values.
//!
//! [`Value`] is what records carry, what the query builder binds as `$n` parameters and what
//! it renders as inline literals for WHERE clauses and column defaults.
//!
//! Binding adapts to the parameter type PostgreSQL inferred for the placeholder, so an
//! `Int` can feed an `INTEGER`, `SMALLINT`, `NUMERIC` or `DOUBLE PRECISION` column and a
//! `Text` can feed a `DATE` or `JSONB` column as long as it parses.

use crate::error::{DbError, DbResult};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::error::Error as StdError;
use std::str::FromStr;
use tokio_postgres::Row;
use tokio_postgres::types::{IsNull, Kind, ToSql, Type, to_sql_checked};
use uuid::Uuid;

type BindError = Box<dyn StdError + Sync + Send>;

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Uuid(Uuid),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Json(_) => "json",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::TimestampTz(_) => "timestamptz",
            Value::Uuid(_) => "uuid",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render the value as an inline SQL literal.
    ///
    /// Text is single-quoted with embedded quotes doubled. This is not a substitute for
    /// parameter binding; only use it with trusted values.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) if v.is_nan() => "'NaN'".to_string(),
            Value::Float(v) if v.is_infinite() => {
                if v.is_sign_positive() {
                    "'Infinity'".to_string()
                } else {
                    "'-Infinity'".to_string()
                }
            }
            Value::Float(v) => format!("{v:?}"),
            Value::Decimal(v) => v.to_string(),
            Value::Text(v) => quote_literal(v),
            Value::Json(v) => quote_literal(&v.to_string()),
            Value::Bytes(v) => {
                let mut hex = String::with_capacity(v.len() * 2 + 4);
                hex.push_str("'\\x");
                for b in v {
                    hex.push_str(&format!("{b:02x}"));
                }
                hex.push('\'');
                hex
            }
            Value::Date(v) => quote_literal(&v.to_string()),
            Value::Time(v) => quote_literal(&v.to_string()),
            Value::Timestamp(v) => quote_literal(&v.to_string()),
            Value::TimestampTz(v) => quote_literal(&v.to_rfc3339()),
            Value::Uuid(v) => quote_literal(&v.to_string()),
        }
    }

    /// Convert to a JSON value (used for printing and JSON export).
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as J;
        match self {
            Value::Null => J::Null,
            Value::Bool(v) => J::Bool(*v),
            Value::Int(v) => J::from(*v),
            Value::Float(v) => J::from(*v),
            Value::Decimal(v) => J::String(v.to_string()),
            Value::Text(v) => J::String(v.clone()),
            Value::Json(v) => v.clone(),
            Value::Bytes(v) => J::Array(v.iter().map(|b| J::from(*b)).collect()),
            Value::Date(v) => J::String(v.to_string()),
            Value::Time(v) => J::String(v.to_string()),
            Value::Timestamp(v) => J::String(v.to_string()),
            Value::TimestampTz(v) => J::String(v.to_rfc3339()),
            Value::Uuid(v) => J::String(v.to_string()),
        }
    }

    /// Build a value from a JSON scalar. Arrays and objects stay JSON.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value as J;
        match value {
            J::Null => Value::Null,
            J::Bool(v) => Value::Bool(*v),
            J::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Json(value.clone())),
            },
            J::String(s) => Value::Text(s.clone()),
            J::Array(_) | J::Object(_) => Value::Json(value.clone()),
        }
    }

    /// Decode column `idx` of a driver row.
    pub(crate) fn decode(row: &Row, idx: usize) -> DbResult<Value> {
        let column = &row.columns()[idx];
        let name = column.name();
        let ty = column.type_();
        let err = |e: tokio_postgres::Error| DbError::decode(name, e.to_string());

        let value = match *ty {
            Type::BOOL => row.try_get::<_, Option<bool>>(idx).map_err(err)?.map(Value::Bool),
            Type::CHAR => row
                .try_get::<_, Option<i8>>(idx)
                .map_err(err)?
                .map(|v| Value::Int(v.into())),
            Type::INT2 => row
                .try_get::<_, Option<i16>>(idx)
                .map_err(err)?
                .map(|v| Value::Int(v.into())),
            Type::INT4 => row
                .try_get::<_, Option<i32>>(idx)
                .map_err(err)?
                .map(|v| Value::Int(v.into())),
            Type::INT8 => row.try_get::<_, Option<i64>>(idx).map_err(err)?.map(Value::Int),
            Type::OID => row
                .try_get::<_, Option<u32>>(idx)
                .map_err(err)?
                .map(|v| Value::Int(v.into())),
            Type::FLOAT4 => row
                .try_get::<_, Option<f32>>(idx)
                .map_err(err)?
                .map(|v| Value::Float(v.into())),
            Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx).map_err(err)?.map(Value::Float),
            Type::NUMERIC => row
                .try_get::<_, Option<Decimal>>(idx)
                .map_err(err)?
                .map(Value::Decimal),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => row
                .try_get::<_, Option<String>>(idx)
                .map_err(err)?
                .map(Value::Text),
            Type::JSON | Type::JSONB => row
                .try_get::<_, Option<serde_json::Value>>(idx)
                .map_err(err)?
                .map(Value::Json),
            Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx).map_err(err)?.map(Value::Bytes),
            Type::DATE => row.try_get::<_, Option<NaiveDate>>(idx).map_err(err)?.map(Value::Date),
            Type::TIME => row.try_get::<_, Option<NaiveTime>>(idx).map_err(err)?.map(Value::Time),
            Type::TIMESTAMP => row
                .try_get::<_, Option<NaiveDateTime>>(idx)
                .map_err(err)?
                .map(Value::Timestamp),
            Type::TIMESTAMPTZ => row
                .try_get::<_, Option<DateTime<Utc>>>(idx)
                .map_err(err)?
                .map(Value::TimestampTz),
            Type::UUID => row.try_get::<_, Option<Uuid>>(idx).map_err(err)?.map(Value::Uuid),
            _ => {
                return Err(DbError::decode(
                    name,
                    format!("unsupported column type {ty}"),
                ));
            }
        };

        Ok(value.unwrap_or(Value::Null))
    }

    fn unsupported(&self, ty: &Type) -> BindError {
        format!("cannot bind {} value to a {} parameter", self.kind_name(), ty).into()
    }
}

fn quote_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

fn is_text(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    )
}

/// Parse a text value into whatever the parameter type needs.
fn bind_text(s: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BindError> {
    match *ty {
        Type::BOOL => bool::from_str(s)?.to_sql(ty, out),
        Type::INT2 => i16::from_str(s)?.to_sql(ty, out),
        Type::INT4 => i32::from_str(s)?.to_sql(ty, out),
        Type::INT8 => i64::from_str(s)?.to_sql(ty, out),
        Type::FLOAT4 => f32::from_str(s)?.to_sql(ty, out),
        Type::FLOAT8 => f64::from_str(s)?.to_sql(ty, out),
        Type::NUMERIC => Decimal::from_str(s)?.to_sql(ty, out),
        Type::JSON | Type::JSONB => serde_json::from_str::<serde_json::Value>(s)?.to_sql(ty, out),
        Type::DATE => NaiveDate::from_str(s)?.to_sql(ty, out),
        Type::TIME => NaiveTime::from_str(s)?.to_sql(ty, out),
        Type::TIMESTAMP => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::from_str(s))?
            .to_sql(ty, out),
        Type::TIMESTAMPTZ => DateTime::parse_from_rfc3339(s)?
            .with_timezone(&Utc)
            .to_sql(ty, out),
        Type::UUID => Uuid::parse_str(s)?.to_sql(ty, out),
        _ if is_text(ty) || matches!(ty.kind(), Kind::Enum(_)) || ty.name() == "citext" => {
            s.to_sql(ty, out)
        }
        _ => Err(format!("cannot bind text value to a {ty} parameter").into()),
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BindError> {
        if let Kind::Domain(inner) = ty.kind() {
            return self.to_sql(inner, out);
        }

        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => match *ty {
                Type::BOOL => v.to_sql(ty, out),
                _ if is_text(ty) => v.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                Type::INT8 => v.to_sql(ty, out),
                Type::OID => u32::try_from(*v)?.to_sql(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*v).to_sql(ty, out),
                Type::JSON | Type::JSONB => serde_json::Value::from(*v).to_sql(ty, out),
                _ if is_text(ty) => v.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => v.to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*v)?.to_sql(ty, out),
                Type::JSON | Type::JSONB => serde_json::Value::from(*v).to_sql(ty, out),
                _ if is_text(ty) => v.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Decimal(v) => match *ty {
                Type::NUMERIC => v.to_sql(ty, out),
                Type::FLOAT4 | Type::FLOAT8 => v
                    .to_f64()
                    .ok_or_else(|| self.unsupported(ty))?
                    .to_sql(ty, out),
                _ if is_text(ty) => v.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Text(v) => bind_text(v, ty, out),
            Value::Json(v) => match *ty {
                Type::JSON | Type::JSONB => v.to_sql(ty, out),
                _ if is_text(ty) => v.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Bytes(v) => match *ty {
                Type::BYTEA => v.to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Date(v) => match *ty {
                Type::DATE => v.to_sql(ty, out),
                Type::TIMESTAMP => v
                    .and_hms_opt(0, 0, 0)
                    .ok_or_else(|| self.unsupported(ty))?
                    .to_sql(ty, out),
                _ if is_text(ty) => v.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Time(v) => match *ty {
                Type::TIME => v.to_sql(ty, out),
                _ if is_text(ty) => v.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Timestamp(v) => match *ty {
                Type::TIMESTAMP => v.to_sql(ty, out),
                Type::TIMESTAMPTZ => Utc.from_utc_datetime(v).to_sql(ty, out),
                _ if is_text(ty) => v.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::TimestampTz(v) => match *ty {
                Type::TIMESTAMPTZ => v.to_sql(ty, out),
                Type::TIMESTAMP => v.naive_utc().to_sql(ty, out),
                _ if is_text(ty) => v.to_rfc3339().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Uuid(v) => match *ty {
                Type::UUID => v.to_sql(ty, out),
                _ if is_text(ty) => v.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    Decimal => Decimal,
    String => Text,
    &str => Text,
    serde_json::Value => Json,
    Vec<u8> => Bytes,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
    Uuid => Uuid,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
