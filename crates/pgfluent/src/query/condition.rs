//! WHERE clause conditions.

use crate::error::{DbError, DbResult};
use crate::ident::Ident;
use crate::value::Value;

/// A single `column op value` comparison.
///
/// The column is validated as an identifier. The operator is inlined as given and the value
/// is rendered as a SQL literal, so neither should come from untrusted input.
///
/// # Example
/// ```ignore
/// use pgfluent::Condition;
///
/// let c = Condition::new("age", ">=", 18);
/// assert_eq!(c.to_sql()?, "age >= 18");
/// # Ok::<(), pgfluent::DbError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    column: String,
    op: String,
    value: Value,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: op.into(),
            value: value.into(),
        }
    }

    /// `column = value`.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, "=", value)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn op(&self) -> &str {
        &self.op
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Render as `<column> <op> <literal>`.
    pub fn to_sql(&self) -> DbResult<String> {
        let column = Ident::parse(&self.column)?;
        let op = self.op.trim();
        if op.is_empty() {
            return Err(DbError::validation(format!(
                "condition on {column} has no operator"
            )));
        }
        Ok(format!("{} {} {}", column, op, self.value.to_sql_literal()))
    }
}

impl<C, O, V> From<(C, O, V)> for Condition
where
    C: Into<String>,
    O: Into<String>,
    V: Into<Value>,
{
    fn from((column, op, value): (C, O, V)) -> Self {
        Self::new(column, op, value)
    }
}

/// Render conditions as ` WHERE a AND b`, or an empty string when there are none.
pub(crate) fn where_clause(conditions: &[Condition]) -> DbResult<String> {
    if conditions.is_empty() {
        return Ok(String::new());
    }
    let parts = conditions
        .iter()
        .map(Condition::to_sql)
        .collect::<DbResult<Vec<_>>>()?;
    Ok(format!(" WHERE {}", parts.join(" AND ")))
}
