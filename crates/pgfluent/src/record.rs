//! Ordered column → value records.
//!
//! A [`Record`] is both the input of `insert`/`update` and the row type returned by reads.
//! Column order is insertion order, which is also the order values get bound in.

use crate::error::{DbError, DbResult};
use crate::value::Value;
use tokio_postgres::Row;

/// An ordered set of named column values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Set a column value, replacing an existing value for the same column in place.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Non-chaining form of [`Record::set`].
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Get a column value by name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    /// Values in column order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a record from a JSON object. Nested arrays/objects become [`Value::Json`].
    pub fn from_json(value: &serde_json::Value) -> DbResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| DbError::validation("Record::from_json expects a JSON object"))?;
        Ok(object
            .iter()
            .map(|(k, v)| (k.clone(), Value::from_json(v)))
            .collect())
    }

    /// Convert to a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(c, v)| (c.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Decode a driver row, keeping the column order of the result set.
    pub(crate) fn from_row(row: &Row) -> DbResult<Self> {
        let mut record = Record::new();
        for (idx, column) in row.columns().iter().enumerate() {
            record
                .fields
                .push((column.name().to_string(), Value::decode(row, idx)?));
        }
        Ok(record)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_keeps_insertion_order() {
        let r = Record::new().set("b", 1).set("a", "x");
        assert_eq!(r.columns().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(
            r.values().cloned().collect::<Vec<_>>(),
            vec![Value::Int(1), Value::from("x")]
        );
    }

    #[test]
    fn set_replaces_existing_column_in_place() {
        let r = Record::new().set("a", 1).set("b", 2).set("a", 3);
        assert_eq!(r.len(), 2);
        assert_eq!(r.get("a"), Some(&Value::Int(3)));
        assert_eq!(r.columns().next(), Some("a"));
    }

    #[test]
    fn from_json_requires_object() {
        let r = Record::from_json(&serde_json::json!({"id": 1, "tags": ["x"]})).unwrap();
        assert_eq!(r.get("id"), Some(&Value::Int(1)));
        assert!(matches!(r.get("tags"), Some(Value::Json(_))));
        assert!(Record::from_json(&serde_json::json!([1])).is_err());
    }

    #[test]
    fn to_json_round_trips_scalars() {
        let r = Record::new().set("n", 1).set("s", "x").set("z", None::<i32>);
        assert_eq!(r.to_json(), serde_json::json!({"n": 1, "s": "x", "z": null}));
    }
}
