//! Schema-less records.
//!
//! A [`Record`] is an identifier plus a bag of named [`Value`]s. The
//! serialized form is exactly what a chunk file holds for each element:
//!
//! ```text
//! {"id": 3, "fields": {"age": 40, "name": "Anura"}}
//! ```

mod value;

pub use value::{Value, ValueKind};

use crate::error::{CoreError, CoreResult};
use crate::types::RecordId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A record with arbitrary string-keyed fields.
///
/// # Example
///
/// ```rust
/// use minibase_core::{Record, Value};
///
/// let mut record = Record::new();
/// record.add_field("name", "Sajith");
/// record.add_field("age", 30);
///
/// assert_eq!(record.get_field("age").unwrap(), &Value::Integer(30));
/// assert!(record.get_field("email").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier, [`RecordId::UNASSIGNED`] until inserted.
    pub id: RecordId,
    /// Field values by name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fields: BTreeMap<String, Value>,
}

/// Older chunk writers emit `"fields": null` for a record with no fields.
fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Record {
    /// Creates an empty, unassigned record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unassigned record from `(name, value)` pairs.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            id: RecordId::UNASSIGNED,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns all fields.
    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Sets a field, replacing any previous value.
    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Gets a field by name.
    ///
    /// # Errors
    ///
    /// Returns `FieldNotFound` if the record has no such field.
    pub fn get_field(&self, name: &str) -> CoreResult<&Value> {
        self.fields
            .get(name)
            .ok_or_else(|| CoreError::field_not_found(name))
    }

    /// Removes a field and returns its value.
    ///
    /// # Errors
    ///
    /// Returns `FieldNotFound` if the record has no such field.
    pub fn remove_field(&mut self, name: &str) -> CoreResult<Value> {
        self.fields
            .remove(name)
            .ok_or_else(|| CoreError::field_not_found(name))
    }

    /// Checks that every `(name, kind)` in `schema` is present with that kind.
    ///
    /// Fields not named in the schema are ignored.
    ///
    /// # Errors
    ///
    /// Returns `FieldNotFound` for the first missing field, or
    /// `Validation` for the first field of the wrong kind.
    pub fn validate(&self, schema: &[(&str, ValueKind)]) -> CoreResult<()> {
        for &(name, expected) in schema {
            let actual = self.get_field(name)?.kind();
            if actual != expected {
                return Err(CoreError::Validation {
                    field: name.to_string(),
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Normalizes whole-number floats in every field to integers.
    pub(crate) fn normalize_numbers(&mut self) {
        self.fields.values_mut().for_each(Value::normalize_numbers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Record {
        Record::from_fields([("name", Value::from("Sajith")), ("age", Value::from(30))])
    }

    #[test]
    fn new_is_unassigned_and_empty() {
        let record = Record::new();
        assert_eq!(record.id(), RecordId::UNASSIGNED);
        assert!(record.fields().is_empty());
    }

    #[test]
    fn get_field() {
        let record = person();
        assert_eq!(record.get_field("name").unwrap().as_str(), Some("Sajith"));
        assert!(matches!(
            record.get_field("email"),
            Err(CoreError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn add_field_overwrites() {
        let mut record = person();
        record.add_field("age", 31);
        assert_eq!(record.get_field("age").unwrap().as_i64(), Some(31));
        assert_eq!(record.fields().len(), 2);
    }

    #[test]
    fn remove_field() {
        let mut record = person();
        assert_eq!(record.remove_field("name").unwrap(), Value::from("Sajith"));
        assert!(record.remove_field("name").is_err());
    }

    #[test]
    fn validate_missing_then_present() {
        let mut record = person();
        let schema = [
            ("name", ValueKind::String),
            ("age", ValueKind::Integer),
            ("email", ValueKind::String),
        ];

        assert!(matches!(
            record.validate(&schema),
            Err(CoreError::FieldNotFound { .. })
        ));

        record.add_field("email", "sajith@example.com");
        record.validate(&schema).unwrap();
    }

    #[test]
    fn validate_wrong_kind() {
        let record = person();
        let err = record.validate(&[("age", ValueKind::String)]).unwrap_err();
        match err {
            CoreError::Validation {
                field,
                expected,
                actual,
            } => {
                assert_eq!(field, "age");
                assert_eq!(expected, ValueKind::String);
                assert_eq!(actual, ValueKind::Integer);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn json_shape() {
        let mut record = person();
        record.id = RecordId::new(3);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"id":3,"fields":{"age":30,"name":"Sajith"}}"#);
    }

    #[test]
    fn missing_fields_decode_as_empty() {
        let record: Record = serde_json::from_str(r#"{"id": 9}"#).unwrap();
        assert_eq!(record.id(), RecordId::new(9));
        assert!(record.fields().is_empty());

        let record: Record = serde_json::from_str(r#"{"id": 9, "fields": null}"#).unwrap();
        assert!(record.fields().is_empty());
    }
}
