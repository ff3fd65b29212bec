use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DynamicFieldError;

/// Caller-supplied values for a request's dynamic body template.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicPayload {
    /// Top-level keys only; object values are passed through whole.
    Map(BTreeMap<String, Value>),
    /// Ordered pairs; a later duplicate key wins.
    Fields(Vec<(String, Value)>),
    /// A serialized record. Nested objects contribute their own fields.
    Record(Map<String, Value>),
}

impl DynamicPayload {
    /// Captures any record-like value.
    ///
    /// # Errors
    ///
    /// Returns an error when `value` fails to serialize or is not an object.
    pub fn from_serialize<T>(value: &T) -> Result<Self, DynamicFieldError>
    where
        T: Serialize,
    {
        match serde_json::to_value(value).map_err(|err| DynamicFieldError::Payload { source: err })? {
            Value::Object(map) => Ok(DynamicPayload::Record(map)),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
                Err(DynamicFieldError::NotAnObject)
            }
        }
    }

    #[must_use]
    pub fn to_field_list(&self) -> Vec<(String, Value)> {
        match self {
            DynamicPayload::Map(map) => map
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            DynamicPayload::Fields(fields) => fields.clone(),
            DynamicPayload::Record(record) => {
                let mut fields = Vec::with_capacity(record.len());
                flatten_into(record, &mut fields);
                fields
            }
        }
    }

    /// Field lookup table; on duplicate keys the last field wins.
    #[must_use]
    pub fn to_lookup(&self) -> BTreeMap<String, Value> {
        self.to_field_list().into_iter().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            DynamicPayload::Map(map) => map.is_empty(),
            DynamicPayload::Fields(fields) => fields.is_empty(),
            DynamicPayload::Record(record) => record.is_empty(),
        }
    }
}

fn flatten_into(record: &Map<String, Value>, fields: &mut Vec<(String, Value)>) {
    for (key, value) in record {
        if let Value::Object(nested) = value {
            flatten_into(nested, fields);
        } else {
            fields.push((key.clone(), value.clone()));
        }
    }
}

impl From<BTreeMap<String, Value>> for DynamicPayload {
    fn from(map: BTreeMap<String, Value>) -> Self {
        DynamicPayload::Map(map)
    }
}

impl From<Vec<(String, Value)>> for DynamicPayload {
    fn from(fields: Vec<(String, Value)>) -> Self {
        DynamicPayload::Fields(fields)
    }
}

impl From<Map<String, Value>> for DynamicPayload {
    fn from(object: Map<String, Value>) -> Self {
        DynamicPayload::Map(object.into_iter().collect())
    }
}
