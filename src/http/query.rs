use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::DynamicPayload;
use crate::error::AppResult;

use super::value_to_text;

/// Ordered query-string pairs appended to a request URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Builds a query from the fields of any serializable record.
    ///
    /// # Errors
    ///
    /// Returns an error when the value does not serialize to an object.
    pub fn from_serialize<T>(value: &T) -> AppResult<Self>
    where
        T: Serialize,
    {
        let payload = DynamicPayload::from_serialize(value)?;
        Ok(payload
            .to_field_list()
            .into_iter()
            .map(|(key, value)| (key, value_to_text(&value)))
            .collect())
    }

    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Percent-encoded `key=value&...` form, without the leading `?`.
    #[must_use]
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl From<BTreeMap<String, String>> for Query {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}
