use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DecodeError;

const MIME_XML: &str = "text/xml";
const XML_TEXT_KEYS: [&str; 2] = ["$text", "$value"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFormat {
    Json,
    Xml,
}

impl DecodeFormat {
    /// `text/xml` selects XML; every other content type, including none,
    /// falls back to JSON. Media type parameters are ignored.
    #[must_use]
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let essence = content_type
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default();
        if essence == MIME_XML {
            DecodeFormat::Xml
        } else {
            DecodeFormat::Json
        }
    }

    /// # Errors
    ///
    /// Returns an error when the bytes are not well-formed for this format or
    /// do not fit `T`.
    pub fn decode<T>(self, bytes: &[u8]) -> Result<T, DecodeError>
    where
        T: DeserializeOwned,
    {
        match self {
            DecodeFormat::Json => {
                serde_json::from_slice(bytes).map_err(|err| DecodeError::Json { source: err })
            }
            DecodeFormat::Xml => {
                quick_xml::de::from_reader(bytes).map_err(|err| DecodeError::Xml { source: err })
            }
        }
    }
}

impl DecodeFormat {
    /// Decodes into a generic value. XML leaf elements come back as plain
    /// strings instead of `{"$text": ..}` objects.
    ///
    /// # Errors
    ///
    /// Returns an error when the bytes are not well-formed for this format.
    pub fn decode_value(self, bytes: &[u8]) -> Result<Value, DecodeError> {
        let value = self.decode::<Value>(bytes)?;
        Ok(match self {
            DecodeFormat::Json => value,
            DecodeFormat::Xml => unwrap_text_nodes(value),
        })
    }
}

fn unwrap_text_nodes(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let leaf =
                map.len() == 1 && map.keys().all(|key| XML_TEXT_KEYS.contains(&key.as_str()));
            let mut entries = map
                .into_iter()
                .map(|(key, child)| (key, unwrap_text_nodes(child)));
            if leaf {
                entries.next().map_or(Value::Null, |(_key, text)| text)
            } else {
                Value::Object(entries.collect())
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(unwrap_text_nodes).collect()),
        scalar @ (Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)) => scalar,
    }
}

/// Decodes `bytes` using the format implied by `content_type`.
///
/// # Errors
///
/// Returns an error when the body is malformed for its declared format.
pub fn decode<T>(bytes: &[u8], content_type: Option<&str>) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
{
    DecodeFormat::from_content_type(content_type).decode(bytes)
}

/// Expected shape of a decoded response body.
pub trait DtoShape: Send + Sync + fmt::Debug {
    fn target(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns an error when `value` does not fit the shape.
    fn shape(&self, value: &Value) -> Result<Value, DecodeError>;
}

/// Shapes a decoded value by passing it through `T`.
pub struct TypedDto<T> {
    marker: PhantomData<fn() -> T>,
}

impl<T> TypedDto<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            marker: PhantomData,
        }
    }
}

impl<T> Default for TypedDto<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypedDto<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedDto")
            .field(&std::any::type_name::<T>())
            .finish()
    }
}

impl<T> DtoShape for TypedDto<T>
where
    T: DeserializeOwned + Serialize,
{
    fn target(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn shape(&self, value: &Value) -> Result<Value, DecodeError> {
        let target = self.target();
        let typed: T = serde_json::from_value(value.clone())
            .map_err(|err| DecodeError::Shape { target, source: err })?;
        serde_json::to_value(typed).map_err(|err| DecodeError::Shape { target, source: err })
    }
}
