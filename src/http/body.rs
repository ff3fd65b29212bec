use std::fmt;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppResult, ConfigError, TransportError};

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Wire form of a request body.
pub enum EncodedBody {
    Empty,
    Bytes {
        bytes: Bytes,
        content_type: Option<String>,
    },
    /// Carries its own `multipart/form-data; boundary=...` content type.
    Multipart(reqwest::multipart::Form),
}

impl fmt::Debug for EncodedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodedBody::Empty => f.write_str("Empty"),
            EncodedBody::Bytes {
                bytes,
                content_type,
            } => f
                .debug_struct("Bytes")
                .field("len", &bytes.len())
                .field("content_type", content_type)
                .finish(),
            EncodedBody::Multipart(form) => f
                .debug_struct("Multipart")
                .field("boundary", &form.boundary())
                .finish(),
        }
    }
}

/// Turns a captured payload into request bytes plus content type.
///
/// Encoders are re-run on every dispatch, so they must be cheap to call
/// repeatedly and must not consume their payload.
pub trait BodyEncoder: Send + Sync + fmt::Debug {
    /// # Errors
    ///
    /// Returns an error when the payload cannot be serialized or a referenced
    /// file cannot be read.
    fn encode(&self) -> Result<EncodedBody, TransportError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBody;

impl BodyEncoder for EmptyBody {
    fn encode(&self) -> Result<EncodedBody, TransportError> {
        Ok(EncodedBody::Empty)
    }
}

#[derive(Debug, Clone)]
pub struct JsonBody {
    value: Value,
}

impl JsonBody {
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self { value }
    }

    /// # Errors
    ///
    /// Returns an error when the value cannot be represented as JSON.
    pub fn from_serialize<T>(value: &T) -> AppResult<Self>
    where
        T: Serialize,
    {
        Ok(Self::new(serde_json::to_value(value)?))
    }
}

impl BodyEncoder for JsonBody {
    fn encode(&self) -> Result<EncodedBody, TransportError> {
        let bytes = serde_json::to_vec(&self.value)
            .map_err(|err| TransportError::EncodeBody { source: err })?;
        Ok(EncodedBody::Bytes {
            bytes: Bytes::from(bytes),
            content_type: Some(CONTENT_TYPE_JSON.to_owned()),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormBody {
    fields: Vec<(String, String)>,
}

impl FormBody {
    pub fn new<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// # Errors
    ///
    /// Returns an error when `content` is neither null nor a mapping.
    pub fn from_value(content: &Value) -> Result<Self, ConfigError> {
        Ok(Self::new(object_fields(content, "form")?.into_iter().map(
            |(key, value)| (key, value_to_text(&value)),
        )))
    }
}

impl BodyEncoder for FormBody {
    fn encode(&self) -> Result<EncodedBody, TransportError> {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish();
        Ok(EncodedBody::Bytes {
            bytes: Bytes::from(encoded),
            content_type: Some(CONTENT_TYPE_FORM.to_owned()),
        })
    }
}

#[derive(Debug, Clone)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    /// Read from disk each time the body is encoded.
    File {
        name: String,
        path: String,
    },
    Bytes {
        name: String,
        file_name: String,
        bytes: Bytes,
        mime: Option<String>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    parts: Vec<FormPart>,
}

impl MultipartBody {
    #[must_use]
    pub const fn new(parts: Vec<FormPart>) -> Self {
        Self { parts }
    }

    #[must_use]
    pub fn with_part(mut self, part: FormPart) -> Self {
        self.parts.push(part);
        self
    }

    /// String values starting with `@` become file parts.
    ///
    /// # Errors
    ///
    /// Returns an error when `content` is neither null nor a mapping.
    pub fn from_value(content: &Value) -> Result<Self, ConfigError> {
        Ok(Self::from_fields(object_fields(content, "multipart-form")?))
    }

    /// Config content only: string values starting with `@` name a file.
    fn from_fields(fields: Vec<(String, Value)>) -> Self {
        let parts = fields
            .into_iter()
            .map(|(name, value)| match value.as_str().and_then(|v| v.strip_prefix('@')) {
                Some(path) if !path.is_empty() => FormPart::File {
                    name,
                    path: path.to_owned(),
                },
                Some(_) | None => FormPart::Text {
                    value: value_to_text(&value),
                    name,
                },
            })
            .collect();
        Self { parts }
    }

    /// Every field becomes a text part, whatever its value.
    pub(crate) fn text_fields(fields: Vec<(String, Value)>) -> Self {
        let parts = fields
            .into_iter()
            .map(|(name, value)| FormPart::Text {
                value: value_to_text(&value),
                name,
            })
            .collect();
        Self { parts }
    }

    #[must_use]
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }
}

impl BodyEncoder for MultipartBody {
    fn encode(&self) -> Result<EncodedBody, TransportError> {
        let mut form = reqwest::multipart::Form::new();
        for part in &self.parts {
            match part {
                FormPart::Text { name, value } => {
                    form = form.text(name.clone(), value.clone());
                }
                FormPart::File { name, path } => {
                    let bytes = std::fs::read(path).map_err(|err| TransportError::ReadFormFile {
                        path: path.clone(),
                        source: err,
                    })?;
                    let file_name = Path::new(path)
                        .file_name()
                        .and_then(|value| value.to_str())
                        .unwrap_or("file")
                        .to_owned();
                    form = form.part(
                        name.clone(),
                        reqwest::multipart::Part::bytes(bytes).file_name(file_name),
                    );
                }
                FormPart::Bytes {
                    name,
                    file_name,
                    bytes,
                    mime,
                } => {
                    let mut file_part =
                        reqwest::multipart::Part::stream(bytes.clone()).file_name(file_name.clone());
                    if let Some(mime) = mime.as_deref() {
                        file_part = file_part
                            .mime_str(mime)
                            .map_err(|err| TransportError::InvalidPartMime {
                                name: name.clone(),
                                source: err,
                            })?;
                    }
                    form = form.part(name.clone(), file_part);
                }
            }
        }
        Ok(EncodedBody::Multipart(form))
    }
}

/// Body type declared in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
    Multipart,
}

impl BodyKind {
    /// Case-insensitive lookup of a configured body type name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Some(BodyKind::Json),
            "form" => Some(BodyKind::Form),
            "multipart-form" | "multipart" => Some(BodyKind::Multipart),
            _ => None,
        }
    }

    /// Builds an encoder for static `content` from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when form content is not a mapping.
    pub fn encoder(self, content: &Value) -> Result<Arc<dyn BodyEncoder>, ConfigError> {
        Ok(match self {
            BodyKind::Json => Arc::new(JsonBody::new(content.clone())),
            BodyKind::Form => Arc::new(FormBody::from_value(content)?),
            BodyKind::Multipart => Arc::new(MultipartBody::from_value(content)?),
        })
    }

    /// Builds an encoder from resolved template fields. Form and multipart keep
    /// field order; JSON objects are emitted with sorted keys. Values are
    /// always sent as data, never as file references.
    #[must_use]
    pub fn encoder_from_fields(self, fields: Vec<(String, Value)>) -> Arc<dyn BodyEncoder> {
        match self {
            BodyKind::Json => Arc::new(JsonBody::new(Value::Object(fields.into_iter().collect()))),
            BodyKind::Form => Arc::new(FormBody::new(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, value_to_text(&value))),
            )),
            BodyKind::Multipart => Arc::new(MultipartBody::text_fields(fields)),
        }
    }
}

/// Renders a scalar the way form and query encoders expect it.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn object_fields(content: &Value, kind: &str) -> Result<Vec<(String, Value)>, ConfigError> {
    match content {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => Ok(map
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()),
        Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
            Err(ConfigError::InvalidBodyContent {
                kind: kind.to_owned(),
            })
        }
    }
}
