use std::sync::Arc;

use serde_json::Value;

use crate::config::DynamicContent;
use crate::error::DynamicFieldError;
use crate::http::{BodyEncoder, BodyKind};

use super::payload::DynamicPayload;

/// Declared `dynamicContent` of one request plus the body type to render it
/// with.
#[derive(Debug, Clone, Default)]
pub(crate) struct BodyTemplate {
    kind: Option<BodyKind>,
    fields: Vec<DynamicContent>,
}

impl BodyTemplate {
    pub(crate) const fn new(kind: Option<BodyKind>, fields: Vec<DynamicContent>) -> Self {
        Self { kind, fields }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolves each template field in declaration order. Literal values win
    /// over the payload.
    pub(crate) fn resolve(
        &self,
        payload: &DynamicPayload,
    ) -> Result<Vec<(String, Value)>, DynamicFieldError> {
        let lookup = payload.to_lookup();
        self.fields
            .iter()
            .map(|field| {
                let value = match field.value.as_ref() {
                    Some(literal) => literal.clone(),
                    None => lookup.get(&field.key).cloned().ok_or_else(|| {
                        DynamicFieldError::MissingField {
                            key: field.key.clone(),
                        }
                    })?,
                };
                Ok((field.key.clone(), value))
            })
            .collect()
    }

    /// Requests without a declared body type render templates as JSON.
    pub(crate) fn render(
        &self,
        payload: &DynamicPayload,
    ) -> Result<Arc<dyn BodyEncoder>, DynamicFieldError> {
        let fields = self.resolve(payload)?;
        Ok(self.kind.unwrap_or(BodyKind::Json).encoder_from_fields(fields))
    }
}
