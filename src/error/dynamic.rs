use thiserror::Error;

#[derive(Debug, Error)]
pub enum DynamicFieldError {
    #[error("Dynamic content key '{key}' not found in payload.")]
    MissingField { key: String },
    #[error("Request '{request}' on room '{room}' declares no dynamicContent template.")]
    MissingTemplate { room: String, request: String },
    #[error("Dynamic payload must serialize to an object of fields.")]
    NotAnObject,
    #[error("Failed to convert dynamic payload: {source}")]
    Payload {
        #[source]
        source: serde_json::Error,
    },
}
