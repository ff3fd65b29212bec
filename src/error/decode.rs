use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed JSON body: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },
    #[error("Malformed XML body: {source}")]
    Xml {
        #[source]
        source: quick_xml::DeError,
    },
    #[error("Body does not match the expected {target} shape: {source}")]
    Shape {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
