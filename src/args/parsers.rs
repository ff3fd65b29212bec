use serde_json::Value;

use elevator::engine::DynamicPayload;

pub(crate) fn parse_payload(s: &str) -> Result<DynamicPayload, String> {
    let value: Value =
        serde_json::from_str(s).map_err(|err| format!("Invalid JSON payload: {}", err))?;
    match value {
        Value::Object(object) => Ok(DynamicPayload::from(object)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
            Err("Payload must be a JSON object.".to_owned())
        }
    }
}
