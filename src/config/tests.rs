use std::collections::BTreeMap;

use serde_json::json;
use tempfile::tempdir;

use super::{expand_with, load_config_file, parse_yaml};
use crate::error::{AppError, ConfigError};
use crate::http::HttpMethod;

const TODO_YAML: &str = r#"
rooms:
  todoRoom:
    connection:
      baseUrl: https://jsonplaceholder.typicode.com
      timeout: 5
      headers:
        Accept: application/json
        X-Retry: 3
    requests:
      add:
        concurrentKey: add
        method: POST
        path: /todos
        body:
          type: json
          content:
            userId: 7
            title: shopping list
          dynamicContent:
            - key: userId
            - key: title
            - key: completed
              value: false
  secured:
    connection:
      baseUrl: https://api.example.com/v1
      auth:
        type: bearer
        accessTokenKey: token
        request:
          method: post
          path: /login
          body:
            type: form
            content:
              user: admin
    requests:
      me:
        path: /me
"#;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: BTreeMap<String, String> = pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn parse_yaml_rooms_and_requests() -> Result<(), String> {
    let config = parse_yaml(TODO_YAML).map_err(|err| format!("parse failed: {}", err))?;
    let room = config
        .rooms
        .get("todoRoom")
        .ok_or_else(|| "Missing todoRoom".to_owned())?;
    if room.connection.base_url != "https://jsonplaceholder.typicode.com" {
        return Err(format!("Unexpected base url: {}", room.connection.base_url));
    }
    if room.connection.timeout != Some(5) {
        return Err("Expected timeout of 5 seconds".to_owned());
    }
    if room.connection.headers.get("X-Retry") != Some(&json!(3)) {
        return Err("Expected numeric header value to survive parsing".to_owned());
    }

    let add = config
        .request("todoRoom", "add")
        .ok_or_else(|| "Missing add request".to_owned())?;
    if add.method != HttpMethod::Post {
        return Err(format!("Unexpected method: {}", add.method));
    }
    if add.concurrent_key.as_deref() != Some("add") {
        return Err("Expected concurrentKey".to_owned());
    }
    let body = add
        .body
        .as_ref()
        .ok_or_else(|| "Expected body".to_owned())?;
    if body.kind.as_deref() != Some("json") {
        return Err("Expected json body".to_owned());
    }
    if body.content != json!({"userId": 7, "title": "shopping list"}) {
        return Err(format!("Unexpected content: {}", body.content));
    }
    if body.dynamic_content.len() != 3 {
        return Err(format!(
            "Expected 3 dynamic fields, got {}",
            body.dynamic_content.len()
        ));
    }
    let literal = body
        .dynamic_content
        .get(2)
        .ok_or_else(|| "Missing literal field".to_owned())?;
    if literal.value != Some(json!(false)) {
        return Err("Expected literal false".to_owned());
    }

    Ok(())
}

#[test]
fn parse_yaml_bearer_auth_section() -> Result<(), String> {
    let config = parse_yaml(TODO_YAML).map_err(|err| format!("parse failed: {}", err))?;
    let room = config
        .rooms
        .get("secured")
        .ok_or_else(|| "Missing secured room".to_owned())?;
    let auth = room
        .connection
        .auth
        .as_ref()
        .ok_or_else(|| "Expected auth".to_owned())?;
    if !auth.is_bearer() || auth.is_disabled() {
        return Err("Expected bearer auth".to_owned());
    }
    if auth.access_token_key.as_deref() != Some("token") {
        return Err("Unexpected token key".to_owned());
    }
    let request = auth
        .request
        .as_ref()
        .ok_or_else(|| "Expected auth request".to_owned())?;
    if request.method != HttpMethod::Post || request.path != "/login" {
        return Err("Unexpected auth request".to_owned());
    }
    let me = config
        .request("secured", "me")
        .ok_or_else(|| "Missing me request".to_owned())?;
    if me.method != HttpMethod::Get || me.body.is_some() {
        return Err("Expected default GET without body".to_owned());
    }
    Ok(())
}

#[test]
fn load_json_config_file() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("elevator.json");
    let content = r#"{
  "rooms": {
    "todoRoom": {
      "connection": { "baseUrl": "http://localhost:3000", "timeoutSeconds": 2 },
      "requests": {
        "list": { "method": "get", "path": "/todos", "concurrencyTag": "bulk" }
      }
    }
  }
}"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    let room = config
        .rooms
        .get("todoRoom")
        .ok_or_else(|| "Missing todoRoom".to_owned())?;
    if room.connection.timeout != Some(2) {
        return Err("Expected timeoutSeconds alias".to_owned());
    }
    let list = config
        .request("todoRoom", "list")
        .ok_or_else(|| "Missing list request".to_owned())?;
    if list.concurrent_key.as_deref() != Some("bulk") {
        return Err("Expected concurrencyTag alias".to_owned());
    }
    Ok(())
}

#[test]
fn load_toml_config_file() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("elevator.toml");
    let content = r#"
[rooms.todoRoom.connection]
baseUrl = "http://localhost:3000"

[rooms.todoRoom.requests.add]
method = "PUT"
path = "/todos/1"

[rooms.todoRoom.requests.add.body]
type = "json"
content = { title = "renamed" }
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    let add = config
        .request("todoRoom", "add")
        .ok_or_else(|| "Missing add request".to_owned())?;
    if add.method != HttpMethod::Put {
        return Err(format!("Unexpected method: {}", add.method));
    }
    let content = add.body.as_ref().map(|body| body.content.clone());
    if content != Some(json!({"title": "renamed"})) {
        return Err("Unexpected body content".to_owned());
    }
    Ok(())
}

#[test]
fn load_config_rejects_unknown_extension() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("elevator.ini");
    std::fs::write(&path, "rooms = 1").map_err(|err| format!("write failed: {}", err))?;

    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "ini" => Ok(()),
        Err(other) => Err(format!("Unexpected error: {}", other)),
        Ok(_) => Err("Expected unsupported extension".to_owned()),
    }
}

#[test]
fn load_config_reports_missing_file() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("absent.yaml");
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::ReadConfig { .. })) => Ok(()),
        Err(other) => Err(format!("Unexpected error: {}", other)),
        Ok(_) => Err("Expected read error".to_owned()),
    }
}

#[test]
fn load_config_reports_yaml_syntax_error() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "rooms: [unclosed").map_err(|err| format!("write failed: {}", err))?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::ParseYaml { .. })) => Ok(()),
        Err(other) => Err(format!("Unexpected error: {}", other)),
        Ok(_) => Err("Expected parse error".to_owned()),
    }
}

#[test]
fn expand_plain_and_braced_variables() -> Result<(), String> {
    let lookup = lookup_from(&[("HOST", "api.local"), ("PORT", "8080")]);
    let expanded = expand_with("http://$HOST:${PORT}/v1", lookup);
    if expanded != "http://api.local:8080/v1" {
        return Err(format!("Unexpected expansion: {}", expanded));
    }
    Ok(())
}

#[test]
fn expand_unset_variable_to_empty() -> Result<(), String> {
    let lookup = lookup_from(&[]);
    let expanded = expand_with("token=${MISSING};user=$ALSO_MISSING!", lookup);
    if expanded != "token=;user=!" {
        return Err(format!("Unexpected expansion: {}", expanded));
    }
    Ok(())
}

#[test]
fn expand_keeps_lone_dollar_and_unclosed_brace() -> Result<(), String> {
    let lookup = lookup_from(&[("X", "1")]);
    let expanded = expand_with("cost: 5$ and ${X", lookup);
    if expanded != "cost: 5$ and ${X" {
        return Err(format!("Unexpected expansion: {}", expanded));
    }
    Ok(())
}

#[test]
fn interpolated_yaml_parses() -> Result<(), String> {
    let lookup = lookup_from(&[("API_BASE", "http://127.0.0.1:9000")]);
    let raw = "rooms:\n  r:\n    connection:\n      baseUrl: ${API_BASE}\n";
    let config = parse_yaml(&expand_with(raw, lookup))
        .map_err(|err| format!("parse failed: {}", err))?;
    let base = config
        .rooms
        .get("r")
        .map(|room| room.connection.base_url.as_str());
    if base != Some("http://127.0.0.1:9000") {
        return Err(format!("Unexpected base url: {:?}", base));
    }
    Ok(())
}
