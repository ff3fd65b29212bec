
use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};
use tempfile::tempdir;

use support_cli::{TEST_TOKEN, run_elevator, spawn_echo_server};

fn write_config(dir: &tempfile::TempDir, base_url: &str) -> Result<PathBuf, String> {
    let path = dir.path().join("elevator.yaml");
    let content = format!(
        r#"
rooms:
  todoRoom:
    connection:
      baseUrl: {base_url}/api
      headers:
        Accept: application/json
    requests:
      addTodo:
        concurrentKey: add
        method: POST
        path: todos/add
        body:
          type: json
          content:
            userId: 1
            title: first
          dynamicContent:
            - key: userId
            - key: title
  todo1Room:
    connection:
      baseUrl: {base_url}
    requests:
      addTodo:
        concurrentKey: add
        method: POST
        path: /todos
        body:
          type: form
          content:
            userId: 2
  secured:
    connection:
      baseUrl: {base_url}
      auth:
        type: bearer
        accessTokenKey: token
        request:
          method: POST
          path: /login
    requests:
      me:
        path: /me
"#
    );
    fs::write(&path, content).map_err(|err| format!("write config failed: {}", err))?;
    Ok(path)
}

fn stdout_lines(output: &std::process::Output) -> Result<Vec<Value>, String> {
    if !output.status.success() {
        return Err(format!(
            "stdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(|err| format!("bad line {}: {}", line, err)))
        .collect()
}

#[test]
fn e2e_cli_execute_posts_configured_body() -> Result<(), String> {
    let (url, _server) = spawn_echo_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = write_config(&dir, &url)?.display().to_string();

    let output = run_elevator([
        "--config",
        config.as_str(),
        "execute",
        "todoRoom",
        "addTodo",
    ])?;
    let lines = stdout_lines(&output)?;
    let line = lines.first().ok_or_else(|| "Expected one line".to_owned())?;
    if line.get("room") != Some(&json!("todoRoom")) || line.get("status") != Some(&json!(200)) {
        return Err(format!("Unexpected summary: {}", line));
    }
    let body = line.get("body").ok_or_else(|| "Missing body".to_owned())?;
    if body.get("path") != Some(&json!("/api/todos/add"))
        || body.get("body") != Some(&json!({"userId": 1, "title": "first"}))
    {
        return Err(format!("Unexpected echo: {}", body));
    }
    Ok(())
}

#[test]
fn e2e_cli_dynamic_uses_payload() -> Result<(), String> {
    let (url, _server) = spawn_echo_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = write_config(&dir, &url)?.display().to_string();

    let output = run_elevator([
        "--config",
        config.as_str(),
        "dynamic",
        "todoRoom",
        "addTodo",
        "--payload",
        r#"{"userId": 7, "title": "milk"}"#,
    ])?;
    let lines = stdout_lines(&output)?;
    let echoed = lines
        .first()
        .and_then(|line| line.get("body"))
        .and_then(|body| body.get("body"))
        .cloned();
    if echoed != Some(json!({"userId": 7, "title": "milk"})) {
        return Err(format!("Unexpected echoed body: {:?}", echoed));
    }
    Ok(())
}

#[test]
fn e2e_cli_concurrent_prints_every_room() -> Result<(), String> {
    let (url, _server) = spawn_echo_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = write_config(&dir, &url)?.display().to_string();

    let output = run_elevator([
        "--config",
        config.as_str(),
        "concurrent",
        "add",
    ])?;
    let lines = stdout_lines(&output)?;
    let rooms: Vec<&str> = lines
        .iter()
        .filter_map(|line| line.get("room").and_then(Value::as_str))
        .collect();
    if rooms != ["todo1Room", "todoRoom"] {
        return Err(format!("Unexpected rooms: {:?}", rooms));
    }
    let form_body = lines
        .first()
        .and_then(|line| line.get("body"))
        .and_then(|body| body.get("body"))
        .cloned();
    if form_body != Some(json!("userId=2")) {
        return Err(format!("Unexpected form body: {:?}", form_body));
    }
    Ok(())
}

#[test]
fn e2e_cli_bearer_auth_injects_token() -> Result<(), String> {
    let (url, _server) = spawn_echo_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = write_config(&dir, &url)?.display().to_string();

    let output = run_elevator([
        "--config",
        config.as_str(),
        "execute",
        "secured",
        "me",
    ])?;
    let lines = stdout_lines(&output)?;
    let authorization = lines
        .first()
        .and_then(|line| line.get("body"))
        .and_then(|body| body.get("authorization"))
        .cloned();
    let expected = format!("Bearer {}", TEST_TOKEN);
    if authorization != Some(json!(expected)) {
        return Err(format!("Unexpected authorization: {:?}", authorization));
    }
    Ok(())
}

#[test]
fn e2e_cli_unknown_room_fails() -> Result<(), String> {
    let (url, _server) = spawn_echo_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = write_config(&dir, &url)?.display().to_string();

    let output = run_elevator([
        "--config",
        config.as_str(),
        "execute",
        "nowhere",
        "addTodo",
    ])?;
    if output.status.success() {
        return Err("Expected a non-zero exit for an unknown room".to_owned());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.contains("nowhere") {
        return Err(format!("Expected the room in the error: {}", stderr));
    }
    Ok(())
}
