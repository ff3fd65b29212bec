use std::future::Future;
use std::path::Path;

use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use elevator::engine::{DynamicPayload, Engine};

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn write_scenario(dir: &Path, todo: &str, todo1: &str) -> Result<std::path::PathBuf, String> {
    let path = dir.join("scenario.yaml");
    let content = format!(
        r#"
rooms:
  todoRoom:
    connection:
      baseUrl: {todo}
      timeout: 5
    requests:
      addTodo:
        concurrentKey: add
        method: POST
        path: todos/add
        body:
          type: json
          content:
            todo: Use DummyJSON in the project
            completed: false
            userId: 5
          dynamicContent:
            - key: todo
            - key: userId
            - key: completed
              value: true
  todo1Room:
    connection:
      baseUrl: {todo1}
    requests:
      addTodo:
        concurrentKey: add
        method: POST
        path: todos/add
        body:
          type: json
          content:
            todo: Second room todo
            completed: true
            userId: 6
"#
    );
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;
    Ok(path)
}

async fn mount_add(server: &MockServer, body: serde_json::Value, id: u32) {
    Mock::given(method("POST"))
        .and(path("/todos/add"))
        .and(body_json(body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": id})))
        .expect(1)
        .mount(server)
        .await;
}

#[test]
fn e2e_engine_fans_out_add_scenario() -> Result<(), String> {
    run_async_test(async {
        let todo = MockServer::start().await;
        let todo1 = MockServer::start().await;
        mount_add(
            &todo,
            json!({"todo": "Use DummyJSON in the project", "completed": false, "userId": 5}),
            151,
        )
        .await;
        mount_add(
            &todo1,
            json!({"todo": "Second room todo", "completed": true, "userId": 6}),
            152,
        )
        .await;

        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let config = write_scenario(dir.path(), &todo.uri(), &todo1.uri())?;
        let mut engine = Engine::from_path(Some(&config)).map_err(|err| err.to_string())?;
        engine.warm_up().map_err(|err| err.to_string())?;

        let results = engine.execute_concurrent("add", &[]).await;
        let mut keys: Vec<&str> = results.keys().map(String::as_str).collect();
        keys.sort_unstable();
        if keys != ["todo1Room", "todoRoom"] {
            return Err(format!("Unexpected keys: {:?}", keys));
        }
        for (room, id) in [("todoRoom", 151), ("todo1Room", 152)] {
            let response = results
                .get(room)
                .ok_or_else(|| format!("Missing {}", room))?;
            if !response.ok() || response.value() != Some(&json!({"id": id})) {
                return Err(format!("Unexpected response for {}: {}", room, response.text()));
            }
        }
        todo.verify().await;
        todo1.verify().await;
        Ok(())
    })
}

#[test]
fn e2e_engine_dynamic_execute_overrides_literals() -> Result<(), String> {
    run_async_test(async {
        let todo = MockServer::start().await;
        mount_add(
            &todo,
            json!({"todo": "Walk the dog", "userId": 9, "completed": true}),
            200,
        )
        .await;

        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let config = write_scenario(dir.path(), &todo.uri(), "http://127.0.0.1:9")?;
        let mut engine = Engine::from_path(Some(&config)).map_err(|err| err.to_string())?;
        engine.warm_up().map_err(|err| err.to_string())?;

        let payload = DynamicPayload::from_serialize(&json!({
            "todo": "Walk the dog",
            "userId": 9,
            "completed": false
        }))
        .map_err(|err| err.to_string())?;
        let response = engine
            .dynamic_execute("todoRoom", "addTodo", &payload)
            .await
            .map_err(|err| err.to_string())?
            .into_result()
            .map_err(|err| err.to_string())?;
        if response.value() != Some(&json!({"id": 200})) {
            return Err(format!("Unexpected response: {}", response.text()));
        }
        todo.verify().await;
        Ok(())
    })
}
