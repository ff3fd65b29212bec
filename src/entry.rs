use std::collections::BTreeMap;

use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::args::{Command, ConcurrentArgs, DynamicArgs, ElevatorArgs, ExecuteArgs};
use elevator::engine::Engine;
use elevator::error::{AppError, AppResult};
use elevator::http::{Outcome, Response};
use elevator::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

/// One line of command output per response.
#[derive(Debug, Serialize)]
struct ResponseSummary<'a> {
    room: &'a str,
    status: u16,
    ok: bool,
    elapsed_ms: u128,
    error: Option<String>,
    body: Value,
}

impl<'a> ResponseSummary<'a> {
    fn new(room: &'a str, response: &Response, error: Option<&AppError>) -> Self {
        let body = response.value().cloned().unwrap_or_else(|| {
            if response.body().is_empty() {
                Value::Null
            } else {
                Value::String(response.text().into_owned())
            }
        });
        Self {
            room,
            status: response.status(),
            ok: response.ok(),
            elapsed_ms: response.elapsed().as_millis(),
            error: error.map(ToString::to_string),
            body,
        }
    }
}

pub(crate) fn run() -> AppResult<()> {
    let args = ElevatorArgs::parse();

    elevator::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

async fn run_async(args: ElevatorArgs) -> AppResult<()> {
    let mut engine = Engine::from_path(args.config.as_deref())?;
    engine.warm_up()?;

    match args.command {
        Command::Execute(cmd) => run_execute(&engine, &cmd).await,
        Command::Dynamic(cmd) => run_dynamic(&engine, &cmd).await,
        Command::Concurrent(cmd) => run_concurrent(&engine, &cmd).await,
    }
}

async fn run_execute(engine: &Engine, cmd: &ExecuteArgs) -> AppResult<()> {
    let outcome = engine.execute(&cmd.room, &cmd.request).await?;
    print_outcome(&cmd.room, &outcome)
}

async fn run_dynamic(engine: &Engine, cmd: &DynamicArgs) -> AppResult<()> {
    let outcome = engine
        .dynamic_execute(&cmd.room, &cmd.request, &cmd.payload)
        .await?;
    print_outcome(&cmd.room, &outcome)
}

async fn run_concurrent(engine: &Engine, cmd: &ConcurrentArgs) -> AppResult<()> {
    let (shutdown_tx, _shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let rooms: Vec<&str> = cmd.rooms.iter().map(String::as_str).collect();
    let results = engine
        .execute_concurrent_until(&cmd.tag, &rooms, &shutdown_tx)
        .await;

    drop(shutdown_tx.send(()));
    if let Err(err) = signal_handle.await {
        warn!("Signal handler task failed: {}", err);
    }

    if results.is_empty() {
        warn!("No requests tagged '{}'", cmd.tag);
    }
    let ordered: BTreeMap<String, Response> = results.into_iter().collect();
    for (room, response) in &ordered {
        print_summary(&ResponseSummary::new(room, response, None))?;
    }
    info!(
        "Fan-out '{}' finished: {} response(s) in {:?}",
        cmd.tag,
        ordered.len(),
        engine.elapsed_time()
    );
    Ok(())
}

fn print_outcome(room: &str, outcome: &Outcome) -> AppResult<()> {
    print_summary(&ResponseSummary::new(
        room,
        &outcome.response,
        outcome.error.as_ref(),
    ))
}

fn print_summary(summary: &ResponseSummary<'_>) -> AppResult<()> {
    println!("{}", serde_json::to_string(summary)?);
    Ok(())
}
