use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use elevator::engine::DynamicPayload;

use super::parsers::parse_payload;

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Send one configured request
    Execute(ExecuteArgs),
    /// Send a configured request with its body rebuilt from a JSON payload
    Dynamic(DynamicArgs),
    /// Send every request tagged with a concurrency key at once
    Concurrent(ConcurrentArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ExecuteArgs {
    /// Room id from the integration file
    pub room: String,

    /// Request id within the room
    pub request: String,
}

#[derive(Debug, Args, Clone)]
pub struct DynamicArgs {
    /// Room id from the integration file
    pub room: String,

    /// Request id within the room
    pub request: String,

    /// JSON object supplying the template fields (e.g. '{"userId": 7}')
    #[arg(long, value_parser = parse_payload)]
    pub payload: DynamicPayload,
}

#[derive(Debug, Args, Clone)]
pub struct ConcurrentArgs {
    /// Concurrency key shared by the requests to fan out
    pub tag: String,

    /// Restrict the fan-out to these rooms (repeatable)
    #[arg(long = "room")]
    pub rooms: Vec<String>,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "elevator",
    version,
    about = "Declarative HTTP client orchestration - named rooms with bearer auth, templated payloads and tagged concurrent fan-out."
)]
pub struct ElevatorArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the integration file (.yaml, .yml, .json or .toml)
    #[arg(long, short = 'c', env = "ELEVATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging (overridden by ELEVATOR_LOG / RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
