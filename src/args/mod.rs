//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;


pub use cli::{Command, ConcurrentArgs, DynamicArgs, ElevatorArgs, ExecuteArgs};
