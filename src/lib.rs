//! Declarative HTTP client orchestration.
//!
//! An integration file declares *rooms*: one backend connection each, with
//! default headers, a timeout, optional bearer authentication and a set of
//! named requests. [`engine::Engine`] warms the rooms up and then executes
//! requests by key, rebuilds bodies from dynamic payloads, or fans out every
//! request sharing a concurrency tag and collects the responses.
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod logger;
pub mod room;
pub mod shutdown;
