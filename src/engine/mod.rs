//! Keyed and concurrent execution over warmed rooms.
mod concurrent;
mod payload;
mod template;
mod warmup;


use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::{ElevatorConfig, load_config};
use crate::error::{AppError, AppResult, ConfigError, DynamicFieldError};
use crate::http::{BodyEncoder, Outcome, Query, Request, TypedDto};
use crate::room::{AuthStrategy, Room};

pub use payload::DynamicPayload;
use template::BodyTemplate;

/// Rooms built from an [`ElevatorConfig`], addressed by room and request key.
#[derive(Debug)]
pub struct Engine {
    config: ElevatorConfig,
    rooms: BTreeMap<String, Room>,
    templates: BTreeMap<String, BTreeMap<String, BodyTemplate>>,
    last_fan_out_nanos: AtomicU64,
}

impl Engine {
    /// Creates a cold engine; call [`Engine::warm_up`] before executing.
    #[must_use]
    pub const fn new(config: ElevatorConfig) -> Self {
        Self {
            config,
            rooms: BTreeMap::new(),
            templates: BTreeMap::new(),
            last_fan_out_nanos: AtomicU64::new(0),
        }
    }

    /// Loads configuration from `path`, or the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error when no config is found or it fails to parse.
    pub fn from_path(path: Option<&Path>) -> AppResult<Self> {
        Ok(Self::new(load_config(path)?))
    }

    #[must_use]
    pub const fn config(&self) -> &ElevatorConfig {
        &self.config
    }

    /// Builds every configured room, replacing whatever was built before.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid URLs, headers, body types or
    /// incomplete auth. On error the previously warmed rooms are kept.
    pub fn warm_up(&mut self) -> AppResult<&mut Self> {
        let mut rooms = BTreeMap::new();
        let mut templates = BTreeMap::new();
        for (key, room_config) in &self.config.rooms {
            let warm = warmup::build_room(key, room_config)?;
            rooms.insert(key.clone(), warm.room);
            templates.insert(key.clone(), warm.templates);
        }
        info!("Engine warmed up with {} room(s)", rooms.len());
        self.rooms = rooms;
        self.templates = templates;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns an error when the room is unknown.
    pub fn room(&self, room: &str) -> AppResult<&Room> {
        self.rooms.get(room).ok_or_else(|| {
            AppError::config(ConfigError::UnknownRoom {
                room: room.to_owned(),
            })
        })
    }

    /// # Errors
    ///
    /// Returns an error when the room or request is unknown.
    pub fn request(&self, room: &str, request: &str) -> AppResult<&Request> {
        self.room(room)?.request(request).ok_or_else(|| {
            AppError::config(ConfigError::UnknownRequest {
                room: room.to_owned(),
                request: request.to_owned(),
            })
        })
    }

    /// Sends a configured request.
    ///
    /// Transport and auth failures come back inside the [`Outcome`].
    ///
    /// # Errors
    ///
    /// Returns an error when the room or request is unknown.
    pub async fn execute(&self, room: &str, request: &str) -> AppResult<Outcome> {
        let target = self.request(room, request)?;
        debug!("Executing {}/{}", room, request);
        Ok(self.room(room)?.send(target).await)
    }

    /// Sends a configured request with its body rebuilt from the declared
    /// template and `payload`. The stored request is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error when a key is unknown, the request declares no
    /// template, or a template field is missing from `payload`.
    pub async fn dynamic_execute(
        &self,
        room: &str,
        request: &str,
        payload: &DynamicPayload,
    ) -> AppResult<Outcome> {
        let mut call = self.request(room, request)?.clone();
        let template = self
            .templates
            .get(room)
            .and_then(|templates| templates.get(request))
            .filter(|template| !template.is_empty())
            .ok_or_else(|| DynamicFieldError::MissingTemplate {
                room: room.to_owned(),
                request: request.to_owned(),
            })?;
        call.set_body(template.render(payload)?);
        debug!("Executing {}/{} with dynamic body", room, request);
        Ok(self.room(room)?.send(&call).await)
    }

    /// # Errors
    ///
    /// Returns an error when the room or request is unknown.
    pub fn put_body_encoder<B>(&mut self, room: &str, request: &str, encoder: B) -> AppResult<&mut Self>
    where
        B: BodyEncoder + 'static,
    {
        self.request_mut(room, request)?.set_body(Arc::new(encoder));
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns an error when the room or request is unknown.
    pub fn put_query(&mut self, room: &str, request: &str, query: Query) -> AppResult<&mut Self> {
        self.request_mut(room, request)?.set_query(query);
        Ok(self)
    }

    /// Shapes future responses of the request through `T`.
    ///
    /// # Errors
    ///
    /// Returns an error when the room or request is unknown.
    pub fn put_dto<T>(&mut self, room: &str, request: &str) -> AppResult<&mut Self>
    where
        T: DeserializeOwned + Serialize + 'static,
    {
        self.request_mut(room, request)?
            .set_dto(Arc::new(TypedDto::<T>::new()));
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns an error when the room is unknown.
    pub fn put_auth_strategy<S>(&mut self, room: &str, strategy: S) -> AppResult<&mut Self>
    where
        S: AuthStrategy + 'static,
    {
        self.room_mut(room)?.set_auth(Arc::new(strategy));
        Ok(self)
    }

    /// Sets a request-level header, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when a key is unknown or the header is invalid.
    pub fn put_header(
        &mut self,
        room: &str,
        request: &str,
        name: &str,
        value: &str,
    ) -> AppResult<&mut Self> {
        let (header_name, header_value) =
            warmup::header_pair(name, value).ok_or_else(|| ConfigError::InvalidHeader {
                room: room.to_owned(),
                name: name.to_owned(),
            })?;
        self.request_mut(room, request)?
            .headers_mut()
            .insert(header_name, header_value);
        Ok(self)
    }

    /// Wall time of the most recent concurrent fan-out.
    #[must_use]
    pub fn elapsed_time(&self) -> Duration {
        Duration::from_nanos(self.last_fan_out_nanos.load(Ordering::Relaxed))
    }

    fn record_elapsed(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.last_fan_out_nanos.store(nanos, Ordering::Relaxed);
    }

    fn room_mut(&mut self, room: &str) -> AppResult<&mut Room> {
        self.rooms.get_mut(room).ok_or_else(|| {
            AppError::config(ConfigError::UnknownRoom {
                room: room.to_owned(),
            })
        })
    }

    fn request_mut(&mut self, room: &str, request: &str) -> AppResult<&mut Request> {
        self.room_mut(room)?.request_mut(request).ok_or_else(|| {
            AppError::config(ConfigError::UnknownRequest {
                room: room.to_owned(),
                request: request.to_owned(),
            })
        })
    }
}
