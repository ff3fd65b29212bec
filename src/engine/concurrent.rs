use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures_util::future::join_all;
use reqwest::header::HeaderMap;
use tracing::{debug, warn};

use crate::error::{AppError, TransportError};
use crate::http::{Outcome, Request, RequestEcho, Response};
use crate::room::Room;
use crate::shutdown::ShutdownSender;

use super::Engine;

/// One (room, request) pair selected for a fan-out.
struct Unit<'a> {
    room_key: &'a str,
    request_key: &'a str,
    room: &'a Room,
    request: &'a Request,
}

impl Engine {
    /// Sends every request tagged `tag` at once and waits for all of them.
    ///
    /// An empty `rooms` slice selects all rooms. Each room contributes at
    /// most one entry; with several matching requests the last in key order
    /// wins. Errors are logged, never returned.
    pub async fn execute_concurrent(&self, tag: &str, rooms: &[&str]) -> HashMap<String, Response> {
        self.fan_out(tag, rooms, None).await
    }

    /// Like [`Engine::execute_concurrent`], but units still in flight when
    /// `shutdown` fires resolve to a status-0 cancelled response.
    pub async fn execute_concurrent_until(
        &self,
        tag: &str,
        rooms: &[&str],
        shutdown: &ShutdownSender,
    ) -> HashMap<String, Response> {
        self.fan_out(tag, rooms, Some(shutdown)).await
    }

    async fn fan_out(
        &self,
        tag: &str,
        rooms: &[&str],
        shutdown: Option<&ShutdownSender>,
    ) -> HashMap<String, Response> {
        let started = Instant::now();
        let units = self.select_units(tag, rooms);
        debug!("Fan-out '{}' over {} unit(s)", tag, units.len());

        let sends = units.iter().map(|unit| {
            let mut receiver = shutdown.map(ShutdownSender::subscribe);
            async move {
                let Some(receiver) = receiver.as_mut() else {
                    return unit.room.send(unit.request).await;
                };
                tokio::select! {
                    outcome = unit.room.send(unit.request) => outcome,
                    _ = receiver.recv() => cancelled(unit, started.elapsed()),
                }
            }
        });
        let outcomes = join_all(sends).await;

        let mut results = HashMap::with_capacity(outcomes.len());
        for (unit, outcome) in units.iter().zip(outcomes) {
            let (response, error) = outcome.into_parts();
            if let Some(err) = error {
                warn!(
                    "Fan-out unit {}/{} failed: {}",
                    unit.room_key, unit.request_key, err
                );
            }
            results.insert(unit.room_key.to_owned(), response);
        }
        self.record_elapsed(started.elapsed());
        results
    }

    fn select_units<'a>(&'a self, tag: &str, rooms: &[&str]) -> Vec<Unit<'a>> {
        self.rooms
            .iter()
            .filter(|(room_key, _)| rooms.is_empty() || rooms.contains(&room_key.as_str()))
            .flat_map(|(room_key, room)| {
                room.requests()
                    .filter(move |(_, request)| request.concurrency_tag() == Some(tag))
                    .map(move |(request_key, request)| Unit {
                        room_key: room_key.as_str(),
                        request_key,
                        room,
                        request,
                    })
            })
            .collect()
    }
}

fn cancelled(unit: &Unit<'_>, elapsed: Duration) -> Outcome {
    let url = unit
        .room
        .connector()
        .resolve_url(unit.request.path(), unit.request.query())
        .map_or_else(|_err| unit.request.path().to_owned(), String::from);
    let echo = RequestEcho {
        method: unit.request.method(),
        url,
        headers: HeaderMap::new(),
        body: Bytes::new(),
    };
    let error = AppError::transport(TransportError::Cancelled);
    let response = Response::failed(echo, &error, elapsed);
    Outcome::failed(response, error)
}
