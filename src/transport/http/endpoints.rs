//! Axum handlers for the SSE front door
//!
//! - GET /sse: open a session, stream responses
//! - POST /messages/?session_id=<id>: side channel for inbound frames
//! - GET /health: liveness probe

use std::collections::HashMap;
use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::connection::run_session;
use super::error::Result;
use super::session::{SessionChannels, SessionError};
use super::AppState;

/// Interval between keep-alive comments on idle streams
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Query string of the side channel
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub session_id: Option<String>,
}

/// GET /sse
///
/// Opens a session and streams its frames. The first event announces the
/// side-channel URI.
pub async fn sse_connect(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let channels = state.sessions.accept(client_metadata(&headers))?;

    let SessionChannels {
        session,
        inbound,
        outbound,
        stream,
    } = channels;

    tracing::info!(
        session_id = %session.session_id,
        user_agent = session.client_metadata.get("user_agent").map(String::as_str),
        open_sessions = state.sessions.session_count(),
        "Accepted SSE connection"
    );

    tokio::spawn(run_session(
        state.server.clone(),
        state.sessions.clone(),
        session,
        inbound,
        outbound,
        state.shutdown.child_token(),
    ));

    let events = stream.map(|frame| Ok::<_, Infallible>(frame.into_event()));

    Ok(Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    ))
}

/// POST /messages/?session_id=<id>
///
/// Enqueues the raw body for the session loop; the response to it arrives on
/// the event stream.
pub async fn post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Result<StatusCode> {
    let session_id = parse_session_id(query.session_id.as_deref())?;

    state.sessions.post_message(session_id, body).await?;

    Ok(StatusCode::ACCEPTED)
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": state.server.service_name(),
    }))
}

/// Accepts both the simple (32 hex) and hyphenated UUID forms
fn parse_session_id(raw: Option<&str>) -> std::result::Result<Uuid, SessionError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SessionError::MissingSessionId)?;

    Uuid::parse_str(raw).map_err(|_| SessionError::InvalidSessionId)
}

fn client_metadata(headers: &HeaderMap) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    if let Some(user_agent) = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
    {
        metadata.insert("user_agent".to_string(), user_agent.to_string());
    }
    metadata
}
