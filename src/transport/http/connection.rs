//! Per-session read loop
//!
//! Reads frames posted through the side channel, dispatches requests
//! concurrently and writes one response per request onto the event stream.
//! Ends on server shutdown or when the client's stream goes away.
//!
//! At most [`MAX_IN_FLIGHT`] requests run at once per session. While the
//! limit is reached the loop stops reading, so further posts wait on the
//! inbound queue.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::error::HttpTransportError;
use super::handler::{handle_notification, handle_request};
use super::jsonrpc::{decode_frame, InboundFrame, JsonRpcRequest, JsonRpcResponse};
use super::session::{Session, SessionStore};
use super::stream::{endpoint_path, OutboundFrame};
use crate::mcp::CryptoServer;

/// Concurrent dispatches per session
pub const MAX_IN_FLIGHT: usize = 16;

/// Drives one session from Connecting to Closed
pub async fn run_session(
    server: CryptoServer,
    store: SessionStore,
    session: Arc<Session>,
    mut inbound: mpsc::Receiver<String>,
    outbound: mpsc::Sender<OutboundFrame>,
    shutdown: CancellationToken,
) {
    let session_id = session.session_id;
    let disconnected = session.disconnected().clone();
    let mut in_flight: JoinSet<()> = JoinSet::new();

    session.mark_active();
    tracing::info!(session_id = %session_id, "Session active");

    if outbound
        .send(OutboundFrame::Endpoint(endpoint_path(session_id)))
        .await
        .is_err()
    {
        tracing::debug!(session_id = %session_id, "Client left before endpoint event");
        disconnected.cancel();
    }

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!(session_id = %session_id, "Server shutting down, closing session");
                break;
            }
            _ = disconnected.cancelled() => {
                tracing::info!(session_id = %session_id, "Client disconnected");
                break;
            }
            frame = inbound.recv(), if in_flight.len() < MAX_IN_FLIGHT => {
                let Some(raw) = frame else {
                    break;
                };

                match decode_frame(&raw) {
                    Ok(InboundFrame::Request(request)) => {
                        in_flight.spawn(dispatch(
                            server.clone(),
                            session.clone(),
                            request,
                            outbound.clone(),
                        ));
                    }
                    Ok(InboundFrame::Notification(notification)) => {
                        handle_notification(&session, &notification);
                    }
                    Ok(InboundFrame::Response(response)) => {
                        let id = response.get("id").cloned().unwrap_or(Value::Null);
                        tracing::debug!(
                            session_id = %session_id,
                            id = %id,
                            "Ignoring client response"
                        );
                    }
                    Err(error_response) => {
                        tracing::warn!(session_id = %session_id, "Rejected malformed frame");
                        in_flight.spawn(deliver(session_id, outbound.clone(), error_response));
                    }
                }
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(err) = joined {
                    if !err.is_cancelled() {
                        tracing::error!(session_id = %session_id, error = %err, "Dispatch task failed");
                    }
                }
            }
        }
    }

    session.begin_close();
    in_flight.shutdown().await;
    store.remove_session(session_id);

    if session.finish_close() {
        let lifetime = chrono::Utc::now() - session.created_at;
        tracing::info!(
            session_id = %session_id,
            lifetime_ms = lifetime.num_milliseconds(),
            remaining = store.session_count(),
            "Session closed"
        );
    }
}

/// Runs one request and writes its response.
///
/// A panic in the handler still answers the request with `-32603`.
async fn dispatch(
    server: CryptoServer,
    session: Arc<Session>,
    request: JsonRpcRequest,
    outbound: mpsc::Sender<OutboundFrame>,
) {
    let id = request.id.clone().unwrap_or(Value::Null);
    let method = request.method.clone();

    let response = match AssertUnwindSafe(handle_request(&server, &session, request))
        .catch_unwind()
        .await
    {
        Ok(response) => response,
        Err(_) => {
            tracing::error!(
                session_id = %session.session_id,
                method = %method,
                "Request handler panicked"
            );
            let error = HttpTransportError::Internal("request handler panicked".to_string());
            JsonRpcResponse::error(error.to_jsonrpc_error(), id)
        }
    };

    deliver(session.session_id, outbound, response).await;
}

async fn deliver(
    session_id: uuid::Uuid,
    outbound: mpsc::Sender<OutboundFrame>,
    response: JsonRpcResponse,
) {
    if outbound.send(OutboundFrame::Message(response)).await.is_err() {
        tracing::debug!(session_id = %session_id, "Event stream gone, response dropped");
    }
}
