//! Outbound half of a session: frames written onto the client's event stream

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::response::sse::Event;
use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};
use uuid::Uuid;

use super::jsonrpc::JsonRpcResponse;

/// Side-channel URI announced in a session's `endpoint` event
pub fn endpoint_path(session_id: Uuid) -> String {
    format!("/messages/?session_id={}", session_id.simple())
}

/// One server-to-client frame
#[derive(Debug, Clone)]
pub enum OutboundFrame {
    /// First event of every stream: where to POST inbound frames
    Endpoint(String),

    /// A JSON-RPC response
    Message(JsonRpcResponse),
}

impl OutboundFrame {
    /// SSE event carrying this frame
    pub fn into_event(self) -> Event {
        match self {
            OutboundFrame::Endpoint(uri) => Event::default().event("endpoint").data(uri),
            OutboundFrame::Message(response) => match Event::default()
                .event("message")
                .json_data(&response)
            {
                Ok(event) => event,
                Err(err) => {
                    tracing::error!("Failed to serialize outbound frame: {}", err);
                    Event::default().comment("dropped unserializable frame")
                }
            },
        }
    }
}

/// Event stream of one session.
///
/// Dropping it (client disconnect, response aborted) cancels the session's
/// disconnect token so the session loop tears down.
pub struct SessionStream {
    frames: ReceiverStream<OutboundFrame>,
    _disconnect: DropGuard,
}

impl SessionStream {
    pub(crate) fn new(
        frames: mpsc::Receiver<OutboundFrame>,
        disconnected: CancellationToken,
    ) -> Self {
        Self {
            frames: ReceiverStream::new(frames),
            _disconnect: disconnected.drop_guard(),
        }
    }
}

impl Stream for SessionStream {
    type Item = OutboundFrame;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.frames).poll_next(cx)
    }
}
