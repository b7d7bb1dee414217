//! SSE session management for MCP transport
//!
//! Manages one session per open event stream with:
//! - Concurrent session limit
//! - UUID-based session identification
//! - Lifecycle tracking (Connecting → Active → Closing → Closed)
//! - Inbound frame queue fed by the POST side channel

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::jsonrpc::InitializeParams;
use super::stream::{OutboundFrame, SessionStream};

/// Inbound frames buffered per session before the POST endpoint waits
const INBOUND_CAPACITY: usize = 64;

/// Outbound frames buffered per session before dispatches wait on the client
const OUTBOUND_CAPACITY: usize = 64;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Registered, stream loop not started yet
    Connecting,
    /// Stream loop running
    Active,
    /// Teardown started
    Closing,
    /// Deregistered, all resources released
    Closed,
}

/// One connected client
#[derive(Debug)]
pub struct Session {
    /// Unique session identifier (UUID v4)
    pub session_id: Uuid,

    /// Client metadata (User-Agent, etc.)
    pub client_metadata: HashMap<String, String>,

    /// Session creation timestamp
    pub created_at: DateTime<Utc>,

    state: Mutex<SessionState>,

    /// Options negotiated by `initialize`
    options: RwLock<Option<InitializeParams>>,

    inbound: mpsc::Sender<String>,

    /// Cancelled when the client's event stream is dropped
    disconnected: CancellationToken,
}

impl Session {
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, from: &[SessionState], to: SessionState) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if from.contains(&*state) {
            *state = to;
            true
        } else {
            false
        }
    }

    /// Connecting → Active
    pub fn mark_active(&self) -> bool {
        self.transition(&[SessionState::Connecting], SessionState::Active)
    }

    /// Connecting/Active → Closing; false if teardown already started
    pub fn begin_close(&self) -> bool {
        self.transition(
            &[SessionState::Connecting, SessionState::Active],
            SessionState::Closing,
        )
    }

    /// Closing → Closed; true exactly once per session
    pub fn finish_close(&self) -> bool {
        self.transition(&[SessionState::Closing], SessionState::Closed)
    }

    /// Whether the session still accepts inbound frames
    pub fn is_open(&self) -> bool {
        matches!(
            self.state(),
            SessionState::Connecting | SessionState::Active
        )
    }

    pub fn record_initialize(&self, params: InitializeParams) {
        *self.options.write().unwrap_or_else(PoisonError::into_inner) = Some(params);
    }

    pub fn initialize_options(&self) -> Option<InitializeParams> {
        self.options
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Token cancelled when the client's event stream goes away
    pub fn disconnected(&self) -> &CancellationToken {
        &self.disconnected
    }
}

/// Everything the session loop owns for one accepted connection
pub struct SessionChannels {
    pub session: Arc<Session>,

    /// Frames posted through the side channel
    pub inbound: mpsc::Receiver<String>,

    /// Frames to write onto the client's event stream
    pub outbound: mpsc::Sender<OutboundFrame>,

    /// Event stream handed to the HTTP response
    pub stream: SessionStream,
}

/// Thread-safe session store
#[derive(Clone)]
pub struct SessionStore {
    /// Open sessions keyed by session ID
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Session>>>>,

    /// Maximum concurrent sessions (default: 50)
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions,
        }
    }

    /// Creates and registers a session for a newly opened event stream
    ///
    /// # Errors
    /// - `SessionLimitExceeded` if max_sessions reached
    pub fn accept(
        &self,
        client_metadata: HashMap<String, String>,
    ) -> Result<SessionChannels, SessionError> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if sessions.len() >= self.max_sessions {
            return Err(SessionError::SessionLimitExceeded(self.max_sessions));
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let disconnected = CancellationToken::new();

        let session = Arc::new(Session {
            session_id: Uuid::new_v4(),
            client_metadata,
            created_at: Utc::now(),
            state: Mutex::new(SessionState::Connecting),
            options: RwLock::new(None),
            inbound: inbound_tx,
            disconnected: disconnected.clone(),
        });

        sessions.insert(session.session_id, session.clone());

        Ok(SessionChannels {
            session,
            inbound: inbound_rx,
            outbound: outbound_tx,
            stream: SessionStream::new(outbound_rx, disconnected),
        })
    }

    /// Queues a raw frame for the session's read loop
    ///
    /// # Errors
    /// - `SessionNotFound` if the ID is unknown
    /// - `SessionClosed` if the session is tearing down
    pub async fn post_message(&self, session_id: Uuid, raw: String) -> Result<(), SessionError> {
        let session = self
            .get_session(session_id)
            .ok_or(SessionError::SessionNotFound(session_id))?;

        if !session.is_open() {
            return Err(SessionError::SessionClosed(session_id));
        }

        session
            .inbound
            .send(raw)
            .await
            .map_err(|_| SessionError::SessionClosed(session_id))
    }

    pub fn get_session(&self, session_id: Uuid) -> Option<Arc<Session>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&session_id)
            .cloned()
    }

    /// Deregisters a session; returns whether it was registered
    pub fn remove_session(&self, session_id: Uuid) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&session_id)
            .is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(50)
    }
}

/// Session-related errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Session closed: {0}")]
    SessionClosed(Uuid),

    #[error("Session limit exceeded: maximum {0} concurrent sessions")]
    SessionLimitExceeded(usize),

    #[error("session_id is required")]
    MissingSessionId,

    #[error("Invalid session ID format")]
    InvalidSessionId,
}
