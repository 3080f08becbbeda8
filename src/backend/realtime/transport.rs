/**
 * Socket Transport
 *
 * One bounded outbox per live session. Producers push with `try_send` and
 * never wait on a client; each session's writer task drains its outbox onto
 * the WebSocket.
 */

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tokio::sync::mpsc;

use super::presence::SessionId;
use crate::shared::ServerEvent;

/// Why a push did not reach a session's outbox
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("session outbox is full")]
    Backpressure,

    #[error("session outbox is closed")]
    Closed,

    #[error("no outbox for session")]
    UnknownSession,
}

/// Push side of the transport
///
/// Implementations must not block; delivery is fire-and-forget.
pub trait EventSink: Send + Sync {
    fn push(&self, session_id: SessionId, event: &ServerEvent) -> Result<(), DeliveryError>;
}

type Outboxes = HashMap<SessionId, mpsc::Sender<ServerEvent>>;

/// Registry of session outboxes
#[derive(Clone, Debug)]
pub struct SocketHub {
    outboxes: Arc<RwLock<Outboxes>>,
    buffer: usize,
}

impl SocketHub {
    /// # Arguments
    /// * `buffer` - Outbox capacity per session
    pub fn new(buffer: usize) -> Self {
        Self {
            outboxes: Arc::new(RwLock::new(HashMap::new())),
            buffer: buffer.max(1),
        }
    }

    /// Open an outbox for a session
    ///
    /// # Returns
    /// The receiving end, consumed by the session's writer task
    pub fn register(&self, session_id: SessionId) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(self.buffer);
        self.write().insert(session_id, tx);
        rx
    }

    /// Close a session's outbox
    pub fn unregister(&self, session_id: SessionId) {
        self.write().remove(&session_id);
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the map half-updated.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Outboxes> {
        self.outboxes.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Outboxes> {
        self.outboxes.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventSink for SocketHub {
    fn push(&self, session_id: SessionId, event: &ServerEvent) -> Result<(), DeliveryError> {
        let outboxes = self.read();
        let tx = outboxes
            .get(&session_id)
            .ok_or(DeliveryError::UnknownSession)?;
        tx.try_send(event.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}
