//! Open SSE connections, keyed by session id.

use super::jsonrpc::JsonRpcResponse;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub type ConnectionId = Uuid;

/// Outbound half of one SSE stream
#[derive(Debug)]
pub struct Connection {
    sender: UnboundedSender<JsonRpcResponse>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PushError {
    #[error("Unknown session: {0}")]
    UnknownSession(ConnectionId),
    #[error("Session closed: {0}")]
    Closed(ConnectionId),
}

/// Registry of live connections; an entry lives exactly as long as its
/// [`ConnectionGuard`]
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<Mutex<HashMap<ConnectionId, Connection>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, Connection>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new connection and hand back its guard and message stream
    pub fn open(&self) -> (ConnectionGuard, UnboundedReceiver<JsonRpcResponse>) {
        let id = Uuid::new_v4();
        let (sender, receiver) = mpsc::unbounded();
        self.lock().insert(id, Connection { sender });
        debug!("Opened SSE connection {}", id);

        let guard = ConnectionGuard {
            id,
            registry: self.clone(),
        };
        (guard, receiver)
    }

    /// Push a response to a connection; a connection whose stream is gone is dropped
    pub fn push(&self, id: ConnectionId, message: JsonRpcResponse) -> Result<(), PushError> {
        let mut connections = self.lock();
        let connection = connections.get(&id).ok_or(PushError::UnknownSession(id))?;

        if connection.sender.unbounded_send(message).is_err() {
            connections.remove(&id);
            debug!("Dropped closed SSE connection {}", id);
            return Err(PushError::Closed(id));
        }
        Ok(())
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn remove(&self, id: ConnectionId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            debug!("Closed SSE connection {}", id);
        }
        removed
    }

    /// Drop every sender so that all open streams end
    pub fn close_all(&self) {
        let mut connections = self.lock();
        debug!("Closing {} SSE connections", connections.len());
        connections.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Removes its connection from the registry when dropped
#[derive(Debug)]
pub struct ConnectionGuard {
    id: ConnectionId,
    registry: ConnectionRegistry,
}

impl ConnectionGuard {
    pub const fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}
