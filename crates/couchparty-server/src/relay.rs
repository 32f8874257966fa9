use std::collections::BTreeMap;

use bytes::Bytes;
use tokio::sync::mpsc;

use couchparty_core::net::messages::ServerMessage;
use couchparty_core::net::protocol::encode_server_message;

/// Server-assigned connection id. A player's id is its connection id.
pub type ConnectionId = u64;

/// Outbound binary frames for one WebSocket. Bounded so a slow phone can't
/// grow memory; `Bytes` keeps broadcast clones cheap.
pub type ConnectionSender = mpsc::Sender<Bytes>;

/// Logical relay group of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    /// Connected but has not sent join or display-join yet.
    Unassigned,
    Players,
    Displays,
}

struct Connection {
    sender: ConnectionSender,
    group: Group,
}

/// Outbound routing table for every open connection.
#[derive(Default)]
pub struct Relay {
    connections: BTreeMap<ConnectionId, Connection>,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ConnectionId, sender: ConnectionSender) {
        self.connections.insert(
            id,
            Connection {
                sender,
                group: Group::Unassigned,
            },
        );
    }

    /// Forget a connection, returning the group it was in.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<Group> {
        self.connections.remove(&id).map(|c| c.group)
    }

    pub fn assign(&mut self, id: ConnectionId, group: Group) -> bool {
        match self.connections.get_mut(&id) {
            Some(conn) => {
                conn.group = group;
                true
            },
            None => false,
        }
    }

    pub fn group_of(&self, id: ConnectionId) -> Option<Group> {
        self.connections.get(&id).map(|c| c.group)
    }

    pub fn count(&self, group: Group) -> usize {
        self.connections.values().filter(|c| c.group == group).count()
    }

    /// Send to one connection. A target that is gone is dropped silently.
    pub fn send_to(&self, id: ConnectionId, data: Bytes) -> bool {
        let Some(conn) = self.connections.get(&id) else {
            tracing::debug!(connection_id = id, "Dropping message for unknown target");
            return false;
        };
        if let Err(e) = conn.sender.try_send(data) {
            tracing::debug!(
                connection_id = id, error = %e,
                "Failed to send to connection (slow or disconnected)"
            );
            return false;
        }
        true
    }

    pub fn broadcast_group(&self, group: Group, data: &Bytes) {
        for (&id, conn) in &self.connections {
            if conn.group == group
                && let Err(e) = conn.sender.try_send(data.clone())
            {
                tracing::debug!(
                    connection_id = id, ?group, error = %e,
                    "Skipping broadcast to slow connection"
                );
            }
        }
    }

    /// Broadcast to every player and display.
    pub fn broadcast_all(&self, data: &Bytes) {
        for (&id, conn) in &self.connections {
            if conn.group != Group::Unassigned
                && let Err(e) = conn.sender.try_send(data.clone())
            {
                tracing::debug!(
                    connection_id = id, error = %e,
                    "Skipping broadcast to slow connection"
                );
            }
        }
    }
}

/// Encode a server message for the relay. Encoding failures are logged and
/// yield `None`.
pub fn encode(msg: &ServerMessage) -> Option<Bytes> {
    match encode_server_message(msg) {
        Ok(data) => Some(Bytes::from(data)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode server message");
            None
        },
    }
}
