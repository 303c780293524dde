//! Connection management for WebSocket clients.
//!
//! Tracks connected clients and which player each one speaks for.

use std::collections::HashMap;

use iobj_domain::PlayerId;
use iobj_shared::ServerMessage;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Information about a connected client.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Unique ID for this connection
    pub connection_id: Uuid,
    /// Player this client identified as (if any)
    pub player_id: Option<PlayerId>,
}

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    /// Map of connection_id -> (ConnectionInfo, sender channel)
    connections: RwLock<HashMap<Uuid, (ConnectionInfo, mpsc::Sender<ServerMessage>)>>,
}

impl ConnectionManager {
    /// Create a new connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new, not yet identified connection.
    pub async fn register(&self, connection_id: Uuid, sender: mpsc::Sender<ServerMessage>) {
        let info = ConnectionInfo {
            connection_id,
            player_id: None,
        };
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, (info, sender));
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Unregister a connection.
    ///
    /// Returns the player whose last connection just closed, if any.
    pub async fn unregister(&self, connection_id: Uuid) -> Option<PlayerId> {
        let mut connections = self.connections.write().await;
        let (info, _) = connections.remove(&connection_id)?;
        tracing::debug!(connection_id = %connection_id, "Connection unregistered");

        let player_id = info.player_id?;
        let still_connected = connections
            .values()
            .any(|(other, _)| other.player_id.as_ref() == Some(&player_id));
        (!still_connected).then_some(player_id)
    }

    /// Get connection info by ID.
    pub async fn get(&self, connection_id: Uuid) -> Option<ConnectionInfo> {
        let connections = self.connections.read().await;
        connections.get(&connection_id).map(|(info, _)| info.clone())
    }

    /// Bind a connection to a player.
    pub async fn identify(
        &self,
        connection_id: Uuid,
        player_id: PlayerId,
    ) -> Result<(), ConnectionError> {
        let mut connections = self.connections.write().await;
        match connections.get_mut(&connection_id) {
            Some((info, _)) => {
                tracing::info!(
                    connection_id = %connection_id,
                    player_id = %player_id,
                    "Connection identified"
                );
                info.player_id = Some(player_id);
                Ok(())
            }
            None => Err(ConnectionError::NotFound),
        }
    }

    /// Whether any connection currently speaks for this player.
    pub async fn is_connected(&self, player_id: &PlayerId) -> bool {
        let connections = self.connections.read().await;
        connections
            .values()
            .any(|(info, _)| info.player_id.as_ref() == Some(player_id))
    }

    /// Send a message to every connection of a player.
    ///
    /// Returns how many connections accepted the message.
    pub async fn send_to_player(&self, player_id: &PlayerId, message: ServerMessage) -> usize {
        let connections = self.connections.read().await;
        let mut delivered = 0;
        for (info, sender) in connections.values() {
            if info.player_id.as_ref() == Some(player_id) {
                match sender.try_send(message.clone()) {
                    Ok(()) => delivered += 1,
                    Err(e) => tracing::warn!(
                        connection_id = %info.connection_id,
                        error = %e,
                        "Failed to send to player"
                    ),
                }
            }
        }
        delivered
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur during connection operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectionError {
    #[error("Connection not found")]
    NotFound,
}
