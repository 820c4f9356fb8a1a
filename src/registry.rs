use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::connection::Connection;

/// Unique identifier for a connected client.
///
/// Each accepted connection gets one when its session starts, so the
/// registry can key entries without hashing the connection itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

struct Entry {
    connection: Arc<Connection>,
    username: String,
}

/// Shared map from live client to username, the single source of truth
/// for who receives the next broadcast.
///
/// Register, deregister, and fan-out all serialize behind the one lock:
/// no broadcast ever observes a partially applied insert or remove, and
/// a client becomes visible to broadcasts the instant its insert lands.
/// The lock is held across the awaited sends, so a stalled recipient
/// stalls every other session's broadcast attempt.
#[derive(Default, Clone)]
pub struct ClientRegistry {
    inner: Arc<Mutex<HashMap<ClientId, Entry>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a client under the lock, making it eligible for every
    /// subsequent broadcast. The username never changes after this.
    pub async fn register(&self, id: ClientId, connection: Arc<Connection>, username: String) {
        let mut guard = self.inner.lock().await;
        guard.insert(
            id,
            Entry {
                connection,
                username,
            },
        );
        tracing::debug!(clients = guard.len(), "registered client");
    }

    /// Remove a client under the lock, returning its username if it was
    /// registered. Safe to call for sessions that never registered.
    pub async fn deregister(&self, id: ClientId) -> Option<String> {
        let mut guard = self.inner.lock().await;
        let removed = guard.remove(&id).map(|entry| entry.username);
        if removed.is_some() {
            tracing::debug!(clients = guard.len(), "deregistered client");
        }
        removed
    }

    /// Send `sender:body` to every registered client, the sender
    /// included, under one lock acquisition.
    ///
    /// A recipient whose send fails is removed from the registry and
    /// the fan-out continues; the failure never propagates to the
    /// sending session. Returns how many clients received the message.
    pub async fn broadcast(&self, sender: &str, body: &str) -> usize {
        let message = format!("{sender}:{body}");
        let mut guard = self.inner.lock().await;
        let total = guard.len();

        let mut dead = Vec::new();
        for (id, entry) in guard.iter() {
            if entry.connection.send(&message).await.is_err() {
                dead.push(*id);
            }
        }

        for id in &dead {
            if let Some(entry) = guard.remove(id) {
                tracing::debug!(username = %entry.username, "dropped unreachable client during fan-out");
            }
        }

        total - dead.len()
    }

    /// Current number of registered clients.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn connected_pair() -> (Connection, Connection) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let client = Connection::new();
        let (accepted, _) = tokio::join!(
            async { listener.accept().await.unwrap().0 },
            async { client.connect("127.0.0.1", port).await.unwrap() },
        );
        (Connection::from_stream(accepted), client)
    }

    #[tokio::test]
    async fn register_and_deregister_track_count() {
        let registry = ClientRegistry::new();
        let id = ClientId::new();

        registry
            .register(id, Arc::new(Connection::new()), "alice".into())
            .await;
        assert_eq!(registry.len().await, 1);

        assert_eq!(registry.deregister(id).await.as_deref(), Some("alice"));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn deregister_unknown_client_is_a_noop() {
        let registry = ClientRegistry::new();
        assert_eq!(registry.deregister(ClientId::new()).await, None);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_registered_client() {
        let registry = ClientRegistry::new();
        let (server_a, peer_a) = connected_pair().await;
        let (server_b, peer_b) = connected_pair().await;

        registry
            .register(ClientId::new(), Arc::new(server_a), "alice".into())
            .await;
        registry
            .register(ClientId::new(), Arc::new(server_b), "bob".into())
            .await;

        let delivered = registry.broadcast("alice", "hello").await;
        assert_eq!(delivered, 2);
        assert_eq!(peer_a.read_line().await.unwrap(), "alice:hello");
        assert_eq!(peer_b.read_line().await.unwrap(), "alice:hello");
    }

    #[tokio::test]
    async fn fan_out_drops_only_the_unreachable_recipient() {
        let registry = ClientRegistry::new();
        let (server_live, peer_live) = connected_pair().await;

        // Never connected, so its send fails immediately.
        registry
            .register(ClientId::new(), Arc::new(Connection::new()), "ghost".into())
            .await;
        registry
            .register(ClientId::new(), Arc::new(server_live), "bob".into())
            .await;

        let delivered = registry.broadcast("bob", "yo").await;
        assert_eq!(delivered, 1);
        assert_eq!(peer_live.read_line().await.unwrap(), "bob:yo");
        assert_eq!(registry.len().await, 1);
    }
}
