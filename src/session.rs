use std::sync::Arc;

use crate::connection::Connection;
use crate::error::{ChatError, ChatResult};
use crate::registry::{ClientId, ClientRegistry};

/// Drive one client's session from first line to teardown.
///
/// Per-session state machine: read the username line, register, then
/// loop reading lines and broadcasting each one. Any error on any step
/// ends the session; the exit path deregisters (a no-op for sessions
/// that never got a username) and closes the connection.
pub async fn handle_client(registry: ClientRegistry, connection: Connection) {
    let connection = Arc::new(connection);
    let id = ClientId::new();

    if let Err(e) = run_session(&registry, &connection, id).await {
        tracing::debug!("session ended: {e}");
    }

    if let Some(username) = registry.deregister(id).await {
        tracing::info!("{username} disconnected");
    }
    if let Err(e) = connection.disconnect().await {
        tracing::debug!("teardown failure: {e}");
    }
}

async fn run_session(
    registry: &ClientRegistry,
    connection: &Arc<Connection>,
    id: ClientId,
) -> ChatResult<()> {
    let username = connection.read_line().await?;
    if username.is_empty() {
        // An empty first line is indistinguishable from a client that
        // gave up before announcing itself; never register it.
        return Err(ChatError::InvalidOperation(
            "connection closed by remote host".into(),
        ));
    }

    registry
        .register(id, Arc::clone(connection), username.clone())
        .await;
    tracing::info!("{username} joined");

    loop {
        let line = connection.read_line().await?;
        let delivered = registry.broadcast(&username, &line).await;
        tracing::debug!(delivered, "broadcast from {username}");
    }
}
