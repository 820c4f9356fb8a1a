use tokio::net::TcpListener;

use crate::connection::Connection;
use crate::error::ChatResult;
use crate::registry::ClientRegistry;
use crate::session;

/// Accept connections forever, spawning one session task per client so
/// a slow handshake never blocks acceptance of the next connection.
///
/// There is no shutdown signal and no accept backoff: a transient
/// accept failure is logged and the loop keeps going.
pub async fn run(listener: TcpListener, registry: ClientRegistry) -> ChatResult<()> {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                tracing::debug!(%addr, "accepted connection");
                let connection = Connection::from_stream(stream);
                tokio::spawn(session::handle_client(registry.clone(), connection));
            }
            Err(e) => {
                tracing::warn!("accept failed: {e}");
            }
        }
    }
}
