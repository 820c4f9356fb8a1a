use tokio::net::TcpListener;

use broadcast_chat_service::{
    config::Config, error::ChatError, logging, registry::ClientRegistry, server,
};

#[tokio::main]
async fn main() -> Result<(), ChatError> {
    logging::init_tracing();

    let config = Config::from_env()?;
    let registry = ClientRegistry::new();

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .map_err(|e| ChatError::StartServer(format!("bind {}: {e}", config.bind_addr())))?;
    tracing::info!("chat server listening on {}", config.bind_addr());

    server::run(listener, registry).await
}
