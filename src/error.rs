use thiserror::Error;

pub type ChatResult<T> = Result<T, ChatError>;

/// Service-wide error type.
///
/// Transport-level causes are flattened into strings at the point they
/// are wrapped; inside a session every variant means the same thing
/// ("this session is over"), so nothing downstream needs the original
/// error value.
#[derive(Debug, Error, Clone)]
pub enum ChatError {
    #[error("failed to establish connection: {0}")]
    Connect(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("error while disconnecting: {0}")]
    Disconnect(String),

    #[error("i/o failure: {0}")]
    Io(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),
}
