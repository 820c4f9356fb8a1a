use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::error::{ChatError, ChatResult};

/// Line-oriented wrapper over a duplex TCP stream.
///
/// Bundles the read and write halves together so callers never juggle
/// them separately, and exposes newline-delimited UTF-8 send/receive.
/// Carries no chat semantics.
///
/// Both halves exist exactly while the transport is attached; they are
/// taken and dropped together on `disconnect`, which closes the socket.
/// Dropping the whole value closes it as well. After `disconnect` the
/// value is back in the unconnected state and may `connect` again.
pub struct Connection {
    reader: Mutex<Option<BufReader<OwnedReadHalf>>>,
    writer: Mutex<Option<OwnedWriteHalf>>,
    open: AtomicBool,
}

impl Connection {
    /// Create an unconnected instance; use [`Connection::connect`] to
    /// attach a transport later.
    pub fn new() -> Self {
        Self {
            reader: Mutex::new(None),
            writer: Mutex::new(None),
            open: AtomicBool::new(false),
        }
    }

    /// Wrap an already-connected stream, e.g. one returned by
    /// `TcpListener::accept`.
    pub fn from_stream(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: Mutex::new(Some(BufReader::new(read_half))),
            writer: Mutex::new(Some(write_half)),
            open: AtomicBool::new(true),
        }
    }

    /// Establish a transport to `host:port` and attach the line streams.
    ///
    /// Every transport failure surfaces as [`ChatError::Connect`]; the
    /// underlying cause is flattened into the message.
    pub async fn connect(&self, host: &str, port: u16) -> ChatResult<()> {
        if self.is_connected() {
            return Err(ChatError::Connect("already connected".into()));
        }

        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| ChatError::Connect(e.to_string()))?;

        let (read_half, write_half) = stream.into_split();
        *self.reader.lock().await = Some(BufReader::new(read_half));
        *self.writer.lock().await = Some(write_half);
        self.open.store(true, Ordering::Release);
        Ok(())
    }

    /// Whether the transport is attached and no end-of-stream or I/O
    /// fault has been observed on it. Once a read or write sees the
    /// peer gone, this latches false until the next successful connect.
    pub fn is_connected(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Send one message, newline-terminated and flushed immediately.
    ///
    /// A payload containing embedded newlines is passed through as-is
    /// and will be read as multiple messages on the receiving side.
    pub async fn send(&self, message: &str) -> ChatResult<()> {
        let mut guard = self.writer.lock().await;
        let writer = match guard.as_mut() {
            Some(writer) if self.is_connected() => writer,
            _ => {
                return Err(ChatError::InvalidOperation(
                    "send on a connection that is not connected".into(),
                ))
            }
        };

        let result: std::io::Result<()> = async {
            writer.write_all(message.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await
        }
        .await;

        if let Err(e) = result {
            self.open.store(false, Ordering::Release);
            return Err(ChatError::Io(e.to_string()));
        }
        Ok(())
    }

    /// Read one message, blocking the calling task until a full line
    /// arrives. The line terminator (`\n` or `\r\n`) is stripped.
    ///
    /// End-of-stream yields `InvalidOperation("connection closed by
    /// remote host")`; that error is the sole peer-disconnect signal
    /// on the read path.
    pub async fn read_line(&self) -> ChatResult<String> {
        let mut guard = self.reader.lock().await;
        let reader = match guard.as_mut() {
            Some(reader) if self.is_connected() => reader,
            _ => {
                return Err(ChatError::InvalidOperation(
                    "read on a connection that is not connected".into(),
                ))
            }
        };

        let mut line = String::new();
        let read = reader.read_line(&mut line).await.map_err(|e| {
            self.open.store(false, Ordering::Release);
            ChatError::Io(e.to_string())
        })?;

        if read == 0 {
            self.open.store(false, Ordering::Release);
            return Err(ChatError::InvalidOperation(
                "connection closed by remote host".into(),
            ));
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    /// Tear down the transport: shut down the write side, then drop
    /// both halves, which closes the socket. Idempotent; teardown
    /// faults wrap to [`ChatError::Disconnect`].
    pub async fn disconnect(&self) -> ChatResult<()> {
        self.open.store(false, Ordering::Release);
        let writer = self.writer.lock().await.take();
        let reader = self.reader.lock().await.take();

        if let Some(mut writer) = writer {
            writer
                .shutdown()
                .await
                .map_err(|e| ChatError::Disconnect(e.to_string()))?;
        }
        drop(reader);
        Ok(())
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}
