use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Not connected")]
    NotConnected,
    #[error("Other: {0}")]
    Other(String),
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Io(e.to_string())
    }
}

/// A generic async byte-stream link to the device (TCP serial bridge, PTY, ...).
///
/// Uses native `async fn` in traits, so implementations are used through
/// concrete types rather than `Box<dyn Transport>`.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    /// Read a chunk of bytes.
    /// Returns (data, timestamp in microseconds since the link opened).
    /// An empty chunk means the peer closed the link.
    async fn read_chunk(&self) -> Result<(Vec<u8>, u64), TransportError>;

    /// Write bytes to the transport.
    async fn write(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Close the connection.
    async fn close(&mut self) -> Result<(), TransportError>;
}
