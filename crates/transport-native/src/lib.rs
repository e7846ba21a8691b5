//! # Native Transport
//!
//! TCP implementation of `core_types::Transport`. Serial ports are reached
//! through a serial-to-TCP bridge (ser2net, socat, a terminal server), and the
//! CTD simulator listens on TCP directly.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

use core_types::{Transport, TransportError};
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

/// Size of the buffer handed to each socket read
pub const READ_CHUNK_SIZE: usize = 1024;

/// Byte-stream link over a TCP connection.
///
/// Read and write halves are locked independently, so a pending read does
/// not block writes.
pub struct TcpTransport {
    peer: String,
    reader: Mutex<OwnedReadHalf>,
    writer: Mutex<OwnedWriteHalf>,
    opened_at: Instant,
}

impl TcpTransport {
    /// Connect to `address` (`host:port`).
    pub async fn connect(address: &str) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(address).await.map_err(|e| {
            TransportError::ConnectionFailed(format!("{}: {}", address, e))
        })?;
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already connected stream (e.g. one accepted by a listener).
    pub fn from_stream(stream: TcpStream) -> Self {
        // Command lines are tiny; don't let Nagle hold them back
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("set_nodelay failed: {}", e);
        }
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "<unknown>".to_string());
        let (reader, writer) = stream.into_split();
        Self {
            peer,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            opened_at: Instant::now(),
        }
    }

    /// Remote address as text
    pub fn peer(&self) -> &str {
        &self.peer
    }

    fn elapsed_us(&self) -> u64 {
        u64::try_from(self.opened_at.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

impl Transport for TcpTransport {
    async fn read_chunk(&self) -> Result<(Vec<u8>, u64), TransportError> {
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        let n = self.reader.lock().await.read(&mut buf).await?;
        buf.truncate(n);
        Ok((buf, self.elapsed_us()))
    }

    async fn write(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(data).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.writer.get_mut().shutdown().await?;
        Ok(())
    }
}
