use actor_protocol::{LinkStatus, SystemEvent};
use actor_runtime::{actor_debug, actor_info, actor_warn, DriverMessage, LinkId, PortMessage};
use core_types::Transport;
use framing::{Framer, LineFramer};
use futures::{SinkExt, StreamExt};
use futures_channel::mpsc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use transport_native::TcpTransport;

use crate::backoff::calculate_retry_delay;
use crate::constants::link;

/// Where and how persistently to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// `host:port` of the serial bridge or simulator
    pub address: String,
    /// Cap of the exponential reconnect delay
    pub max_retry_delay_ms: u64,
    /// Consecutive failed connects before giving up; 0 retries forever
    pub max_attempts: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            address: link::DEFAULT_ADDRESS.to_string(),
            max_retry_delay_ms: link::MAX_RETRY_DELAY_MS,
            max_attempts: link::MAX_CONNECT_ATTEMPTS,
        }
    }
}

/// What ended a connected session
enum LinkEnd {
    /// Peer closed or I/O failed; reconnect
    Lost,
    /// Shutdown, inbox closed or driver gone; stop
    Stop,
}

/// PortActor owns the link to the device
///
/// Responsibilities:
/// - Connect (and reconnect with backoff) to the configured address
/// - Report `LinkOpened` / `LinkClosed` to the driver
/// - Split inbound bytes into lines and forward them to the driver
/// - Write outbound command lines tagged with the current link; writes for
///   an earlier link are dropped
///
/// Unlike the other actors it multiplexes its inbox with socket reads, so it
/// has its own run loop instead of `Actor::run`.
pub struct PortActor {
    config: LinkConfig,
    driver_tx: mpsc::Sender<DriverMessage>,
    event_tx: mpsc::Sender<SystemEvent>,
    shutdown: CancellationToken,
}

impl PortActor {
    pub fn new(
        config: LinkConfig,
        driver_tx: mpsc::Sender<DriverMessage>,
        event_tx: mpsc::Sender<SystemEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            driver_tx,
            event_tx,
            shutdown,
        }
    }

    /// Run until shutdown, the inbox closing, or `max_attempts` consecutive
    /// connect failures.
    ///
    /// Each connection gets the next `LinkId`, starting at 1.
    pub async fn run(mut self, mut rx: mpsc::Receiver<PortMessage>) {
        let shutdown = self.shutdown.clone();
        let mut attempt: u32 = 0;
        let mut link_id: LinkId = 0;

        actor_debug!("PortActor started");

        loop {
            let connected = tokio::select! {
                _ = shutdown.cancelled() => break,
                result = TcpTransport::connect(&self.config.address) => result,
            };

            match connected {
                Ok(transport) => {
                    attempt = 0;
                    link_id += 1;
                    actor_info!("Link {} opened to {}", link_id, transport.peer());
                    self.publish(SystemEvent::StatusUpdate {
                        message: format!("Connected to {}", transport.peer()),
                    });

                    if let LinkEnd::Stop = self.serve(transport, link_id, &mut rx).await {
                        break;
                    }
                }
                Err(e) => {
                    attempt = attempt.saturating_add(1);
                    actor_warn!(
                        "Failed to open link to {} (attempt {}): {}",
                        self.config.address,
                        attempt,
                        e
                    );
                    if self.config.max_attempts > 0 && attempt >= self.config.max_attempts {
                        self.publish(SystemEvent::Error {
                            message: format!(
                                "Giving up on {} after {} attempts: {}",
                                self.config.address, attempt, e
                            ),
                        });
                        break;
                    }
                }
            }

            let delay = calculate_retry_delay(attempt.max(1), self.config.max_retry_delay_ms);
            actor_debug!("PortActor: reconnecting in {}ms", delay);
            if !self.wait_before_retry(&mut rx, Duration::from_millis(delay)).await {
                break;
            }
        }

        actor_debug!("PortActor stopped");
    }

    /// One connected session. Always reports `LinkClosed` before returning.
    async fn serve(
        &mut self,
        mut transport: TcpTransport,
        link_id: LinkId,
        rx: &mut mpsc::Receiver<PortMessage>,
    ) -> LinkEnd {
        let shutdown = self.shutdown.clone();
        let mut framer = LineFramer::new();

        let opened = DriverMessage::Link {
            status: LinkStatus::LinkOpened,
            link_id,
        };
        if !self.forward(opened).await {
            return LinkEnd::Stop;
        }

        let end = loop {
            tokio::select! {
                _ = shutdown.cancelled() => break LinkEnd::Stop,
                msg = rx.next() => match msg {
                    Some(PortMessage::Write { link_id: target, data }) if target != link_id => {
                        actor_debug!(
                            "PortActor: dropped {} byte write for link {}, now on link {}",
                            data.len(),
                            target,
                            link_id
                        );
                    }
                    Some(PortMessage::Write { data, .. }) => {
                        if let Err(e) = transport.write(&data).await {
                            actor_warn!("Write to {} failed: {}", transport.peer(), e);
                            break LinkEnd::Lost;
                        }
                    }
                    None => break LinkEnd::Stop,
                },
                chunk = transport.read_chunk() => match chunk {
                    Ok((bytes, _)) if bytes.is_empty() => {
                        actor_info!("Link closed by {}", transport.peer());
                        break LinkEnd::Lost;
                    }
                    Ok((bytes, timestamp_us)) => {
                        let mut driver_gone = false;
                        for frame in framer.push(&bytes, timestamp_us) {
                            if !self.forward(DriverMessage::Line(frame.text())).await {
                                driver_gone = true;
                                break;
                            }
                        }
                        if driver_gone {
                            break LinkEnd::Stop;
                        }
                    }
                    Err(e) => {
                        actor_warn!("Read from {} failed: {}", transport.peer(), e);
                        break LinkEnd::Lost;
                    }
                },
            }
        };

        if let Err(e) = transport.close().await {
            actor_debug!("PortActor: close failed: {}", e);
        }
        self.forward(DriverMessage::Link {
            status: LinkStatus::LinkClosed,
            link_id,
        })
        .await;
        self.publish(SystemEvent::StatusUpdate {
            message: format!("Disconnected from {}", transport.peer()),
        });

        end
    }

    /// Sleep before the next connect attempt while still honoring shutdown.
    /// Every write arriving meanwhile is for a link that is gone. Returns
    /// false if the actor should stop.
    async fn wait_before_retry(
        &self,
        rx: &mut mpsc::Receiver<PortMessage>,
        delay: Duration,
    ) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return false,
                _ = &mut sleep => return true,
                msg = rx.next() => match msg {
                    Some(PortMessage::Write { link_id, data }) => {
                        actor_debug!(
                            "PortActor: link down, dropped {} byte write for link {}",
                            data.len(),
                            link_id
                        );
                    }
                    None => return false,
                },
            }
        }
    }

    /// Deliver to the driver, waiting for space. False if the driver is gone.
    async fn forward(&mut self, msg: DriverMessage) -> bool {
        match self.driver_tx.send(msg).await {
            Ok(()) => true,
            Err(_) => {
                actor_warn!("PortActor: DriverActor has shut down");
                false
            }
        }
    }

    fn publish(&mut self, event: SystemEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            actor_warn!("PortActor: event dropped: {}", e);
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const TEST_TIMEOUT: Duration = Duration::from_secs(10);

    struct Harness {
        driver_rx: mpsc::Receiver<DriverMessage>,
        event_rx: mpsc::Receiver<SystemEvent>,
        port_tx: mpsc::Sender<PortMessage>,
        token: CancellationToken,
    }

    fn actor(config: LinkConfig) -> (PortActor, mpsc::Receiver<PortMessage>, Harness) {
        let (driver_tx, driver_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(16);
        let (port_tx, port_rx) = mpsc::channel(16);
        let token = CancellationToken::new();
        let actor = PortActor::new(config, driver_tx, event_tx, token.clone());
        (
            actor,
            port_rx,
            Harness {
                driver_rx,
                event_rx,
                port_tx,
                token,
            },
        )
    }

    fn link_msg(status: LinkStatus, link_id: LinkId) -> DriverMessage {
        DriverMessage::Link { status, link_id }
    }

    fn config_for(address: String) -> LinkConfig {
        LinkConfig {
            address,
            max_retry_delay_ms: 50,
            max_attempts: 0,
        }
    }

    #[tokio::test]
    async fn test_lines_writes_and_link_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let (port_actor, port_rx, mut h) = actor(config_for(address));

        let device = async {
            let (stream, _) = listener.accept().await.unwrap();
            let device = TcpTransport::from_stream(stream);

            assert_eq!(h.driver_rx.next().await, Some(link_msg(LinkStatus::LinkOpened, 1)));

            // Blank line dropped, partial line held back
            device.write(b"$ZCACK,START\r\n\r\n$ZCA").await.unwrap();
            assert_eq!(
                h.driver_rx.next().await,
                Some(DriverMessage::Line("$ZCACK,START".into()))
            );

            h.port_tx
                .send(PortMessage::Write {
                    link_id: 1,
                    data: b"$ZCCMD,STOP*67\r\n".to_vec(),
                })
                .await
                .unwrap();
            let mut received = Vec::new();
            while received.len() < 16 {
                let (chunk, _) = device.read_chunk().await.unwrap();
                assert!(!chunk.is_empty());
                received.extend_from_slice(&chunk);
            }
            assert_eq!(received, b"$ZCCMD,STOP*67\r\n");

            drop(device);
            assert_eq!(h.driver_rx.next().await, Some(link_msg(LinkStatus::LinkClosed, 1)));

            h.token.cancel();
        };

        tokio::time::timeout(TEST_TIMEOUT, async {
            tokio::join!(port_actor.run(port_rx), device);
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_closed_inbox_stops_actor() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let (port_actor, port_rx, h) = actor(config_for(address));
        let Harness {
            mut driver_rx,
            port_tx,
            token,
            ..
        } = h;

        let device = async {
            let (_stream, _) = listener.accept().await.unwrap();
            assert_eq!(driver_rx.next().await, Some(link_msg(LinkStatus::LinkOpened, 1)));
            drop(port_tx);
            assert_eq!(driver_rx.next().await, Some(link_msg(LinkStatus::LinkClosed, 1)));
        };

        // run() returns without the token being cancelled
        tokio::time::timeout(TEST_TIMEOUT, async {
            tokio::join!(port_actor.run(port_rx), device);
        })
        .await
        .unwrap();
        assert!(!token.is_cancelled());
    }

    async fn read_exactly(device: &TcpTransport, len: usize) -> Vec<u8> {
        let mut received = Vec::new();
        while received.len() < len {
            let (chunk, _) = device.read_chunk().await.unwrap();
            assert!(!chunk.is_empty(), "link closed early");
            received.extend_from_slice(&chunk);
        }
        received
    }

    #[tokio::test]
    async fn test_writes_for_earlier_link_are_dropped() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let (port_actor, port_rx, mut h) = actor(config_for(address));

        let write = |link_id: LinkId, line: &str| PortMessage::Write {
            link_id,
            data: format!("{}\r\n", line).into_bytes(),
        };

        let device = async {
            let (stream, _) = listener.accept().await.unwrap();
            let first = TcpTransport::from_stream(stream);
            assert_eq!(h.driver_rx.next().await, Some(link_msg(LinkStatus::LinkOpened, 1)));
            drop(first);
            assert_eq!(h.driver_rx.next().await, Some(link_msg(LinkStatus::LinkClosed, 1)));

            // SLEEP of the finished session, sent after its link went down
            h.port_tx.send(write(1, "$ZCCMD,SLEEP*30")).await.unwrap();

            let (stream, _) = listener.accept().await.unwrap();
            let second = TcpTransport::from_stream(stream);
            assert_eq!(h.driver_rx.next().await, Some(link_msg(LinkStatus::LinkOpened, 2)));

            h.port_tx.send(write(1, "$ZCCMD,STOP*67")).await.unwrap();
            h.port_tx.send(write(2, "$ZCCMD,START*3F")).await.unwrap();
            assert_eq!(read_exactly(&second, 17).await, b"$ZCCMD,START*3F\r\n");

            h.token.cancel();
        };

        tokio::time::timeout(TEST_TIMEOUT, async {
            tokio::join!(port_actor.run(port_rx), device);
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let mut config = config_for(address);
        config.max_attempts = 2;
        config.max_retry_delay_ms = 10;
        let (port_actor, port_rx, mut h) = actor(config);

        tokio::time::timeout(TEST_TIMEOUT, port_actor.run(port_rx))
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Ok(Some(event)) = h.event_rx.try_next() {
            events.push(event);
        }
        assert!(events
            .iter()
            .any(|e| matches!(e, SystemEvent::Error { message } if message.contains("2 attempts"))));
        assert!(
            !matches!(h.driver_rx.try_next(), Ok(Some(_))),
            "no link status expected"
        );
    }

    #[tokio::test]
    async fn test_shutdown_while_retrying() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let mut config = config_for(address);
        config.max_retry_delay_ms = 60_000;
        let (port_actor, port_rx, h) = actor(config);

        let cancel = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            h.token.cancel();
        };

        tokio::time::timeout(TEST_TIMEOUT, async {
            tokio::join!(port_actor.run(port_rx), cancel);
        })
        .await
        .unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = LinkConfig::default();
        assert_eq!(config.address, "127.0.0.1:54321");
        assert_eq!(config.max_retry_delay_ms, 5000);
        assert_eq!(config.max_attempts, 0);
    }
}
