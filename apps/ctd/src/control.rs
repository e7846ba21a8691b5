//! Operator commands typed on stdin
//!
//! One command per line: `LOGGING`/`start` or `NOT_LOGGING`/`stop`, any case.
//! Blank lines and `#` comments are ignored.

use actor_protocol::{CtdControl, DesiredState};
use actor_runtime::ChannelManager;
use futures::{SinkExt, StreamExt};
use futures_channel::mpsc;
use tokio_util::sync::CancellationToken;

/// Parse one operator line. `None` for lines that carry no command.
pub fn parse_command(line: &str) -> Option<Result<CtdControl, String>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line.parse::<DesiredState>().map(CtdControl::new))
}

/// Read stdin lines on a dedicated thread.
///
/// Blocking stdin reads would hold up runtime shutdown, so they stay off the
/// runtime; the thread ends at EOF or once the receiver is dropped.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (mut tx, rx) = mpsc::channel(16);

    let spawned = std::thread::Builder::new()
        .name("ctd-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lines() {
                let Ok(line) = line else { break };
                if futures::executor::block_on(tx.send(line)).is_err() {
                    break;
                }
            }
        });

    if let Err(e) = spawned {
        tracing::warn!("Operator input disabled, stdin thread failed to start: {}", e);
    }

    rx
}

/// Forward operator commands to the driver until shutdown.
///
/// Owns the `ChannelManager` so the driver inbox can close once this returns.
/// `lines` of `None` (or a closed stream) just waits for shutdown.
pub async fn run_operator_input(
    mut lines: Option<mpsc::Receiver<String>>,
    manager: ChannelManager,
    shutdown: CancellationToken,
) {
    loop {
        let next = match lines.as_mut() {
            Some(rx) => tokio::select! {
                _ = shutdown.cancelled() => break,
                line = rx.next() => line,
            },
            None => {
                shutdown.cancelled().await;
                break;
            }
        };

        let Some(line) = next else {
            tracing::debug!("Operator input closed");
            lines = None;
            continue;
        };

        match parse_command(&line) {
            None => {}
            Some(Ok(ctrl)) => {
                tracing::info!("Operator: {:?}", ctrl.desired_state);
                if let Err(e) = manager.send_control(ctrl) {
                    tracing::warn!("Operator command not delivered: {}", e);
                }
            }
            Some(Err(e)) => tracing::warn!("{}", e),
        }
    }

    drop(manager);
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use actor_runtime::DriverMessage;

    #[test]
    fn test_parse_command() {
        assert_eq!(
            parse_command("start"),
            Some(Ok(CtdControl::new(DesiredState::Logging)))
        );
        assert_eq!(
            parse_command("  NOT_LOGGING \n"),
            Some(Ok(CtdControl::new(DesiredState::NotLogging)))
        );
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("# comment"), None);
        assert!(matches!(parse_command("sleep"), Some(Err(_))));
    }

    #[tokio::test]
    async fn test_operator_lines_reach_driver() {
        let (manager, mut handles) = ChannelManager::new();
        let (mut tx, rx) = mpsc::channel(8);
        let token = CancellationToken::new();

        tx.send("stop".to_string()).await.unwrap();
        tx.send("bogus".to_string()).await.unwrap();
        tx.send("LOGGING".to_string()).await.unwrap();
        drop(tx);

        let driver = async {
            let first = handles.driver_rx.next().await;
            let second = handles.driver_rx.next().await;
            token.cancel();
            (first, second)
        };

        let (_, (first, second)) =
            tokio::join!(run_operator_input(Some(rx), manager, token.clone()), driver);

        assert_eq!(
            first,
            Some(DriverMessage::Control(CtdControl::new(DesiredState::NotLogging)))
        );
        assert_eq!(
            second,
            Some(DriverMessage::Control(CtdControl::new(DesiredState::Logging)))
        );

        // Manager dropped on return: nothing else can reach the driver
        assert_eq!(handles.driver_rx.next().await, None);
    }

    #[tokio::test]
    async fn test_without_input_waits_for_shutdown() {
        let (manager, mut handles) = ChannelManager::new();
        let token = CancellationToken::new();
        token.cancel();

        run_operator_input(None, manager, token).await;

        assert_eq!(handles.driver_rx.next().await, None);
    }
}
