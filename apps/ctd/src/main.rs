use actor_runtime::{init_tracing, Actor, ActorHandles, ChannelManager};
use anyhow::Context;
use clap::Parser;
use ctd_actors::{DriverActor, PortActor};
use ctd_native::control::{run_operator_input, spawn_stdin_reader};
use ctd_native::tracker::watch_events;
use ctd_native::{Args, DriverConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = DriverConfig::resolve(&args).context("Failed to load configuration")?;
    init_tracing(&config.logging.filter)?;

    tracing::info!("CTD driver starting, link {}", config.link.address);

    let (mut manager, handles) = ChannelManager::new();
    let events = manager.take_event_receiver();
    let ActorHandles {
        driver_rx,
        port_rx,
        event_tx,
    } = handles;
    let shutdown = CancellationToken::new();

    let driver = DriverActor::new(manager.port_sender(), event_tx.clone());
    let port = PortActor::new(
        config.link_config(),
        manager.driver_sender(),
        event_tx.clone(),
        shutdown.clone(),
    );
    let operator_lines = config.control.stdin.then(spawn_stdin_reader);
    if operator_lines.is_some() {
        tracing::info!("Type 'start' or 'stop' to control logging");
    }

    let link = async {
        port.run(port_rx).await;
        // Port gave up or was closed: nothing left to drive
        shutdown.cancel();
    };

    let signals = async {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::warn!("Failed to listen for Ctrl+C: {}", e);
                    return;
                }
                tracing::info!("Shutting down");
                shutdown.cancel();
            }
            _ = shutdown.cancelled() => {}
        }
    };

    // Single task: the driver stops once the port actor and the operator
    // input have both dropped their senders.
    let (_, _, _, tracker, _) = tokio::join!(
        driver.run(driver_rx, event_tx),
        link,
        run_operator_input(operator_lines, manager, shutdown.clone()),
        watch_events(events),
        signals,
    );

    tracing::info!(
        "CTD driver stopped ({} commands sent, last phase {})",
        tracker.commands_sent(),
        tracker.current().unwrap_or("none")
    );
    Ok(())
}
