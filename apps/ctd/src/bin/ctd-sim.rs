use actor_runtime::init_tracing;
use anyhow::Context;
use clap::Parser;
use ctd_actors::simulator::serve_connection;
use ctd_native::SimArgs;
use tokio::net::TcpListener;
use transport_native::TcpTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = SimArgs::parse();
    init_tracing(if args.verbose { "debug" } else { "info" })?;

    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("Failed to listen on {}", args.listen))?;
    tracing::info!("CTD simulator listening on {}", listener.local_addr()?);

    // One driver at a time, like the real logger's single serial port
    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        };

        tracing::info!("Driver connected from {}", peer);
        let transport = TcpTransport::from_stream(stream);

        tokio::select! {
            result = serve_connection(&transport) => match result {
                Ok(()) => tracing::info!("Driver {} disconnected", peer),
                Err(e) => tracing::warn!("Connection to {} failed: {}", peer, e),
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("CTD simulator stopped");
    Ok(())
}
