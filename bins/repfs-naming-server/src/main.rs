use std::sync::Arc;

use clap::Parser;

use repfs_logging::LogConfig;
use repfs_naming_service::{NamingConfig, NamingRpcHandler, NamingServiceImpl, NamingState};
use repfs_net::tcp::{TcpConnector, TcpListener, TcpSocket};
use repfs_net::{RpcClient, Server};
use repfs_stubs::RpcStorageStub;

/// repfs naming server: the metadata coordinator.
#[derive(Parser, Debug)]
#[command(name = "repfs-naming-server", version, about)]
struct Args {
    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = repfs_logging::init_logging(&LogConfig::with_level(args.log_level));

    let config = NamingConfig::from_env();
    tracing::info!(addr = %config.listen_addr, "starting repfs naming server");

    let listener = TcpListener::bind(&config.listen_addr).await?;

    let client = Arc::new(RpcClient::<TcpSocket>::new(Box::new(TcpConnector::new())));
    let storage = Arc::new(RpcStorageStub::new(client));
    let state = NamingState::new(storage).into_arc();

    let mut server = Server::new();
    server.register_service(Box::new(NamingRpcHandler::new(Arc::new(
        NamingServiceImpl::new(state),
    ))));
    server.start(listener);

    wait_for_shutdown_signal().await;
    server.stop();
    tracing::info!("naming server shutting down");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("failed to register SIGTERM handler");
    tokio::select! {
        _ = ctrl_c => { tracing::info!("received CTRL+C"); }
        _ = sigterm.recv() => { tracing::info!("received SIGTERM"); }
    }
}
