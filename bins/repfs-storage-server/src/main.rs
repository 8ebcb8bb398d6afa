use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use repfs_logging::LogConfig;
use repfs_net::tcp::{TcpConnector, TcpListener, TcpSocket};
use repfs_net::{RpcClient, Server};
use repfs_storage_service::{
    bootstrap, FileStore, StorageConfig, StorageRpcHandler, StorageServiceImpl, StorageState,
};
use repfs_stubs::{RpcNamingStub, RpcStorageStub};

/// repfs storage server: a replica node.
#[derive(Parser, Debug)]
#[command(name = "repfs-storage-server", version, about)]
struct Args {
    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = repfs_logging::init_logging(&LogConfig::with_level(args.log_level));

    let config = StorageConfig::from_env()?;
    tracing::info!(
        alias = %config.alias,
        addr = %config.listen_addr,
        naming = %config.naming_addr,
        "starting repfs storage server"
    );

    let client = Arc::new(RpcClient::<TcpSocket>::new(Box::new(TcpConnector::new())));
    let naming = Arc::new(RpcNamingStub::new(
        config.naming_addr.clone(),
        Arc::clone(&client),
    ));
    let peers = Arc::new(RpcStorageStub::new(client));

    // Register first; a declined replica must not sync or serve.
    let port = config.port()?;
    bootstrap::register(
        naming.as_ref(),
        &config.alias,
        port,
        &config.public_hostname,
    )
    .await
    .context("registration with the naming server failed")?;

    let listener = TcpListener::bind(&config.listen_addr).await?;

    let state = StorageState::new(
        config.alias.clone(),
        FileStore::new(&config.storage_root),
        naming,
        peers,
    )
    .into_arc();

    tracing::info!(alias = %config.alias, "starting sync");
    bootstrap::sync(&state).await.context("bootstrap sync failed")?;
    tracing::info!(alias = %config.alias, "sync completed");

    let mut server = Server::new();
    server.register_service(Box::new(StorageRpcHandler::new(Arc::new(
        StorageServiceImpl::new(state),
    ))));
    server.start(listener);

    wait_for_shutdown_signal().await;
    server.stop();
    tracing::info!("storage server shutting down");
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
