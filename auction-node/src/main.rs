use std::sync::Arc;

use auction_node::{
    api::{start_rest_api, AppState},
    cli::NodeArgs,
    logging::{init_tracing, NODE_FILTER},
    Config,
};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = NodeArgs::parse();
    let _guard = init_tracing(NODE_FILTER, args.log_file.as_deref());

    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    let node = Arc::new(config.build_node()?);
    info!(
        node = %node.id(),
        peers = node.peers().len(),
        fan_out = ?config.replication.fan_out,
        retry = ?config.replication.retry,
        "starting auctioneer node"
    );

    let listener = TcpListener::bind(config.listen_addr()?).await?;
    info!("Node {} running on port {}", node.id(), config.port);

    start_rest_api(listener, AppState { node }, shutdown_signal()).await?;

    info!("Node stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
