use std::{sync::Arc, time::Duration};

use auction_core::Cluster;
use auction_node::{
    cli::ClientArgs,
    client::HttpEndpoint,
    logging::{init_tracing, REPL_FILTER},
    repl::{run, Session},
};
use clap::Parser;
use tokio::io::{stdin, stdout, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ClientArgs::parse();
    let _guard = init_tracing(REPL_FILTER, None);

    let timeout = Duration::from_millis(args.timeout_ms);
    let mut cluster = Cluster::new(args.policy.selector());
    for url in &args.nodes {
        cluster.add(Arc::new(HttpEndpoint::new(url.as_str(), timeout)?));
    }

    println!(
        "Auction CLI connected to {} node(s), {} selection",
        cluster.len(),
        args.policy
    );

    let mut session = Session::new(cluster);
    run(&mut session, BufReader::new(stdin()), stdout()).await?;
    Ok(())
}
