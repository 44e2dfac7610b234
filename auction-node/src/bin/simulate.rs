use std::sync::Arc;

use auction_core::{Cluster, InMemoryClusterBuilder};
use auction_node::{
    cli::SimArgs,
    logging::{init_tracing, REPL_FILTER},
    repl::{run, Session},
};
use clap::Parser;
use tokio::io::{stdin, stdout, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = SimArgs::parse();
    let _guard = init_tracing(REPL_FILTER, None);

    if args.nodes == 0 {
        return Err("--nodes must be at least 1".into());
    }

    let (_transport, nodes) = InMemoryClusterBuilder::new()
        .with_nodes(args.nodes)
        .with_fan_out(args.fan_out)
        .build();

    let mut cluster = Cluster::new(args.policy.selector());
    for node in &nodes {
        cluster.add(Arc::clone(node));
    }

    println!(
        "Auction started with {} in-process node(s), {} selection",
        nodes.len(),
        args.policy
    );

    let mut session = Session::new(cluster);
    run(&mut session, BufReader::new(stdin()), stdout()).await?;
    Ok(())
}
