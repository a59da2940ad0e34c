//! cmrsync CLI - CMR graph synchronizer
//!
//! Command-line entry points for bootstrapping the graph from the catalog,
//! indexing single records, and running the change-queue worker.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Cli;

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "cmrsync=info,cmrsync_cmr=info,cmrsync_queue=info,cmrsync_graph=info".into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    cli.execute().await
}
