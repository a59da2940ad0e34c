//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod bootstrap;
pub mod graph;
pub mod index;
pub mod worker;

/// cmrsync - keep a property graph in sync with the CMR catalog
#[derive(Parser)]
#[command(name = "cmrsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl the catalog feed and fan record ids out to the change queue
    Bootstrap(bootstrap::BootstrapArgs),

    /// Fetch one collection from the catalog and index it
    Index(index::IndexArgs),

    /// Delete one collection and its exclusively linked vertices
    Delete(index::DeleteArgs),

    /// Consume change notifications from the queue
    Worker(worker::WorkerArgs),

    /// Graph maintenance commands
    #[command(subcommand)]
    Graph(graph::GraphCommands),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Bootstrap(args) => bootstrap::execute(args).await,
            Commands::Index(args) => index::execute_index(args).await,
            Commands::Delete(args) => index::execute_delete(args).await,
            Commands::Worker(args) => worker::execute(args).await,
            Commands::Graph(cmd) => graph::execute(cmd).await,
        }
    }
}
