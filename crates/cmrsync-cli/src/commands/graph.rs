//! Graph maintenance commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use cmrsync_graph::{schema, GraphClient};

#[derive(Subcommand)]
pub enum GraphCommands {
    /// Create uniqueness constraints and indexes
    Schema,

    /// Show vertex and edge counts
    Status,
}

pub async fn execute(cmd: GraphCommands) -> Result<()> {
    let client = GraphClient::connect_default()
        .await
        .context("Failed to connect to the graph")?;

    match cmd {
        GraphCommands::Schema => cmd_schema(&client).await,
        GraphCommands::Status => cmd_status(&client).await,
    }
}

async fn cmd_schema(client: &GraphClient) -> Result<()> {
    schema::initialize_schema(client).await?;
    println!("{}", "Schema initialized.".green().bold());
    Ok(())
}

async fn cmd_status(client: &GraphClient) -> Result<()> {
    let counts = client.get_counts().await?;

    println!("{}", "Graph status".bold());
    println!("{}", "─".repeat(30));
    println!("  Collections:  {}", counts.collections);
    println!("  Campaigns:    {}", counts.campaigns);
    println!("  Platforms:    {}", counts.platforms);
    println!("  Related urls: {}", counts.related_urls);
    println!("  Edges:        {}", counts.edges);

    Ok(())
}
