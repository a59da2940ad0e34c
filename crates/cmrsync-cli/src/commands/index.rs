//! Single-record indexing and deletion commands.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use cmrsync_cmr::{CmrClient, CmrConfig};
use cmrsync_graph::store::CONCEPT_ID;
use cmrsync_graph::{delete_collection, index_collection, GraphClient, GraphStore, VertexLabel};

#[derive(Args)]
pub struct IndexArgs {
    /// Catalog concept id, e.g. C1237289-GES_DISC
    pub concept_id: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Catalog concept id
    pub concept_id: String,
}

pub async fn execute_index(args: IndexArgs) -> Result<()> {
    let cmr_config = CmrConfig::from_env();
    let client = CmrClient::new(cmr_config.clone());
    let graph = GraphClient::connect_default()
        .await
        .context("Failed to connect to the graph")?;

    let Some(document) = client
        .fetch_collection(&args.concept_id)
        .await
        .context("Failed fetching the collection from CMR")?
    else {
        // The catalog no longer has it: drop whatever the graph still holds.
        println!(
            "{} {}",
            "Concept missing upstream, removing from graph:".yellow(),
            args.concept_id
        );
        let report = delete_collection(&graph, &args.concept_id).await?;
        print_delete_report(&report);
        return Ok(());
    };

    let report = index_collection(&graph, &document, &cmr_config.cmr_root).await?;

    println!("{} {}", "Indexed".green().bold(), args.concept_id);
    println!(
        "  Campaigns:    {} indexed, {} failed",
        report.campaigns.indexed, report.campaigns.failed
    );
    println!(
        "  Platforms:    {} indexed, {} failed",
        report.platforms.indexed, report.platforms.failed
    );
    println!(
        "  Related urls: {} indexed, {} failed",
        report.related_urls.indexed, report.related_urls.failed
    );
    if report.failures() > 0 {
        println!(
            "{}",
            format!("{} entity upserts failed", report.failures()).yellow()
        );
    }

    Ok(())
}

pub async fn execute_delete(args: DeleteArgs) -> Result<()> {
    let graph = GraphClient::connect_default()
        .await
        .context("Failed to connect to the graph")?;

    let existing = graph
        .find_vertex(VertexLabel::Collection, CONCEPT_ID, &args.concept_id)
        .await?;
    if existing.is_none() {
        println!(
            "{} {}",
            "Nothing to delete, collection is not in the graph:".dimmed(),
            args.concept_id
        );
        return Ok(());
    }

    let report = delete_collection(&graph, &args.concept_id).await?;

    println!("{} {}", "Deleted".green().bold(), args.concept_id);
    print_delete_report(&report);
    Ok(())
}

fn print_delete_report(report: &cmrsync_graph::DeleteReport) {
    println!("  Campaigns removed:    {}", report.campaigns_removed);
    println!("  Platforms removed:    {}", report.platforms_removed);
    println!("  Related urls removed: {}", report.related_urls_removed);
    println!("  Collection vertex:    {}", if report.collection_removed { "removed" } else { "not present" });
}
