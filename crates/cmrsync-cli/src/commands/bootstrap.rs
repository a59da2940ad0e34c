//! Bootstrap crawl: walk the catalog feed and fan out to the queue.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use cmrsync_cmr::{crawl, CmrClient, CmrConfig, CrawlOptions};
use cmrsync_queue::{ChangeQueue, QueueConfig};

#[derive(Args)]
pub struct BootstrapArgs {
    /// Restrict the crawl to a single provider's collections
    #[arg(long)]
    pub provider: Option<String>,

    /// Resume from a scroll id reported by an aborted crawl
    #[arg(long)]
    pub scroll_id: Option<String>,
}

pub async fn execute(args: BootstrapArgs) -> Result<()> {
    let cmr_config = CmrConfig::from_env();
    let client = CmrClient::new(cmr_config.clone());
    let queue = ChangeQueue::connect(&QueueConfig::from_env())
        .await
        .context("Failed to connect to the change queue")?;

    println!("{}", "Crawling the CMR collection feed...".bold());

    let options = CrawlOptions {
        provider: args.provider,
        scroll_id: args.scroll_id,
    };

    match crawl(&client, &queue, cmr_config.page_size, &options).await {
        Ok(report) => {
            println!("\n{}", "Crawl complete:".green().bold());
            println!("  Pages fetched: {}", report.pages);
            println!("  Records queued: {}", report.records);
            Ok(())
        }
        Err(e) => {
            println!("\n{}", "Crawl aborted:".red().bold());
            println!("  {e}");
            if let Some(scroll_id) = &e.scroll_id {
                println!("  Last active scroll id: {}", scroll_id.yellow());
            }
            Err(e.into())
        }
    }
}
