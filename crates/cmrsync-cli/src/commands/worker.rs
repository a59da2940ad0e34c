//! Queue worker: drain change notifications and apply them to the graph.

use anyhow::{Context, Result};
use clap::Args;
use tracing::{error, info, warn};

use cmrsync_cmr::{CmrClient, CmrConfig};
use cmrsync_core::{ChangeAction, ChangeMessage};
use cmrsync_graph::{delete_collection, index_collection, GraphClient};
use cmrsync_queue::{ChangeQueue, QueueConfig};

#[derive(Args)]
pub struct WorkerArgs {
    /// Stop after this many messages (default: run until the queue stays empty)
    #[arg(long)]
    pub max: Option<usize>,

    /// Seconds to block waiting for the next message
    #[arg(long, default_value = "5")]
    pub poll_timeout: u64,
}

pub async fn execute(args: WorkerArgs) -> Result<()> {
    let cmr_config = CmrConfig::from_env();
    let cmr = CmrClient::new(cmr_config.clone());
    let queue = ChangeQueue::connect(&QueueConfig::from_env())
        .await
        .context("Failed to connect to the change queue")?;
    let graph = GraphClient::connect_default()
        .await
        .context("Failed to connect to the graph")?;

    let mut handled = 0usize;
    loop {
        if let Some(max) = args.max {
            if handled >= max {
                break;
            }
        }

        let Some(message) = queue.pop(args.poll_timeout as f64).await? else {
            info!(handled, "queue idle, worker stopping");
            break;
        };

        handle_message(&cmr, &graph, &cmr_config.cmr_root, &message).await;
        handled += 1;
    }

    println!("Handled {handled} change notifications");
    Ok(())
}

/// Process one change notification. Failures are logged, not fatal: the
/// next message still gets its turn.
async fn handle_message(
    cmr: &CmrClient,
    graph: &GraphClient,
    cmr_root: &str,
    message: &ChangeMessage,
) {
    let concept_id = message.concept_id.as_str();

    match message.action {
        ChangeAction::ConceptDelete => {
            if let Err(e) = delete_collection(graph, concept_id).await {
                error!(concept_id, error = %e, "delete notification failed");
            }
        }
        ChangeAction::ConceptUpdate => match cmr.fetch_collection(concept_id).await {
            Ok(Some(document)) => {
                if let Err(e) = index_collection(graph, &document, cmr_root).await {
                    error!(concept_id, error = %e, "index attempt failed");
                }
            }
            Ok(None) => {
                // The catalog dropped it between fan-out and now.
                warn!(concept_id, "concept missing upstream, removing from graph");
                if let Err(e) = delete_collection(graph, concept_id).await {
                    error!(concept_id, error = %e, "removal of missing concept failed");
                }
            }
            Err(e) => error!(concept_id, error = %e, "fetch from CMR failed"),
        },
    }
}
