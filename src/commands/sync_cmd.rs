//! Sync CLI command for reconciling with the remote store.

use clap::Args;

use northstar_core::{ObjectType, RemoteClient, SyncEngine};

/// Reconcile local data with the remote store
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Sync only one object type (quest, waypoint, tag, tag_type)
    #[arg(long, value_parser = parse_object_type)]
    pub r#type: Option<ObjectType>,
}

fn parse_object_type(s: &str) -> Result<ObjectType, String> {
    ObjectType::from_name(s).ok_or_else(|| format!("unknown object type: {s}"))
}

impl SyncCommand {
    pub async fn run<R: RemoteClient>(
        &self,
        engine: &mut SyncEngine<R>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        println!("Syncing with remote store...");
        println!();

        let results = match self.r#type {
            Some(object_type) => vec![(object_type, engine.sync_type(object_type).await?)],
            None => engine.sync_all().await?,
        };

        let mut any_errors = false;
        for (object_type, summary) in &results {
            let status = if summary.errors > 0 {
                any_errors = true;
                "✗"
            } else {
                "✓"
            };
            println!(
                "  {} {:<9} {} processed, {} conflict(s), {} error(s)",
                status, object_type, summary.processed, summary.conflicts, summary.errors
            );
        }

        println!();
        if any_errors {
            println!("Sync finished with errors; local changes are preserved.");
        } else {
            println!("Sync complete.");
        }
        Ok(())
    }
}
