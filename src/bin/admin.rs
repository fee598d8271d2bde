//! Northstar Admin CLI
//!
//! Administration tool for managing the remote item store directly.
//!
//! # Usage
//!
//! ```bash
//! northstar-admin list
//! northstar-admin seed data/seed.json
//! northstar-admin get a7f8b3e2-9d14-4c8a-b7e3-2f6d8a9c1e5b
//! northstar-admin update <global-id> '{"name":"New Name"}'
//! northstar-admin delete <global-id>
//! northstar-admin clear
//! ```
//!
//! # Environment Variables
//!
//! - `NORTHSTAR_REMOTE_URL`: base URL of the remote item store (required)
//! - `NORTHSTAR_API_KEY`: bearer token for the remote store (optional)

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use northstar_core::{
    HttpRemote, ObjectType, Payload, Quest, RemoteClient, SyncEnvelope, Tag, TagType, Waypoint,
};

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "northstar-admin")]
#[command(version)]
#[command(about = "Northstar remote store administration tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all items in the remote table
    List {
        /// Only items of this type (quest, waypoint, tag, tag_type)
        #[arg(long)]
        r#type: Option<String>,
    },
    /// Fetch a single item by global ID
    Get {
        /// Global object ID
        global_id: String,
    },
    /// Merge a JSON object into an item's payload
    Update {
        /// Global object ID
        global_id: String,
        /// JSON object with fields to merge
        data: String,
    },
    /// Delete a single item by global ID
    Delete {
        /// Global object ID
        global_id: String,
    },
    /// Delete every item in the remote table
    Clear,
    /// Migrate a JSON seed file into the remote table
    Seed {
        /// Path to a seed file
        file: PathBuf,
    },
}

// ============================================================================
// Seed file format
// ============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SeedData {
    quests: Vec<Quest>,
    tag_types: Vec<TagType>,
    tags: Vec<Tag>,
    waypoints: Vec<Waypoint>,
}

impl SeedData {
    /// Converts the seed entities into envelopes, using the entity's own
    /// ID as the sync key when none is set.
    fn into_envelopes(self) -> Vec<SyncEnvelope> {
        let mut items = Vec::new();

        for quest in self.quests {
            items.push(seed_envelope(Payload::Quest(quest)));
        }
        for tag_type in self.tag_types {
            items.push(seed_envelope(Payload::TagType(tag_type)));
        }
        for tag in self.tags {
            items.push(seed_envelope(Payload::Tag(tag)));
        }
        for waypoint in self.waypoints {
            items.push(seed_envelope(Payload::Waypoint(waypoint)));
        }
        items
    }
}

fn seed_envelope(mut payload: Payload) -> SyncEnvelope {
    if payload.global_id().is_empty() {
        let id = match &payload {
            Payload::Quest(q) => q.id.clone(),
            Payload::Waypoint(w) => w.id.clone(),
            Payload::Tag(t) => t.id.clone(),
            Payload::TagType(t) => t.id.clone(),
        };
        payload.set_global_id(id);
    }
    SyncEnvelope::new(payload)
}

// ============================================================================
// Commands
// ============================================================================

async fn list(remote: &HttpRemote, type_filter: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let items = match type_filter {
        Some(name) => {
            let object_type = ObjectType::from_name(name)
                .ok_or_else(|| format!("unknown object type: {name}"))?;
            remote.scan_by_type(object_type).await?
        }
        None => remote.scan_all().await?,
    };

    if items.is_empty() {
        println!("Table is empty.");
        return Ok(());
    }

    println!("{:<38} {:<9} {}", "global_id", "type", "last_modified");
    for item in &items {
        println!(
            "{:<38} {:<9} {}",
            item.global_id,
            item.object_type(),
            item.last_modified.to_rfc3339()
        );
    }
    println!("\n{} item(s)", items.len());
    Ok(())
}

async fn get(remote: &HttpRemote, global_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    match remote.get_one(global_id).await? {
        Some(item) => println!("{}", serde_json::to_string_pretty(&item)?),
        None => println!("Item {} not found", global_id),
    }
    Ok(())
}

async fn update(
    remote: &HttpRemote,
    global_id: &str,
    data: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let patch: serde_json::Value = serde_json::from_str(data)?;
    if !patch.is_object() {
        return Err("update data must be a JSON object".into());
    }

    let Some(existing) = remote.get_one(global_id).await? else {
        println!("Item {} not found", global_id);
        return Ok(());
    };

    // Shallow-merge the patch into the payload fields, then restamp.
    let mut value = serde_json::to_value(&existing)?;
    if let (Some(payload), Some(fields)) = (value["payload"].as_object_mut(), patch.as_object()) {
        for (key, field) in fields {
            payload.insert(key.clone(), field.clone());
        }
    }

    let mut updated: SyncEnvelope = serde_json::from_value(value)?;
    let now: DateTime<Utc> = Utc::now();
    updated.payload.touch(now);
    updated.last_modified = now;

    remote.put_one(&updated).await?;
    println!("Item {} updated", global_id);
    Ok(())
}

async fn delete(remote: &HttpRemote, global_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    if remote.get_one(global_id).await?.is_none() {
        println!("Item {} not found", global_id);
        return Ok(());
    }
    remote.delete_one(global_id).await?;
    println!("Item {} deleted", global_id);
    Ok(())
}

async fn clear(remote: &HttpRemote) -> Result<(), Box<dyn std::error::Error>> {
    let items = remote.scan_all().await?;
    if items.is_empty() {
        println!("Table is already empty.");
        return Ok(());
    }

    println!("Deleting {} item(s)...", items.len());
    for item in &items {
        remote.delete_one(&item.global_id).await?;
    }
    println!("Table cleared.");
    Ok(())
}

async fn seed(remote: &HttpRemote, file: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(file)?;
    let data: SeedData = serde_json::from_str(&contents)?;

    let counts = (
        data.quests.len(),
        data.tag_types.len(),
        data.tags.len(),
        data.waypoints.len(),
    );
    let items = data.into_envelopes();

    println!("Inserting {} item(s)...", items.len());
    remote.batch_put(&items).await?;

    println!("Seed data migrated:");
    println!("  quests:    {}", counts.0);
    println!("  tag types: {}", counts.1);
    println!("  tags:      {}", counts.2);
    println!("  waypoints: {}", counts.3);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn remote_from_env() -> Result<HttpRemote, Box<dyn std::error::Error>> {
    let base_url = std::env::var("NORTHSTAR_REMOTE_URL")
        .map_err(|_| "NORTHSTAR_REMOTE_URL must be set")?;
    let api_key = std::env::var("NORTHSTAR_API_KEY").ok();
    Ok(HttpRemote::new(base_url, api_key))
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let remote = remote_from_env()?;

    match &cli.command {
        Commands::List { r#type } => list(&remote, r#type.as_deref()).await,
        Commands::Get { global_id } => get(&remote, global_id).await,
        Commands::Update { global_id, data } => update(&remote, global_id, data).await,
        Commands::Delete { global_id } => delete(&remote, global_id).await,
        Commands::Clear => clear(&remote).await,
        Commands::Seed { file } => seed(&remote, file).await,
    }
}
