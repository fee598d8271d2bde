//! Waypoint CLI commands.

use clap::{Args, Subcommand};

use northstar_core::{Payload, RemoteClient, SyncEngine, Waypoint};

use super::local_waypoints;

/// Manage waypoints
#[derive(Debug, Args)]
pub struct WaypointCommand {
    #[command(subcommand)]
    command: WaypointSubcommand,
}

#[derive(Debug, Subcommand)]
enum WaypointSubcommand {
    /// List waypoints
    List {
        /// Only waypoints belonging to this quest
        #[arg(long)]
        quest: Option<String>,
        /// Read through the remote-backed entity cache instead of local storage
        #[arg(long)]
        remote: bool,
    },
    /// Create a new waypoint
    Add {
        /// Waypoint name
        name: String,
        /// Quest this waypoint belongs to
        #[arg(long)]
        quest: Option<String>,
        /// Longer description
        #[arg(long, short, default_value = "")]
        description: String,
        /// Waypoint IDs this waypoint unblocks (comma separated)
        #[arg(long, value_delimiter = ',')]
        unblocks: Vec<String>,
        /// Tags (comma separated)
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Mark a waypoint completed
    Done {
        /// Waypoint ID
        id: String,
    },
    /// Delete a waypoint
    Rm {
        /// Waypoint ID
        id: String,
    },
}

impl WaypointCommand {
    pub async fn run<R: RemoteClient>(
        &self,
        engine: &mut SyncEngine<R>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WaypointSubcommand::List { quest, remote } => {
                self.list(engine, quest.as_deref(), *remote).await
            }
            WaypointSubcommand::Add {
                name,
                quest,
                description,
                unblocks,
                tags,
            } => {
                self.add(engine, name, quest.as_deref(), description, unblocks, tags)
                    .await
            }
            WaypointSubcommand::Done { id } => self.done(engine, id).await,
            WaypointSubcommand::Rm { id } => self.remove(engine, id).await,
        }
    }

    async fn list<R: RemoteClient>(
        &self,
        engine: &mut SyncEngine<R>,
        quest: Option<&str>,
        remote: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut waypoints = if remote {
            engine.cache().waypoints().await?
        } else {
            local_waypoints(engine)?
        };
        if let Some(quest_id) = quest {
            waypoints.retain(|w| w.in_quest(quest_id));
        }

        if waypoints.is_empty() {
            println!("No waypoints.");
            return Ok(());
        }
        for waypoint in waypoints {
            println!("{}  {}", waypoint.id, waypoint);
        }
        Ok(())
    }

    async fn add<R: RemoteClient>(
        &self,
        engine: &mut SyncEngine<R>,
        name: &str,
        quest: Option<&str>,
        description: &str,
        unblocks: &[String],
        tags: &[String],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut waypoint = Waypoint::new(name)
            .with_description(description)
            .with_unblocks(unblocks.to_vec())
            .with_tags(tags.to_vec());
        if let Some(quest_id) = quest {
            waypoint = waypoint.with_quests(vec![quest_id.to_string()]);
        }

        let envelope = engine.create_and_sync(Payload::Waypoint(waypoint)).await?;
        println!("Created waypoint \"{}\" ({})", name, envelope.global_id);
        Ok(())
    }

    async fn done<R: RemoteClient>(
        &self,
        engine: &mut SyncEngine<R>,
        id: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let waypoints = local_waypoints(engine)?;
        let Some(mut waypoint) = waypoints.into_iter().find(|w| w.id == id) else {
            return Err(format!("no waypoint with ID {id}").into());
        };

        waypoint.complete();
        let name = waypoint.name.clone();
        engine.update_and_sync(Payload::Waypoint(waypoint)).await?;
        println!("Completed \"{}\"", name);
        Ok(())
    }

    async fn remove<R: RemoteClient>(
        &self,
        engine: &mut SyncEngine<R>,
        id: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let waypoints = local_waypoints(engine)?;
        let Some(waypoint) = waypoints.into_iter().find(|w| w.id == id) else {
            return Err(format!("no waypoint with ID {id}").into());
        };

        engine
            .delete_and_sync(northstar_core::ObjectType::Waypoint, &waypoint.global_id)
            .await?;
        println!("Deleted \"{}\"", waypoint.name);
        Ok(())
    }
}
