//! Quest CLI commands.

use clap::{Args, Subcommand};

use northstar_core::{Payload, Quest, RemoteClient, SyncEngine};

use super::{local_quests, local_waypoints};

/// Manage quests
#[derive(Debug, Args)]
pub struct QuestCommand {
    #[command(subcommand)]
    command: QuestSubcommand,
}

#[derive(Debug, Subcommand)]
enum QuestSubcommand {
    /// List quests
    List,
    /// Create a new quest
    Add {
        /// Quest name
        name: String,
    },
}

impl QuestCommand {
    pub async fn run<R: RemoteClient>(
        &self,
        engine: &mut SyncEngine<R>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            QuestSubcommand::List => self.list(engine).await,
            QuestSubcommand::Add { name } => self.add(engine, name).await,
        }
    }

    async fn list<R: RemoteClient>(
        &self,
        engine: &mut SyncEngine<R>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let quests = local_quests(engine)?;
        if quests.is_empty() {
            println!("No quests. Create one with `northstar quest add <name>`.");
            return Ok(());
        }

        let waypoints = local_waypoints(engine)?;
        for quest in quests {
            let count = waypoints.iter().filter(|w| w.in_quest(&quest.id)).count();
            println!("{}  {} ({} waypoint(s))", quest.id, quest.name, count);
        }
        Ok(())
    }

    async fn add<R: RemoteClient>(
        &self,
        engine: &mut SyncEngine<R>,
        name: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let envelope = engine.create_and_sync(Payload::Quest(Quest::new(name))).await?;
        println!("Created quest \"{}\" ({})", name, envelope.global_id);
        Ok(())
    }
}
