//! Layout CLI command: constellation coordinates for a quest.

use clap::Args;

use northstar_core::{compute_layout, LayoutBounds, RemoteClient, SyncEngine};

use super::local_waypoints;

/// Compute the constellation layout for a quest's waypoints
#[derive(Debug, Args)]
pub struct LayoutCommand {
    /// Quest ID
    quest_id: String,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 390.0)]
    width: f64,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 700.0)]
    height: f64,

    /// Canvas margin in pixels
    #[arg(long, default_value_t = northstar_core::layout::DEFAULT_PADDING)]
    padding: f64,
}

impl LayoutCommand {
    pub async fn run<R: RemoteClient>(
        &self,
        engine: &mut SyncEngine<R>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut waypoints = local_waypoints(engine)?;
        waypoints.retain(|w| w.in_quest(&self.quest_id));

        let bounds = LayoutBounds::new(self.width, self.height).with_padding(self.padding);
        let layout = compute_layout(&waypoints, &bounds)?;

        if layout.positions.is_empty() {
            println!("No waypoints in quest {}.", self.quest_id);
            return Ok(());
        }

        println!("{:<38} {:>4} {:>4} {:>9} {:>9}", "waypoint", "rank", "col", "x", "y");
        for waypoint in &waypoints {
            let pos = &layout.positions[&waypoint.id];
            println!(
                "{:<38} {:>4} {:>4} {:>9.1} {:>9.1}",
                waypoint.name, pos.rank, pos.column, pos.x, pos.y
            );
        }

        if !layout.links.is_empty() {
            println!();
            println!("links:");
            for link in &layout.links {
                println!(
                    "  {} -> {}  ({:.1},{:.1}) -> ({:.1},{:.1})",
                    link.source_id, link.target_id, link.x1, link.y1, link.x2, link.y2
                );
            }
        }
        Ok(())
    }
}
