mod config_cmd;
mod layout_cmd;
mod quest;
mod sync_cmd;
mod waypoint;

pub use config_cmd::ConfigCommand;
pub use layout_cmd::LayoutCommand;
pub use quest::QuestCommand;
pub use sync_cmd::SyncCommand;
pub use waypoint::WaypointCommand;

use northstar_core::{ObjectType, Payload, Quest, RemoteClient, SyncEngine, Waypoint};

/// Decodes the locally persisted waypoint collection.
pub fn local_waypoints<R: RemoteClient>(
    engine: &SyncEngine<R>,
) -> Result<Vec<Waypoint>, Box<dyn std::error::Error>> {
    let items = engine.local().load(ObjectType::Waypoint)?;
    Ok(items
        .into_iter()
        .filter_map(|item| match item.payload {
            Payload::Waypoint(w) => Some(w),
            _ => None,
        })
        .collect())
}

/// Decodes the locally persisted quest collection.
pub fn local_quests<R: RemoteClient>(
    engine: &SyncEngine<R>,
) -> Result<Vec<Quest>, Box<dyn std::error::Error>> {
    let items = engine.local().load(ObjectType::Quest)?;
    Ok(items
        .into_iter()
        .filter_map(|item| match item.payload {
            Payload::Quest(q) => Some(q),
            _ => None,
        })
        .collect())
}
