//! Synced entity types.

mod quest;
mod tag;
mod waypoint;

pub use quest::Quest;
pub use tag::{Tag, TagType};
pub use waypoint::Waypoint;
