use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A task-like node in the dependency graph.
///
/// Waypoints belong to zero or more quests and carry outgoing `unblocks`
/// edges: completing this waypoint unblocks each listed target. The
/// `unblocks` relation is expected to form a DAG; the inverse ("blocked
/// by") relation is always derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Waypoint {
    pub id: String,
    /// Sync key shared between the local and remote replicas.
    /// Empty until the first sync assigns one.
    #[serde(default)]
    pub global_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quest_ids: Vec<String>,
    /// Waypoint IDs that this waypoint is a prerequisite for.
    #[serde(default)]
    pub unblocks: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    pub last_modified: DateTime<Utc>,
}

impl Waypoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            global_id: String::new(),
            name: name.into(),
            description: String::new(),
            quest_ids: Vec::new(),
            unblocks: Vec::new(),
            tags: Vec::new(),
            completed: false,
            last_modified: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_quests(mut self, quest_ids: Vec<String>) -> Self {
        self.quest_ids = quest_ids;
        self
    }

    pub fn with_unblocks(mut self, unblocks: Vec<String>) -> Self {
        self.unblocks = unblocks;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Marks the waypoint completed.
    pub fn complete(&mut self) {
        self.completed = true;
    }

    /// True if this waypoint belongs to the given quest.
    pub fn in_quest(&self, quest_id: &str) -> bool {
        self.quest_ids.iter().any(|q| q == quest_id)
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.completed { "x" } else { " " };
        write!(f, "[{}] {}", mark, self.name)?;
        if !self.tags.is_empty() {
            write!(f, " ({})", self.tags.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waypoint_new() {
        let wp = Waypoint::new("Setup project");
        assert_eq!(wp.name, "Setup project");
        assert!(wp.global_id.is_empty());
        assert!(wp.unblocks.is_empty());
        assert!(!wp.completed);
    }

    #[test]
    fn test_waypoint_builder() {
        let wp = Waypoint::new("Write parser")
            .with_description("Tokenizer first")
            .with_quests(vec!["quest-1".into()])
            .with_unblocks(vec!["wp-2".into(), "wp-3".into()])
            .with_tags(vec!["home".into()]);

        assert_eq!(wp.description, "Tokenizer first");
        assert!(wp.in_quest("quest-1"));
        assert!(!wp.in_quest("quest-2"));
        assert_eq!(wp.unblocks.len(), 2);
        assert_eq!(wp.tags, vec!["home".to_string()]);
    }

    #[test]
    fn test_waypoint_complete() {
        let mut wp = Waypoint::new("Ship it");
        wp.complete();
        assert!(wp.completed);
    }

    #[test]
    fn test_waypoint_json_roundtrip() {
        let wp = Waypoint::new("Roundtrip")
            .with_unblocks(vec!["other".into()])
            .with_tags(vec!["a".into(), "b".into()]);

        let json = serde_json::to_string(&wp).unwrap();
        let parsed: Waypoint = serde_json::from_str(&json).unwrap();
        assert_eq!(wp, parsed);
    }

    #[test]
    fn test_waypoint_missing_global_id_defaults_empty() {
        let json = r#"{
            "id": "wp-1",
            "name": "legacy",
            "last_modified": "2025-01-13T18:30:00Z"
        }"#;
        let parsed: Waypoint = serde_json::from_str(json).unwrap();
        assert!(parsed.global_id.is_empty());
        assert!(parsed.quest_ids.is_empty());
    }

    #[test]
    fn test_waypoint_display() {
        let mut wp = Waypoint::new("Render graph").with_tags(vec!["ui".into()]);
        assert_eq!(format!("{}", wp), "[ ] Render graph (ui)");
        wp.complete();
        assert_eq!(format!("{}", wp), "[x] Render graph (ui)");
    }
}
