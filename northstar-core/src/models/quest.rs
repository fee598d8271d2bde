use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A named grouping of waypoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quest {
    pub id: String,
    /// Sync key shared between the local and remote replicas.
    #[serde(default)]
    pub global_id: String,
    pub name: String,
    pub last_modified: DateTime<Utc>,
}

impl Quest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            global_id: String::new(),
            name: name.into(),
            last_modified: Utc::now(),
        }
    }
}

impl fmt::Display for Quest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
