use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A free-form label attached to waypoints, grouped under a [`TagType`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: String,
    #[serde(default)]
    pub global_id: String,
    pub name: String,
    pub tag_type_id: String,
    pub last_modified: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: impl Into<String>, tag_type_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            global_id: String::new(),
            name: name.into(),
            tag_type_id: tag_type_id.into(),
            last_modified: Utc::now(),
        }
    }
}

/// A category of tags (e.g. "location").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagType {
    pub id: String,
    #[serde(default)]
    pub global_id: String,
    pub name: String,
    pub last_modified: DateTime<Utc>,
}

impl TagType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            global_id: String::new(),
            name: name.into(),
            last_modified: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_new() {
        let tag_type = TagType::new("location");
        let tag = Tag::new("home", tag_type.id.clone());
        assert_eq!(tag.name, "home");
        assert_eq!(tag.tag_type_id, tag_type.id);
    }

    #[test]
    fn test_tag_json_roundtrip() {
        let tag = Tag::new("home", "tt-1");
        let json = serde_json::to_string(&tag).unwrap();
        let parsed: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(tag, parsed);
    }
}
