//! Sync envelope: the wire and storage representation shared by the local
//! replica and the remote store.
//!
//! Every synced entity travels as a [`SyncEnvelope`] carrying a globally
//! unique `global_id` (flat keyspace across all object types), the
//! last-write-wins `last_modified` timestamp, and a typed [`Payload`].
//! Timestamps serialize as RFC 3339 strings and round-trip losslessly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Quest, Tag, TagType, Waypoint};

/// The fixed set of synced object types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Quest,
    Waypoint,
    Tag,
    TagType,
}

impl ObjectType {
    /// All object types, in full-sync order.
    pub const ALL: [ObjectType; 4] = [
        ObjectType::Quest,
        ObjectType::Waypoint,
        ObjectType::Tag,
        ObjectType::TagType,
    ];

    /// Wire name used by the remote scan filter.
    pub fn name(&self) -> &'static str {
        match self {
            ObjectType::Quest => "quest",
            ObjectType::Waypoint => "waypoint",
            ObjectType::Tag => "tag",
            ObjectType::TagType => "tag_type",
        }
    }

    /// Filename of the local persisted collection for this type.
    pub fn filename(&self) -> &'static str {
        match self {
            ObjectType::Quest => "quests.json",
            ObjectType::Waypoint => "waypoints.json",
            ObjectType::Tag => "tags.json",
            ObjectType::TagType => "tag_types.json",
        }
    }

    /// Parses a wire name back into an object type.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "quest" => Some(ObjectType::Quest),
            "waypoint" => Some(ObjectType::Waypoint),
            "tag" => Some(ObjectType::Tag),
            "tag_type" => Some(ObjectType::TagType),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type-specific entity payload, tagged by object type on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "object_type", content = "payload", rename_all = "snake_case")]
pub enum Payload {
    Quest(Quest),
    Waypoint(Waypoint),
    Tag(Tag),
    TagType(TagType),
}

impl Payload {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Payload::Quest(_) => ObjectType::Quest,
            Payload::Waypoint(_) => ObjectType::Waypoint,
            Payload::Tag(_) => ObjectType::Tag,
            Payload::TagType(_) => ObjectType::TagType,
        }
    }

    pub fn global_id(&self) -> &str {
        match self {
            Payload::Quest(q) => &q.global_id,
            Payload::Waypoint(w) => &w.global_id,
            Payload::Tag(t) => &t.global_id,
            Payload::TagType(t) => &t.global_id,
        }
    }

    pub fn set_global_id(&mut self, global_id: String) {
        match self {
            Payload::Quest(q) => q.global_id = global_id,
            Payload::Waypoint(w) => w.global_id = global_id,
            Payload::Tag(t) => t.global_id = global_id,
            Payload::TagType(t) => t.global_id = global_id,
        }
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        match self {
            Payload::Quest(q) => q.last_modified,
            Payload::Waypoint(w) => w.last_modified,
            Payload::Tag(t) => t.last_modified,
            Payload::TagType(t) => t.last_modified,
        }
    }

    /// Stamps the entity's modification time.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        match self {
            Payload::Quest(q) => q.last_modified = now,
            Payload::Waypoint(w) => w.last_modified = now,
            Payload::Tag(t) => t.last_modified = now,
            Payload::TagType(t) => t.last_modified = now,
        }
    }
}

/// One synced item: `{global_id, object_type, last_modified, payload}`.
///
/// `global_id` and `last_modified` are duplicated out of the payload so
/// the remote store can key and filter items without decoding them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncEnvelope {
    pub global_id: String,
    pub last_modified: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: Payload,
}

impl SyncEnvelope {
    /// Wraps a payload, lifting its sync key and timestamp.
    pub fn new(payload: Payload) -> Self {
        Self {
            global_id: payload.global_id().to_string(),
            last_modified: payload.last_modified(),
            payload,
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.payload.object_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_object_type_names() {
        assert_eq!(ObjectType::Quest.name(), "quest");
        assert_eq!(ObjectType::TagType.name(), "tag_type");
        for ot in ObjectType::ALL {
            assert_eq!(ObjectType::from_name(ot.name()), Some(ot));
        }
        assert_eq!(ObjectType::from_name("bogus"), None);
    }

    #[test]
    fn test_object_type_filenames() {
        assert_eq!(ObjectType::Quest.filename(), "quests.json");
        assert_eq!(ObjectType::Waypoint.filename(), "waypoints.json");
        assert_eq!(ObjectType::Tag.filename(), "tags.json");
        assert_eq!(ObjectType::TagType.filename(), "tag_types.json");
    }

    #[test]
    fn test_envelope_wire_shape() {
        let mut quest = Quest::new("frontend");
        quest.global_id = "g-1".into();
        let envelope = SyncEnvelope::new(Payload::Quest(quest));

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["global_id"], "g-1");
        assert_eq!(value["object_type"], "quest");
        assert_eq!(value["payload"]["name"], "frontend");
        assert!(value["last_modified"].is_string());
    }

    #[test]
    fn test_envelope_lifts_payload_fields() {
        let mut wp = Waypoint::new("a");
        wp.global_id = "g-wp".into();
        let stamp = Utc.with_ymd_and_hms(2025, 1, 13, 18, 30, 0).unwrap();
        wp.last_modified = stamp;

        let envelope = SyncEnvelope::new(Payload::Waypoint(wp));
        assert_eq!(envelope.global_id, "g-wp");
        assert_eq!(envelope.last_modified, stamp);
        assert_eq!(envelope.object_type(), ObjectType::Waypoint);
    }

    #[test]
    fn test_envelope_roundtrip_millisecond_precision() {
        let mut wp = Waypoint::new("precise");
        wp.global_id = "g-ms".into();
        wp.last_modified = Utc.timestamp_millis_opt(1_736_793_000_123).unwrap();

        let envelope = SyncEnvelope::new(Payload::Waypoint(wp));
        let json = serde_json::to_string(&envelope).unwrap();
        let parsed: SyncEnvelope = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.last_modified, envelope.last_modified);
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_payload_touch_and_set_global_id() {
        let mut payload = Payload::Tag(Tag::new("home", "tt-1"));
        assert!(payload.global_id().is_empty());

        payload.set_global_id("g-tag".into());
        let stamp = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        payload.touch(stamp);

        assert_eq!(payload.global_id(), "g-tag");
        assert_eq!(payload.last_modified(), stamp);
        assert_eq!(payload.object_type(), ObjectType::Tag);
    }

    #[test]
    fn test_envelope_tag_type_wire_name() {
        let mut tt = TagType::new("location");
        tt.global_id = "g-tt".into();
        let value = serde_json::to_value(SyncEnvelope::new(Payload::TagType(tt))).unwrap();
        assert_eq!(value["object_type"], "tag_type");
    }
}
