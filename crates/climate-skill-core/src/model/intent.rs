// ── Inbound intent types ──
//
// Wire shape of the requests produced by the intent engine. The free-form
// entity map is narrowed to named slots at the deserialization boundary;
// unknown categories are dropped there.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display};
use uuid::Uuid;

// ── IntentType ──────────────────────────────────────────────────────

/// Intent tag assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[non_exhaustive]
pub enum IntentType {
    #[serde(rename = "device.on")]
    #[strum(serialize = "device.on")]
    DeviceOn,
    #[serde(rename = "device.off")]
    #[strum(serialize = "device.off")]
    DeviceOff,
    #[serde(rename = "device.set")]
    #[strum(serialize = "device.set")]
    DeviceSet,
    #[serde(rename = "device.open")]
    #[strum(serialize = "device.open")]
    DeviceOpen,
    #[serde(rename = "device.close")]
    #[strum(serialize = "device.close")]
    DeviceClose,
    #[serde(rename = "media.play")]
    #[strum(serialize = "media.play")]
    MediaPlay,
    #[serde(rename = "media.stop")]
    #[strum(serialize = "media.stop")]
    MediaStop,
    #[serde(rename = "media.next")]
    #[strum(serialize = "media.next")]
    MediaNext,
    #[serde(rename = "media.volume_set")]
    #[strum(serialize = "media.volume_set")]
    MediaVolumeSet,
    #[serde(rename = "query.status")]
    #[strum(serialize = "query.status")]
    QueryStatus,
    #[serde(rename = "query.list")]
    #[strum(serialize = "query.list")]
    QueryList,
    #[serde(rename = "query.time")]
    #[strum(serialize = "query.time")]
    QueryTime,
    #[serde(rename = "scene.apply")]
    #[strum(serialize = "scene.apply")]
    SceneApply,
    #[serde(rename = "schedule.set")]
    #[strum(serialize = "schedule.set")]
    ScheduleSet,
    #[serde(rename = "system.help")]
    #[strum(serialize = "system.help")]
    SystemHelp,
    #[serde(rename = "system.refresh")]
    #[strum(serialize = "system.refresh")]
    SystemRefresh,
    #[serde(other, rename = "unknown")]
    #[strum(serialize = "unknown")]
    Unknown,
}

// ── Entities ────────────────────────────────────────────────────────

/// Kind of span the classifier extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Number,
    Room,
    Device,
    Duration,
    Time,
    #[serde(other)]
    Other,
}

/// A typed span extracted from user text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(default)]
    pub raw_text: String,
    pub normalized_value: Value,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub linked_to: Vec<Uuid>,
}

impl Entity {
    pub fn new(entity_type: EntityType, raw_text: impl Into<String>, normalized_value: Value) -> Self {
        Self {
            id: None,
            entity_type,
            raw_text: raw_text.into(),
            normalized_value,
            confidence: 1.0,
            metadata: Map::new(),
            linked_to: Vec::new(),
        }
    }

    pub fn number(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::new(EntityType::Number, value.to_string(), value)
    }

    pub fn room(name: &str) -> Self {
        Self::new(EntityType::Room, name, Value::String(name.to_owned()))
    }

    pub fn device(name: &str) -> Self {
        Self::new(EntityType::Device, name, Value::String(name.to_owned()))
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_owned(), value.into());
        self
    }

    /// Normalized value as text, for string-valued entities.
    pub fn normalized_str(&self) -> Option<&str> {
        self.normalized_value.as_str()
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    pub fn metadata_flag(&self, key: &str) -> bool {
        self.metadata.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Entity categories this skill reads, by canonical key.
pub mod category {
    pub const NUMBER: &str = "number";
    pub const ROOM: &str = "room";
    pub const DEVICE: &str = "device";
}

/// Entities grouped into the slots the resolver understands.
///
/// A category that was absent on the wire is an empty list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntentEntities {
    pub numbers: Vec<Entity>,
    pub rooms: Vec<Entity>,
    pub devices: Vec<Entity>,
}

impl IntentEntities {
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty() && self.rooms.is_empty() && self.devices.is_empty()
    }

    pub fn with_number(mut self, entity: Entity) -> Self {
        self.numbers.push(entity);
        self
    }

    pub fn with_room(mut self, entity: Entity) -> Self {
        self.rooms.push(entity);
        self
    }

    pub fn with_device(mut self, entity: Entity) -> Self {
        self.devices.push(entity);
        self
    }
}

impl From<HashMap<String, Vec<Entity>>> for IntentEntities {
    fn from(mut map: HashMap<String, Vec<Entity>>) -> Self {
        let entities = Self {
            numbers: map.remove(category::NUMBER).unwrap_or_default(),
            rooms: map.remove(category::ROOM).unwrap_or_default(),
            devices: map.remove(category::DEVICE).unwrap_or_default(),
        };
        for ignored in map.keys() {
            tracing::trace!(category = %ignored, "ignoring entity category");
        }
        entities
    }
}

impl<'de> Deserialize<'de> for IntentEntities {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        HashMap::<String, Vec<Entity>>::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for IntentEntities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = HashMap::new();
        for (key, list) in [
            (category::NUMBER, &self.numbers),
            (category::ROOM, &self.rooms),
            (category::DEVICE, &self.devices),
        ] {
            if !list.is_empty() {
                map.insert(key, list);
            }
        }
        map.serialize(serializer)
    }
}

// ── Requests ────────────────────────────────────────────────────────

/// Classifier output for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedIntent {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub intent_type: IntentType,
    pub confidence: f64,
    #[serde(default)]
    pub entities: IntentEntities,
    #[serde(default)]
    pub alternative_intents: Vec<Value>,
    #[serde(default)]
    pub raw_text: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ClassifiedIntent {
    pub fn new(intent_type: IntentType, confidence: f64, entities: IntentEntities) -> Self {
        Self {
            id: Uuid::new_v4(),
            intent_type,
            confidence,
            entities,
            alternative_intents: Vec::new(),
            raw_text: String::new(),
            timestamp: Utc::now(),
        }
    }
}

/// The originating client: where the request came from and where to reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRequest {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub text: String,
    pub room: String,
    pub output_topic: String,
}

impl ClientRequest {
    pub fn new(room: impl Into<String>, output_topic: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: String::new(),
            room: room.into(),
            output_topic: output_topic.into(),
        }
    }
}

/// A classified intent together with its client context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRequest {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub classified_intent: ClassifiedIntent,
    pub client_request: ClientRequest,
}

impl IntentRequest {
    pub fn new(classified_intent: ClassifiedIntent, client_request: ClientRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            classified_intent,
            client_request,
        }
    }
}
