// ── Device domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::registry::RegistryRecord;
use crate::render::{Template, Variable};

/// Longest topic a device may use.
pub const MAX_TOPIC_LENGTH: usize = 128;

/// Payload sent when a registry record does not provide its own template.
pub const DEFAULT_PAYLOAD_TEMPLATE: &str = r#"{"occupied_heating_setpoint": {{ temperature }}}"#;

/// A validated destination topic for device commands.
///
/// Rejects empty topics, control characters, whitespace, the MQTT
/// wildcards `#` and `+`, the reserved `$` prefix character, and
/// anything longer than [`MAX_TOPIC_LENGTH`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CoreError> {
        let raw = raw.as_ref();
        let invalid = |reason: String| CoreError::InvalidTopic {
            topic: raw.to_owned(),
            reason,
        };

        if raw.is_empty() {
            return Err(invalid("topic must not be empty".into()));
        }
        if let Some(bad) = raw.chars().find(|c| is_forbidden(*c)) {
            return Err(invalid(format!(
                "topic must not contain invalid characters (found {bad:?})"
            )));
        }
        let length = raw.chars().count();
        if length > MAX_TOPIC_LENGTH {
            return Err(invalid(format!(
                "topic length {length} exceeds maximum allowed limit ({MAX_TOPIC_LENGTH} characters)"
            )));
        }

        Ok(Self(raw.trim().to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_forbidden(c: char) -> bool {
    c <= '\u{19}' || c.is_whitespace() || matches!(c, '#' | '+' | '$')
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Topic {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

/// A climate-capable device as the skill sees it.
///
/// Immutable once built; a directory refresh replaces devices wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub alias: String,
    pub room: String,
    pub topic: Topic,
    pub device_type: Option<String>,
    pub payload_template: Template,
}

impl Device {
    /// Build a device that uses [`DEFAULT_PAYLOAD_TEMPLATE`].
    pub fn new(
        alias: impl Into<String>,
        room: impl Into<String>,
        topic: impl AsRef<str>,
    ) -> Result<Self, CoreError> {
        let alias = alias.into();
        let payload_template = parse_payload_template(&alias, DEFAULT_PAYLOAD_TEMPLATE)?;
        Ok(Self {
            topic: Topic::new(topic)?,
            room: room.into(),
            device_type: None,
            payload_template,
            alias,
        })
    }

    /// Replace the payload template, validating it.
    pub fn with_payload_template(mut self, source: &str) -> Result<Self, CoreError> {
        self.payload_template = parse_payload_template(&self.alias, source)?;
        Ok(self)
    }

    pub fn with_device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = Some(device_type.into());
        self
    }

    /// Translate a registry record, enforcing every construction invariant.
    pub fn from_record(record: &RegistryRecord) -> Result<Self, CoreError> {
        let rejected = |reason: &str| CoreError::InvalidDevice {
            alias: record.name.clone(),
            reason: reason.to_owned(),
        };

        let topic = record
            .attribute_str("topic")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| rejected("missing required 'topic' attribute"))?;
        let room = record
            .room
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| rejected("not assigned to a room"))?;

        let mut device = Self::new(record.name.clone(), room, topic)?;
        if let Some(template) = record.attribute_str("payload_set_template") {
            device = device.with_payload_template(template)?;
        }
        if let Some(ref device_type) = record.device_type {
            device = device.with_device_type(device_type.clone());
        }
        Ok(device)
    }

    /// Render the setpoint command for this device.
    pub fn render_payload(&self, temperature: i32) -> String {
        self.payload_template
            .render_with(|_| temperature.to_string())
    }
}

fn parse_payload_template(alias: &str, source: &str) -> Result<Template, CoreError> {
    Template::parse(format!("{alias} payload"), source, Variable::PAYLOAD).map_err(|e| {
        CoreError::InvalidDevice {
            alias: alias.to_owned(),
            reason: e.to_string(),
        }
    })
}
