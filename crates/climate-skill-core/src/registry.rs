// ── Device registry seam ──
//
// The registry owns device persistence. The directory only ever asks it
// for the full list of records and builds a fresh snapshot from them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// One device entry as the registry stores it.
///
/// Skill-specific settings (`topic`, `payload_set_template`) live in the
/// free-form `attributes` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub name: String,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl RegistryRecord {
    /// Look up a string-valued attribute.
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}

/// Source of device records for the directory.
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// Fetch every device record assigned to this skill, in registry order.
    async fn fetch_devices(&self) -> Result<Vec<RegistryRecord>, CoreError>;
}
