// ── File-backed device registry ──
//
// Reads the device list from a TOML file on every fetch, so edits to the
// file take effect on the next refresh.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use climate_skill_core::{CoreError, DeviceRegistry, RegistryRecord};

/// On-disk shape of the devices file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DevicesFile {
    #[serde(default)]
    pub devices: Vec<RegistryRecord>,
}

/// Registry that reads `[[devices]]` entries from a TOML file.
#[derive(Debug, Clone)]
pub struct FileRegistry {
    path: PathBuf,
}

impl FileRegistry {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DeviceRegistry for FileRegistry {
    async fn fetch_devices(&self) -> Result<Vec<RegistryRecord>, CoreError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CoreError::Registry {
                message: format!("cannot read {}: {e}", self.path.display()),
            })?;
        let file: DevicesFile = toml::from_str(&text).map_err(|e| CoreError::Registry {
            message: format!("cannot parse {}: {e}", self.path.display()),
        })?;
        debug!(path = %self.path.display(), records = file.devices.len(), "device file read");
        Ok(file.devices)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn devices_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn reads_records_in_file_order() {
        let file = devices_file(
            r#"
            [[devices]]
            name = "main thermostat"
            room = "livingroom"
            device_type = "hvac"
            attributes = { topic = "zigbee2mqtt/livingroom/climate/main/set" }

            [[devices]]
            name = "radiator"
            room = "bedroom"
            attributes = { topic = "bedroom/radiator/set", payload_set_template = "{\"target\": {{ temperature }}}" }
            "#,
        );

        let records = FileRegistry::new(file.path()).fetch_devices().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "main thermostat");
        assert_eq!(records[0].device_type.as_deref(), Some("hvac"));
        assert_eq!(
            records[0].attribute_str("topic"),
            Some("zigbee2mqtt/livingroom/climate/main/set")
        );
        assert_eq!(records[1].device_type, None);
        assert_eq!(
            records[1].attribute_str("payload_set_template"),
            Some(r#"{"target": {{ temperature }}}"#)
        );
    }

    #[tokio::test]
    async fn empty_file_has_no_devices() {
        let file = devices_file("");
        let records = FileRegistry::new(file.path()).fetch_devices().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn unreadable_or_malformed_files_are_registry_errors() {
        let missing = FileRegistry::new("/nonexistent/climate/devices.toml");
        assert!(matches!(
            missing.fetch_devices().await,
            Err(CoreError::Registry { .. })
        ));

        let file = devices_file("[[devices]]\nroom = 3\n");
        assert!(matches!(
            FileRegistry::new(file.path()).fetch_devices().await,
            Err(CoreError::Registry { .. })
        ));
    }
}
