// ── Immutable directory snapshot ──
//
// Built once from the registry and never mutated afterwards. Refresh
// builds a new one and swaps it in.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::warn;

use crate::model::Device;
use crate::registry::RegistryRecord;

/// Devices grouped by room, in registry order.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    by_room: IndexMap<String, Vec<Arc<Device>>>,
    loaded_at: Option<DateTime<Utc>>,
    rejected: usize,
}

impl DirectorySnapshot {
    /// The never-loaded snapshot a directory starts with.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Group already-validated devices by room.
    pub fn from_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        let mut by_room: IndexMap<String, Vec<Arc<Device>>> = IndexMap::new();
        for device in devices {
            by_room
                .entry(device.room.clone())
                .or_default()
                .push(Arc::new(device));
        }
        Self {
            by_room,
            loaded_at: Some(Utc::now()),
            rejected: 0,
        }
    }

    /// Validate registry records, skipping any that fail.
    pub fn from_records(records: &[RegistryRecord]) -> Self {
        let mut rejected = 0;
        let devices: Vec<Device> = records
            .iter()
            .filter_map(|record| match Device::from_record(record) {
                Ok(device) => Some(device),
                Err(e) => {
                    warn!(device = %record.name, error = %e, "skipping device");
                    rejected += 1;
                    None
                }
            })
            .collect();

        let mut snapshot = Self::from_devices(devices);
        snapshot.rejected = rejected;
        snapshot
    }

    /// Devices in `rooms`, following the caller's room order.
    ///
    /// A room named twice is only visited once; unknown rooms contribute
    /// nothing.
    pub fn devices_for<S: AsRef<str>>(&self, rooms: &[S]) -> Vec<Arc<Device>> {
        let mut seen: Vec<&str> = Vec::with_capacity(rooms.len());
        let mut devices = Vec::new();
        for room in rooms {
            let room = room.as_ref();
            if seen.contains(&room) {
                continue;
            }
            seen.push(room);
            if let Some(list) = self.by_room.get(room) {
                devices.extend(list.iter().cloned());
            }
        }
        devices
    }

    pub fn rooms(&self) -> impl Iterator<Item = &str> {
        self.by_room.keys().map(String::as_str)
    }

    pub fn devices(&self) -> impl Iterator<Item = &Arc<Device>> {
        self.by_room.values().flatten()
    }

    pub fn device_count(&self) -> usize {
        self.by_room.values().map(Vec::len).sum()
    }

    /// Registry records rejected while building this snapshot.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }
}
