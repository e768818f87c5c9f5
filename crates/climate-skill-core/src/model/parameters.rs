// ── Resolved action parameters ──

use std::sync::Arc;

use super::device::Device;

/// Setpoint value meaning "the user did not give a temperature".
pub const TEMPERATURE_UNSET: i32 = 0;

/// Verdict of the climate-relevance filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClimateRelevance {
    /// No device-type or unit signal was present.
    #[default]
    Undetermined,
    /// At least one signal names a climate device type or temperature unit.
    Relevant,
    /// Signals were present and none of them is about climate.
    NotClimate,
}

impl ClimateRelevance {
    /// Whether the skill may answer the intent at all.
    pub fn may_proceed(self) -> bool {
        !matches!(self, Self::NotClimate)
    }

    /// Whether a climate signal was positively found.
    pub fn is_relevant(self) -> bool {
        matches!(self, Self::Relevant)
    }
}

/// Everything a handler needs to answer and act on an intent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedParameters {
    /// Target rooms, in the order the user named them.
    pub rooms: Vec<String>,
    /// Devices in those rooms. Empty means nothing was found.
    pub targets: Vec<Arc<Device>>,
    /// Requested setpoint, [`TEMPERATURE_UNSET`] when absent.
    pub temperature: i32,
    pub relevance: ClimateRelevance,
}

impl ResolvedParameters {
    /// Parameters for a non-action intent scoped to one room.
    pub fn for_room(room: impl Into<String>) -> Self {
        Self {
            rooms: vec![room.into()],
            ..Self::default()
        }
    }

    pub fn has_setpoint(&self) -> bool {
        self.temperature != TEMPERATURE_UNSET
    }

    pub fn target_aliases(&self) -> Vec<&str> {
        self.targets.iter().map(|d| d.alias.as_str()).collect()
    }
}
