// ── Runtime skill configuration ──
//
// These types describe how the skill behaves on the bus. They never touch
// disk: the config crate (or an embedding application) builds a
// `SkillConfig` and hands it in.

use crate::model::IntentType;

/// Minimum classifier confidence per supported intent.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceThresholds {
    pub device_set: f64,
    pub system_help: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            device_set: 0.8,
            system_help: 0.7,
        }
    }
}

impl ConfidenceThresholds {
    /// Threshold for `intent`, or `None` when the skill does not handle it.
    pub fn for_intent(&self, intent: IntentType) -> Option<f64> {
        match intent {
            IntentType::DeviceSet => Some(self.device_set),
            IntentType::SystemHelp => Some(self.system_help),
            _ => None,
        }
    }
}

/// Vocabulary the climate-relevance filter matches against.
///
/// Comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClimatePolicy {
    pub device_types: Vec<String>,
    pub temperature_units: Vec<String>,
}

impl Default for ClimatePolicy {
    fn default() -> Self {
        Self {
            device_types: ["hvac", "thermostat", "climate", "heater"]
                .map(String::from)
                .to_vec(),
            temperature_units: [
                "celsius",
                "fahrenheit",
                "kelvin",
                "degree",
                "degrees",
                "°c",
                "°f",
                "c",
                "f",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl ClimatePolicy {
    pub fn is_climate_device_type(&self, candidate: &str) -> bool {
        contains_ignore_case(&self.device_types, candidate)
    }

    pub fn is_temperature_unit(&self, candidate: &str) -> bool {
        contains_ignore_case(&self.temperature_units, candidate)
    }
}

fn contains_ignore_case(list: &[String], candidate: &str) -> bool {
    let candidate = candidate.trim();
    list.iter().any(|item| item.eq_ignore_ascii_case(candidate))
}

/// Configuration for one running skill instance.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillConfig {
    /// Identifier used as the skill's client id on the bus.
    pub client_id: String,
    /// Prefix for the shared assistant topics.
    pub base_topic: String,
    pub thresholds: ConfidenceThresholds,
    pub climate: ClimatePolicy,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            client_id: "climate-skill".into(),
            base_topic: "assistant".into(),
            thresholds: ConfidenceThresholds::default(),
            climate: ClimatePolicy::default(),
        }
    }
}

impl SkillConfig {
    /// Topic the intent engine publishes classified requests on.
    pub fn intent_topic(&self) -> String {
        format!("{}/intent_engine/result", self.base_topic)
    }

    /// Topic carrying the empty "registry changed" notification.
    pub fn device_update_topic(&self) -> String {
        format!("{}/global_device_update", self.base_topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_derive_from_base() {
        let config = SkillConfig {
            base_topic: "home".into(),
            ..SkillConfig::default()
        };
        assert_eq!(config.intent_topic(), "home/intent_engine/result");
        assert_eq!(config.device_update_topic(), "home/global_device_update");
    }

    #[test]
    fn policy_matching_ignores_case() {
        let policy = ClimatePolicy::default();
        assert!(policy.is_climate_device_type("HVAC"));
        assert!(policy.is_temperature_unit("°C"));
        assert!(policy.is_temperature_unit(" Celsius "));
        assert!(!policy.is_temperature_unit("brightness"));
        assert!(!policy.is_climate_device_type("light"));
    }

    #[test]
    fn thresholds_only_cover_supported_intents() {
        let thresholds = ConfidenceThresholds::default();
        assert_eq!(thresholds.for_intent(IntentType::DeviceSet), Some(0.8));
        assert_eq!(thresholds.for_intent(IntentType::SystemHelp), Some(0.7));
        assert_eq!(thresholds.for_intent(IntentType::DeviceOn), None);
    }
}
