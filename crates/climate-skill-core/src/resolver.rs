// ── Parameter resolution ──
//
// Turns an intent's entities plus the client's room into concrete
// targets and a setpoint. Never fails: anything it cannot interpret
// falls back to a default and is logged.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClimatePolicy;
use crate::directory::Directory;
use crate::model::{
    ClimateRelevance, Entity, IntentEntities, IntentType, ResolvedParameters, TEMPERATURE_UNSET,
};

const DEVICE_TYPE_KEY: &str = "device_type";
const GENERIC_KEY: &str = "is_generic";
const UNIT_KEY: &str = "unit";

/// Maps intents onto directory devices.
pub struct Resolver {
    directory: Arc<Directory>,
    policy: ClimatePolicy,
}

impl Resolver {
    pub fn new(directory: Arc<Directory>, policy: ClimatePolicy) -> Self {
        Self { directory, policy }
    }

    pub fn policy(&self) -> &ClimatePolicy {
        &self.policy
    }

    /// Resolve target rooms, devices and setpoint for one intent.
    ///
    /// Rooms default to `current_room` when the intent names none. For
    /// action intents the first number becomes the setpoint and the
    /// climate-relevance verdict is attached; deciding what to do with an
    /// unset setpoint or a non-climate verdict is left to the caller.
    pub fn resolve(
        &self,
        intent: IntentType,
        entities: &IntentEntities,
        current_room: &str,
    ) -> ResolvedParameters {
        let rooms: Vec<String> = if entities.rooms.is_empty() {
            vec![current_room.to_owned()]
        } else {
            entities.rooms.iter().map(room_name).collect()
        };
        let targets = self.directory.devices_for(&rooms);

        let mut parameters = ResolvedParameters {
            rooms,
            targets,
            ..ResolvedParameters::default()
        };

        if is_action(intent) {
            parameters.temperature = match entities.numbers.first() {
                Some(number) => setpoint(number),
                None => {
                    warn!(%intent, "no temperature value found in intent");
                    TEMPERATURE_UNSET
                }
            };
            parameters.relevance = self.relevance(entities);
        }

        debug!(
            %intent,
            rooms = ?parameters.rooms,
            targets = ?parameters.target_aliases(),
            temperature = parameters.temperature,
            relevance = ?parameters.relevance,
            "parameters resolved"
        );
        parameters
    }

    /// Decide whether the entities describe a climate request.
    ///
    /// Device-type signals are checked before the number's unit; any one
    /// valid signal makes the intent relevant. Signals that are present but
    /// all invalid make it not climate-related. With no signal at all the
    /// verdict is undetermined.
    pub fn relevance(&self, entities: &IntentEntities) -> ClimateRelevance {
        let mut signalled = false;

        for device in &entities.devices {
            if let Some(kind) = device.metadata_str(DEVICE_TYPE_KEY) {
                signalled = true;
                if self.policy.is_climate_device_type(kind) {
                    return ClimateRelevance::Relevant;
                }
            }
            if device.metadata_flag(GENERIC_KEY) {
                if let Some(name) = device.normalized_str() {
                    signalled = true;
                    if self.policy.is_climate_device_type(name) {
                        return ClimateRelevance::Relevant;
                    }
                }
            }
        }

        if let Some(unit) = entities
            .numbers
            .first()
            .and_then(|n| n.metadata_str(UNIT_KEY))
        {
            signalled = true;
            if self.policy.is_temperature_unit(unit) {
                return ClimateRelevance::Relevant;
            }
        }

        if signalled {
            ClimateRelevance::NotClimate
        } else {
            ClimateRelevance::Undetermined
        }
    }
}

/// Whether the intent asks the skill to change device state.
pub fn is_action(intent: IntentType) -> bool {
    matches!(intent, IntentType::DeviceSet)
}

fn room_name(entity: &Entity) -> String {
    match &entity.normalized_value {
        Value::String(name) => name.clone(),
        other => {
            debug!(raw = %entity.raw_text, value = %other, "room entity without text value");
            entity.raw_text.clone()
        }
    }
}

/// Read a number entity as whole degrees, truncating toward zero.
fn setpoint(entity: &Entity) -> i32 {
    let parsed = match &entity.normalized_value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .or_else(|| n.as_f64().and_then(truncate_degrees)),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(truncate_degrees),
        _ => None,
    };

    parsed.unwrap_or_else(|| {
        warn!(
            raw = %entity.raw_text,
            value = %entity.normalized_value,
            "unparsable temperature, treating as unspecified"
        );
        TEMPERATURE_UNSET
    })
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn truncate_degrees(value: f64) -> Option<i32> {
    let whole = value.trunc();
    (whole.is_finite() && whole >= f64::from(i32::MIN) && whole <= f64::from(i32::MAX))
        .then_some(whole as i32)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::directory::DirectorySnapshot;
    use crate::model::Device;
    use crate::registry::{DeviceRegistry, RegistryRecord};
    use crate::CoreError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct NoRegistry;

    #[async_trait]
    impl DeviceRegistry for NoRegistry {
        async fn fetch_devices(&self) -> Result<Vec<RegistryRecord>, CoreError> {
            Ok(Vec::new())
        }
    }

    fn resolver() -> Resolver {
        let directory = Arc::new(Directory::new(Arc::new(NoRegistry)));
        directory.replace(DirectorySnapshot::from_devices([
            Device::new("main thermostat", "livingroom", "livingroom/climate/main").unwrap(),
            Device::new("radiator", "bedroom", "bedroom/climate/radiator").unwrap(),
        ]));
        Resolver::new(directory, ClimatePolicy::default())
    }

    fn celsius(value: serde_json::Value) -> Entity {
        Entity::number(value).with_metadata("unit", "celsius")
    }

    #[test]
    fn rooms_default_to_current_room() {
        let params = resolver().resolve(
            IntentType::DeviceSet,
            &IntentEntities::default().with_number(celsius(json!(22))),
            "livingroom",
        );
        assert_eq!(params.rooms, vec!["livingroom".to_owned()]);
        assert_eq!(params.target_aliases(), vec!["main thermostat"]);
        assert_eq!(params.temperature, 22);
        assert_eq!(params.relevance, ClimateRelevance::Relevant);
    }

    #[test]
    fn named_rooms_override_current_room() {
        let entities = IntentEntities::default()
            .with_room(Entity::room("bedroom"))
            .with_room(Entity::room("livingroom"))
            .with_number(celsius(json!(19)));
        let params = resolver().resolve(IntentType::DeviceSet, &entities, "kitchen");
        assert_eq!(params.rooms, vec!["bedroom".to_owned(), "livingroom".to_owned()]);
        assert_eq!(params.target_aliases(), vec!["radiator", "main thermostat"]);
    }

    #[test]
    fn missing_number_leaves_sentinel() {
        let params = resolver().resolve(IntentType::DeviceSet, &IntentEntities::default(), "livingroom");
        assert_eq!(params.temperature, TEMPERATURE_UNSET);
        assert!(!params.has_setpoint());
        assert_eq!(params.relevance, ClimateRelevance::Undetermined);
    }

    #[test]
    fn number_forms_are_truncated_to_whole_degrees() {
        let r = resolver();
        for (value, expected) in [
            (json!(21.7), 21),
            (json!("23"), 23),
            (json!(" 18.2 "), 18),
            (json!(-3.9), -3),
        ] {
            let entities = IntentEntities::default().with_number(celsius(value));
            let params = r.resolve(IntentType::DeviceSet, &entities, "livingroom");
            assert_eq!(params.temperature, expected);
        }
    }

    #[test]
    fn malformed_numbers_fall_back_to_sentinel() {
        let r = resolver();
        for value in [json!("warm"), json!(null), json!([22]), json!(1e12)] {
            let entities = IntentEntities::default().with_number(celsius(value));
            let params = r.resolve(IntentType::DeviceSet, &entities, "livingroom");
            assert_eq!(params.temperature, TEMPERATURE_UNSET);
        }
    }

    #[test]
    fn non_action_intents_skip_setpoint_and_filter() {
        let entities = IntentEntities::default()
            .with_number(Entity::number(json!(40)).with_metadata("unit", "percent"));
        let params = resolver().resolve(IntentType::SystemHelp, &entities, "bedroom");
        assert_eq!(params.temperature, TEMPERATURE_UNSET);
        assert_eq!(params.relevance, ClimateRelevance::Undetermined);
        assert_eq!(params.target_aliases(), vec!["radiator"]);
    }

    #[test]
    fn brightness_number_is_not_climate() {
        let entities = IntentEntities::default()
            .with_number(Entity::number(json!(50)).with_metadata("unit", "brightness"));
        assert_eq!(resolver().relevance(&entities), ClimateRelevance::NotClimate);
    }

    #[test]
    fn device_signal_is_checked_before_unit() {
        let entities = IntentEntities::default()
            .with_device(Entity::device("thermostat").with_metadata("device_type", "hvac"))
            .with_number(Entity::number(json!(50)).with_metadata("unit", "brightness"));
        assert_eq!(resolver().relevance(&entities), ClimateRelevance::Relevant);
    }

    #[test]
    fn generic_device_mention_matches_by_name() {
        let generic = Entity::device("thermostat").with_metadata("is_generic", true);
        let entities = IntentEntities::default().with_device(generic);
        assert_eq!(resolver().relevance(&entities), ClimateRelevance::Relevant);

        let lamp = Entity::device("lamp").with_metadata("is_generic", true);
        let entities = IntentEntities::default().with_device(lamp);
        assert_eq!(resolver().relevance(&entities), ClimateRelevance::NotClimate);
    }

    #[test]
    fn light_device_with_temperature_unit_is_relevant() {
        let entities = IntentEntities::default()
            .with_device(Entity::device("ceiling").with_metadata("device_type", "light"))
            .with_number(celsius(json!(21)));
        assert_eq!(resolver().relevance(&entities), ClimateRelevance::Relevant);
    }

    #[test]
    fn resolution_is_idempotent() {
        let r = resolver();
        let entities = IntentEntities::default()
            .with_room(Entity::room("bedroom"))
            .with_number(celsius(json!(20)));
        let first = r.resolve(IntentType::DeviceSet, &entities, "livingroom");
        let second = r.resolve(IntentType::DeviceSet, &entities, "livingroom");
        assert_eq!(first, second);
    }
}
