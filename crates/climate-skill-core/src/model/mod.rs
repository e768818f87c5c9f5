// ── Domain model ──

pub mod device;
pub mod intent;
pub mod parameters;

pub use device::{DEFAULT_PAYLOAD_TEMPLATE, Device, MAX_TOPIC_LENGTH, Topic};
pub use intent::{
    ClassifiedIntent, ClientRequest, Entity, EntityType, IntentEntities, IntentRequest, IntentType,
};
pub use parameters::{ClimateRelevance, ResolvedParameters, TEMPERATURE_UNSET};
