//! Core of the climate skill for a voice-assistant message bus.
//!
//! The skill listens for classified intents, works out which thermostats
//! the user means, replies to the client and sends setpoint commands:
//!
//! - **[`Skill`]**: facade that routes inbound messages. Set requests are
//!   answered and dispatched as independent background tasks; help and
//!   unsupported intents get a single reply.
//!
//! - **[`Directory`]**: room-indexed device cache loaded from a
//!   [`DeviceRegistry`]. Readers see an immutable snapshot behind an atomic
//!   pointer; refresh swaps in a complete replacement.
//!
//! - **[`Resolver`]**: maps intent entities and the client's room onto
//!   target devices, a setpoint and a climate-relevance verdict.
//!
//! - **[`Renderer`]** and **[`Dispatcher`]**: template-driven reply text and
//!   per-device command payloads, published through a [`Publisher`].
//!
//! The crate does not read files or open network connections. Callers
//! supply a [`SkillConfig`], a registry, a publisher and a template source.

pub mod config;
pub mod directory;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod registry;
pub mod render;
pub mod resolver;
pub mod skill;
pub mod transport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClimatePolicy, ConfidenceThresholds, SkillConfig};
pub use directory::{Directory, DirectorySnapshot, RefreshSummary};
pub use dispatch::Dispatcher;
pub use error::CoreError;
pub use registry::{DeviceRegistry, RegistryRecord};
pub use render::{APOLOGY, BuiltinTemplates, Renderer, TemplateSource};
pub use resolver::Resolver;
pub use skill::{MISSING_TEMPERATURE_MESSAGE, NO_DEVICES_MESSAGE, Skill, UNSUPPORTED_MESSAGE};
pub use transport::{InboundMessage, Publisher, QoS, TransportError};

// Model types at the crate root for ergonomics.
pub use model::{
    ClassifiedIntent, ClientRequest, ClimateRelevance, Device, Entity, EntityType, IntentEntities,
    IntentRequest, IntentType, ResolvedParameters, TEMPERATURE_UNSET, Topic,
};
