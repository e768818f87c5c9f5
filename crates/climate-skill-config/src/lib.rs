//! Configuration for the climate skill binary.
//!
//! A TOML file merged over built-in defaults and `CLIMATE_SKILL_*`
//! environment overrides, translated into the core's `SkillConfig`. Also
//! provides the file-backed device registry and the template directory
//! source the binary wires into the skill.

mod registry;
mod templates;

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use climate_skill_core::{
    BuiltinTemplates, ClimatePolicy, ConfidenceThresholds, SkillConfig, TemplateSource, Topic,
};

pub use registry::{DevicesFile, FileRegistry};
pub use templates::DirectoryTemplates;

/// Environment variable prefix for overrides; nested keys split on `__`.
pub const ENV_PREFIX: &str = "CLIMATE_SKILL_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Client identifier on the message bus.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Prefix of the shared assistant topics.
    #[serde(default = "default_base_topic")]
    pub base_topic: String,

    /// Directory holding `help.tmpl` and `set_temperature.tmpl`.
    /// Built-in templates are used when unset.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,

    /// TOML file listing the skill's devices.
    #[serde(default = "default_devices_file")]
    pub devices_file: PathBuf,

    #[serde(default)]
    pub intents: IntentSettings,

    #[serde(default)]
    pub climate: ClimateSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            base_topic: default_base_topic(),
            templates_dir: None,
            devices_file: default_devices_file(),
            intents: IntentSettings::default(),
            climate: ClimateSettings::default(),
        }
    }
}

/// Minimum classifier confidence per handled intent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IntentSettings {
    #[serde(default = "default_device_set_confidence")]
    pub device_set_min_confidence: f64,

    #[serde(default = "default_system_help_confidence")]
    pub system_help_min_confidence: f64,
}

impl Default for IntentSettings {
    fn default() -> Self {
        Self {
            device_set_min_confidence: default_device_set_confidence(),
            system_help_min_confidence: default_system_help_confidence(),
        }
    }
}

/// Vocabulary for the climate-relevance filter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClimateSettings {
    #[serde(default = "default_device_types")]
    pub device_types: Vec<String>,

    #[serde(default = "default_temperature_units")]
    pub temperature_units: Vec<String>,
}

impl Default for ClimateSettings {
    fn default() -> Self {
        Self {
            device_types: default_device_types(),
            temperature_units: default_temperature_units(),
        }
    }
}

fn default_client_id() -> String {
    SkillConfig::default().client_id
}
fn default_base_topic() -> String {
    SkillConfig::default().base_topic
}
fn default_devices_file() -> PathBuf {
    PathBuf::from("devices.toml")
}
fn default_device_set_confidence() -> f64 {
    ConfidenceThresholds::default().device_set
}
fn default_system_help_confidence() -> f64 {
    ConfidenceThresholds::default().system_help
}
fn default_device_types() -> Vec<String> {
    ClimatePolicy::default().device_types
}
fn default_temperature_units() -> Vec<String> {
    ClimatePolicy::default().temperature_units
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the default config file path via platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "private-assistant", "climate-skill").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("climate-skill");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from `path` plus environment, then validate it.
///
/// A missing file is not an error: defaults and environment still apply.
/// Relative `templates_dir` and `devices_file` are resolved against the
/// directory holding the config file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let mut config: Config = figment.extract()?;
    config.validate()?;
    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Serialize config to TOML, e.g. for `check` output.
pub fn render_config(config: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}

impl Config {
    /// Reject values the skill cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(invalid("client_id", "must not be empty"));
        }
        if self.base_topic.trim().is_empty() {
            return Err(invalid("base_topic", "must not be empty"));
        }
        Topic::new(&self.base_topic).map_err(|e| invalid("base_topic", &e.to_string()))?;

        for (field, value) in [
            ("intents.device_set_min_confidence", self.intents.device_set_min_confidence),
            ("intents.system_help_min_confidence", self.intents.system_help_min_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, &format!("expected a value in [0, 1], got {value}")));
            }
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        if self.devices_file.is_relative() {
            self.devices_file = base.join(&self.devices_file);
        }
        if let Some(dir) = self.templates_dir.as_mut() {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }

    /// Runtime configuration for the skill core.
    pub fn skill_config(&self) -> SkillConfig {
        SkillConfig {
            client_id: self.client_id.clone(),
            base_topic: self.base_topic.trim().to_owned(),
            thresholds: ConfidenceThresholds {
                device_set: self.intents.device_set_min_confidence,
                system_help: self.intents.system_help_min_confidence,
            },
            climate: ClimatePolicy {
                device_types: self.climate.device_types.clone(),
                temperature_units: self.climate.temperature_units.clone(),
            },
        }
    }

    /// Device registry backed by `devices_file`.
    pub fn registry(&self) -> FileRegistry {
        FileRegistry::new(&self.devices_file)
    }

    /// Template source: the configured directory, or the built-in set.
    pub fn template_source(&self) -> Box<dyn TemplateSource> {
        match &self.templates_dir {
            Some(dir) => Box::new(DirectoryTemplates::new(dir)),
            None => Box::new(BuiltinTemplates),
        }
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}
