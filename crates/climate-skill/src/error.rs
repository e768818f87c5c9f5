//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help
//! text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use climate_skill_config::ConfigError;
use climate_skill_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const REGISTRY: i32 = 4;
    pub const TRANSPORT: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(
        code(climate_skill::validation),
        help("Fix the value in {path} or the matching CLIMATE_SKILL_* variable.")
    )]
    Validation {
        field: String,
        reason: String,
        path: String,
    },

    #[error("Could not load configuration from {path}")]
    #[diagnostic(code(climate_skill::config))]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("Critical templates failed to load: {}", names.join(", "))]
    #[diagnostic(
        code(climate_skill::templates),
        help(
            "Every response template must exist and parse.\n\
             Check templates_dir in the config, or unset it to use the built-in templates."
        )
    )]
    Templates { names: Vec<String> },

    // ── Registry ─────────────────────────────────────────────────────
    #[error("Device registry unavailable: {message}")]
    #[diagnostic(
        code(climate_skill::registry),
        help("Check devices_file in the config and the [[devices]] entries it contains.")
    )]
    Registry { message: String },

    // ── Runtime ──────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(climate_skill::transport))]
    Transport(climate_skill_core::TransportError),

    #[error(transparent)]
    #[diagnostic(code(climate_skill::core))]
    Core(CoreError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(climate_skill::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => exit_code::USAGE,
            Self::Config { .. } | Self::Templates { .. } => exit_code::CONFIG,
            Self::Registry { .. } => exit_code::REGISTRY,
            Self::Transport(_) => exit_code::TRANSPORT,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the config file path to a config loading failure.
    pub fn from_config(err: ConfigError, path: &std::path::Path) -> Self {
        let path = path.display().to_string();
        match err {
            ConfigError::Validation { field, reason } => Self::Validation {
                field,
                reason,
                path,
            },
            source => Self::Config { path, source },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MissingTemplates { names } => Self::Templates { names },
            CoreError::Template { name, message } => {
                tracing::debug!(template = %name, %message, "template rejected");
                Self::Templates { names: vec![name] }
            }
            CoreError::Registry { message } => Self::Registry { message },
            CoreError::Transport(e) => Self::Transport(e),
            other => Self::Core(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use climate_skill_core::TransportError;

    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let validation = CliError::from_config(
            ConfigError::Validation {
                field: "base_topic".into(),
                reason: "must not be empty".into(),
            },
            Path::new("/etc/climate.toml"),
        );
        assert_eq!(validation.exit_code(), exit_code::USAGE);

        let templates = CliError::from(CoreError::MissingTemplates {
            names: vec!["help.tmpl".into()],
        });
        assert_eq!(templates.exit_code(), exit_code::CONFIG);
        assert_eq!(
            templates.to_string(),
            "Critical templates failed to load: help.tmpl"
        );

        let registry = CliError::from(CoreError::Registry {
            message: "file missing".into(),
        });
        assert_eq!(registry.exit_code(), exit_code::REGISTRY);

        let transport = CliError::from(CoreError::Transport(TransportError::Closed));
        assert_eq!(transport.exit_code(), exit_code::TRANSPORT);
    }
}
