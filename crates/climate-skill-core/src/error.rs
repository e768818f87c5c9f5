// ── Core error types ──
//
// Errors surfaced by the skill core. Request handling never lets these
// escape: they end as a log line, a user message, or a silent drop.
// Construction-time failures (templates, config) are the only ones that
// reach the caller and stop the process.

use thiserror::Error;

use crate::transport::TransportError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation errors ────────────────────────────────────────────
    #[error("Invalid topic '{topic}': {reason}")]
    InvalidTopic { topic: String, reason: String },

    #[error("Device '{alias}' rejected: {reason}")]
    InvalidDevice { alias: String, reason: String },

    // ── Template errors ──────────────────────────────────────────────
    #[error("Template '{name}' is invalid: {message}")]
    Template { name: String, message: String },

    #[error("Critical templates failed to load: {}", names.join(", "))]
    MissingTemplates { names: Vec<String> },

    // ── Collaborator errors ──────────────────────────────────────────
    #[error("Device registry unavailable: {message}")]
    Registry { message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Cannot decode message on '{topic}': {message}")]
    Decode { topic: String, message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}
