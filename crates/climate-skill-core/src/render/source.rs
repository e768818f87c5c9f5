// ── Template sources ──

use crate::error::CoreError;

/// Where response template text comes from.
pub trait TemplateSource: Send + Sync {
    /// Load the raw text of template `name`, or `None` if it does not exist.
    fn load(&self, name: &str) -> Result<Option<String>, CoreError>;
}

/// Templates compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

impl BuiltinTemplates {
    const HELP: &'static str = include_str!("../../templates/help.tmpl");
    const SET_TEMPERATURE: &'static str = include_str!("../../templates/set_temperature.tmpl");
}

impl TemplateSource for BuiltinTemplates {
    fn load(&self, name: &str) -> Result<Option<String>, CoreError> {
        Ok(match name {
            "help.tmpl" => Some(Self::HELP.to_owned()),
            "set_temperature.tmpl" => Some(Self::SET_TEMPERATURE.to_owned()),
            _ => None,
        })
    }
}
