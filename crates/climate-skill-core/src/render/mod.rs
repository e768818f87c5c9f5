// ── Response rendering ──
//
// Every response template is loaded and checked up front; a skill that
// cannot render its core responses refuses to start. Rendering is then a
// pure lookup plus substitution.

mod source;
mod template;

use std::collections::HashMap;

use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{debug, error};

use crate::error::CoreError;
use crate::model::{IntentType, ResolvedParameters};

pub use source::{BuiltinTemplates, TemplateSource};
pub use template::{Template, Variable};

/// Reply used when no template exists for an intent.
pub const APOLOGY: &str = "Sorry, I couldn't process your request.";

/// Responses the skill renders from templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ResponseKind {
    Help,
    SetTemperature,
}

impl ResponseKind {
    pub fn template_name(self) -> &'static str {
        match self {
            Self::Help => "help.tmpl",
            Self::SetTemperature => "set_temperature.tmpl",
        }
    }

    pub fn for_intent(intent: IntentType) -> Option<Self> {
        match intent {
            IntentType::SystemHelp => Some(Self::Help),
            IntentType::DeviceSet => Some(Self::SetTemperature),
            _ => None,
        }
    }
}

/// Preloaded response templates keyed by response kind.
#[derive(Debug, Clone)]
pub struct Renderer {
    templates: HashMap<ResponseKind, Template>,
}

impl Renderer {
    /// Load and validate every required template from `source`.
    ///
    /// A single trailing newline is stripped from each template, so files
    /// saved by ordinary editors render without one.
    pub fn load(source: &dyn TemplateSource) -> Result<Self, CoreError> {
        let mut templates = HashMap::new();
        let mut failed = Vec::new();

        for kind in ResponseKind::iter() {
            let name = kind.template_name();
            match load_one(source, name) {
                Ok(template) => {
                    templates.insert(kind, template);
                }
                Err(e) => {
                    error!(template = name, error = %e, "failed to load template");
                    failed.push(name.to_owned());
                }
            }
        }

        if !failed.is_empty() {
            return Err(CoreError::MissingTemplates { names: failed });
        }
        debug!("all templates successfully loaded");
        Ok(Self { templates })
    }

    /// Render the response for `intent` against `parameters`.
    pub fn render(&self, intent: IntentType, parameters: &ResolvedParameters) -> String {
        let Some(template) = ResponseKind::for_intent(intent).and_then(|k| self.templates.get(&k))
        else {
            error!(%intent, "no template found for intent");
            return APOLOGY.to_owned();
        };
        template.render_with(|var| value_of(var, parameters))
    }
}

fn load_one(source: &dyn TemplateSource, name: &str) -> Result<Template, CoreError> {
    let text = source.load(name)?.ok_or_else(|| CoreError::Template {
        name: name.to_owned(),
        message: "template not found".into(),
    })?;
    let text = text.strip_suffix('\n').unwrap_or(&text);
    Template::parse(name, text, Variable::RESPONSE)
}

fn value_of(var: Variable, parameters: &ResolvedParameters) -> String {
    match var {
        Variable::Temperature => parameters.temperature.to_string(),
        Variable::Rooms => parameters.rooms.join(", "),
        Variable::Room => parameters.rooms.first().cloned().unwrap_or_default(),
        Variable::Targets => parameters.target_aliases().join(", "),
        Variable::TargetCount => parameters.targets.len().to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::Device;

    struct MapSource(HashMap<&'static str, &'static str>);

    impl TemplateSource for MapSource {
        fn load(&self, name: &str) -> Result<Option<String>, CoreError> {
            Ok(self.0.get(name).map(|s| (*s).to_owned()))
        }
    }

    fn set_parameters(temperature: i32, alias: &str) -> ResolvedParameters {
        ResolvedParameters {
            rooms: vec!["livingroom".into()],
            targets: vec![Arc::new(
                Device::new(alias, "livingroom", "livingroom/climate/main").unwrap(),
            )],
            temperature,
            ..ResolvedParameters::default()
        }
    }

    #[test]
    fn builtin_help_text() {
        let renderer = Renderer::load(&BuiltinTemplates).unwrap();
        let out = renderer.render(IntentType::SystemHelp, &ResolvedParameters::for_room("office"));
        assert_eq!(
            out,
            "Here is how you can use the ClimateSkill:\n- Say 'set the temperature to 22 degrees' to set a device."
        );
    }

    #[test]
    fn builtin_set_temperature_text() {
        let renderer = Renderer::load(&BuiltinTemplates).unwrap();
        assert_eq!(
            renderer.render(IntentType::DeviceSet, &set_parameters(22, "Living Room Thermostat")),
            "I have set the temperature to 22°C."
        );
        assert_eq!(
            renderer.render(IntentType::DeviceSet, &set_parameters(18, "Bedroom Thermostat")),
            "I have set the temperature to 18°C."
        );
    }

    #[test]
    fn custom_templates_see_rooms_and_targets() {
        let source = MapSource(HashMap::from([
            ("help.tmpl", "Ask me about {{ room }}."),
            (
                "set_temperature.tmpl",
                "{{ target_count }} device(s) in {{ rooms }} ({{ targets }}) set to {{ temperature }}.\n",
            ),
        ]));
        let renderer = Renderer::load(&source).unwrap();
        assert_eq!(
            renderer.render(IntentType::DeviceSet, &set_parameters(20, "main")),
            "1 device(s) in livingroom (main) set to 20."
        );
        assert_eq!(
            renderer.render(IntentType::SystemHelp, &ResolvedParameters::for_room("office")),
            "Ask me about office."
        );
    }

    #[test]
    fn missing_templates_fail_loading_with_every_name() {
        let source = MapSource(HashMap::new());
        match Renderer::load(&source) {
            Err(CoreError::MissingTemplates { names }) => {
                assert_eq!(names, vec!["help.tmpl", "set_temperature.tmpl"]);
            }
            other => panic!("expected MissingTemplates, got {other:?}"),
        }
    }

    #[test]
    fn invalid_template_fails_loading() {
        let source = MapSource(HashMap::from([
            ("help.tmpl", "help"),
            ("set_temperature.tmpl", "{{ humidity }}"),
        ]));
        assert!(matches!(
            Renderer::load(&source),
            Err(CoreError::MissingTemplates { names }) if names == vec!["set_temperature.tmpl"]
        ));
    }

    #[test]
    fn intent_without_template_gets_apology() {
        let renderer = Renderer::load(&BuiltinTemplates).unwrap();
        assert_eq!(
            renderer.render(IntentType::DeviceOn, &ResolvedParameters::default()),
            APOLOGY
        );
    }
}
