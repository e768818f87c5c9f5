// ── Placeholder templates ──
//
// Literal text with `{{ name }}` placeholders. Templates are parsed and
// checked against the variables their context can supply when they are
// loaded, so rendering itself cannot fail.

use std::str::FromStr;

use strum::{AsRefStr, Display, EnumString};

use crate::error::CoreError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A value a template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Variable {
    Temperature,
    Rooms,
    Room,
    Targets,
    TargetCount,
}

impl Variable {
    /// Variables available to response templates.
    pub const RESPONSE: &'static [Variable] = &[
        Self::Temperature,
        Self::Rooms,
        Self::Room,
        Self::Targets,
        Self::TargetCount,
    ];

    /// Variables available to device payload templates.
    pub const PAYLOAD: &'static [Variable] = &[Self::Temperature];
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Variable),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source`, accepting only placeholders listed in `allowed`.
    pub fn parse(
        name: impl Into<String>,
        source: impl Into<String>,
        allowed: &[Variable],
    ) -> Result<Self, CoreError> {
        let name = name.into();
        let source = source.into();
        let invalid = |message: String| CoreError::Template {
            name: name.clone(),
            message,
        };

        let mut segments = Vec::new();
        let mut rest = source.as_str();
        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_owned()));
            }
            let after_open = &rest[start + OPEN.len()..];
            let end = after_open
                .find(CLOSE)
                .ok_or_else(|| invalid("unterminated '{{' placeholder".into()))?;
            let key = after_open[..end].trim();
            if key.is_empty() {
                return Err(invalid("empty placeholder".into()));
            }
            let variable = Variable::from_str(key)
                .ok()
                .filter(|v| allowed.contains(v))
                .ok_or_else(|| invalid(format!("unknown variable '{key}'")))?;
            segments.push(Segment::Placeholder(variable));
            rest = &after_open[end + CLOSE.len()..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_owned()));
        }

        Ok(Self {
            name,
            source,
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unparsed template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render with `value` supplying each placeholder.
    pub fn render_with(&self, value: impl Fn(Variable) -> String) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(var) => out.push_str(&value(*var)),
            }
        }
        out
    }
}
