use crate::script::ScriptFunction;
use derive_more::{Deref, DerefMut, From};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value of one layout parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ParameterValue {
    Boolean(bool),
    Number(f64),
    /// Name of a graph attribute field
    Attribute(String),
    Script(ScriptFunction),
}

impl ParameterValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ParameterValue::Boolean(_) => "boolean",
            ParameterValue::Number(_) => "number",
            ParameterValue::Attribute(_) => "attribute",
            ParameterValue::Script(_) => "script",
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Boolean(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Number(value)
    }
}

impl From<ScriptFunction> for ParameterValue {
    fn from(value: ScriptFunction) -> Self {
        ParameterValue::Script(value)
    }
}

/// Parameter values keyed by parameter id
///
/// The same type carries partial, user-edited settings and the complete
/// settings produced by validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Deref, DerefMut, From)]
#[serde(transparent)]
pub struct LayoutSettings(BTreeMap<String, ParameterValue>);

impl LayoutSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insertion
    pub fn with(mut self, id: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.0.insert(id.into(), value.into());
        self
    }

    pub fn boolean(&self, id: &str) -> Option<bool> {
        match self.0.get(id)? {
            ParameterValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn number(&self, id: &str) -> Option<f64> {
        match self.0.get(id)? {
            ParameterValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn attribute(&self, id: &str) -> Option<&str> {
        match self.0.get(id)? {
            ParameterValue::Attribute(field) => Some(field),
            _ => None,
        }
    }

    pub fn script(&self, id: &str) -> Option<&ScriptFunction> {
        match self.0.get(id)? {
            ParameterValue::Script(function) => Some(function),
            _ => None,
        }
    }
}

impl FromIterator<(String, ParameterValue)> for LayoutSettings {
    fn from_iter<I: IntoIterator<Item = (String, ParameterValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
