//! Typed description of layout options
//!
//! A layout declares its options as a list of [`LayoutParameter`]s. The
//! settings UI renders controls from them and [`validate`] turns a partial,
//! user-edited [`LayoutSettings`] into a complete one.

mod validate;
mod value;

pub use validate::{defaults, validate};
pub use value::{LayoutSettings, ParameterValue};

use crate::config::ScriptConfig;
use crate::error::{ValidationError, ValidationReason};
use crate::script::{ScriptFunction, ScriptGuard, ScriptValidationError};
use graphwerk_graph::{Graph, ItemType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of attribute an `attribute` parameter accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeRestriction {
    Qualitative,
    Quantitative,
}

impl fmt::Display for AttributeRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeRestriction::Qualitative => write!(f, "qualitative"),
            AttributeRestriction::Quantitative => write!(f, "quantitative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberParameter {
    pub default: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Increment used by the settings UI, not enforced
    pub step: Option<f64>,
}

impl NumberParameter {
    pub fn new(default: f64) -> Self {
        Self {
            default,
            min: None,
            max: None,
            step: None,
        }
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    fn check(&self, value: f64) -> Result<(), ValidationReason> {
        if !value.is_finite() {
            return Err(ValidationReason::NotFinite(value));
        }
        let min = self.min.unwrap_or(f64::NEG_INFINITY);
        let max = self.max.unwrap_or(f64::INFINITY);
        if value < min || value > max {
            return Err(ValidationReason::OutOfBounds { value, min, max });
        }
        Ok(())
    }
}

/// Acceptance check run on a script value
#[derive(Clone, Copy)]
pub struct ScriptCheck(
    pub fn(&ScriptFunction, &dyn Graph, &ScriptConfig) -> Result<(), ScriptValidationError>,
);

impl ScriptCheck {
    pub fn run(
        &self,
        function: &ScriptFunction,
        graph: &dyn Graph,
        config: &ScriptConfig,
    ) -> Result<(), ScriptValidationError> {
        (self.0)(function, graph, config)
    }
}

impl Default for ScriptCheck {
    fn default() -> Self {
        Self(positioning_check)
    }
}

fn positioning_check(
    function: &ScriptFunction,
    graph: &dyn Graph,
    config: &ScriptConfig,
) -> Result<(), ScriptValidationError> {
    ScriptGuard::new(config.clone()).check(function, graph)
}

impl fmt::Debug for ScriptCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScriptCheck")
    }
}

#[derive(Debug, Clone)]
pub struct ScriptParameter {
    pub default: ScriptFunction,
    /// Documentation shown next to the script editor
    pub function_doc: String,
    pub check: ScriptCheck,
}

#[derive(Debug, Clone)]
pub enum ParameterKind {
    Boolean {
        default: bool,
    },
    Number(NumberParameter),
    Attribute {
        item_type: ItemType,
        restriction: Option<AttributeRestriction>,
    },
    Script(ScriptParameter),
}

impl ParameterKind {
    pub fn name(&self) -> &'static str {
        match self {
            ParameterKind::Boolean { .. } => "boolean",
            ParameterKind::Number(_) => "number",
            ParameterKind::Attribute { .. } => "attribute",
            ParameterKind::Script(_) => "script",
        }
    }

    /// Value used when the settings don't provide one
    pub fn default_value(&self) -> Option<ParameterValue> {
        match self {
            ParameterKind::Boolean { default } => Some(ParameterValue::Boolean(*default)),
            ParameterKind::Number(number) => Some(ParameterValue::Number(number.default)),
            ParameterKind::Attribute { .. } => None,
            ParameterKind::Script(script) => Some(ParameterValue::Script(script.default.clone())),
        }
    }
}

/// One configurable option of a layout
#[derive(Debug, Clone)]
pub struct LayoutParameter {
    /// Unique within its layout
    pub id: String,
    /// Whether the UI has a description text for this parameter
    pub description: bool,
    pub required: bool,
    pub kind: ParameterKind,
}

impl LayoutParameter {
    fn new(id: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            id: id.into(),
            description: false,
            required: false,
            kind,
        }
    }

    pub fn boolean(id: impl Into<String>, default: bool) -> Self {
        Self::new(id, ParameterKind::Boolean { default })
    }

    pub fn number(id: impl Into<String>, number: NumberParameter) -> Self {
        Self::new(id, ParameterKind::Number(number))
    }

    pub fn attribute(
        id: impl Into<String>,
        item_type: ItemType,
        restriction: Option<AttributeRestriction>,
    ) -> Self {
        Self::new(
            id,
            ParameterKind::Attribute {
                item_type,
                restriction,
            },
        )
    }

    pub fn script(
        id: impl Into<String>,
        default: ScriptFunction,
        function_doc: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            ParameterKind::Script(ScriptParameter {
                default,
                function_doc: function_doc.into(),
                check: ScriptCheck::default(),
            }),
        )
    }

    pub fn described(mut self) -> Self {
        self.description = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Replace the acceptance check of a script parameter
    pub fn with_script_check(mut self, check: ScriptCheck) -> Self {
        if let ParameterKind::Script(script) = &mut self.kind {
            script.check = check;
        }
        self
    }

    /// Parse a textual value, as typed on a command line, for this parameter
    pub fn parse_value(&self, text: &str) -> Result<ParameterValue, ValidationError> {
        let invalid = |found| {
            ValidationError::new(
                &self.id,
                ValidationReason::TypeMismatch {
                    expected: self.kind.name(),
                    found,
                },
            )
        };
        match &self.kind {
            ParameterKind::Boolean { .. } => text
                .trim()
                .parse()
                .map(ParameterValue::Boolean)
                .map_err(|_| invalid("text")),
            ParameterKind::Number(_) => text
                .trim()
                .parse()
                .map(ParameterValue::Number)
                .map_err(|_| invalid("text")),
            ParameterKind::Attribute { .. } => Ok(ParameterValue::Attribute(text.to_string())),
            ParameterKind::Script(_) => Ok(ParameterValue::Script(ScriptFunction::new(text))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn number_bounds_are_inclusive() {
        let number = NumberParameter::new(5.0).min(0.0).max(10.0);
        assert!(number.check(0.0).is_ok());
        assert!(number.check(10.0).is_ok());
        assert_eq!(
            number.check(10.5),
            Err(ValidationReason::OutOfBounds {
                value: 10.5,
                min: 0.0,
                max: 10.0
            })
        );
        assert_eq!(
            number.check(f64::NAN).map_err(|e| e.to_string()),
            Err("NaN is not a finite number".to_string())
        );
    }

    #[test]
    fn unbounded_numbers_accept_anything_finite() {
        let number = NumberParameter::new(0.0);
        assert!(number.check(-1e12).is_ok());
        assert!(number.check(f64::INFINITY).is_err());
    }

    #[test]
    fn parses_command_line_values() {
        let flag = LayoutParameter::boolean("flag", false);
        assert_eq!(flag.parse_value("true"), Ok(ParameterValue::Boolean(true)));
        assert!(flag.parse_value("yes").is_err());

        let scale = LayoutParameter::number("scale", NumberParameter::new(1.0));
        assert_eq!(scale.parse_value(" 2.5"), Ok(ParameterValue::Number(2.5)));
        let err = scale.parse_value("big").unwrap_err();
        assert_eq!(err.parameter, "scale");

        let field = LayoutParameter::attribute("field", ItemType::Nodes, None);
        assert_eq!(
            field.parse_value("color"),
            Ok(ParameterValue::Attribute("color".into()))
        );
    }
}
