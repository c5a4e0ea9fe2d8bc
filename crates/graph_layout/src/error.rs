use crate::params::AttributeRestriction;
use crate::script::ScriptValidationError;
use crate::LayoutKind;
use graphwerk_graph::ItemType;
use std::any::Any;
use thiserror::Error;

/// A settings value rejected before any computation starts
#[derive(Debug, Error, Clone, PartialEq)]
#[error("invalid parameter {parameter:?}: {reason}")]
pub struct ValidationError {
    pub parameter: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(parameter: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            parameter: parameter.into(),
            reason,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationReason {
    #[error("{value} is outside [{min}, {max}]")]
    OutOfBounds { value: f64, min: f64, max: f64 },

    #[error("{0} is not a finite number")]
    NotFinite(f64),

    #[error("a value is required")]
    Missing,

    #[error("the layout has no such parameter")]
    UnknownParameter,

    #[error("expected a {expected} value, got a {found} value")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{item_type} have no attribute {field:?}")]
    UnknownAttribute { item_type: ItemType, field: String },

    #[error("attribute {field:?} is not {restriction}")]
    RestrictionMismatch {
        field: String,
        restriction: AttributeRestriction,
    },

    #[error(transparent)]
    Script(#[from] ScriptValidationError),
}

/// Misuse of the layout registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no layout registered with id {0:?}")]
    NotFound(String),

    #[error("a layout with id {0:?} is already registered")]
    DuplicateId(String),

    #[error("layout {layout:?} declares parameter {parameter:?} twice")]
    DuplicateParameter { layout: String, parameter: String },
}

/// Failure inside a layout algorithm
#[derive(Debug, Error)]
#[error("layout {layout:?} failed: {cause:#}")]
pub struct AlgorithmError {
    pub layout: String,
    pub cause: anyhow::Error,
}

/// Everything the layout controller can fail with
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),

    #[error("layout {layout:?} is a {actual} layout, not a {expected} one")]
    WrongKind {
        layout: String,
        expected: LayoutKind,
        actual: LayoutKind,
    },

    #[error("layout {layout:?} has no button {button:?}")]
    UnknownButton { layout: String, button: String },
}

/// Best effort text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
