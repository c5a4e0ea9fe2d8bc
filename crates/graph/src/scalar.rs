use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute mapping of a node or an edge
pub type ItemData = BTreeMap<String, Scalar>;

/// The two kinds of graph items carrying attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Nodes,
    Edges,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::Nodes => write!(f, "nodes"),
            ItemType::Edges => write!(f, "edges"),
        }
    }
}

/// A single attribute value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Numeric value if this scalar is coercible to a finite number
    ///
    /// Numeric strings such as `"3.5"` coerce, booleans and null don't.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Scalar::Number(n) => *n,
            Scalar::String(s) => s.trim().parse::<f64>().ok()?,
            Scalar::Bool(_) | Scalar::Null => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Canonical text used to count distinct values
    pub(crate) fn key(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::String(s) => s.clone(),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value as f64)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            other => write!(f, "{}", other.key()),
        }
    }
}
