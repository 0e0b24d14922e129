use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown wherever no value could be observed.
pub const NOT_APPLICABLE: &str = "N/A";

/// One typed attribute value: numeric, boolean, categorical or absent.
///
/// Deserialized untagged so raw JSON `4.5`, `true`, `"stainless"` and `null`
/// map onto the matching variant directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum AttributeValue {
    Boolean(bool),
    Numeric(f64),
    Categorical(String),
    #[default]
    NotApplicable,
}

/// The type tag of an [`AttributeValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Numeric,
    Boolean,
    Categorical,
    NotApplicable,
}

impl AttributeValue {
    /// The `"N/A"` categorical value used for unscored or unobserved attributes.
    pub fn not_available() -> Self {
        AttributeValue::Categorical(NOT_APPLICABLE.to_string())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            AttributeValue::Numeric(_) => ValueKind::Numeric,
            AttributeValue::Boolean(_) => ValueKind::Boolean,
            AttributeValue::Categorical(_) => ValueKind::Categorical,
            AttributeValue::NotApplicable => ValueKind::NotApplicable,
        }
    }

    #[inline]
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            AttributeValue::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_categorical(&self) -> Option<&str> {
        match self {
            AttributeValue::Categorical(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self, AttributeValue::NotApplicable)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Numeric(v) => write!(f, "{}", v),
            AttributeValue::Boolean(b) => write!(f, "{}", b),
            AttributeValue::Categorical(s) => f.write_str(s),
            AttributeValue::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Numeric(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Boolean(b)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Categorical(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Categorical(s)
    }
}
