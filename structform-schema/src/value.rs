//! Submitted and stored field values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar or, for multi-value columns, an ordered sequence of scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multi(Vec<String>),
}

impl FieldValue {
    /// The empty scalar.
    pub fn empty() -> Self {
        FieldValue::Single(String::new())
    }

    /// Empty string or empty sequence.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Single(s) => s.is_empty(),
            FieldValue::Multi(v) => v.is_empty(),
        }
    }

    /// Empty, or the scalar `"0"`. Such values count as "not given" for
    /// defaulting purposes.
    pub fn is_falsy(&self) -> bool {
        match self {
            FieldValue::Single(s) => s.is_empty() || s == "0",
            FieldValue::Multi(v) => v.is_empty(),
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, FieldValue::Multi(_))
    }

    /// Apply `f` to every scalar.
    pub fn map(&self, mut f: impl FnMut(&str) -> String) -> Self {
        match self {
            FieldValue::Single(s) => FieldValue::Single(f(s)),
            FieldValue::Multi(v) => FieldValue::Multi(v.iter().map(|s| f(s)).collect()),
        }
    }

    /// All scalars, one for a single value.
    pub fn values(&self) -> Vec<&str> {
        match self {
            FieldValue::Single(s) => vec![s.as_str()],
            FieldValue::Multi(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Single(s) => f.write_str(s),
            FieldValue::Multi(v) => f.write_str(&v.join(", ")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Single(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Single(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::Multi(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        FieldValue::Multi(value.into_iter().map(String::from).collect())
    }
}
