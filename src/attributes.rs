//! Attribute bags and requirement validation
//!
//! Callers describe a monitoring asset as an ordered mapping from attribute
//! name to value. Each operation declares which attributes are obligated and
//! which are optional; validation runs once, before any element is built.

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Ordered attribute mapping supplied by the caller per operation
pub type AttributeBag = IndexMap<String, Value>;

/// A single attribute value
///
/// Values are coerced to text with default string conversion only; callers
/// are responsible for precision and formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text value
    Text(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Nested attribute mapping
    Map(AttributeBag),
    /// Ordered sequence of attribute mappings (repeatable group)
    List(Vec<AttributeBag>),
}

impl Value {
    /// Coerce a scalar value to text; nested structures have no text form
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Int(n) => Some(n.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Map(_) | Value::List(_) => None,
        }
    }

    /// Get the nested mapping, if this value is one
    pub fn as_map(&self) -> Option<&AttributeBag> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Get the sequence of mappings, if this value is one
    pub fn as_list(&self) -> Option<&[AttributeBag]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<AttributeBag> for Value {
    fn from(m: AttributeBag) -> Self {
        Value::Map(m)
    }
}

impl From<Vec<AttributeBag>> for Value {
    fn from(l: Vec<AttributeBag>) -> Self {
        Value::List(l)
    }
}

/// Obligation level of an attribute within an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obligation {
    /// Schema term for "required"
    Obligated,
    /// May be absent; absence is never an error
    Optional,
}

/// Per-operation requirement spec: attribute name plus obligation level
pub type Requirements = &'static [(&'static str, Obligation)];

/// Check an attribute bag against a requirement spec
///
/// Fails with [`Error::MissingRequiredAttribute`] for the first obligated
/// key absent from the bag. Optional keys are never required and unknown
/// keys pass through untouched, preserving the schema's openness to future
/// optional fields.
pub fn check_required(
    data: &AttributeBag,
    requirements: &[(&str, Obligation)],
    operation: &str,
) -> Result<()> {
    for (key, obligation) in requirements {
        if *obligation == Obligation::Obligated && !data.contains_key(*key) {
            return Err(Error::missing(operation, *key));
        }
    }
    Ok(())
}
