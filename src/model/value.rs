//! Metadata value type carried by units, nodes and representations.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Value stored in a [`Metadata`](super::Metadata) map.
///
/// Covers what analyzers attach to semantic units:
/// - Scalars: Bool, Int, Float, String
/// - Containers: List, Map
///
/// Maps are ordered so that payload serialization stays deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum MetaValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<MetaValue>),
    Map(BTreeMap<String, MetaValue>),
}

// ============================================================================
// Type checking
// ============================================================================

impl MetaValue {
    pub fn is_null(&self) -> bool {
        matches!(self, MetaValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            MetaValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            MetaValue::Float(f) => Some(*f),
            MetaValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// False if any float inside the value is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        match self {
            MetaValue::Float(f) => f.is_finite(),
            MetaValue::List(items) => items.iter().all(MetaValue::is_finite),
            MetaValue::Map(m) => m.values().all(MetaValue::is_finite),
            _ => true,
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for MetaValue {
    fn from(b: bool) -> Self { MetaValue::Bool(b) }
}

impl From<i64> for MetaValue {
    fn from(i: i64) -> Self { MetaValue::Int(i) }
}

impl From<u32> for MetaValue {
    fn from(i: u32) -> Self { MetaValue::Int(i as i64) }
}

impl From<u8> for MetaValue {
    fn from(i: u8) -> Self { MetaValue::Int(i as i64) }
}

impl From<f64> for MetaValue {
    fn from(f: f64) -> Self { MetaValue::Float(f) }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self { MetaValue::String(s.to_string()) }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self { MetaValue::String(s) }
}

impl From<Vec<MetaValue>> for MetaValue {
    fn from(v: Vec<MetaValue>) -> Self { MetaValue::List(v) }
}

impl<T: Into<MetaValue>> From<Option<T>> for MetaValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => MetaValue::Null,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Null => write!(f, "null"),
            MetaValue::Bool(b) => write!(f, "{b}"),
            MetaValue::Int(i) => write!(f, "{i}"),
            MetaValue::Float(v) => write!(f, "{v}"),
            MetaValue::String(s) => write!(f, "'{s}'"),
            MetaValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            MetaValue::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(MetaValue::from("roi").to_string(), "'roi'");
        assert_eq!(MetaValue::Int(42).to_string(), "42");
        assert_eq!(MetaValue::Null.to_string(), "null");
        assert_eq!(MetaValue::from(vec![MetaValue::Int(1), MetaValue::Int(2)]).to_string(), "[1, 2]");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(MetaValue::from("x").as_str(), Some("x"));
        assert_eq!(MetaValue::Int(3).as_float(), Some(3.0));
        assert_eq!(MetaValue::Bool(true).as_int(), None);
        assert!(MetaValue::from(None::<i64>).is_null());
    }

    #[test]
    fn test_is_finite_looks_inside_containers() {
        assert!(MetaValue::Float(1.5).is_finite());
        assert!(!MetaValue::Float(f64::NAN).is_finite());
        assert!(!MetaValue::from(vec![("k", f64::NEG_INFINITY)]).is_finite());
        assert!(MetaValue::from(vec![MetaValue::Int(1), MetaValue::from("x")]).is_finite());
    }
}
