//! Scalar metadata values.
//!
//! The destination vector store can only index scalar metadata, so every
//! value attached to a fragment is restricted to this closed set.

use serde::{Deserialize, Serialize};

/// A metadata value the vector store can index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl MetaValue {
    /// Reduce an arbitrary JSON value to a storable scalar.
    ///
    /// Scalars pass through. A single-element string list is unwrapped to
    /// its element. Everything else (objects, multi-element or non-string
    /// lists) is dropped.
    pub fn sanitize(value: &serde_json::Value) -> Option<MetaValue> {
        use serde_json::Value;
        match value {
            Value::String(s) => Some(MetaValue::Str(s.clone())),
            Value::Bool(b) => Some(MetaValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(MetaValue::Int(i))
                } else {
                    n.as_f64().map(MetaValue::Float)
                }
            }
            Value::Null => Some(MetaValue::Null),
            Value::Array(items) => match items.as_slice() {
                [Value::String(s)] => Some(MetaValue::Str(s.clone())),
                _ => None,
            },
            Value::Object(_) => None,
        }
    }

    /// String form used when a backend wants a flat text payload.
    pub fn to_display_string(&self) -> String {
        match self {
            MetaValue::Str(s) => s.clone(),
            MetaValue::Int(i) => i.to_string(),
            MetaValue::Float(f) => f.to_string(),
            MetaValue::Bool(b) => b.to_string(),
            MetaValue::Null => String::new(),
        }
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Str(s)
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Str(s.to_string())
    }
}

impl From<i64> for MetaValue {
    fn from(i: i64) -> Self {
        MetaValue::Int(i)
    }
}

impl From<usize> for MetaValue {
    fn from(i: usize) -> Self {
        MetaValue::Int(i as i64)
    }
}

impl From<bool> for MetaValue {
    fn from(b: bool) -> Self {
        MetaValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_pass_through() {
        assert_eq!(
            MetaValue::sanitize(&json!("title")),
            Some(MetaValue::Str("title".into()))
        );
        assert_eq!(MetaValue::sanitize(&json!(3)), Some(MetaValue::Int(3)));
        assert_eq!(MetaValue::sanitize(&json!(1.5)), Some(MetaValue::Float(1.5)));
        assert_eq!(MetaValue::sanitize(&json!(true)), Some(MetaValue::Bool(true)));
        assert_eq!(MetaValue::sanitize(&json!(null)), Some(MetaValue::Null));
    }

    #[test]
    fn single_string_list_unwraps() {
        assert_eq!(
            MetaValue::sanitize(&json!(["author"])),
            Some(MetaValue::Str("author".into()))
        );
    }

    #[test]
    fn composites_are_dropped() {
        assert_eq!(MetaValue::sanitize(&json!(["a", "b"])), None);
        assert_eq!(MetaValue::sanitize(&json!([1])), None);
        assert_eq!(MetaValue::sanitize(&json!({"k": "v"})), None);
    }
}
