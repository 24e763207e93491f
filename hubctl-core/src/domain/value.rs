//! Parameter and output values
//!
//! Values attached to instances are polymorphic on the wire: a string, a
//! number, a boolean or an arbitrary JSON document. They are decoded into a
//! tagged [`Value`] and paired with an explicit [`ValueKind`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind string the hub uses for secret values
pub const SECRET_KIND: &str = "secret";

/// Kind discriminant of a parameter or output
///
/// `secret` is the only kind with behavior attached to it; every other kind
/// string is preserved verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValueKind {
    Secret,
    Named(String),
}

impl ValueKind {
    pub fn is_secret(&self) -> bool {
        matches!(self, ValueKind::Secret)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ValueKind::Secret => SECRET_KIND,
            ValueKind::Named(name) => name,
        }
    }
}

impl From<String> for ValueKind {
    fn from(kind: String) -> Self {
        if kind == SECRET_KIND {
            ValueKind::Secret
        } else {
            ValueKind::Named(kind)
        }
    }
}

impl From<&str> for ValueKind {
    fn from(kind: &str) -> Self {
        ValueKind::from(kind.to_string())
    }
}

impl From<ValueKind> for String {
    fn from(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Secret => SECRET_KIND.to_string(),
            ValueKind::Named(name) => name,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parameter or output value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Number(serde_json::Number),
    String(String),
    Structured(serde_json::Value),
}

impl Value {
    /// Reference of a secret value
    ///
    /// Secrets are stored either as a bare reference string or as an object
    /// `{"secret": "<ref>"}`.
    pub fn secret_ref(&self) -> Option<&str> {
        match self {
            Value::String(reference) if !reference.is_empty() => Some(reference),
            Value::Structured(serde_json::Value::Object(map)) => map
                .get(SECRET_KIND)
                .and_then(|reference| reference.as_str())
                .filter(|reference| !reference.is_empty()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Structured(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_decodes_each_variant() {
        let values: Vec<Value> =
            serde_json::from_value(json!(["text", 42, 1.5, true, {"a": [1, 2]}])).unwrap();

        assert_eq!(values[0], Value::String("text".to_string()));
        assert!(matches!(values[1], Value::Number(_)));
        assert!(matches!(values[2], Value::Number(_)));
        assert_eq!(values[3], Value::Boolean(true));
        assert!(matches!(values[4], Value::Structured(_)));
    }

    #[test]
    fn test_value_display() {
        let number: Value = serde_json::from_value(json!(8080)).unwrap();
        let structured: Value = serde_json::from_value(json!({"a": 1})).unwrap();

        assert_eq!(number.to_string(), "8080");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(structured.to_string(), r#"{"a":1}"#);
    }

    #[test]
    fn test_secret_ref() {
        let bare = Value::from("db-password");
        let wrapped: Value = serde_json::from_value(json!({"secret": "abc123"})).unwrap();
        let other: Value = serde_json::from_value(json!({"value": "x"})).unwrap();

        assert_eq!(bare.secret_ref(), Some("db-password"));
        assert_eq!(wrapped.secret_ref(), Some("abc123"));
        assert_eq!(other.secret_ref(), None);
        assert_eq!(Value::Boolean(true).secret_ref(), None);
    }

    #[test]
    fn test_kind_round_trips_through_string() {
        let kind: ValueKind = serde_json::from_value(json!("secret")).unwrap();
        assert!(kind.is_secret());

        let kind: ValueKind = serde_json::from_value(json!("text")).unwrap();
        assert_eq!(kind, ValueKind::Named("text".to_string()));
        assert_eq!(serde_json::to_value(&kind).unwrap(), json!("text"));
    }
}
