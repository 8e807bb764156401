//! Runtime values under inspection
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)] // Fluent setters are designed for chaining.

use crate::path::Segment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value in the inspected tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent value
    Undefined,

    /// Explicit null
    Null,

    /// Boolean value
    Bool(bool),

    /// Numeric value
    Number(f64),

    /// String value
    String(String),

    /// Ordered sequence
    Array(Vec<Value>),

    /// Keyed record
    Object(Object),
}

/// An object with ordered fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Object {
    /// Runtime type name reported for the object (None for plain objects)
    pub class_name: Option<String>,

    /// Fields in insertion order
    pub fields: Vec<(String, Value)>,
}

impl Object {
    /// Create an empty plain object
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty object carrying a runtime class name
    pub fn with_class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            fields: Vec::new(),
        }
    }

    /// Insert or replace a field, keeping the original position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    /// Builder-style insert
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// Get a field by exact key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Field keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Value {
    /// Name of the value's runtime type, used for name-based schema lookups
    pub fn type_name(&self) -> &str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "Array",
            Value::Object(obj) => obj.class_name.as_deref().unwrap_or("Object"),
        }
    }

    /// True for objects without a runtime class name
    pub fn is_plain_object(&self) -> bool {
        matches!(self, Value::Object(obj) if obj.class_name.is_none())
    }

    /// True for objects and arrays
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Array(_))
    }

    /// True for `undefined` and `null`
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Direct children with the path segment addressing each of them
    pub fn children(&self) -> Vec<(Segment, &Value)> {
        match self {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| (Segment::Index(idx), item))
                .collect(),
            Value::Object(obj) => obj
                .fields
                .iter()
                .map(|(k, v)| (Segment::Field(k.clone()), v))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Convert to JSON; `undefined` and non-finite numbers become null
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(obj) => serde_json::Value::Object(
                obj.fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Number rendering as a JavaScript-style inspector shows it
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Array(items) => write!(f, "Array({})", items.len()),
            Value::Object(obj) => write!(f, "{}", obj.class_name.as_deref().unwrap_or("Object")),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(Object {
                class_name: None,
                fields: map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            }),
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

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_structure() {
        let value = Value::from(json!({"name": "Ada", "tags": ["x", 1], "ok": true, "none": null}));
        let obj = value.as_object().unwrap();

        assert_eq!(obj.get("name"), Some(&Value::String("Ada".to_string())));
        assert_eq!(
            obj.get("tags"),
            Some(&Value::Array(vec![Value::from("x"), Value::Number(1.0)]))
        );
        assert_eq!(obj.get("ok"), Some(&Value::Bool(true)));
        assert_eq!(obj.get("none"), Some(&Value::Null));
        assert!(value.is_plain_object());
    }

    #[test]
    fn test_object_insert_replaces_in_place() {
        let mut obj = Object::new();
        obj.insert("a", Value::from(1));
        obj.insert("b", Value::from(2));
        obj.insert("a", Value::from(3));

        assert_eq!(obj.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(obj.get("a"), Some(&Value::Number(3.0)));
        assert_eq!(obj.len(), 2);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Undefined.type_name(), "undefined");
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(1).type_name(), "number");
        assert_eq!(Value::Array(vec![]).type_name(), "Array");
        assert_eq!(Value::from(Object::new()).type_name(), "Object");
        assert_eq!(Value::from(Object::with_class("Person")).type_name(), "Person");
        assert!(!Value::from(Object::with_class("Person")).is_plain_object());
    }

    #[test]
    fn test_display_defaults() {
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
        assert_eq!(Value::from(29.9).to_string(), "29.9");
        assert_eq!(Value::from(3).to_string(), "3");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Array(vec![Value::Null; 2]).to_string(), "Array(2)");
        assert_eq!(Value::Undefined.to_string(), "undefined");
    }

    #[test]
    fn test_children_segments() {
        let value = Value::Array(vec![Value::from("a"), Value::from("b")]);
        let children = value.children();

        assert_eq!(children.len(), 2);
        assert_eq!(children[1].0, Segment::Index(1));
        assert!(Value::from(1).children().is_empty());
    }

    #[test]
    fn test_to_json() {
        let value = Value::from(Object::new().field("a", Value::Undefined).field("b", 2));
        assert_eq!(value.to_json(), json!({"a": null, "b": 2.0}));
    }
}
