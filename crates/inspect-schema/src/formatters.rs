//! Named pretty formatters
//!
//! Schema documents reference formatters by name since they cannot carry
//! code. Built-ins cover common display conventions; embedders can register
//! their own before loading.

use crate::ast::PrettyFn;
use crate::{Error, Result};
use inspect_ir::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Registry of pretty formatters addressable by name
#[derive(Clone, Default)]
pub struct FormatterRegistry {
    formatters: HashMap<String, PrettyFn>,
}

impl FormatterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in formatters
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register("currency", |v| {
                let n = expect_number(v, "currency")?;
                Ok(Value::String(format!("${n:.2}")))
            })
            .register("fixed2", |v| {
                let n = expect_number(v, "fixed2")?;
                Ok(Value::String(format!("{n:.2}")))
            })
            .register("percent", |v| {
                let n = expect_number(v, "percent")?;
                Ok(Value::String(format!("{:.1}%", n * 100.0)))
            })
            .register("uppercase", |v| {
                let s = expect_string(v, "uppercase")?;
                Ok(Value::String(s.to_uppercase()))
            })
            .register("lowercase", |v| {
                let s = expect_string(v, "lowercase")?;
                Ok(Value::String(s.to_lowercase()))
            })
            .register("json", |v| {
                serde_json::to_string(&v.to_json())
                    .map(Value::String)
                    .map_err(|e| Error::Format(format!("json: {e}")))
            });
        registry
    }

    /// Register a formatter, replacing any previous one with the same name
    pub fn register(
        &mut self,
        name: impl Into<String>,
        formatter: impl Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    ) -> &mut Self {
        self.formatters.insert(name.into(), Arc::new(formatter));
        self
    }

    /// Get a formatter by name
    pub fn get(&self, name: &str) -> Option<PrettyFn> {
        self.formatters.get(name).cloned()
    }

    /// Get a formatter by name or fail with [`Error::UnknownFormatter`]
    pub fn require(&self, name: &str) -> Result<PrettyFn> {
        self.get(name)
            .ok_or_else(|| Error::UnknownFormatter(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.formatters.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("formatters", &self.names())
            .finish()
    }
}

fn expect_number(value: &Value, formatter: &str) -> Result<f64> {
    value.as_f64().ok_or_else(|| {
        Error::Format(format!("{formatter} expects a number, got {}", value.type_name()))
    })
}

fn expect_string<'a>(value: &'a Value, formatter: &str) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        Error::Format(format!("{formatter} expects a string, got {}", value.type_name()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(name: &str, value: Value) -> Result<Value> {
        let registry = FormatterRegistry::with_builtins();
        let formatter = registry.require(name)?;
        formatter(&value)
    }

    #[test]
    fn test_currency() {
        assert_eq!(run("currency", Value::from(29.9)).unwrap(), Value::from("$29.90"));
        assert_eq!(run("currency", Value::from(3)).unwrap(), Value::from("$3.00"));
        assert!(run("currency", Value::from("3")).is_err());
    }

    #[test]
    fn test_percent_and_fixed() {
        assert_eq!(run("percent", Value::from(0.125)).unwrap(), Value::from("12.5%"));
        assert_eq!(run("fixed2", Value::from(2.5)).unwrap(), Value::from("2.50"));
    }

    #[test]
    fn test_case_formatters() {
        assert_eq!(run("uppercase", Value::from("abc")).unwrap(), Value::from("ABC"));
        assert_eq!(run("lowercase", Value::from("ABC")).unwrap(), Value::from("abc"));
        assert!(run("uppercase", Value::Null).is_err());
    }

    #[test]
    fn test_json() {
        let value = Value::Array(vec![Value::from(1), Value::Null]);
        assert_eq!(run("json", value).unwrap(), Value::from("[1.0,null]"));
    }

    #[test]
    fn test_unknown_formatter() {
        match run("roman", Value::from(4)) {
            Err(Error::UnknownFormatter(name)) => assert_eq!(name, "roman"),
            other => panic!("expected UnknownFormatter, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_registration_replaces() {
        let mut registry = FormatterRegistry::with_builtins();
        registry.register("currency", |_| Ok(Value::from("EUR")));

        let formatter = registry.get("currency").unwrap();
        assert_eq!(formatter(&Value::from(1)).unwrap(), Value::from("EUR"));
        assert!(registry.contains("json"));
        assert!(!FormatterRegistry::new().contains("json"));
    }
}
