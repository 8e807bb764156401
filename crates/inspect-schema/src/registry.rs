//! Name-indexed schema registry

use crate::annotations::get_annotations;
use crate::ast::Schema;
use std::collections::HashMap;
use tracing::trace;

/// Registry for looking up schemas by identifier, title, or explicit name
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under `name`, else its identifier, else its title.
    ///
    /// Schemas without a usable key are skipped. A later registration under
    /// the same key replaces the earlier one. Returns the key used.
    pub fn register(&mut self, schema: &Schema, name: Option<&str>) -> Option<String> {
        let key = match name {
            Some(name) => name.to_string(),
            None => {
                let annotations = get_annotations(schema);
                annotations.identifier.or(annotations.title)?
            }
        };

        if key.is_empty() {
            trace!("Skipping schema registration with empty key");
            return None;
        }

        if self.schemas.insert(key.clone(), schema.clone()).is_some() {
            trace!("Replaced registered schema: {}", key);
        }
        Some(key)
    }

    /// Get a schema by exact name
    pub fn lookup(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Check if a schema exists
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
