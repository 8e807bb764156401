//! Path-scoped schema context consumed by the tree renderer
//!
//! A [`SchemaContext`] is an immutable view bound to the schema at one node,
//! the root schema of the whole tree, and a shared registry. Child contexts
//! are cheap to derive and are passed explicitly to each node render.

use crate::annotations::{format_with_pretty, get_annotations, SchemaAnnotations};
use crate::ast::Schema;
use crate::registry::SchemaRegistry;
use crate::resolver::{get_array_element_schema, get_field_schema, resolve_schema_for_path};
use dashmap::DashMap;
use inspect_ir::Value;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::trace;

/// Resolved schemas keyed by path, shared by all contexts of one root
type PathCache = DashMap<String, Option<Schema>>;

static DEFAULT_CONTEXT: LazyLock<SchemaContext> = LazyLock::new(|| SchemaContext {
    schema: None,
    root_schema: None,
    registry: Arc::new(SchemaRegistry::new()),
    cache: Arc::new(PathCache::new()),
});

/// Immutable schema view for one node of the inspected tree
#[derive(Clone)]
pub struct SchemaContext {
    schema: Option<Schema>,
    root_schema: Option<Schema>,
    registry: Arc<SchemaRegistry>,
    cache: Arc<PathCache>,
}

/// Schema-derived display information for one value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayInfo {
    pub display_name: Option<String>,
    pub formatted_value: Option<String>,
    pub has_schema: bool,
}

/// Create the root context for a rendering session.
///
/// The root schema is registered first, then each auxiliary schema, by
/// identifier or title. Without a root schema and auxiliary schemas this is
/// the shared default context.
pub fn create_context(root_schema: Option<&Schema>, auxiliary: &[Schema]) -> SchemaContext {
    SchemaContext::new(root_schema.cloned(), auxiliary)
}

impl SchemaContext {
    /// See [`create_context`]
    pub fn new(root_schema: Option<Schema>, auxiliary: &[Schema]) -> Self {
        if root_schema.is_none() && auxiliary.is_empty() {
            return Self::default();
        }

        let mut registry = SchemaRegistry::new();
        for schema in root_schema.iter().chain(auxiliary) {
            registry.register(schema, None);
        }
        trace!(registered = registry.len(), "Created schema context");

        Self {
            schema: root_schema.clone(),
            root_schema,
            registry: Arc::new(registry),
            cache: Arc::new(PathCache::new()),
        }
    }

    /// The shared context used when no schema was configured
    pub fn empty() -> &'static SchemaContext {
        &DEFAULT_CONTEXT
    }

    /// True for the shared no-schema context and anything derived from it
    pub fn is_default(&self) -> bool {
        Arc::ptr_eq(&self.registry, &DEFAULT_CONTEXT.registry)
    }

    /// Context for another node of the same tree
    fn derive(&self, schema: Option<Schema>) -> Self {
        if self.is_default() {
            return Self::default();
        }
        Self {
            schema,
            root_schema: self.root_schema.clone(),
            registry: Arc::clone(&self.registry),
            cache: Arc::clone(&self.cache),
        }
    }

    /// Schema bound to this node, if known
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Root schema of the tree
    pub fn root_schema(&self) -> Option<&Schema> {
        self.root_schema.as_ref()
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn has_schema(&self) -> bool {
        self.schema.is_some()
    }

    /// Annotations of the bound schema; empty without one
    pub fn get_annotations(&self) -> SchemaAnnotations {
        self.schema
            .as_ref()
            .map(get_annotations)
            .unwrap_or_default()
    }

    /// Title, else identifier of the bound schema
    pub fn get_display_name(&self) -> Option<String> {
        self.get_annotations().display_name().map(str::to_string)
    }

    pub fn get_description(&self) -> Option<String> {
        self.get_annotations().description
    }

    /// Value rendered by the bound schema's pretty formatter
    pub fn format_value(&self, value: &Value) -> Option<String> {
        let schema = self.schema.as_ref()?;
        format_with_pretty(value, &get_annotations(schema))
    }

    /// Context for a named child of the current node
    pub fn get_field_context(&self, field_name: &str) -> Self {
        let schema = self
            .schema
            .as_ref()
            .and_then(|schema| get_field_schema(schema, field_name));
        self.derive(schema)
    }

    /// Context for the elements of the current sequence node
    pub fn get_element_context(&self) -> Self {
        let schema = self.schema.as_ref().and_then(get_array_element_schema);
        self.derive(schema)
    }

    /// Look up a registered schema by name
    pub fn lookup_by_name(&self, name: &str) -> Option<Schema> {
        self.registry.lookup(name).cloned()
    }

    /// Schema for a path such as `$.address.street`, always resolved from the root
    pub fn get_schema_for_path(&self, path: &str) -> Option<Schema> {
        let root = self.root_schema.as_ref()?;
        if let Some(cached) = self.cache.get(path).map(|entry| entry.value().clone()) {
            return cached;
        }

        let resolved = resolve_schema_for_path(root, path);
        if resolved.is_none() {
            trace!(path, "No schema for path");
        }
        self.cache.insert(path.to_string(), resolved.clone());
        resolved
    }

    /// Context for a path, resolved from the root regardless of the current node
    pub fn get_context_for_path(&self, path: &str) -> Self {
        self.derive(self.get_schema_for_path(path))
    }

    /// Context bound to the registry entry for the value's runtime type name
    pub fn for_value_type(&self, value: &Value) -> Self {
        self.derive(self.lookup_by_name(value.type_name()))
    }

    /// Display name and formatted value for `value`, optionally at a child field
    pub fn display_info(&self, value: &Value, field_name: Option<&str>) -> DisplayInfo {
        let field_ctx;
        let ctx = match field_name {
            Some(name) if !name.is_empty() => {
                field_ctx = self.get_field_context(name);
                &field_ctx
            }
            _ => self,
        };

        DisplayInfo {
            display_name: ctx.get_display_name(),
            formatted_value: ctx.format_value(value),
            has_schema: ctx.has_schema(),
        }
    }
}

impl Default for SchemaContext {
    fn default() -> Self {
        DEFAULT_CONTEXT.clone()
    }
}

impl fmt::Debug for SchemaContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaContext")
            .field("schema", &self.schema.as_ref().map(Schema::tag))
            .field("root_schema", &self.root_schema.as_ref().map(Schema::tag))
            .field("registered", &self.registry.len())
            .field("is_default", &self.is_default())
            .finish()
    }
}
