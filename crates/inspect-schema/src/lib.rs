//! # inspect-schema
//!
//! Schema-path resolution and annotation extraction for value inspection.
//!
//! Given a root schema describing the shape of a value and a path identifying
//! a node inside the actual data tree, this crate finds the sub-schema that
//! describes the node and derives display metadata from it: a name, a
//! description, and an optional pretty formatter.
//!
//! Missing schema information is never an error. Every lookup returns an
//! absent result instead, and callers fall back to generic rendering.
//!
//! ```rust
//! use inspect_schema::{create_context, Schema};
//!
//! let address = Schema::struct_of([("street", Schema::string())]).title("Address");
//! let person = Schema::struct_of([("name", Schema::string()), ("address", address)]);
//!
//! let ctx = create_context(Some(&person), &[]);
//! let address_ctx = ctx.get_context_for_path("$.address");
//! assert_eq!(address_ctx.get_display_name().as_deref(), Some("Address"));
//! assert!(ctx.get_context_for_path("$.phone").schema().is_none());
//! ```

pub mod annotations;
pub mod ast;
pub mod context;
pub mod formatters;
pub mod loader;
pub mod registry;
pub mod resolver;

pub use annotations::{
    format_with_pretty, get_annotations, get_annotations_from_ast, get_display_name, is_nullish,
    unwrap_for_display, SchemaAnnotations, MAX_UNWRAP_DEPTH,
};
pub use ast::{
    Annotation, AnnotationKey, Annotations, Ast, AstKind, AstTag, Keyword, PrettyFn,
    PropertySignature, Schema, TupleElement,
};
pub use context::{create_context, DisplayInfo, SchemaContext};
pub use formatters::FormatterRegistry;
pub use loader::{SchemaLoader, SchemaSet};
pub use registry::SchemaRegistry;
pub use resolver::{get_array_element_schema, get_field_schema, resolve_schema_for_path};

use thiserror::Error;

/// Errors that can occur when loading schemas or running formatters
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema not found: {0}")]
    NotFound(String),

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("Unknown formatter: {0}")]
    UnknownFormatter(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
