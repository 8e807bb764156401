#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # inspect-ir
//!
//! Runtime value tree, path grammar, and traversal APIs for schema-aware inspection.
//!
//! The tree renderer walks a [`Value`] and addresses every node with an
//! [`ObjectPath`] such as `$.items.0.name`. The same textual path is what the
//! schema layer resolves against a root schema, so both sides share the
//! parsing rules in [`path`].

/// Path grammar shared by the renderer and the schema resolver.
pub mod path;
/// Cursor-based navigation and path-emitting tree walks.
pub mod traversal;
/// Runtime values under inspection.
pub mod value;

/// Path types and parsing helpers.
pub use path::{ObjectPath, Segment};
/// Traversal entry points for navigating value trees.
pub use traversal::{walk, walk_from, Cursor, Traversal};
/// Value primitives.
pub use value::{Object, Value};

use thiserror::Error;

/// Errors that can occur when navigating a value tree
#[derive(Error, Debug)]
pub enum Error {
    #[error("Node not found at path: {path}")]
    NodeNotFound { path: String },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
}

impl Error {
    /// Build a node-not-found error with path context.
    pub fn node_not_found(path: impl Into<String>) -> Self {
        Self::NodeNotFound { path: path.into() }
    }

    /// Build a type-mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Crate-local result type for value-tree operations.
pub type Result<T> = std::result::Result<T, Error>;
