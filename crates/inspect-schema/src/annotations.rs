//! Display-annotation extraction
//!
//! Annotations are read from the semantically meaningful node behind any
//! wrapper nodes: transformations show their `to` side, refinements their
//! base, suspended schemas their constructed target, and a union of one
//! non-nullish member plus nullish members shows that member.

use crate::ast::{AnnotationKey, AstKind, Keyword, PrettyFn, Schema};
use inspect_ir::Value;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::trace;

/// Maximum number of wrapper nodes followed by a single unwrap
pub const MAX_UNWRAP_DEPTH: usize = 64;

/// Display metadata extracted from one schema node
#[derive(Clone, Default)]
pub struct SchemaAnnotations {
    pub identifier: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub pretty: Option<PrettyFn>,
}

impl SchemaAnnotations {
    /// Title, else identifier
    pub fn display_name(&self) -> Option<&str> {
        get_display_name(self)
    }

    /// Format a value with the pretty annotation, if any
    pub fn format(&self, value: &Value) -> Option<String> {
        format_with_pretty(value, self)
    }

    pub fn is_empty(&self) -> bool {
        self.identifier.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.pretty.is_none()
    }
}

impl fmt::Debug for SchemaAnnotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaAnnotations")
            .field("identifier", &self.identifier)
            .field("title", &self.title)
            .field("description", &self.description)
            .field("has_pretty", &self.pretty.is_some())
            .finish()
    }
}

/// `undefined`, `void`, or the literal `null`
pub fn is_nullish(schema: &Schema) -> bool {
    matches!(
        schema.kind(),
        AstKind::Keyword(Keyword::Undefined | Keyword::Void) | AstKind::Literal(Value::Null)
    )
}

/// Unwrap display-transparent wrapper nodes.
///
/// Returns `None` when a suspended schema cannot be constructed or when more
/// than [`MAX_UNWRAP_DEPTH`] wrappers are chained (e.g. a lazy schema that only
/// refers to itself).
pub fn unwrap_for_display(schema: &Schema) -> Option<Schema> {
    let mut current = schema.clone();
    let mut remaining = MAX_UNWRAP_DEPTH;

    loop {
        let next = match current.kind() {
            AstKind::Transformation { to, .. } => Some(to.clone()),
            AstKind::Refinement { from, .. } => Some(from.clone()),
            AstKind::Suspend(thunk) => {
                let target = thunk();
                if target.is_none() {
                    trace!("Suspended schema produced no target");
                    return None;
                }
                target
            }
            AstKind::Union(members) => {
                let mut non_nullish = members.iter().filter(|member| !is_nullish(member));
                match (non_nullish.next(), non_nullish.next()) {
                    (Some(only), None) => Some(only.clone()),
                    _ => None,
                }
            }
            _ => None,
        };
        let Some(next) = next else {
            return Some(current);
        };

        if remaining == 0 {
            trace!(limit = MAX_UNWRAP_DEPTH, "Unwrap depth exhausted");
            return None;
        }
        remaining -= 1;
        current = next;
    }
}

/// Read the annotation bundle of exactly this node, without unwrapping
pub fn get_annotations_from_ast(schema: &Schema) -> SchemaAnnotations {
    let annotations = schema.annotations();
    SchemaAnnotations {
        identifier: annotations
            .text(&AnnotationKey::Identifier)
            .map(str::to_string),
        title: annotations.text(&AnnotationKey::Title).map(str::to_string),
        description: annotations
            .text(&AnnotationKey::Description)
            .map(str::to_string),
        pretty: annotations
            .get(&AnnotationKey::Pretty)
            .and_then(|a| a.as_pretty())
            .cloned(),
    }
}

/// Annotation bundle of the unwrapped node; empty if unwrapping fails
pub fn get_annotations(schema: &Schema) -> SchemaAnnotations {
    unwrap_for_display(schema)
        .map(|ast| get_annotations_from_ast(&ast))
        .unwrap_or_default()
}

/// Title if present, else identifier
pub fn get_display_name(annotations: &SchemaAnnotations) -> Option<&str> {
    annotations
        .title
        .as_deref()
        .or(annotations.identifier.as_deref())
}

/// Run the pretty formatter inside a failure boundary.
///
/// A formatter that errors, panics, or returns anything but a string yields
/// `None`. Some host schemas attach hooks rather than formatters under the
/// pretty key, so non-string results are expected.
///
/// Nothing is logged here. A panicking formatter still reaches the process
/// panic hook, which by default prints the message to stderr; embedders that
/// need silence install their own hook with [`std::panic::set_hook`].
pub fn format_with_pretty(value: &Value, annotations: &SchemaAnnotations) -> Option<String> {
    let pretty = annotations.pretty.as_ref()?;
    match panic::catch_unwind(AssertUnwindSafe(|| pretty(value))) {
        Ok(Ok(Value::String(formatted))) => Some(formatted),
        _ => None,
    }
}
