//! Field, element, and path resolution against a root schema

use crate::annotations::unwrap_for_display;
use crate::ast::{AstKind, Schema};
use inspect_ir::path::{is_index_segment, split_path};

/// Schema of a named property of a record schema.
///
/// Returns `None` unless the unwrapped schema is a record with a property of
/// exactly that name.
pub fn get_field_schema(schema: &Schema, field_name: &str) -> Option<Schema> {
    let ast = unwrap_for_display(schema)?;
    match ast.kind() {
        AstKind::TypeLiteral {
            property_signatures,
        } => property_signatures
            .iter()
            .find(|sig| sig.name == field_name)
            .and_then(|sig| unwrap_for_display(&sig.schema)),
        _ => None,
    }
}

/// Schema of the elements of a sequence schema.
///
/// Only the first rest type is exposed; fixed leading tuple slots are not
/// addressable here.
pub fn get_array_element_schema(schema: &Schema) -> Option<Schema> {
    let ast = unwrap_for_display(schema)?;
    match ast.kind() {
        AstKind::TupleType { rest, .. } => rest.first().and_then(unwrap_for_display),
        _ => None,
    }
}

/// Walk `segments` from `root`, treating all-digit segments as indices.
/// Once a step finds nothing the result stays absent.
pub fn resolve_schema_for_segments<S: AsRef<str>>(
    root: Option<&Schema>,
    segments: &[S],
) -> Option<Schema> {
    let mut current = root?.clone();
    for segment in segments {
        let segment = segment.as_ref();
        current = if is_index_segment(segment) {
            get_array_element_schema(&current)?
        } else {
            get_field_schema(&current, segment)?
        };
    }
    Some(current)
}

/// Schema describing the node at `path` (e.g. `$.items.0.name`)
pub fn resolve_schema_for_path(root: &Schema, path: &str) -> Option<Schema> {
    resolve_schema_for_segments(Some(root), &split_path(path))
}
