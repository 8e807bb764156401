//! Schema-annotated text tree
//!
//! Every node's [`SchemaContext`] is resolved from the root context by the
//! node's path, then handed to [`node_label`] explicitly. Inline previews
//! use the field and element contexts of the node they preview.

use crate::config::InspectConfig;
use inspect_ir::{walk_from, ObjectPath, Segment, Traversal, Value};
use inspect_schema::SchemaContext;

/// Render `value`, located at `path` in the full tree, as indented lines.
///
/// `root_ctx` is the context of the whole tree, not of `value`.
pub fn render_tree(
    value: &Value,
    path: &ObjectPath,
    root_ctx: &SchemaContext,
    config: &InspectConfig,
) -> Vec<String> {
    let mut renderer = TreeRenderer {
        config,
        root: root_ctx.clone(),
        lines: Vec::new(),
    };
    walk_from(value, path, &mut renderer);
    renderer.lines
}

/// Label for one node: `key: body  // description`.
///
/// An expanded plain object shows only its name since its fields follow on
/// their own lines.
pub fn node_label(
    value: &Value,
    key: Option<&Segment>,
    ctx: &SchemaContext,
    expanded: bool,
    config: &InspectConfig,
) -> String {
    let mut label = String::new();
    if let Some(key) = key {
        label.push_str(&format!("{key}: "));
    }

    let body = match ctx.format_value(value) {
        Some(pretty) => pretty,
        None if expanded && value.is_plain_object() => ctx
            .get_display_name()
            .unwrap_or_else(|| value.type_name().to_string()),
        None => default_body(value, ctx, config),
    };
    label.push_str(&body);

    if config.show_descriptions {
        if let Some(description) = ctx.get_description() {
            label.push_str("  // ");
            label.push_str(&description);
        }
    }
    label
}

fn default_body(value: &Value, ctx: &SchemaContext, config: &InspectConfig) -> String {
    match value {
        Value::Object(obj) => {
            let mut entries: Vec<String> = obj
                .keys()
                .take(config.object_preview_max)
                .filter_map(|k| {
                    let field_ctx = ctx.get_field_context(k);
                    obj.get(k)
                        .map(|v| format!("{k}: {}", short_preview(v, &field_ctx)))
                })
                .collect();
            if obj.len() > config.object_preview_max {
                entries.push("…".to_string());
            }
            let preview = format!("{{{}}}", entries.join(", "));

            let name = if value.is_plain_object() {
                ctx.get_display_name()
            } else {
                Some(value.type_name().to_string())
            };
            match name {
                Some(name) => format!("{name} {preview}"),
                None => preview,
            }
        }
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) => {
            let element_ctx = ctx.get_element_context();
            let mut entries: Vec<String> = items
                .iter()
                .take(config.array_preview_max)
                .map(|item| short_preview(item, &element_ctx))
                .collect();
            if items.len() > config.array_preview_max {
                entries.push("…".to_string());
            }
            format!("({}) [{}]", items.len(), entries.join(", "))
        }
        other => other.to_string(),
    }
}

/// One preview entry: pretty value, else a plain object's display name
fn short_preview(value: &Value, ctx: &SchemaContext) -> String {
    if let Some(pretty) = ctx.format_value(value) {
        return pretty;
    }
    match value {
        Value::Object(obj) if value.is_plain_object() => match ctx.get_display_name() {
            Some(name) => name,
            None if obj.is_empty() => "{}".to_string(),
            None => "{…}".to_string(),
        },
        other => other.to_string(),
    }
}

struct TreeRenderer<'c> {
    config: &'c InspectConfig,
    root: SchemaContext,
    lines: Vec<String>,
}

impl TreeRenderer<'_> {
    fn context_for(&self, value: &Value, path: &ObjectPath) -> SchemaContext {
        let ctx = self.root.get_context_for_path(&path.to_string());
        if ctx.has_schema() {
            return ctx;
        }

        // Unresolved nodes fall back to a schema registered under the value's type name
        let by_type = ctx.for_value_type(value);
        if by_type.has_schema() { by_type } else { ctx }
    }

    fn expands(&self, value: &Value, depth: usize) -> bool {
        depth < self.config.max_depth && !value.children().is_empty()
    }
}

impl Traversal for TreeRenderer<'_> {
    fn visit(&mut self, value: &Value, path: &ObjectPath, depth: usize) {
        let ctx = self.context_for(value, path);
        let key = if depth == 0 { None } else { path.last() };
        let expanded = self.expands(value, depth);
        let label = node_label(value, key, &ctx, expanded, self.config);
        self.lines.push(format!("{}{label}", "  ".repeat(depth)));
    }

    fn descend(&self, _value: &Value, _path: &ObjectPath, depth: usize) -> bool {
        depth < self.config.max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspect_ir::Object;
    use inspect_schema::{create_context, Schema};

    fn dollars(v: &Value) -> inspect_schema::Result<Value> {
        let n = v.as_f64().unwrap_or_default();
        Ok(Value::String(format!("${n:.2}")))
    }

    fn order() -> Value {
        Value::from(
            Object::new()
                .field("id", 7)
                .field("total", 29.9)
                .field(
                    "lines",
                    Value::Array(vec![Value::from(Object::new().field("sku", "A-1"))]),
                ),
        )
    }

    fn order_schema() -> Schema {
        let line = Schema::struct_of([("sku", Schema::string().description("Stock code"))])
            .title("Line");
        Schema::struct_of([
            ("id", Schema::number()),
            ("total", Schema::number().pretty(dollars)),
            ("lines", Schema::array(line)),
        ])
        .title("Order")
    }

    #[test]
    fn test_render_without_schema() {
        let lines = render_tree(
            &order(),
            &ObjectPath::root(),
            SchemaContext::empty(),
            &InspectConfig::default(),
        );

        assert_eq!(
            lines,
            vec![
                "Object",
                "  id: 7",
                "  total: 29.9",
                "  lines: (1) [{…}]",
                "    0: Object",
                "      sku: \"A-1\"",
            ]
        );
    }

    #[test]
    fn test_render_with_schema() {
        let schema = order_schema();
        let ctx = create_context(Some(&schema), &[]);
        let lines = render_tree(&order(), &ObjectPath::root(), &ctx, &InspectConfig::default());

        assert_eq!(
            lines,
            vec![
                "Order",
                "  id: 7",
                "  total: $29.90",
                "  lines: (1) [Line]",
                "    0: Line",
                "      sku: \"A-1\"  // Stock code",
            ]
        );
    }

    #[test]
    fn test_collapsed_preview_uses_field_schemas() {
        let schema = Schema::struct_of([
            ("total", Schema::number().pretty(dollars)),
            ("address", Schema::struct_of([("city", Schema::string())]).title("Address")),
        ]);
        let ctx = create_context(Some(&schema), &[]);
        let value = Value::from(
            Object::new()
                .field("total", 29.9)
                .field("address", Object::new().field("city", "Oslo")),
        );

        let label = node_label(&value, None, &ctx, false, &InspectConfig::default());
        assert_eq!(label, "{total: $29.90, address: Address}");

        let config = InspectConfig {
            max_depth: 0,
            ..InspectConfig::default()
        };
        let lines = render_tree(&value, &ObjectPath::root(), &ctx, &config);
        assert_eq!(lines, vec!["{total: $29.90, address: Address}"]);
    }

    #[test]
    fn test_array_preview_uses_element_schema() {
        let schema = Schema::array(Schema::number().pretty(dollars));
        let ctx = create_context(Some(&schema), &[]);
        let value = Value::Array(vec![Value::from(1), Value::from(2.5)]);

        let label = node_label(&value, None, &ctx, false, &InspectConfig::default());
        assert_eq!(label, "(2) [$1.00, $2.50]");
    }

    #[test]
    fn test_empty_containers() {
        let ctx = SchemaContext::empty();
        let config = InspectConfig::default();

        assert_eq!(node_label(&Value::Array(Vec::new()), None, ctx, false, &config), "[]");

        let lines = render_tree(
            &Value::from(Object::new().field("items", Value::Array(Vec::new()))),
            &ObjectPath::root(),
            ctx,
            &config,
        );
        assert_eq!(lines, vec!["Object", "  items: []"]);
    }

    #[test]
    fn test_numeric_object_keys_resolve_like_paths() {
        let seven = Schema::number().pretty(|_| Ok(Value::from("SEVEN")));
        let schema = Schema::struct_of([("7", seven)]);
        let ctx = create_context(Some(&schema), &[]);
        let data = Value::from(Object::new().field("7", 1));

        assert_eq!(ctx.get_context_for_path("$.7").format_value(&Value::from(1)), None);

        let lines = render_tree(&data, &ObjectPath::root(), &ctx, &InspectConfig::default());
        assert_eq!(lines, vec!["Object", "  7: 1"]);
    }

    #[test]
    fn test_descriptions_can_be_hidden() {
        let schema = order_schema();
        let ctx = create_context(Some(&schema), &[]);
        let config = InspectConfig {
            show_descriptions: false,
            ..InspectConfig::default()
        };
        let lines = render_tree(&order(), &ObjectPath::root(), &ctx, &config);

        assert_eq!(lines[5], "      sku: \"A-1\"");
    }

    #[test]
    fn test_max_depth_stops_descent() {
        let config = InspectConfig {
            max_depth: 1,
            ..InspectConfig::default()
        };
        let lines = render_tree(&order(), &ObjectPath::root(), SchemaContext::empty(), &config);

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "  lines: (1) [{…}]");
    }

    #[test]
    fn test_previews_are_truncated() {
        let config = InspectConfig {
            object_preview_max: 2,
            array_preview_max: 3,
            ..InspectConfig::default()
        };
        let ctx = SchemaContext::empty();

        let obj = Value::from(Object::new().field("a", 1).field("b", 2).field("c", 3));
        assert_eq!(node_label(&obj, None, ctx, false, &config), "{a: 1, b: 2, …}");

        let arr = Value::Array((1..=5).map(Value::from).collect());
        assert_eq!(node_label(&arr, None, ctx, false, &config), "(5) [1, 2, 3, …]");
    }

    #[test]
    fn test_class_objects_show_class_name() {
        let value = Value::from(Object::with_class("Point").field("x", 1));
        let config = InspectConfig::default();

        let collapsed = node_label(&value, None, SchemaContext::empty(), false, &config);
        assert_eq!(collapsed, "Point {x: 1}");
        let expanded = node_label(&value, None, SchemaContext::empty(), true, &config);
        assert_eq!(expanded, "Point {x: 1}");
    }

    #[test]
    fn test_type_name_fallback() {
        let number = Schema::number().identifier("number").pretty(|v| {
            let n = v.as_f64().unwrap_or_default();
            Ok(Value::String(format!("{n:.1}")))
        });
        let ctx = create_context(None, &[number]);
        let data = Value::from(Object::new().field("count", 3));

        let lines = render_tree(&data, &ObjectPath::root(), &ctx, &InspectConfig::default());
        assert_eq!(lines, vec!["Object", "  count: 3.0"]);
    }

    #[test]
    fn test_subtree_resolves_from_root() {
        let schema = order_schema();
        let ctx = create_context(Some(&schema), &[]);
        let data = order();
        let cursor = inspect_ir::Cursor::new(&data).navigate("$.lines.0").unwrap();

        let lines = render_tree(
            cursor.value(),
            cursor.path(),
            &ctx,
            &InspectConfig::default(),
        );
        assert_eq!(lines, vec!["Line", "  sku: \"A-1\"  // Stock code"]);
    }
}
