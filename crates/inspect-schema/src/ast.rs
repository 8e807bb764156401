//! Schema AST model
//!
//! A [`Schema`] is a shared handle to an immutable [`Ast`] node. Nodes are
//! never mutated after construction; the annotation helpers return new nodes
//! that share their children with the source.

use inspect_ir::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Pretty-print hook attached to a schema node.
///
/// Formatters may fail or produce a non-string value; both are treated as
/// "no formatted value" by the annotation layer.
pub type PrettyFn = Arc<dyn Fn(&Value) -> crate::Result<Value> + Send + Sync>;

/// Deferred constructor of a lazily defined (possibly self-referential) schema.
/// Returns `None` when the referenced definition is no longer available.
pub type SuspendFn = Arc<dyn Fn() -> Option<Schema> + Send + Sync>;

/// Shared handle to an immutable schema node
#[derive(Clone)]
pub struct Schema(Arc<Ast>);

/// A schema node: structural kind plus annotations
#[derive(Debug, Clone)]
pub struct Ast {
    pub kind: AstKind,
    pub annotations: Annotations,
}

/// Structural description of a schema node
#[derive(Clone)]
pub enum AstKind {
    /// Record with named properties
    TypeLiteral {
        property_signatures: Vec<PropertySignature>,
    },

    /// Sequence: fixed leading elements followed by homogeneous rest types
    TupleType {
        elements: Vec<TupleElement>,
        rest: Vec<Schema>,
    },

    /// Decoded/encoded pair; display uses the `to` side
    Transformation { from: Schema, to: Schema },

    /// Constrained base type; display uses the base
    Refinement { from: Schema, name: Option<String> },

    /// Lazily constructed schema
    Suspend(SuspendFn),

    /// Union of alternatives
    Union(Vec<Schema>),

    /// Exact literal value
    Literal(Value),

    /// Primitive and special keywords
    Keyword(Keyword),

    /// Opaque declared type such as `Date`
    Declaration { name: String },
}

/// Keyword (terminal) types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Object,
    Unknown,
    Any,
    Never,
    Undefined,
    Void,
}

/// Discriminator of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstTag {
    TypeLiteral,
    TupleType,
    Transformation,
    Refinement,
    Suspend,
    Union,
    Literal,
    Keyword(Keyword),
    Declaration,
}

/// A named property of a record
#[derive(Debug, Clone)]
pub struct PropertySignature {
    pub name: String,
    pub schema: Schema,
    pub is_optional: bool,
}

/// A fixed-position tuple slot
#[derive(Debug, Clone)]
pub struct TupleElement {
    pub schema: Schema,
    pub is_optional: bool,
}

/// Well-known annotation keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnnotationKey {
    Identifier,
    Title,
    Description,
    Pretty,
    Custom(String),
}

/// An annotation value
#[derive(Clone)]
pub enum Annotation {
    Text(String),
    Pretty(PrettyFn),
    Value(Value),
}

/// Annotation map of a schema node
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    entries: HashMap<AnnotationKey, Annotation>,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::String => "StringKeyword",
            Keyword::Number => "NumberKeyword",
            Keyword::Boolean => "BooleanKeyword",
            Keyword::BigInt => "BigIntKeyword",
            Keyword::Symbol => "SymbolKeyword",
            Keyword::Object => "ObjectKeyword",
            Keyword::Unknown => "UnknownKeyword",
            Keyword::Any => "AnyKeyword",
            Keyword::Never => "NeverKeyword",
            Keyword::Undefined => "UndefinedKeyword",
            Keyword::Void => "VoidKeyword",
        }
    }
}

impl AstTag {
    pub fn as_str(self) -> &'static str {
        match self {
            AstTag::TypeLiteral => "TypeLiteral",
            AstTag::TupleType => "TupleType",
            AstTag::Transformation => "Transformation",
            AstTag::Refinement => "Refinement",
            AstTag::Suspend => "Suspend",
            AstTag::Union => "Union",
            AstTag::Literal => "Literal",
            AstTag::Keyword(keyword) => keyword.as_str(),
            AstTag::Declaration => "Declaration",
        }
    }
}

impl fmt::Display for AstTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AstKind {
    pub fn tag(&self) -> AstTag {
        match self {
            AstKind::TypeLiteral { .. } => AstTag::TypeLiteral,
            AstKind::TupleType { .. } => AstTag::TupleType,
            AstKind::Transformation { .. } => AstTag::Transformation,
            AstKind::Refinement { .. } => AstTag::Refinement,
            AstKind::Suspend(_) => AstTag::Suspend,
            AstKind::Union(_) => AstTag::Union,
            AstKind::Literal(_) => AstTag::Literal,
            AstKind::Keyword(keyword) => AstTag::Keyword(*keyword),
            AstKind::Declaration { .. } => AstTag::Declaration,
        }
    }
}

impl fmt::Debug for AstKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstKind::TypeLiteral {
                property_signatures,
            } => f
                .debug_struct("TypeLiteral")
                .field("property_signatures", property_signatures)
                .finish(),
            AstKind::TupleType { elements, rest } => f
                .debug_struct("TupleType")
                .field("elements", elements)
                .field("rest", rest)
                .finish(),
            AstKind::Transformation { from, to } => f
                .debug_struct("Transformation")
                .field("from", from)
                .field("to", to)
                .finish(),
            AstKind::Refinement { from, name } => f
                .debug_struct("Refinement")
                .field("from", from)
                .field("name", name)
                .finish(),
            // Not followed: the target may refer back to this node
            AstKind::Suspend(_) => f.write_str("Suspend(..)"),
            AstKind::Union(members) => f.debug_tuple("Union").field(members).finish(),
            AstKind::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            AstKind::Keyword(keyword) => f.debug_tuple("Keyword").field(keyword).finish(),
            AstKind::Declaration { name } => {
                f.debug_struct("Declaration").field("name", name).finish()
            }
        }
    }
}

impl Annotation {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Annotation::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_pretty(&self) -> Option<&PrettyFn> {
        match self {
            Annotation::Pretty(pretty) => Some(pretty),
            _ => None,
        }
    }
}

impl fmt::Debug for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Annotation::Pretty(_) => f.write_str("Pretty(..)"),
            Annotation::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &AnnotationKey) -> Option<&Annotation> {
        self.entries.get(key)
    }

    /// Text stored under `key`; other annotation kinds read as absent
    pub fn text(&self, key: &AnnotationKey) -> Option<&str> {
        self.get(key).and_then(Annotation::as_text)
    }

    pub fn insert(&mut self, key: AnnotationKey, annotation: Annotation) -> &mut Self {
        self.entries.insert(key, annotation);
        self
    }

    pub fn contains(&self, key: &AnnotationKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of `self` with every entry of `other` applied on top
    #[must_use]
    pub fn merged(&self, other: &Annotations) -> Annotations {
        let mut entries = self.entries.clone();
        entries.extend(other.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        Annotations { entries }
    }
}

impl PropertySignature {
    /// A required property
    pub fn required(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            is_optional: false,
        }
    }

    /// An optional property; its type admits `undefined`
    pub fn optional(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema: Schema::union(vec![schema, Schema::undefined()]),
            is_optional: true,
        }
    }
}

impl TupleElement {
    pub fn required(schema: Schema) -> Self {
        Self {
            schema,
            is_optional: false,
        }
    }
}

impl Schema {
    /// Wrap an AST node
    pub fn from_ast(ast: Ast) -> Self {
        Self(Arc::new(ast))
    }

    /// Node of the given kind with no annotations
    pub fn new(kind: AstKind) -> Self {
        Self::from_ast(Ast {
            kind,
            annotations: Annotations::new(),
        })
    }

    pub fn ast(&self) -> &Ast {
        &self.0
    }

    pub fn kind(&self) -> &AstKind {
        &self.0.kind
    }

    pub fn tag(&self) -> AstTag {
        self.0.kind.tag()
    }

    pub fn annotations(&self) -> &Annotations {
        &self.0.annotations
    }

    /// True when both handles point at the same node
    pub fn ptr_eq(a: &Schema, b: &Schema) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn keyword(keyword: Keyword) -> Self {
        Self::new(AstKind::Keyword(keyword))
    }

    pub fn string() -> Self {
        Self::keyword(Keyword::String)
    }

    pub fn number() -> Self {
        Self::keyword(Keyword::Number)
    }

    pub fn boolean() -> Self {
        Self::keyword(Keyword::Boolean)
    }

    pub fn unknown() -> Self {
        Self::keyword(Keyword::Unknown)
    }

    pub fn undefined() -> Self {
        Self::keyword(Keyword::Undefined)
    }

    pub fn void() -> Self {
        Self::keyword(Keyword::Void)
    }

    /// The literal `null`
    pub fn null() -> Self {
        Self::literal(Value::Null)
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(AstKind::Literal(value.into()))
    }

    pub fn declaration(name: impl Into<String>) -> Self {
        Self::new(AstKind::Declaration { name: name.into() })
    }

    pub fn type_literal(property_signatures: Vec<PropertySignature>) -> Self {
        Self::new(AstKind::TypeLiteral {
            property_signatures,
        })
    }

    /// Record of required properties
    pub fn struct_of<N: Into<String>>(fields: impl IntoIterator<Item = (N, Schema)>) -> Self {
        Self::type_literal(
            fields
                .into_iter()
                .map(|(name, schema)| PropertySignature::required(name, schema))
                .collect(),
        )
    }

    /// Homogeneous sequence
    pub fn array(item: Schema) -> Self {
        Self::tuple(Vec::new(), vec![item])
    }

    pub fn tuple(elements: Vec<TupleElement>, rest: Vec<Schema>) -> Self {
        Self::new(AstKind::TupleType { elements, rest })
    }

    pub fn union(members: Vec<Schema>) -> Self {
        Self::new(AstKind::Union(members))
    }

    /// `schema | null`
    pub fn nullable(schema: Schema) -> Self {
        Self::union(vec![schema, Self::null()])
    }

    pub fn transform(from: Schema, to: Schema) -> Self {
        Self::new(AstKind::Transformation { from, to })
    }

    pub fn refine(from: Schema, name: Option<String>) -> Self {
        Self::new(AstKind::Refinement { from, name })
    }

    pub fn suspend(f: impl Fn() -> Option<Schema> + Send + Sync + 'static) -> Self {
        Self::new(AstKind::Suspend(Arc::new(f)))
    }

    /// New node of the same kind with `annotations` merged over the existing ones
    #[must_use]
    pub fn with_annotations(&self, annotations: &Annotations) -> Self {
        Self::from_ast(Ast {
            kind: self.0.kind.clone(),
            annotations: self.0.annotations.merged(annotations),
        })
    }

    #[must_use]
    pub fn annotate(&self, key: AnnotationKey, annotation: Annotation) -> Self {
        let mut annotations = Annotations::new();
        annotations.insert(key, annotation);
        self.with_annotations(&annotations)
    }

    #[must_use]
    pub fn identifier(&self, identifier: impl Into<String>) -> Self {
        self.annotate(AnnotationKey::Identifier, Annotation::Text(identifier.into()))
    }

    #[must_use]
    pub fn title(&self, title: impl Into<String>) -> Self {
        self.annotate(AnnotationKey::Title, Annotation::Text(title.into()))
    }

    #[must_use]
    pub fn description(&self, description: impl Into<String>) -> Self {
        self.annotate(
            AnnotationKey::Description,
            Annotation::Text(description.into()),
        )
    }

    #[must_use]
    pub fn pretty(
        &self,
        pretty: impl Fn(&Value) -> crate::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.annotate(AnnotationKey::Pretty, Annotation::Pretty(Arc::new(pretty)))
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        Schema::ptr_eq(self, other)
    }
}

impl Eq for Schema {}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        assert_eq!(Schema::string().tag().as_str(), "StringKeyword");
        assert_eq!(Schema::null().tag(), AstTag::Literal);
        assert_eq!(Schema::array(Schema::number()).tag(), AstTag::TupleType);
        assert_eq!(
            Schema::struct_of([("a", Schema::string())]).tag().to_string(),
            "TypeLiteral"
        );
        assert_eq!(Schema::suspend(|| None).tag(), AstTag::Suspend);
    }

    #[test]
    fn test_annotate_returns_new_node() {
        let base = Schema::string();
        let titled = base.title("Name");

        assert!(base.annotations().is_empty());
        assert_eq!(titled.annotations().text(&AnnotationKey::Title), Some("Name"));
        assert_ne!(base, titled);
    }

    #[test]
    fn test_annotations_accumulate() {
        let schema = Schema::number().identifier("Price").title("Unit price");

        assert_eq!(schema.annotations().len(), 2);
        assert_eq!(
            schema.annotations().text(&AnnotationKey::Identifier),
            Some("Price")
        );
    }

    #[test]
    fn test_text_ignores_other_annotation_kinds() {
        let schema =
            Schema::string().annotate(AnnotationKey::Title, Annotation::Value(Value::from(1)));
        assert_eq!(schema.annotations().text(&AnnotationKey::Title), None);
        assert!(schema.annotations().contains(&AnnotationKey::Title));
    }

    #[test]
    fn test_optional_property_admits_undefined() {
        let prop = PropertySignature::optional("nickname", Schema::string());
        assert!(prop.is_optional);
        match prop.schema.kind() {
            AstKind::Union(members) => {
                assert_eq!(members.len(), 2);
                assert_eq!(members[1].tag(), AstTag::Keyword(Keyword::Undefined));
            }
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn test_identity_equality() {
        let a = Schema::string();
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Schema::string());
    }

    #[test]
    fn test_debug_does_not_follow_suspend() {
        let schema = Schema::struct_of([("child", Schema::suspend(|| None))]);
        let rendered = format!("{schema:?}");
        assert!(rendered.contains("Suspend(..)"));
    }
}
