//! Schema document loader
//!
//! Loads named schema definitions from YAML or JSON documents:
//!
//! ```yaml
//! root: Order
//! definitions:
//!   Order:
//!     type: struct
//!     title: Purchase order
//!     fields:
//!       - name: total
//!         type: number
//!         pretty: currency
//!       - name: lines
//!         type: array
//!         items: { ref: Line }
//!   Line:
//!     type: struct
//!     fields:
//!       - { name: sku, type: string }
//!       - { name: note, type: string, optional: true }
//! ```
//!
//! Documents are checked in full before any schema is built, so a loaded
//! [`SchemaSet`] never contains dangling references.

use crate::ast::{
    Annotation, AnnotationKey, Annotations, Ast, AstKind, Keyword, PropertySignature, Schema,
    TupleElement,
};
use crate::context::SchemaContext;
use crate::formatters::FormatterRegistry;
use crate::{Error, Result};
use dashmap::DashMap;
use inspect_ir::Value;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Serializable schema document
#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    root: Option<String>,
    #[serde(default)]
    definitions: BTreeMap<String, DeclFile>,
}

/// Serializable schema declaration
#[derive(Debug, Default, Deserialize)]
struct DeclFile {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(rename = "ref", default)]
    reference: Option<String>,
    #[serde(default)]
    identifier: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    pretty: Option<String>,
    #[serde(default)]
    nullable: bool,
    #[serde(default)]
    fields: Vec<FieldFile>,
    #[serde(default)]
    items: Option<Box<DeclFile>>,
    #[serde(default)]
    elements: Vec<DeclFile>,
    #[serde(default)]
    rest: Option<Box<DeclFile>>,
    #[serde(default)]
    members: Vec<DeclFile>,
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(default)]
    from: Option<Box<DeclFile>>,
    #[serde(default)]
    to: Option<Box<DeclFile>>,
    #[serde(default)]
    base: Option<Box<DeclFile>>,
    #[serde(default)]
    refinement: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FieldFile {
    name: String,
    #[serde(default)]
    optional: bool,
    #[serde(flatten)]
    decl: DeclFile,
}

/// Checked declaration, ready to build
struct Decl {
    kind: DeclKind,
    annotations: Annotations,
    nullable: bool,
}

enum DeclKind {
    Keyword(Keyword),
    Literal(Value),
    Date,
    Struct(Vec<FieldDecl>),
    Array(Box<Decl>),
    Tuple {
        elements: Vec<Decl>,
        rest: Option<Box<Decl>>,
    },
    Union(Vec<Decl>),
    Transform {
        from: Box<Decl>,
        to: Box<Decl>,
    },
    Refine {
        base: Box<Decl>,
        name: Option<String>,
    },
    Ref(String),
}

struct FieldDecl {
    name: String,
    optional: bool,
    decl: Decl,
}

type Definitions = HashMap<String, Schema>;

/// Named schema definitions loaded from one document
#[derive(Debug, Clone)]
pub struct SchemaSet {
    definitions: Arc<Definitions>,
    root: Option<String>,
}

impl SchemaSet {
    /// Get a definition by name
    pub fn get(&self, name: &str) -> Option<Schema> {
        self.definitions.get(name).cloned()
    }

    /// The definition named by the document's `root`, if any
    pub fn root(&self) -> Option<Schema> {
        self.root.as_deref().and_then(|name| self.get(name))
    }

    pub fn root_name(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// Same definitions with a different root
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no definition has that name.
    pub fn with_root(&self, name: &str) -> Result<SchemaSet> {
        if !self.definitions.contains_key(name) {
            return Err(Error::NotFound(name.to_string()));
        }
        Ok(SchemaSet {
            definitions: Arc::clone(&self.definitions),
            root: Some(name.to_string()),
        })
    }

    /// Definition names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All definitions, sorted by name
    pub fn schemas(&self) -> Vec<Schema> {
        self.names()
            .into_iter()
            .filter_map(|name| self.get(name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Root context with every definition registered for name lookups.
    ///
    /// References between definitions resolve only while this set (or a
    /// clone of it) is alive.
    pub fn context(&self) -> SchemaContext {
        let root = self.root();
        let auxiliary: Vec<Schema> = self
            .names()
            .into_iter()
            .filter(|name| Some(*name) != self.root.as_deref())
            .filter_map(|name| self.get(name))
            .collect();
        SchemaContext::new(root, &auxiliary)
    }
}

/// Schema loader with a per-file cache
pub struct SchemaLoader {
    formatters: FormatterRegistry,
    search_paths: Vec<PathBuf>,
    cache: DashMap<PathBuf, SchemaSet>,
}

impl SchemaLoader {
    /// Create a loader with the built-in formatters and the given search paths
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self::with_formatters(FormatterRegistry::with_builtins(), search_paths)
    }

    /// Create a loader with a custom formatter registry
    pub fn with_formatters(formatters: FormatterRegistry, search_paths: Vec<PathBuf>) -> Self {
        Self {
            formatters,
            search_paths,
            cache: DashMap::new(),
        }
    }

    /// Add a search path for schema files
    pub fn add_path(&mut self, path: PathBuf) {
        self.search_paths.push(path);
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    /// Load `<name>.yaml`, `<name>.yml` or `<name>.json` from the search paths
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no search path holds such a file, or
    /// any error from [`SchemaLoader::load_from_file`].
    pub fn load(&self, name: &str) -> Result<SchemaSet> {
        let path = self.find_schema_file(name)?;
        self.load_from_file(&path)
    }

    fn find_schema_file(&self, name: &str) -> Result<PathBuf> {
        for dir in &self.search_paths {
            for extension in ["yaml", "yml", "json"] {
                let candidate = dir.join(format!("{name}.{extension}"));
                if candidate.is_file() {
                    trace!("Found schema file: {:?}", candidate);
                    return Ok(candidate);
                }
            }
        }
        Err(Error::NotFound(format!(
            "{name} (searched {} path(s))",
            self.search_paths.len()
        )))
    }

    /// Load a schema document from a file; YAML by extension, JSON otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the document is invalid.
    pub fn load_from_file(&self, path: &Path) -> Result<SchemaSet> {
        if let Some(cached) = self.cache.get(path).map(|entry| entry.value().clone()) {
            debug!("Cache hit for schema file: {:?}", path);
            return Ok(cached);
        }

        trace!("Loading schema from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;

        let set = if path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            self.load_from_yaml(&content)?
        } else {
            self.load_from_json(&content)?
        };

        self.cache.insert(path.to_path_buf(), set.clone());
        Ok(set)
    }

    /// Load a schema document from a YAML string
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the document is invalid.
    pub fn load_from_yaml(&self, yaml: &str) -> Result<SchemaSet> {
        let document: SchemaDocument = serde_yaml::from_str(yaml)
            .map_err(|e| Error::InvalidFormat(format!("YAML parse error: {e}")))?;
        self.build(document)
    }

    /// Load a schema document from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the document is invalid.
    pub fn load_from_json(&self, json: &str) -> Result<SchemaSet> {
        let document: SchemaDocument = serde_json::from_str(json)
            .map_err(|e| Error::InvalidFormat(format!("JSON parse error: {e}")))?;
        self.build(document)
    }

    fn build(&self, document: SchemaDocument) -> Result<SchemaSet> {
        let mut checked = Vec::with_capacity(document.definitions.len());
        for (name, file) in document.definitions {
            let mut decl = self.check(file, &format!("definitions.{name}"))?;
            if !decl.annotations.contains(&AnnotationKey::Identifier) {
                decl.annotations.insert(
                    AnnotationKey::Identifier,
                    Annotation::Text(name.clone()),
                );
            }
            checked.push((name, decl));
        }

        let known: Vec<&str> = checked.iter().map(|(name, _)| name.as_str()).collect();
        for (name, decl) in &checked {
            check_refs(decl, &known, name)?;
        }
        if let Some(root) = &document.root {
            if !known.contains(&root.as_str()) {
                return Err(Error::NotFound(format!("root definition '{root}'")));
            }
        }

        let definitions = Arc::new_cyclic(|table: &Weak<Definitions>| {
            checked
                .iter()
                .map(|(name, decl)| (name.clone(), build_schema(decl, table)))
                .collect::<Definitions>()
        });

        debug!(
            definitions = definitions.len(),
            root = ?document.root,
            "Loaded schema document"
        );

        Ok(SchemaSet {
            definitions,
            root: document.root,
        })
    }

    fn check(&self, file: DeclFile, context: &str) -> Result<Decl> {
        let mut annotations = Annotations::new();
        for (key, text) in [
            (AnnotationKey::Identifier, file.identifier),
            (AnnotationKey::Title, file.title),
            (AnnotationKey::Description, file.description),
        ] {
            if let Some(text) = text {
                annotations.insert(key, Annotation::Text(text));
            }
        }
        if let Some(name) = &file.pretty {
            annotations.insert(
                AnnotationKey::Pretty,
                Annotation::Pretty(self.formatters.require(name)?),
            );
        }

        let kind = match (file.kind.as_deref(), file.reference) {
            (Some(_), Some(_)) => {
                return Err(invalid(context, "declares both 'type' and 'ref'"));
            }
            (None, Some(target)) => DeclKind::Ref(target),
            (None, None) => return Err(invalid(context, "needs a 'type' or a 'ref'")),
            (Some(kind), None) => match kind {
                "string" => DeclKind::Keyword(Keyword::String),
                "number" => DeclKind::Keyword(Keyword::Number),
                "boolean" => DeclKind::Keyword(Keyword::Boolean),
                "bigint" => DeclKind::Keyword(Keyword::BigInt),
                "symbol" => DeclKind::Keyword(Keyword::Symbol),
                "object" => DeclKind::Keyword(Keyword::Object),
                "unknown" => DeclKind::Keyword(Keyword::Unknown),
                "any" => DeclKind::Keyword(Keyword::Any),
                "never" => DeclKind::Keyword(Keyword::Never),
                "undefined" => DeclKind::Keyword(Keyword::Undefined),
                "void" => DeclKind::Keyword(Keyword::Void),
                "null" => DeclKind::Literal(Value::Null),
                "date" => DeclKind::Date,
                "literal" => match file.value {
                    Some(value) => DeclKind::Literal(Value::from(value)),
                    None => return Err(invalid(context, "literal needs a 'value'")),
                },
                "struct" => DeclKind::Struct(
                    file.fields
                        .into_iter()
                        .map(|field| {
                            let field_context = format!("{context}.{}", field.name);
                            Ok(FieldDecl {
                                decl: self.check(field.decl, &field_context)?,
                                name: field.name,
                                optional: field.optional,
                            })
                        })
                        .collect::<Result<Vec<_>>>()?,
                ),
                "array" => match file.items {
                    Some(items) => {
                        DeclKind::Array(Box::new(self.check(*items, &format!("{context}.items"))?))
                    }
                    None => return Err(invalid(context, "array needs 'items'")),
                },
                "tuple" => DeclKind::Tuple {
                    elements: self.check_all(file.elements, context, "elements")?,
                    rest: match file.rest {
                        Some(rest) => {
                            Some(Box::new(self.check(*rest, &format!("{context}.rest"))?))
                        }
                        None => None,
                    },
                },
                "union" => {
                    if file.members.is_empty() {
                        return Err(invalid(context, "union needs 'members'"));
                    }
                    DeclKind::Union(self.check_all(file.members, context, "members")?)
                }
                "transform" => match (file.from, file.to) {
                    (Some(from), Some(to)) => DeclKind::Transform {
                        from: Box::new(self.check(*from, &format!("{context}.from"))?),
                        to: Box::new(self.check(*to, &format!("{context}.to"))?),
                    },
                    _ => return Err(invalid(context, "transform needs 'from' and 'to'")),
                },
                "refine" => match file.base {
                    Some(base) => DeclKind::Refine {
                        base: Box::new(self.check(*base, &format!("{context}.base"))?),
                        name: file.refinement,
                    },
                    None => return Err(invalid(context, "refine needs 'base'")),
                },
                other => return Err(invalid(context, &format!("unknown type '{other}'"))),
            },
        };

        Ok(Decl {
            kind,
            annotations,
            nullable: file.nullable,
        })
    }

    fn check_all(&self, files: Vec<DeclFile>, context: &str, member: &str) -> Result<Vec<Decl>> {
        files
            .into_iter()
            .enumerate()
            .map(|(idx, file)| self.check(file, &format!("{context}.{member}.{idx}")))
            .collect()
    }
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new(vec![PathBuf::from(".")])
    }
}

fn invalid(context: &str, reason: &str) -> Error {
    Error::InvalidFormat(format!("{context}: {reason}"))
}

fn check_refs(decl: &Decl, known: &[&str], definition: &str) -> Result<()> {
    match &decl.kind {
        DeclKind::Ref(target) => {
            if known.contains(&target.as_str()) {
                Ok(())
            } else {
                Err(Error::NotFound(format!(
                    "definition '{target}' referenced from '{definition}'"
                )))
            }
        }
        DeclKind::Struct(fields) => fields
            .iter()
            .try_for_each(|field| check_refs(&field.decl, known, definition)),
        DeclKind::Array(item) => check_refs(item, known, definition),
        DeclKind::Tuple { elements, rest } => {
            for element in elements {
                check_refs(element, known, definition)?;
            }
            match rest {
                Some(rest) => check_refs(rest, known, definition),
                None => Ok(()),
            }
        }
        DeclKind::Union(members) => members
            .iter()
            .try_for_each(|member| check_refs(member, known, definition)),
        DeclKind::Transform { from, to } => {
            check_refs(from, known, definition)?;
            check_refs(to, known, definition)
        }
        DeclKind::Refine { base, .. } => check_refs(base, known, definition),
        DeclKind::Keyword(_) | DeclKind::Literal(_) | DeclKind::Date => Ok(()),
    }
}

fn build_schema(decl: &Decl, table: &Weak<Definitions>) -> Schema {
    let kind = match &decl.kind {
        DeclKind::Keyword(keyword) => AstKind::Keyword(*keyword),
        DeclKind::Literal(value) => AstKind::Literal(value.clone()),
        DeclKind::Date => AstKind::Declaration {
            name: "Date".to_string(),
        },
        DeclKind::Struct(fields) => AstKind::TypeLiteral {
            property_signatures: fields
                .iter()
                .map(|field| {
                    let schema = build_schema(&field.decl, table);
                    if field.optional {
                        PropertySignature::optional(&field.name, schema)
                    } else {
                        PropertySignature::required(&field.name, schema)
                    }
                })
                .collect(),
        },
        DeclKind::Array(item) => AstKind::TupleType {
            elements: Vec::new(),
            rest: vec![build_schema(item, table)],
        },
        DeclKind::Tuple { elements, rest } => AstKind::TupleType {
            elements: elements
                .iter()
                .map(|element| TupleElement::required(build_schema(element, table)))
                .collect(),
            rest: rest
                .iter()
                .map(|rest| build_schema(rest, table))
                .collect(),
        },
        DeclKind::Union(members) => AstKind::Union(
            members
                .iter()
                .map(|member| build_schema(member, table))
                .collect(),
        ),
        DeclKind::Transform { from, to } => AstKind::Transformation {
            from: build_schema(from, table),
            to: build_schema(to, table),
        },
        DeclKind::Refine { base, name } => AstKind::Refinement {
            from: build_schema(base, table),
            name: name.clone(),
        },
        DeclKind::Ref(target) => {
            let table = table.clone();
            let target = target.clone();
            AstKind::Suspend(Arc::new(move || {
                table
                    .upgrade()
                    .and_then(|definitions| definitions.get(&target).cloned())
            }))
        }
    };

    let schema = Schema::from_ast(Ast {
        kind,
        annotations: decl.annotations.clone(),
    });
    if decl.nullable {
        Schema::nullable(schema)
    } else {
        schema
    }
}
