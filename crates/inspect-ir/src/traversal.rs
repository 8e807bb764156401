//! Traversal and cursor APIs for navigating the value tree

use crate::path::{ObjectPath, Segment};
use crate::value::Value;
use crate::Error;
use crate::Result;

/// A cursor for navigating the value tree
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    /// Current value
    value: &'a Value,

    /// Path to current value
    path: ObjectPath,
}

/// Trait for traversing the value tree
pub trait Traversal {
    /// Visit a value
    fn visit(&mut self, value: &Value, path: &ObjectPath, depth: usize);

    /// Called when entering a value with children
    fn enter(&mut self, _value: &Value, _path: &ObjectPath, _depth: usize) {}

    /// Called when leaving a value with children
    fn leave(&mut self, _value: &Value, _path: &ObjectPath, _depth: usize) {}

    /// Returns true if the children of this value should be walked
    fn descend(&self, _value: &Value, _path: &ObjectPath, _depth: usize) -> bool {
        true
    }

    /// Returns true if traversal should continue
    fn should_continue(&self) -> bool {
        true
    }
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the root of the given value
    pub fn new(value: &'a Value) -> Self {
        Self {
            value,
            path: ObjectPath::root(),
        }
    }

    /// Get the current value
    #[must_use]
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Get the current path
    #[must_use]
    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    /// Navigate to a field of the current object
    ///
    /// # Errors
    ///
    /// Returns an error if the current value is not an object or has no such field.
    pub fn child(&self, name: &str) -> Result<Cursor<'a>> {
        self.step(&Segment::Field(name.to_string()))
    }

    /// Navigate to an element of the current array
    ///
    /// # Errors
    ///
    /// Returns an error if the current value is not a container or the index is out of range.
    pub fn child_at(&self, index: usize) -> Result<Cursor<'a>> {
        self.step(&Segment::Index(index))
    }

    /// Navigate using a path (e.g., "$.items.0.name")
    ///
    /// # Errors
    ///
    /// Returns an error at the first segment that cannot be followed.
    pub fn navigate(&self, path: &str) -> Result<Cursor<'a>> {
        let mut cursor = self.clone();
        for segment in crate::path::parse_segments(path) {
            cursor = cursor.step(&segment)?;
        }
        Ok(cursor)
    }

    fn step(&self, segment: &Segment) -> Result<Cursor<'a>> {
        let next_path = self.path.child(segment.clone());
        let next = match (self.value, segment) {
            (Value::Object(obj), Segment::Field(name)) => obj.get(name),
            // Numeric keys on objects are addressed with index syntax too
            (Value::Object(obj), Segment::Index(idx)) => obj.get(&idx.to_string()),
            (Value::Array(items), Segment::Index(idx)) => items.get(*idx),
            (Value::Array(_), Segment::Field(_)) => None,
            (other, _) => {
                return Err(Error::type_mismatch("object or array", other.type_name()));
            }
        };

        match next {
            Some(value) => Ok(Cursor {
                value,
                path: next_path,
            }),
            None => Err(Error::node_not_found(next_path.to_string())),
        }
    }
}

/// Walk the tree using a visitor, starting at the root path
pub fn walk<T: Traversal>(value: &Value, visitor: &mut T) {
    walk_from(value, &ObjectPath::root(), visitor);
}

/// Walk a subtree whose root sits at `path` in the full tree
pub fn walk_from<T: Traversal>(value: &Value, path: &ObjectPath, visitor: &mut T) {
    walk_recursive(value, path, 0, visitor);
}

fn walk_recursive<T: Traversal>(value: &Value, path: &ObjectPath, depth: usize, visitor: &mut T) {
    if !visitor.should_continue() {
        return;
    }

    visitor.visit(value, path, depth);

    let children = value.children();
    if children.is_empty() || !visitor.descend(value, path, depth) {
        return;
    }

    visitor.enter(value, path, depth);
    for (segment, child) in children {
        walk_recursive(child, &path.child(segment), depth + 1, visitor);
    }
    visitor.leave(value, path, depth);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Object;

    fn sample() -> Value {
        Value::from(
            Object::new()
                .field("name", "Ada")
                .field(
                    "items",
                    Value::Array(vec![
                        Value::from(Object::new().field("id", 1)),
                        Value::from(Object::new().field("id", 2)),
                    ]),
                )
                .field("7", "numeric key"),
        )
    }

    #[test]
    fn test_cursor_creation() {
        let root = sample();
        let cursor = Cursor::new(&root);

        assert!(cursor.path().is_root());
        assert!(cursor.value().is_plain_object());
    }

    #[test]
    fn test_cursor_child() {
        let root = sample();
        let cursor = Cursor::new(&root).child("name").unwrap();

        assert_eq!(cursor.value(), &Value::from("Ada"));
        assert_eq!(cursor.path().to_string(), "$.name");
    }

    #[test]
    fn test_cursor_child_not_found() {
        let root = sample();
        let result = Cursor::new(&root).child("missing");

        match result {
            Err(Error::NodeNotFound { path }) => assert_eq!(path, "$.missing"),
            _ => panic!("Expected NodeNotFound error"),
        }
    }

    #[test]
    fn test_cursor_child_at() {
        let root = sample();
        let items = Cursor::new(&root).child("items").unwrap();

        let second = items.child_at(1).unwrap();
        assert_eq!(second.path().to_string(), "$.items.1");
        assert!(items.child_at(5).is_err());
    }

    #[test]
    fn test_cursor_navigate() {
        let root = sample();
        let cursor = Cursor::new(&root).navigate("$.items.0.id").unwrap();

        assert_eq!(cursor.value(), &Value::Number(1.0));
        assert_eq!(cursor.path().to_string(), "$.items.0.id");
        assert!(Cursor::new(&root).navigate("$").unwrap().path().is_root());
    }

    #[test]
    fn test_cursor_navigate_numeric_object_key() {
        let root = sample();
        let cursor = Cursor::new(&root).navigate("$.7").unwrap();
        assert_eq!(cursor.value(), &Value::from("numeric key"));
    }

    #[test]
    fn test_cursor_navigate_into_primitive() {
        let root = sample();
        match Cursor::new(&root).navigate("$.name.length") {
            Err(Error::TypeMismatch { found, .. }) => assert_eq!(found, "string"),
            _ => panic!("Expected TypeMismatch error"),
        }
    }

    struct TestVisitor {
        visited: Vec<String>,
        entered: Vec<String>,
        left: Vec<String>,
        max_depth: usize,
        max_visits: usize,
    }

    impl TestVisitor {
        fn new() -> Self {
            Self {
                visited: Vec::new(),
                entered: Vec::new(),
                left: Vec::new(),
                max_depth: usize::MAX,
                max_visits: usize::MAX,
            }
        }
    }

    impl Traversal for TestVisitor {
        fn visit(&mut self, _value: &Value, path: &ObjectPath, _depth: usize) {
            self.visited.push(path.to_string());
        }

        fn enter(&mut self, _value: &Value, path: &ObjectPath, _depth: usize) {
            self.entered.push(path.to_string());
        }

        fn leave(&mut self, _value: &Value, path: &ObjectPath, _depth: usize) {
            self.left.push(path.to_string());
        }

        fn descend(&self, _value: &Value, _path: &ObjectPath, depth: usize) -> bool {
            depth < self.max_depth
        }

        fn should_continue(&self) -> bool {
            self.visited.len() < self.max_visits
        }
    }

    #[test]
    fn test_walk_emits_paths() {
        let root = sample();
        let mut visitor = TestVisitor::new();
        walk(&root, &mut visitor);

        assert_eq!(
            visitor.visited,
            vec![
                "$",
                "$.name",
                "$.items",
                "$.items.0",
                "$.items.0.id",
                "$.items.1",
                "$.items.1.id",
                "$.7",
            ]
        );
        assert_eq!(visitor.entered, vec!["$", "$.items", "$.items.0", "$.items.1"]);
        assert_eq!(visitor.left, vec!["$.items.0", "$.items.1", "$.items", "$"]);
    }

    #[test]
    fn test_walk_respects_descend() {
        let root = sample();
        let mut visitor = TestVisitor::new();
        visitor.max_depth = 1;
        walk(&root, &mut visitor);

        assert_eq!(visitor.visited, vec!["$", "$.name", "$.items", "$.7"]);
    }

    #[test]
    fn test_walk_should_continue() {
        let root = sample();
        let mut visitor = TestVisitor::new();
        visitor.max_visits = 2;
        walk(&root, &mut visitor);

        assert_eq!(visitor.visited, vec!["$", "$.name"]);
    }

    #[test]
    fn test_walk_from_subtree() {
        let root = sample();
        let cursor = Cursor::new(&root).navigate("$.items.1").unwrap();
        let mut visitor = TestVisitor::new();
        walk_from(cursor.value(), cursor.path(), &mut visitor);

        assert_eq!(visitor.visited, vec!["$.items.1", "$.items.1.id"]);
    }
}
