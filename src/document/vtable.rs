//! Document capability vtable
//!
//! Field accessors, user-registered methods and the base document
//! operations are resolved once per collection into a vtable. Wrapping
//! a document is then a borrow, not a per-document merge.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::schema::{CollectionSchema, FieldPath};

use super::errors::{DocumentError, DocumentResult};

/// A user-registered document method
pub type DocumentMethod = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Names taken by the base document operations
pub const BASE_DOCUMENT_PROPERTIES: &[&str] =
    &["primary_key", "data", "get", "field", "call", "has_method"];

/// Capability table shared by every document of one collection
pub struct DocumentVtable {
    primary_path: FieldPath,
    accessors: HashMap<String, FieldPath>,
    methods: HashMap<String, DocumentMethod>,
}

impl DocumentVtable {
    /// Composes the vtable for a collection.
    ///
    /// Accessor paths are compiled from the schema's declared fields.
    /// User method names must not start with an underscore, take a base
    /// operation name, or shadow a declared field.
    pub fn compose(
        schema: &CollectionSchema,
        user_methods: HashMap<String, DocumentMethod>,
    ) -> DocumentResult<Self> {
        let accessors: HashMap<String, FieldPath> = schema
            .fields
            .keys()
            .map(|field| (field.clone(), FieldPath::parse(field.clone())))
            .collect();

        for name in user_methods.keys() {
            if name.starts_with('_') || BASE_DOCUMENT_PROPERTIES.contains(&name.as_str()) {
                return Err(DocumentError::reserved_name(name));
            }
            if accessors.contains_key(name) {
                return Err(DocumentError::field_collision(name));
            }
        }

        Ok(Self {
            primary_path: FieldPath::parse(schema.primary_key.clone()),
            accessors,
            methods: user_methods,
        })
    }

    /// Wraps a document value in a borrow view over this vtable
    pub fn wrap<'a>(&'a self, data: &'a Value) -> DocumentRef<'a> {
        DocumentRef { vtable: self, data }
    }

    /// Declared field names with compiled accessors
    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.accessors.keys().map(String::as_str)
    }

    /// Registered user method names
    pub fn method_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.methods.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for DocumentVtable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentVtable")
            .field("primary_path", &self.primary_path)
            .field("accessors", &self.accessors.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// Borrowed view of one document through its collection's vtable
#[derive(Clone, Copy)]
pub struct DocumentRef<'a> {
    vtable: &'a DocumentVtable,
    data: &'a Value,
}

impl<'a> DocumentRef<'a> {
    /// The raw document value
    pub fn data(&self) -> &'a Value {
        self.data
    }

    /// The document's primary key, absent when missing or non-string
    pub fn primary_key(&self) -> Option<&'a str> {
        self.vtable
            .primary_path
            .get(self.data)
            .and_then(Value::as_str)
    }

    /// Declared field access through the compiled accessor
    pub fn field(&self, name: &str) -> Option<&'a Value> {
        self.vtable
            .accessors
            .get(name)
            .and_then(|path| path.get(self.data))
    }

    /// Arbitrary dotted-path access
    pub fn get(&self, path: &str) -> Option<&'a Value> {
        FieldPath::parse(path).get(self.data)
    }

    /// Invokes a user-registered method, `None` when unknown
    pub fn call(&self, name: &str) -> Option<Value> {
        self.vtable.methods.get(name).map(|method| method(self.data))
    }

    /// Whether a user method of this name is registered
    pub fn has_method(&self, name: &str) -> bool {
        self.vtable.methods.contains_key(name)
    }
}

impl std::fmt::Debug for DocumentRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRef")
            .field("primary_key", &self.primary_key())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, IndexDef};
    use serde_json::json;

    fn schema() -> CollectionSchema {
        let mut fields = HashMap::new();
        fields.insert("id".to_string(), FieldType::string(10));
        fields.insert("age".to_string(), FieldType::integer(0, 120));
        CollectionSchema::new("id", fields, vec![IndexDef::single("age")]).unwrap()
    }

    fn greet_method() -> DocumentMethod {
        Arc::new(|doc: &Value| {
            let id = doc.get("id").and_then(Value::as_str).unwrap_or("?");
            json!(format!("hello {id}"))
        })
    }

    #[test]
    fn test_compose_and_wrap() {
        let schema = schema();
        let mut methods = HashMap::new();
        methods.insert("greet".to_string(), greet_method());
        let vtable = DocumentVtable::compose(&schema, methods).unwrap();

        let doc = json!({"id": "alice", "age": 30});
        let wrapped = vtable.wrap(&doc);

        assert_eq!(wrapped.primary_key(), Some("alice"));
        assert_eq!(wrapped.field("age"), Some(&json!(30)));
        assert_eq!(wrapped.field("missing"), None);
        assert_eq!(wrapped.call("greet"), Some(json!("hello alice")));
        assert!(wrapped.has_method("greet"));
        assert!(!wrapped.has_method("other"));
    }

    #[test]
    fn test_vtable_is_shared_across_documents() {
        let vtable = DocumentVtable::compose(&schema(), HashMap::new()).unwrap();
        let first = json!({"id": "a", "age": 1});
        let second = json!({"id": "b", "age": 2});

        assert_eq!(vtable.wrap(&first).primary_key(), Some("a"));
        assert_eq!(vtable.wrap(&second).primary_key(), Some("b"));
    }

    #[test]
    fn test_base_operation_names_are_reserved() {
        let mut methods = HashMap::new();
        methods.insert("primary_key".to_string(), greet_method());

        let err = DocumentVtable::compose(&schema(), methods).unwrap_err();
        assert_eq!(err.code().code(), "LUMA_DOCUMENT_RESERVED_NAME");
        assert_eq!(err.name(), Some("primary_key"));
    }

    #[test]
    fn test_underscore_names_are_reserved() {
        let mut methods = HashMap::new();
        methods.insert("_internal".to_string(), greet_method());

        let err = DocumentVtable::compose(&schema(), methods).unwrap_err();
        assert_eq!(err.code().code(), "LUMA_DOCUMENT_RESERVED_NAME");
    }

    #[test]
    fn test_schema_field_names_collide() {
        let mut methods = HashMap::new();
        methods.insert("age".to_string(), greet_method());

        let err = DocumentVtable::compose(&schema(), methods).unwrap_err();
        assert_eq!(err.code().code(), "LUMA_DOCUMENT_FIELD_COLLISION");
        assert_eq!(err.name(), Some("age"));
    }

    #[test]
    fn test_dotted_path_access() {
        let mut fields = HashMap::new();
        fields.insert("id".to_string(), FieldType::string(10));
        fields.insert("address.city".to_string(), FieldType::string(40));
        let schema = CollectionSchema::new("id", fields, vec![]).unwrap();
        let vtable = DocumentVtable::compose(&schema, HashMap::new()).unwrap();

        let doc = json!({"id": "a", "address": {"city": "Berlin"}});
        let wrapped = vtable.wrap(&doc);
        assert_eq!(wrapped.field("address.city"), Some(&json!("Berlin")));
        assert_eq!(wrapped.get("address.city"), Some(&json!("Berlin")));
    }

    #[test]
    fn test_missing_primary_key() {
        let vtable = DocumentVtable::compose(&schema(), HashMap::new()).unwrap();
        let doc = json!({"age": 3});
        assert_eq!(vtable.wrap(&doc).primary_key(), None);
    }
}
