//! Materialized result window of a cached query
//!
//! Keeps the sorted result list together with a primary-key map, so
//! classification can answer "is this document in the window" without
//! scanning and every mutation keeps both views consistent.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

/// One window slot: key plus shared document
#[derive(Debug, Clone)]
struct Entry {
    key: String,
    doc: Arc<Value>,
}

/// Sorted result window plus by-key lookup map
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    entries: Vec<Entry>,
    by_key: HashMap<String, Arc<Value>>,
}

impl ResultSet {
    /// Creates an empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a result set from freshly queried documents in query
    /// order, keyed by the given primary key field.
    ///
    /// Documents without a string primary key are kept in the list but
    /// cannot be found by key.
    pub fn from_documents(primary_key: &str, documents: Vec<Value>) -> Self {
        let mut set = Self::new();
        for doc in documents {
            let doc = Arc::new(doc);
            let key = doc
                .get(primary_key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if !key.is_empty() {
                set.by_key.insert(key.clone(), doc.clone());
            }
            set.entries.push(Entry { key, doc });
        }
        set
    }

    /// Number of documents in the window
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the window is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the document with this key is inside the window
    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// The in-window document with this key, if any
    pub fn get(&self, key: &str) -> Option<&Arc<Value>> {
        self.by_key.get(key)
    }

    /// The document at a window position
    pub fn doc_at(&self, position: usize) -> Option<&Arc<Value>> {
        self.entries.get(position).map(|entry| &entry.doc)
    }

    /// Documents in window order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Value>> + '_ {
        self.entries.iter().map(|entry| &entry.doc)
    }

    /// Snapshot of the window in order
    pub fn to_vec(&self) -> Vec<Arc<Value>> {
        self.entries.iter().map(|entry| entry.doc.clone()).collect()
    }

    /// Inserts a document at a window position, clamped to the end.
    ///
    /// Callers remove an existing entry before re-inserting its key,
    /// otherwise the list would hold the key twice.
    pub fn insert_at(&mut self, position: usize, key: impl Into<String>, doc: Value) {
        let key = key.into();
        let doc = Arc::new(doc);
        if !key.is_empty() {
            self.by_key.insert(key.clone(), doc.clone());
        }
        let position = position.min(self.entries.len());
        self.entries.insert(position, Entry { key, doc });
    }

    /// Inserts a document at the front of the window
    pub fn push_front(&mut self, key: impl Into<String>, doc: Value) {
        self.insert_at(0, key, doc);
    }

    /// Appends a document to the end of the window
    pub fn push_back(&mut self, key: impl Into<String>, doc: Value) {
        let position = self.entries.len();
        self.insert_at(position, key, doc);
    }

    /// Removes the first document of the window
    pub fn remove_first(&mut self) -> Option<Arc<Value>> {
        if self.entries.is_empty() {
            return None;
        }
        let entry = self.entries.remove(0);
        self.by_key.remove(&entry.key);
        Some(entry.doc)
    }

    /// Removes the last document of the window
    pub fn remove_last(&mut self) -> Option<Arc<Value>> {
        let entry = self.entries.pop()?;
        self.by_key.remove(&entry.key);
        Some(entry.doc)
    }

    /// Removes the document with this key from the window
    pub fn remove_by_key(&mut self, key: &str) -> Option<Arc<Value>> {
        let position = self.entries.iter().position(|entry| entry.key == key)?;
        let entry = self.entries.remove(position);
        self.by_key.remove(&entry.key);
        Some(entry.doc)
    }

    /// Replaces the document with this key in place, keeping its window
    /// position. Returns false when the key is not in the window.
    pub fn replace_by_key(&mut self, key: &str, doc: Value) -> bool {
        let Some(position) = self.entries.iter().position(|entry| entry.key == key) else {
            return false;
        };
        let doc = Arc::new(doc);
        self.by_key.insert(key.to_string(), doc.clone());
        self.entries[position].doc = doc;
        true
    }

    /// Empties the window
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_key.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, age: i64) -> Value {
        json!({"id": id, "age": age})
    }

    #[test]
    fn test_from_documents_builds_key_map() {
        let set = ResultSet::from_documents("id", vec![doc("a", 1), doc("b", 2)]);
        assert_eq!(set.len(), 2);
        assert!(set.contains_key("a"));
        assert!(set.contains_key("b"));
        assert!(!set.contains_key("c"));
        assert_eq!(set.get("b").map(|d| d.as_ref()), Some(&doc("b", 2)));
    }

    #[test]
    fn test_document_without_key_stays_in_list() {
        let set = ResultSet::from_documents("id", vec![json!({"age": 9})]);
        assert_eq!(set.len(), 1);
        assert!(!set.contains_key(""));
    }

    #[test]
    fn test_insert_at_keeps_order_and_map() {
        let mut set = ResultSet::from_documents("id", vec![doc("a", 1), doc("c", 3)]);
        set.insert_at(1, "b", doc("b", 2));

        let order: Vec<String> = set
            .iter()
            .map(|d| d["id"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert!(set.contains_key("b"));
    }

    #[test]
    fn test_insert_position_clamps_to_end() {
        let mut set = ResultSet::new();
        set.insert_at(99, "a", doc("a", 1));
        assert_eq!(set.len(), 1);
        assert_eq!(set.doc_at(0).map(|d| d.as_ref()), Some(&doc("a", 1)));
    }

    #[test]
    fn test_remove_by_key() {
        let mut set = ResultSet::from_documents("id", vec![doc("a", 1), doc("b", 2), doc("c", 3)]);
        let removed = set.remove_by_key("b");
        assert_eq!(removed.as_deref(), Some(&doc("b", 2)));
        assert_eq!(set.len(), 2);
        assert!(!set.contains_key("b"));
        assert_eq!(set.remove_by_key("b"), None);
    }

    #[test]
    fn test_remove_first_and_last_update_map() {
        let mut set = ResultSet::from_documents("id", vec![doc("a", 1), doc("b", 2), doc("c", 3)]);
        assert_eq!(set.remove_first().as_deref(), Some(&doc("a", 1)));
        assert_eq!(set.remove_last().as_deref(), Some(&doc("c", 3)));
        assert!(!set.contains_key("a"));
        assert!(!set.contains_key("c"));
        assert!(set.contains_key("b"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_replace_by_key_keeps_position() {
        let mut set = ResultSet::from_documents("id", vec![doc("a", 1), doc("b", 2)]);
        assert!(set.replace_by_key("a", doc("a", 99)));
        assert_eq!(set.doc_at(0).map(|d| d.as_ref()), Some(&doc("a", 99)));
        assert_eq!(set.get("a").map(|d| d.as_ref()), Some(&doc("a", 99)));
        assert!(!set.replace_by_key("zz", doc("zz", 0)));
    }
}
