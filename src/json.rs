//! Thin document-builder wrapper over `serde_json`.
//!
//! Mirrors the record-oriented style of the rest of the crate: one writer
//! owns one mutable document, the root is set once, and nested nodes are
//! grown in place through handles into the tree. Available behind the
//! `json` feature.

use serde_json::{Map, Value};

/// Mutable JSON document builder.
#[derive(Debug, Default)]
pub struct JsonWriter {
    doc: Value,
}

impl JsonWriter {
    /// Writer with a null root.
    pub fn new() -> Self {
        Self { doc: Value::Null }
    }

    /// Replace the root with an empty object and return a handle to it.
    pub fn object_root(&mut self) -> &mut Map<String, Value> {
        self.doc = Value::Object(Map::new());
        match &mut self.doc {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    /// Replace the root with an empty array and return a handle to it.
    pub fn array_root(&mut self) -> &mut Vec<Value> {
        self.doc = Value::Array(Vec::new());
        match &mut self.doc {
            Value::Array(arr) => arr,
            _ => unreachable!(),
        }
    }

    /// Replace the root with null.
    pub fn null_root(&mut self) {
        self.doc = Value::Null;
    }

    /// Replace the root with a scalar.
    pub fn scalar_root(&mut self, value: impl Into<Value>) {
        self.doc = value.into();
    }

    /// Add an empty object under `key` and return a handle to it.
    pub fn add_object_to_object<'a>(
        parent: &'a mut Map<String, Value>,
        key: &str,
    ) -> Option<&'a mut Map<String, Value>> {
        parent.insert(key.to_string(), Value::Object(Map::new()));
        match parent.get_mut(key) {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Add an empty array under `key` and return a handle to it.
    pub fn add_array_to_object<'a>(
        parent: &'a mut Map<String, Value>,
        key: &str,
    ) -> Option<&'a mut Vec<Value>> {
        parent.insert(key.to_string(), Value::Array(Vec::new()));
        match parent.get_mut(key) {
            Some(Value::Array(arr)) => Some(arr),
            _ => None,
        }
    }

    /// Add a scalar or prebuilt value under `key`.
    pub fn add_value_to_object(
        parent: &mut Map<String, Value>,
        key: &str,
        value: impl Into<Value>,
    ) {
        parent.insert(key.to_string(), value.into());
    }

    /// Push an empty object and return a handle to it.
    pub fn add_object_to_array(parent: &mut Vec<Value>) -> Option<&mut Map<String, Value>> {
        parent.push(Value::Object(Map::new()));
        match parent.last_mut() {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Push an empty array and return a handle to it.
    pub fn add_array_to_array(parent: &mut Vec<Value>) -> Option<&mut Vec<Value>> {
        parent.push(Value::Array(Vec::new()));
        match parent.last_mut() {
            Some(Value::Array(arr)) => Some(arr),
            _ => None,
        }
    }

    /// Push a scalar or prebuilt value.
    pub fn add_value_to_array(parent: &mut Vec<Value>, value: impl Into<Value>) {
        parent.push(value.into());
    }

    /// Immutable view of the whole document.
    pub fn root(&self) -> &Value {
        &self.doc
    }

    /// Render the document as compact JSON text.
    pub fn render(&self) -> String {
        self.doc.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fresh_writer_renders_null() {
        let w = JsonWriter::new();
        assert_eq!(w.render(), "null");
    }

    #[test]
    fn object_root_with_scalars() {
        let mut w = JsonWriter::new();
        let root = w.object_root();
        JsonWriter::add_value_to_object(root, "id", 7);
        JsonWriter::add_value_to_object(root, "name", "probe");
        JsonWriter::add_value_to_object(root, "live", true);
        assert_eq!(*w.root(), json!({"id": 7, "name": "probe", "live": true}));
    }

    #[test]
    fn nested_arrays_and_objects() {
        let mut w = JsonWriter::new();
        let root = w.object_root();
        let items = JsonWriter::add_array_to_object(root, "items").unwrap();
        let first = JsonWriter::add_object_to_array(items).unwrap();
        JsonWriter::add_value_to_object(first, "n", 1);
        JsonWriter::add_value_to_array(items, 2.5);
        assert_eq!(*w.root(), json!({"items": [{"n": 1}, 2.5]}));
    }

    #[test]
    fn root_can_be_replaced() {
        let mut w = JsonWriter::new();
        w.object_root();
        w.scalar_root("done");
        assert_eq!(w.render(), "\"done\"");
        w.null_root();
        assert_eq!(w.render(), "null");
    }
}
