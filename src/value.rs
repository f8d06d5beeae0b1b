use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::ConfigError;

/// A single node in a configuration tree.
///
/// A `Value` owns all of its descendants; `clone()` is always a deep copy,
/// so two trees never share mutable state. Mapping keys are unique and kept
/// in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

/// Key of a child node yielded by [`Value::children`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKey<'a> {
    Key(&'a str),
    Index(usize),
}

impl Value {
    /// An empty mapping node.
    pub fn mapping() -> Self {
        Value::Mapping(IndexMap::new())
    }

    /// An empty sequence node.
    pub fn sequence() -> Self {
        Value::Sequence(Vec::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    /// True for null and for empty containers. Scalars are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Sequence(seq) => seq.is_empty(),
            Value::Mapping(map) => map.is_empty(),
            _ => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    pub fn as_bool(&self) -> Result<bool, ConfigError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(type_mismatch("bool", other)),
        }
    }

    pub fn as_int(&self) -> Result<i64, ConfigError> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(type_mismatch("int", other)),
        }
    }

    /// Numeric accessor. Ints widen to float; nothing else coerces.
    pub fn as_float(&self) -> Result<f64, ConfigError> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            other => Err(type_mismatch("float", other)),
        }
    }

    pub fn as_str(&self) -> Result<&str, ConfigError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(type_mismatch("string", other)),
        }
    }

    pub fn as_sequence(&self) -> Result<&Vec<Value>, ConfigError> {
        match self {
            Value::Sequence(seq) => Ok(seq),
            other => Err(type_mismatch("sequence", other)),
        }
    }

    pub fn as_sequence_mut(&mut self) -> Result<&mut Vec<Value>, ConfigError> {
        match self {
            Value::Sequence(seq) => Ok(seq),
            other => Err(type_mismatch("sequence", other)),
        }
    }

    pub fn as_mapping(&self) -> Result<&IndexMap<String, Value>, ConfigError> {
        match self {
            Value::Mapping(map) => Ok(map),
            other => Err(type_mismatch("mapping", other)),
        }
    }

    pub fn as_mapping_mut(&mut self) -> Result<&mut IndexMap<String, Value>, ConfigError> {
        match self {
            Value::Mapping(map) => Ok(map),
            other => Err(type_mismatch("mapping", other)),
        }
    }

    /// Iterate over direct children as `(key, value)` pairs.
    ///
    /// Mappings yield `ValueKey::Key` in insertion order, sequences yield
    /// `ValueKey::Index` in index order, scalars yield nothing.
    pub fn children(&self) -> Children<'_> {
        let inner = match self {
            Value::Mapping(map) => ChildrenInner::Mapping(map.iter()),
            Value::Sequence(seq) => ChildrenInner::Sequence(seq.iter().enumerate()),
            _ => ChildrenInner::Scalar,
        };
        Children { inner }
    }
}

fn type_mismatch(expected: &str, found: &Value) -> ConfigError {
    ConfigError::TypeMismatch {
        expected: expected.to_string(),
        found: found.type_name().to_string(),
        hint: None,
        code: Some(400),
    }
}

/// Single-pass iterator over the direct children of a node.
pub struct Children<'a> {
    inner: ChildrenInner<'a>,
}

enum ChildrenInner<'a> {
    Mapping(indexmap::map::Iter<'a, String, Value>),
    Sequence(std::iter::Enumerate<std::slice::Iter<'a, Value>>),
    Scalar,
}

impl<'a> Iterator for Children<'a> {
    type Item = (ValueKey<'a>, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            ChildrenInner::Mapping(iter) => {
                iter.next().map(|(k, v)| (ValueKey::Key(k.as_str()), v))
            }
            ChildrenInner::Sequence(iter) => iter.next().map(|(i, v)| (ValueKey::Index(i), v)),
            ChildrenInner::Scalar => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Sequence(value)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(value: IndexMap<String, Value>) -> Self {
        Value::Mapping(value)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(seq) => {
                let mut state = serializer.serialize_seq(Some(seq.len()))?;
                for item in seq {
                    state.serialize_element(item)?;
                }
                state.end()
            }
            Value::Mapping(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    state.serialize_entry(key, value)?;
                }
                state.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mapping() -> Value {
        let mut inner = IndexMap::new();
        inner.insert("host".to_string(), Value::from("localhost"));
        inner.insert("port".to_string(), Value::from(8080_i64));
        let mut map = IndexMap::new();
        map.insert("server".to_string(), Value::Mapping(inner));
        map.insert(
            "tags".to_string(),
            Value::Sequence(vec![Value::from("a"), Value::from("b")]),
        );
        Value::Mapping(map)
    }

    #[test]
    fn test_accessors_reject_wrong_kind() {
        let value = Value::from(42_i64);
        assert_eq!(value.as_int().unwrap(), 42);
        assert!(value.as_bool().is_err());
        assert!(value.as_str().is_err());
        assert!(value.as_sequence().is_err());
        assert!(value.as_mapping().is_err());
    }

    #[test]
    fn test_as_float_widens_int() {
        assert_eq!(Value::from(3_i64).as_float().unwrap(), 3.0);
        assert_eq!(Value::from(2.5).as_float().unwrap(), 2.5);
        assert!(Value::from("3").as_float().is_err());
    }

    #[test]
    fn test_is_empty() {
        assert!(Value::Null.is_empty());
        assert!(Value::mapping().is_empty());
        assert!(Value::sequence().is_empty());
        assert!(!Value::from(0_i64).is_empty());
        assert!(!Value::from("").is_empty());
        assert!(!sample_mapping().is_empty());
    }

    #[test]
    fn test_clone_is_deep() {
        let original = sample_mapping();
        let mut copy = original.clone();
        let server = copy.as_mapping_mut().unwrap().get_mut("server").unwrap();
        server
            .as_mapping_mut()
            .unwrap()
            .insert("port".to_string(), Value::from(9999_i64));

        let original_port = original.as_mapping().unwrap()["server"]
            .as_mapping()
            .unwrap()["port"]
            .as_int()
            .unwrap();
        assert_eq!(original_port, 8080);
    }

    #[test]
    fn test_mapping_insert_overwrites_duplicate_key() {
        let mut map = IndexMap::new();
        map.insert("key".to_string(), Value::from(1_i64));
        map.insert("key".to_string(), Value::from(2_i64));
        assert_eq!(map.len(), 1);
        assert_eq!(map["key"], Value::Int(2));
    }

    #[test]
    fn test_children_order() {
        let value = sample_mapping();
        let keys: Vec<_> = value.children().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![ValueKey::Key("server"), ValueKey::Key("tags")]);

        let seq = &value.as_mapping().unwrap()["tags"];
        let keys: Vec<_> = seq.children().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![ValueKey::Index(0), ValueKey::Index(1)]);

        assert_eq!(Value::from("scalar").children().count(), 0);
    }

    #[test]
    fn test_serialize_preserves_insertion_order() {
        let value = sample_mapping();
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(
            json,
            r#"{"server":{"host":"localhost","port":8080},"tags":["a","b"]}"#
        );
    }
}
