//! The document tree.
//!
//! Everything the generator produces is a [`Node`]: mappings keep insertion order so the
//! emitted document reads in the order it was assembled. Besides plain data a node can be a
//! [`Reference`] placeholder, which stands in for a shared component definition until the
//! [`references`](crate::references) pass replaces it with a pointer string.

use crate::error::Result;
use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Error as _, Serialize, Serializer};
use std::fmt;

/// Insertion-ordered mapping of a document node
pub type Mapping = IndexMap<String, Node>;

/// A node of the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Node>),
    Mapping(Mapping),
    /// A not yet materialized shared definition
    Reference(Reference),
}

/// Placeholder for a named component definition.
///
/// `locator` names the type whose `#[component]` attribute holds the definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Component category, e.g. `schemas` or `responses`
    pub category: String,
    /// Component name under `components.<category>`
    pub name: String,
    /// Type declaring the definition
    pub locator: String,
}

/// Registry key of a component: `(category, name)`
pub type ComponentKey = (String, String);

/// One step of a location inside the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Path from the root of a tree to one of its nodes
pub type Location = Vec<Segment>;

impl Reference {
    /// Creates a reference whose component name is the locator's type name.
    pub fn new(category: impl Into<String>, locator: impl Into<String>) -> Self {
        let locator = locator.into();
        Self {
            category: category.into(),
            name: locator.clone(),
            locator,
        }
    }

    pub fn key(&self) -> ComponentKey {
        (self.category.clone(), self.name.clone())
    }

    /// The `#/components/<category>/<name>` pointer replacing this placeholder.
    pub fn pointer(&self) -> String {
        format!("#/components/{}/{}", self.category, self.name)
    }
}

impl Node {
    /// An empty mapping node.
    pub fn mapping() -> Self {
        Node::Mapping(Mapping::new())
    }

    /// Converts any serializable value into a tree.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self> {
        let json = serde_json::to_value(value)?;
        Ok(Node::deserialize(json)?)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a direct child of a mapping node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Follows a chain of mapping keys.
    pub fn get_path(&self, keys: &[&str]) -> Option<&Node> {
        keys.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Turns the node into a mapping (discarding any other content) and returns it.
    pub fn ensure_mapping(&mut self) -> &mut Mapping {
        if !matches!(self, Node::Mapping(_)) {
            *self = Node::mapping();
        }
        match self {
            Node::Mapping(map) => map,
            _ => unreachable!("node was just turned into a mapping"),
        }
    }

    /// Turns the node into a sequence (discarding any other content) and returns it.
    pub fn ensure_sequence(&mut self) -> &mut Vec<Node> {
        if !matches!(self, Node::Sequence(_)) {
            *self = Node::Sequence(Vec::new());
        }
        match self {
            Node::Sequence(items) => items,
            _ => unreachable!("node was just turned into a sequence"),
        }
    }

    /// Returns the mapping stored under `key`, creating it when missing.
    pub fn mapping_entry(&mut self, key: &str) -> &mut Mapping {
        self.ensure_mapping()
            .entry(key.to_string())
            .or_insert_with(Node::mapping)
            .ensure_mapping()
    }

    /// Returns the sequence stored under `key`, creating it when missing.
    pub fn sequence_entry(&mut self, key: &str) -> &mut Vec<Node> {
        self.ensure_mapping()
            .entry(key.to_string())
            .or_insert_with(|| Node::Sequence(Vec::new()))
            .ensure_sequence()
    }

    /// Mutable access to the node at `location`.
    pub fn at_mut(&mut self, location: &[Segment]) -> Option<&mut Node> {
        location.iter().try_fold(self, |node, segment| match (node, segment) {
            (Node::Mapping(map), Segment::Key(key)) => map.get_mut(key),
            (Node::Sequence(items), Segment::Index(index)) => items.get_mut(*index),
            _ => None,
        })
    }

    /// Collects every reference placeholder together with its location.
    pub fn references(&self) -> Vec<(Location, Reference)> {
        let mut found = Vec::new();
        collect_references(self, &mut Vec::new(), &mut found);
        found
    }

    pub fn contains_references(&self) -> bool {
        match self {
            Node::Reference(_) => true,
            Node::Sequence(items) => items.iter().any(Node::contains_references),
            Node::Mapping(map) => map.values().any(Node::contains_references),
            _ => false,
        }
    }
}

fn collect_references(node: &Node, location: &mut Location, found: &mut Vec<(Location, Reference)>) {
    match node {
        Node::Reference(reference) => found.push((location.clone(), reference.clone())),
        Node::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                location.push(Segment::Index(index));
                collect_references(item, location, found);
                location.pop();
            }
        }
        Node::Mapping(map) => {
            for (key, value) in map {
                location.push(Segment::Key(key.clone()));
                collect_references(value, location, found);
                location.pop();
            }
        }
        _ => {}
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Integer(value)
    }
}

impl From<Mapping> for Node {
    fn from(value: Mapping) -> Self {
        Node::Mapping(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::Sequence(value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(value) => serializer.serialize_bool(*value),
            Node::Integer(value) => serializer.serialize_i64(*value),
            Node::Float(value) => serializer.serialize_f64(*value),
            Node::String(value) => serializer.serialize_str(value),
            Node::Sequence(items) => items.serialize(serializer),
            Node::Mapping(map) => map.serialize(serializer),
            Node::Reference(reference) => Err(S::Error::custom(format!(
                "unresolved reference to {}",
                reference.pointer()
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a document value")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> std::result::Result<Node, E> {
        Ok(Node::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Node, E> {
        Ok(Node::Integer(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Node, E> {
        Ok(i64::try_from(value)
            .map(Node::Integer)
            .unwrap_or(Node::Float(value as f64)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Node, E> {
        Ok(Node::Float(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Node, E> {
        Ok(Node::String(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> std::result::Result<Node, E> {
        Ok(Node::String(value))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Node, A::Error> {
        let mut map = Mapping::new();
        while let Some((key, value)) = access.next_entry::<String, Node>()? {
            map.insert(key, value);
        }
        Ok(Node::Mapping(map))
    }
}
