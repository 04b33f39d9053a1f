//! YAML objects manipulation utilities.

#![allow(clippy::module_name_repetitions)]

use std::{
    cell::{Ref, RefCell},
    fmt,
    rc::Rc,
};

use hashlink::LinkedHashMap;
use ordered_float::OrderedFloat;
use thiserror::Error;

use crate::emitter::{EmitError, YamlEmitter};

/// The type contained in the [`YamlData::Sequence`] variant.
pub type Sequence = Vec<Yaml>;
/// The type contained in the [`YamlData::Mapping`] variant.
///
/// Iteration order matches the order in which keys were first inserted.
pub type Mapping = LinkedHashMap<String, Yaml>;

/// A handle to a YAML node.
///
/// Nodes are reference-counted and interiorly mutable: cloning a [`Yaml`] yields a second handle
/// to the *same* node. This is how aliases are represented; resolving `*name` hands out the node
/// that was anchored with `&name`, and a mutation through one handle is visible through all
/// others. Use [`Yaml::deep_clone`] for an independent copy.
///
/// ```
/// use akao_yaml::{SafelyIndex, Yaml};
///
/// let doc = akao_yaml::parse("base: &b {x: 1}\nuse: *b\n").unwrap();
/// let base = doc.get("base").unwrap();
/// base.set_mapping("y", Yaml::integer(2)).unwrap();
/// assert_eq!(doc.get("use").get("y").unwrap().as_integer(), Ok(2));
/// ```
///
/// Equality compares values only; source locations, anchor names and comments are ignored.
#[derive(Clone)]
pub struct Yaml {
    node: Rc<RefCell<Node>>,
}

#[derive(Clone)]
struct Node {
    data: YamlData,
    location: Option<SourceLocation>,
    anchor: Option<String>,
    comments: Vec<String>,
}

/// The value held by a YAML node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum YamlData {
    /// A string scalar.
    String(String),
    /// A 64-bit signed integer.
    Integer(i64),
    /// A 64-bit floating point number.
    ///
    /// `NaN` compares equal to itself so that node trees implement [`Eq`].
    Float(OrderedFloat<f64>),
    /// `true` or `false`.
    Boolean(bool),
    /// `null`, `~`, or an empty value.
    Null,
    /// An ordered list of nodes.
    Sequence(Sequence),
    /// String keys mapped to nodes, in insertion order.
    Mapping(Mapping),
    /// A node carrying an anchor name, as built programmatically.
    ///
    /// Parsed documents never contain this variant: the anchor name is recorded on the node
    /// itself (see [`Yaml::anchor_name`]).
    Anchor(String, Yaml),
    /// A reference to an anchor, as built programmatically.
    ///
    /// Parsed documents never contain this variant: aliases resolve to the anchored node.
    Alias(String),
}

/// The kind of a YAML node, as returned by [`Yaml::node_type`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// See [`YamlData::String`].
    String,
    /// See [`YamlData::Integer`].
    Integer,
    /// See [`YamlData::Float`].
    Float,
    /// See [`YamlData::Boolean`].
    Boolean,
    /// See [`YamlData::Null`].
    Null,
    /// See [`YamlData::Sequence`].
    Sequence,
    /// See [`YamlData::Mapping`].
    Mapping,
    /// See [`YamlData::Anchor`].
    Anchor,
    /// See [`YamlData::Alias`].
    Alias,
}

impl NodeType {
    /// Return the kind of the given value.
    #[must_use]
    pub fn of(data: &YamlData) -> NodeType {
        match data {
            YamlData::String(_) => NodeType::String,
            YamlData::Integer(_) => NodeType::Integer,
            YamlData::Float(_) => NodeType::Float,
            YamlData::Boolean(_) => NodeType::Boolean,
            YamlData::Null => NodeType::Null,
            YamlData::Sequence(_) => NodeType::Sequence,
            YamlData::Mapping(_) => NodeType::Mapping,
            YamlData::Anchor(..) => NodeType::Anchor,
            YamlData::Alias(_) => NodeType::Alias,
        }
    }

    /// The lowercase name of the kind (`string`, `integer`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::String => "string",
            NodeType::Integer => "integer",
            NodeType::Float => "float",
            NodeType::Boolean => "boolean",
            NodeType::Null => "null",
            NodeType::Sequence => "sequence",
            NodeType::Mapping => "mapping",
            NodeType::Anchor => "anchor",
            NodeType::Alias => "alias",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a node was read from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// The file the node was loaded from, if it was loaded from a file.
    pub file: Option<Rc<str>>,
    /// The line (1-based) of the first character of the node.
    pub line: usize,
    /// The column (1-based) of the first character of the node.
    pub column: usize,
}

/// An error raised by a typed accessor or a mutation of a [`Yaml`] node.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum NodeError {
    /// The node does not hold the type required by the operation.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The type the operation required.
        expected: NodeType,
        /// The type the node holds.
        found: NodeType,
    },
}

impl NodeError {
    pub(crate) fn mismatch(expected: NodeType, found: &YamlData) -> NodeError {
        NodeError::TypeMismatch {
            expected,
            found: NodeType::of(found),
        }
    }
}

impl Yaml {
    /// Create a node holding the given value, with no metadata.
    #[must_use]
    pub fn new(data: YamlData) -> Yaml {
        Yaml {
            node: Rc::new(RefCell::new(Node {
                data,
                location: None,
                anchor: None,
                comments: vec![],
            })),
        }
    }

    /// Create a string node.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Yaml {
        Yaml::new(YamlData::String(value.into()))
    }

    /// Create an integer node.
    #[must_use]
    pub fn integer(value: i64) -> Yaml {
        Yaml::new(YamlData::Integer(value))
    }

    /// Create a floating point node.
    #[must_use]
    pub fn float(value: f64) -> Yaml {
        Yaml::new(YamlData::Float(OrderedFloat(value)))
    }

    /// Create a boolean node.
    #[must_use]
    pub fn boolean(value: bool) -> Yaml {
        Yaml::new(YamlData::Boolean(value))
    }

    /// Create a null node.
    #[must_use]
    pub fn null() -> Yaml {
        Yaml::new(YamlData::Null)
    }

    /// Create an empty sequence node.
    #[must_use]
    pub fn sequence() -> Yaml {
        Yaml::new(YamlData::Sequence(Sequence::new()))
    }

    /// Create an empty mapping node.
    #[must_use]
    pub fn mapping() -> Yaml {
        Yaml::new(YamlData::Mapping(Mapping::new()))
    }

    /// Create a node wrapping `target` under the anchor `name`.
    #[must_use]
    pub fn anchor(name: impl Into<String>, target: Yaml) -> Yaml {
        Yaml::new(YamlData::Anchor(name.into(), target))
    }

    /// Create an alias node referring to the anchor `name`.
    #[must_use]
    pub fn alias(name: impl Into<String>) -> Yaml {
        Yaml::new(YamlData::Alias(name.into()))
    }

    /// Borrow the value held by the node.
    ///
    /// # Panics
    /// Panics if the node is currently being mutated through another handle.
    #[must_use]
    pub fn data(&self) -> Ref<'_, YamlData> {
        Ref::map(self.node.borrow(), |node| &node.data)
    }

    /// Replace the value held by the node, keeping its metadata.
    ///
    /// The change is visible through every handle to the node.
    pub fn set_data(&self, data: YamlData) {
        self.node.borrow_mut().data = data;
    }

    /// Return the kind of the node.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        NodeType::of(&self.data())
    }

    define_is!(is_string, YamlData::String(_));
    define_is!(is_integer, YamlData::Integer(_));
    define_is!(is_float, YamlData::Float(_));
    define_is!(is_boolean, YamlData::Boolean(_));
    define_is!(is_null, YamlData::Null);
    define_is!(is_sequence, YamlData::Sequence(_));
    define_is!(is_mapping, YamlData::Mapping(_));
    define_is!(is_anchor, YamlData::Anchor(..));
    define_is!(is_alias, YamlData::Alias(_));

    /// Check whether the node is a string, a number, a boolean or null.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(
            *self.data(),
            YamlData::String(_)
                | YamlData::Integer(_)
                | YamlData::Float(_)
                | YamlData::Boolean(_)
                | YamlData::Null
        )
    }

    /// Check whether the node is a sequence or a mapping.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(*self.data(), YamlData::Sequence(_) | YamlData::Mapping(_))
    }

    /// Get a copy of the string held by the node.
    ///
    /// # Errors
    /// Returns [`NodeError::TypeMismatch`] if the node is not a string.
    pub fn as_string(&self) -> Result<String, NodeError> {
        match *self.data() {
            YamlData::String(ref v) => Ok(v.clone()),
            ref other => Err(NodeError::mismatch(NodeType::String, other)),
        }
    }

    /// Get a copy of the string held by the node, or `default` if it holds another type.
    #[must_use]
    pub fn as_string_or_default(&self, default: &str) -> String {
        self.as_string().unwrap_or_else(|_| default.to_string())
    }

    define_as!(as_integer, as_integer_or_default, i64, Integer);
    define_as!(as_float, as_float_or_default, f64, Float);
    define_as!(as_boolean, as_boolean_or_default, bool, Boolean);

    /// Get handles to the elements of the sequence.
    ///
    /// # Errors
    /// Returns [`NodeError::TypeMismatch`] if the node is not a sequence.
    pub fn as_sequence(&self) -> Result<Sequence, NodeError> {
        match *self.data() {
            YamlData::Sequence(ref v) => Ok(v.clone()),
            ref other => Err(NodeError::mismatch(NodeType::Sequence, other)),
        }
    }

    /// Get handles to the entries of the mapping, in order.
    ///
    /// # Errors
    /// Returns [`NodeError::TypeMismatch`] if the node is not a mapping.
    pub fn as_mapping(&self) -> Result<Mapping, NodeError> {
        match *self.data() {
            YamlData::Mapping(ref v) => Ok(v.clone()),
            ref other => Err(NodeError::mismatch(NodeType::Mapping, other)),
        }
    }

    /// Follow [`YamlData::Anchor`] wrappers down to the node they annotate.
    #[must_use]
    pub fn resolved(&self) -> Yaml {
        let mut current = self.clone();
        loop {
            let next = match *current.data() {
                YamlData::Anchor(_, ref target) => target.clone(),
                _ => break,
            };
            if next.ptr_eq(self) {
                break;
            }
            current = next;
        }
        current
    }

    /// Check whether `key` is a key of the mapping.
    ///
    /// Returns `false` if the node is not a mapping.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        match *self.resolved().data() {
            YamlData::Mapping(ref map) => map.contains_key(key),
            _ => false,
        }
    }

    /// Return the number of elements of a sequence or entries of a mapping, `0` otherwise.
    #[must_use]
    pub fn size(&self) -> usize {
        match *self.resolved().data() {
            YamlData::Sequence(ref seq) => seq.len(),
            YamlData::Mapping(ref map) => map.len(),
            _ => 0,
        }
    }

    /// Return the keys of the mapping in order, or an empty list if the node is not a mapping.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        match *self.resolved().data() {
            YamlData::Mapping(ref map) => map.keys().cloned().collect(),
            _ => vec![],
        }
    }

    /// Set `key` to `value` in the mapping.
    ///
    /// An existing key keeps its position and has its value replaced.
    ///
    /// # Errors
    /// Returns [`NodeError::TypeMismatch`] if the node is not a mapping.
    pub fn set_mapping(&self, key: impl Into<String>, value: Yaml) -> Result<(), NodeError> {
        let mut node = self.node.borrow_mut();
        match node.data {
            YamlData::Mapping(ref mut map) => {
                let key = key.into();
                if let Some(slot) = map.get_mut(&key) {
                    *slot = value;
                } else {
                    map.insert(key, value);
                }
                Ok(())
            }
            ref other => Err(NodeError::mismatch(NodeType::Mapping, other)),
        }
    }

    /// Append `value` to the sequence.
    ///
    /// # Errors
    /// Returns [`NodeError::TypeMismatch`] if the node is not a sequence.
    pub fn add_to_sequence(&self, value: Yaml) -> Result<(), NodeError> {
        let mut node = self.node.borrow_mut();
        match node.data {
            YamlData::Sequence(ref mut seq) => {
                seq.push(value);
                Ok(())
            }
            ref other => Err(NodeError::mismatch(NodeType::Sequence, other)),
        }
    }

    /// Return where the node was read from, if it was parsed.
    #[must_use]
    pub fn location(&self) -> Option<SourceLocation> {
        self.node.borrow().location.clone()
    }

    /// Record where the node was read from.
    pub fn set_location(&self, location: SourceLocation) {
        self.node.borrow_mut().location = Some(location);
    }

    /// Return the name of the anchor the node was defined with (`&name`), if any.
    #[must_use]
    pub fn anchor_name(&self) -> Option<String> {
        self.node.borrow().anchor.clone()
    }

    pub(crate) fn set_anchor_name(&self, name: &str) {
        self.node.borrow_mut().anchor = Some(name.to_string());
    }

    /// Return the comments attached to the node.
    ///
    /// Comments are only collected when parsing with
    /// [`ParseOptions::preserve_comments`](crate::ParseOptions::preserve_comments).
    #[must_use]
    pub fn comments(&self) -> Vec<String> {
        self.node.borrow().comments.clone()
    }

    /// Attach a comment to the node.
    pub fn add_comment(&self, comment: impl Into<String>) {
        self.node.borrow_mut().comments.push(comment.into());
    }

    /// Check whether both handles refer to the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Yaml) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// Copy the whole tree rooted at this node.
    ///
    /// Nodes shared through aliases are copied once per reference, so the copy shares nothing
    /// with `self` nor within itself.
    ///
    /// # Panics
    /// Overflows the stack if the tree is cyclic.
    #[must_use]
    pub fn deep_clone(&self) -> Yaml {
        let node = self.node.borrow();
        let data = match node.data {
            YamlData::Sequence(ref seq) => {
                YamlData::Sequence(seq.iter().map(Yaml::deep_clone).collect())
            }
            YamlData::Mapping(ref map) => YamlData::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.deep_clone()))
                    .collect(),
            ),
            YamlData::Anchor(ref name, ref target) => {
                YamlData::Anchor(name.clone(), target.deep_clone())
            }
            ref scalar => scalar.clone(),
        };
        Yaml {
            node: Rc::new(RefCell::new(Node {
                data,
                location: node.location.clone(),
                anchor: node.anchor.clone(),
                comments: node.comments.clone(),
            })),
        }
    }

    /// Serialize the tree rooted at this node as a YAML document.
    ///
    /// Nested blocks are indented by `indent` spaces (at least 2). The output ends with a newline
    /// and parses back into a tree equal to `self`.
    ///
    /// ```
    /// use akao_yaml::Yaml;
    ///
    /// let root = Yaml::mapping();
    /// let list = Yaml::sequence();
    /// list.add_to_sequence(Yaml::integer(1)).unwrap();
    /// root.set_mapping("list", list).unwrap();
    /// assert_eq!(root.to_yaml(2).unwrap(), "list:\n  - 1\n");
    /// ```
    ///
    /// # Errors
    /// Returns [`EmitError::Recursion`] if the tree is nested too deeply, which happens for
    /// cyclic trees.
    pub fn to_yaml(&self, indent: usize) -> Result<String, EmitError> {
        let mut out = String::new();
        let mut emitter = YamlEmitter::new(&mut out);
        emitter.indent(indent);
        emitter.dump(self)?;
        Ok(out)
    }
}

impl From<YamlData> for Yaml {
    fn from(data: YamlData) -> Self {
        Yaml::new(data)
    }
}

impl PartialEq for Yaml {
    fn eq(&self, other: &Yaml) -> bool {
        self.ptr_eq(other) || *self.data() == *other.data()
    }
}

impl Eq for Yaml {}

impl fmt::Debug for Yaml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.data(), f)
    }
}

/// A short, single-line description of the node.
///
/// Scalars print their value; collections print their size.
impl fmt::Display for Yaml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.data() {
            YamlData::String(ref v) => f.write_str(v),
            YamlData::Integer(v) => write!(f, "{v}"),
            YamlData::Float(v) => write!(f, "{v}"),
            YamlData::Boolean(v) => write!(f, "{v}"),
            YamlData::Null => f.write_str("null"),
            YamlData::Sequence(ref seq) => write!(f, "[sequence with {} elements]", seq.len()),
            YamlData::Mapping(ref map) => write!(f, "{{mapping with {} keys}}", map.len()),
            YamlData::Anchor(ref name, ref target) => write!(f, "&{name} {target}"),
            YamlData::Alias(ref name) => write!(f, "*{name}"),
        }
    }
}
