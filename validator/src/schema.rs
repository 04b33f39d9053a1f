//! Declarative schema rules and schema files.

use std::path::Path;

use akao_yaml::{LoadError, NodeType, ParseError, SafelyIndex, Yaml};
use thiserror::Error;

/// A constraint on the node at a given path.
///
/// ```
/// use akao_yaml::NodeType;
/// use akao_yaml_validator::SchemaRule;
///
/// let rule = SchemaRule::new("/metadata/version")
///     .required()
///     .with_type(NodeType::String)
///     .with_allowed_values(["v1", "v2"]);
/// assert!(rule.is_required);
/// assert!(rule.allow_empty);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct SchemaRule {
    /// The path of the node, in [`Yaml::at_path`] syntax.
    pub path: String,
    /// The type the node must have, if any.
    pub required_type: Option<NodeType>,
    /// Whether the node must exist.
    pub is_required: bool,
    /// The values a string node may take. Empty means any value.
    pub allowed_values: Vec<String>,
    /// Whether the node may be an empty string, sequence or mapping, or null.
    pub allow_empty: bool,
}

impl SchemaRule {
    /// Create a rule that accepts anything at `path`, including nothing.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        SchemaRule {
            path: path.into(),
            required_type: None,
            is_required: false,
            allowed_values: vec![],
            allow_empty: true,
        }
    }

    /// Require the node to exist (builder-style).
    #[must_use]
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Require the node to have the given type (builder-style).
    #[must_use]
    pub fn with_type(mut self, node_type: NodeType) -> Self {
        self.required_type = Some(node_type);
        self
    }

    /// Restrict the values of a string node (builder-style).
    #[must_use]
    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Set [`Self::allow_empty`] (builder-style).
    #[must_use]
    pub fn with_allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }
}

/// An error loading a schema file.
#[derive(Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SchemaError {
    /// The schema file could not be read or parsed.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The schema text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The schema was parsed, but does not describe rules.
    #[error("invalid schema at {path}: {message}")]
    Invalid {
        /// Where in the schema document the problem is.
        path: String,
        /// What is wrong.
        message: String,
    },
}

impl SchemaError {
    fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::Invalid {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Read the rules of a schema file.
pub(crate) fn load_file(path: &Path) -> Result<Vec<SchemaRule>, SchemaError> {
    rules_from_document(&akao_yaml::parse_file(path)?)
}

/// Read the rules of a schema document given as text.
pub(crate) fn load_str(text: &str) -> Result<Vec<SchemaRule>, SchemaError> {
    rules_from_document(&akao_yaml::parse(text)?)
}

/// Read the rules of a schema document.
///
/// ```yaml
/// rules:
///   - path: /metadata/id
///     type: string
///     required: true
///     allowed_values: [a, b]
///     allow_empty: false
/// ```
fn rules_from_document(doc: &Yaml) -> Result<Vec<SchemaRule>, SchemaError> {
    let rules = doc
        .get("rules")
        .ok_or_else(|| SchemaError::invalid("/", "missing 'rules' sequence"))?;
    let rules = rules
        .as_sequence()
        .map_err(|e| SchemaError::invalid("/rules", e.to_string()))?;
    rules
        .iter()
        .enumerate()
        .map(|(i, rule)| rule_from_node(rule, &format!("/rules[{i}]")))
        .collect()
}

fn rule_from_node(node: &Yaml, at: &str) -> Result<SchemaRule, SchemaError> {
    if !node.resolved().is_mapping() {
        return Err(SchemaError::invalid(at, "a rule must be a mapping"));
    }
    let field = |key: &str| node.get(key).map(|value| (value, format!("{at}/{key}")));

    let path = match field("path") {
        Some((value, path)) => value
            .as_string()
            .map_err(|e| SchemaError::invalid(path, e.to_string()))?,
        None => return Err(SchemaError::invalid(at, "missing 'path'")),
    };
    let mut rule = SchemaRule::new(path);
    if let Some((value, path)) = field("type") {
        let name = value
            .as_string()
            .map_err(|e| SchemaError::invalid(&path, e.to_string()))?;
        let node_type = parse_node_type(&name)
            .ok_or_else(|| SchemaError::invalid(&path, format!("unknown type '{name}'")))?;
        rule = rule.with_type(node_type);
    }
    if let Some((value, path)) = field("required") {
        rule.is_required = value
            .as_boolean()
            .map_err(|e| SchemaError::invalid(path, e.to_string()))?;
    }
    if let Some((value, path)) = field("allow_empty") {
        rule.allow_empty = value
            .as_boolean()
            .map_err(|e| SchemaError::invalid(path, e.to_string()))?;
    }
    if let Some((value, path)) = field("allowed_values") {
        let values = value
            .as_sequence()
            .map_err(|e| SchemaError::invalid(&path, e.to_string()))?;
        rule.allowed_values = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_string()
                    .map_err(|e| SchemaError::invalid(format!("{path}[{i}]"), e.to_string()))
            })
            .collect::<Result<_, _>>()?;
    }
    Ok(rule)
}

/// Parse the name of a node type, as written by [`NodeType::as_str`].
fn parse_node_type(name: &str) -> Option<NodeType> {
    Some(match name {
        "string" => NodeType::String,
        "integer" => NodeType::Integer,
        "float" => NodeType::Float,
        "boolean" => NodeType::Boolean,
        "null" => NodeType::Null,
        "sequence" => NodeType::Sequence,
        "mapping" => NodeType::Mapping,
        _ => return None,
    })
}
