//! The validation pass.

use std::path::Path;

use akao_yaml::{Yaml, YamlData};
use log::debug;

use crate::{
    akao::{self, DocumentKind},
    result::{child_path, item_path, Findings, ValidationResult},
    schema::{self, SchemaError, SchemaRule},
};

/// The maximum nesting depth followed by the structural walk.
///
/// Programmatically built trees may be cyclic; deeper nodes are reported rather than visited.
const MAX_DEPTH: usize = 512;

/// How thoroughly a tree is checked.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValidationLevel {
    /// Only walk the structure of the tree. Schema rules are not applied.
    Basic,
    /// Walk the structure and apply the schema rules.
    #[default]
    Standard,
    /// As [`Self::Standard`], and findings that are warnings otherwise (empty required sections,
    /// unresolved aliases) are errors.
    Strict,
    /// As [`Self::Standard`], and documents that look like Akao philosophies, rules or rulesets
    /// are checked against the matching fixed schema.
    AkaoSpec,
}

/// A tree validator holding a set of [`SchemaRule`]s.
///
/// Validation never fails and never modifies the tree: every finding is collected in the
/// returned [`ValidationResult`].
///
/// ```
/// use akao_yaml::NodeType;
/// use akao_yaml_validator::{SchemaRule, YamlValidator};
///
/// let mut validator = YamlValidator::default();
/// validator.add_schema_rule(SchemaRule::new("/port").required().with_type(NodeType::Integer));
///
/// let result = validator.validate_str("port: http\n");
/// assert!(!result.is_valid);
/// assert_eq!(result.errors[0].path, "/port");
/// assert_eq!((result.errors[0].line, result.errors[0].column), (1, 7));
/// ```
#[derive(Clone, Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct YamlValidator {
    level: ValidationLevel,
    rules: Vec<SchemaRule>,
}

impl YamlValidator {
    /// Create a validator with no schema rule.
    #[must_use]
    pub fn new(level: ValidationLevel) -> Self {
        YamlValidator {
            level,
            rules: vec![],
        }
    }

    /// Return the level the validator checks at.
    #[must_use]
    pub fn level(&self) -> ValidationLevel {
        self.level
    }

    /// Change the level the validator checks at.
    pub fn set_level(&mut self, level: ValidationLevel) {
        self.level = level;
    }

    /// Return the schema rules, in the order they are applied.
    #[must_use]
    pub fn schema_rules(&self) -> &[SchemaRule] {
        &self.rules
    }

    /// Add a rule to the schema.
    pub fn add_schema_rule(&mut self, rule: SchemaRule) {
        self.rules.push(rule);
    }

    /// Remove every rule from the schema.
    pub fn clear_schema(&mut self) {
        self.rules.clear();
    }

    /// Add the rules of the schema file at `path`.
    ///
    /// # Errors
    /// Returns a [`SchemaError`] if the file cannot be loaded or does not describe rules. No rule
    /// is added in that case.
    pub fn load_schema(&mut self, path: impl AsRef<Path>) -> Result<(), SchemaError> {
        let rules = schema::load_file(path.as_ref())?;
        debug!(
            "loaded {} schema rules from {}",
            rules.len(),
            path.as_ref().display()
        );
        self.rules.extend(rules);
        Ok(())
    }

    /// Add the rules of a schema document given as text.
    ///
    /// # Errors
    /// See [`Self::load_schema`].
    pub fn load_schema_str(&mut self, text: &str) -> Result<(), SchemaError> {
        self.rules.extend(schema::load_str(text)?);
        Ok(())
    }

    /// Validate the tree rooted at `root`.
    #[must_use]
    pub fn validate(&self, root: &Yaml) -> ValidationResult {
        self.check(root, None)
    }

    /// Parse `text` and validate its first document.
    ///
    /// A parse failure is reported as an error at `/`.
    #[must_use]
    pub fn validate_str(&self, text: &str) -> ValidationResult {
        match akao_yaml::parse(text) {
            Ok(root) => self.validate(&root),
            Err(err) => parse_failure(format!("failed to parse YAML content: {err}")),
        }
    }

    /// Load and validate the first document of the file at `path`.
    ///
    /// A load or parse failure is reported as an error at `/`.
    #[must_use]
    pub fn validate_file(&self, path: impl AsRef<Path>) -> ValidationResult {
        match akao_yaml::parse_file(path.as_ref()) {
            Ok(root) => self.validate(&root),
            Err(err) => parse_failure(format!("failed to parse file: {err}")),
        }
    }

    /// Validate `root` as an Akao philosophy document.
    #[must_use]
    pub fn validate_akao_philosophy(&self, root: &Yaml) -> ValidationResult {
        self.validate_as(root, DocumentKind::Philosophy)
    }

    /// Validate `root` as an Akao rule document.
    #[must_use]
    pub fn validate_akao_rule(&self, root: &Yaml) -> ValidationResult {
        self.validate_as(root, DocumentKind::Rule)
    }

    /// Validate `root` as an Akao ruleset document.
    #[must_use]
    pub fn validate_akao_ruleset(&self, root: &Yaml) -> ValidationResult {
        self.validate_as(root, DocumentKind::Ruleset)
    }

    fn validate_as(&self, root: &Yaml, kind: DocumentKind) -> ValidationResult {
        self.check(root, Some(kind))
    }

    /// Run every check the level calls for. `kind` forces a fixed schema; without it, the
    /// schema is picked from the shape of the document at [`ValidationLevel::AkaoSpec`].
    fn check(&self, root: &Yaml, kind: Option<DocumentKind>) -> ValidationResult {
        let mut findings = Findings::default();
        self.walk(root, "/", 0, &mut findings);
        if self.level != ValidationLevel::Basic {
            for rule in &self.rules {
                self.apply_rule(rule, root, &mut findings);
            }
        }
        let kind = kind.or_else(|| {
            (self.level == ValidationLevel::AkaoSpec)
                .then(|| DocumentKind::detect(root))
                .flatten()
        });
        if let Some(kind) = kind {
            debug!("validating the document as an Akao {kind}");
            akao::check(root, kind, self.strict(), &mut findings);
        }
        findings.finish()
    }

    fn strict(&self) -> bool {
        self.level == ValidationLevel::Strict
    }

    fn walk(&self, node: &Yaml, path: &str, depth: usize, findings: &mut Findings) {
        if depth > MAX_DEPTH {
            findings.error(
                format!("nesting exceeds {MAX_DEPTH} levels; the tree may contain a cycle"),
                path,
                Some(node),
            );
            return;
        }
        let node = node.resolved();
        let data = node.data();
        match *data {
            YamlData::Mapping(ref map) => {
                for (key, value) in map {
                    self.walk(value, &child_path(path, key), depth + 1, findings);
                }
            }
            YamlData::Sequence(ref seq) => {
                for (i, item) in seq.iter().enumerate() {
                    self.walk(item, &item_path(path, i), depth + 1, findings);
                }
            }
            YamlData::Alias(ref name) => {
                let message = format!("alias '*{name}' does not refer to a node");
                if self.strict() {
                    findings.error(message, path, Some(&node));
                } else {
                    findings.warning(message, path, Some(&node));
                }
            }
            _ => {}
        }
    }

    fn apply_rule(&self, rule: &SchemaRule, root: &Yaml, findings: &mut Findings) {
        let Some(node) = get_node_at_path(root, &rule.path) else {
            if rule.is_required {
                findings.error(
                    format!("required field '{}' is missing", rule.path),
                    &rule.path,
                    None,
                );
            }
            return;
        };
        let node = node.resolved();

        if let Some(expected) = rule.required_type {
            let found = node.node_type();
            if found != expected {
                findings.error(
                    format!(
                        "field '{}' should be of type '{expected}', found '{found}'",
                        rule.path
                    ),
                    &rule.path,
                    Some(&node),
                );
            }
        }

        if !rule.allowed_values.is_empty() {
            if let Ok(value) = node.as_string() {
                if !rule.allowed_values.contains(&value) {
                    findings.error(
                        format!(
                            "field '{}' has invalid value '{value}' (allowed: {})",
                            rule.path,
                            rule.allowed_values.join(", ")
                        ),
                        &rule.path,
                        Some(&node),
                    );
                }
            }
        }

        if !rule.allow_empty && is_empty(&node) {
            findings.error(
                format!("field '{}' must not be empty", rule.path),
                &rule.path,
                Some(&node),
            );
        }
    }
}

/// Return the node at `path` under `root`, in [`Yaml::at_path`] syntax.
///
/// ```
/// let doc = akao_yaml::parse("a:\n  - x\n  - y\n").unwrap();
/// let node = akao_yaml_validator::get_node_at_path(&doc, "/a[1]").unwrap();
/// assert_eq!(node.as_string().unwrap(), "y");
/// ```
#[must_use]
pub fn get_node_at_path(root: &Yaml, path: &str) -> Option<Yaml> {
    root.at_path(path)
}

/// Check whether a node is null, an empty string or an empty collection.
pub(crate) fn is_empty(node: &Yaml) -> bool {
    match *node.resolved().data() {
        YamlData::Null => true,
        YamlData::String(ref s) => s.is_empty(),
        YamlData::Sequence(ref seq) => seq.is_empty(),
        YamlData::Mapping(ref map) => map.is_empty(),
        _ => false,
    }
}

fn parse_failure(message: String) -> ValidationResult {
    let mut findings = Findings::default();
    findings.error(message, "/", None);
    findings.finish()
}
