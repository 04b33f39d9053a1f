//! Fixed schemas of Akao philosophy, rule and ruleset documents.

use std::{fmt, sync::OnceLock};

use akao_yaml::{SafelyIndex, Yaml};
use regex::Regex;

use crate::{
    result::{child_path, item_path, Findings, Severity},
    validator::is_empty,
};

/// `akao:philosophy::<category>:<name>:v<N>`
const PHILOSOPHY_ID: &str =
    r"^akao:philosophy::[A-Za-z_][A-Za-z0-9_]*:[A-Za-z_][A-Za-z0-9_]*:v\d+$";
/// `akao:rule::<category>:<name>:v<N>`
const RULE_ID: &str = r"^akao:rule::[A-Za-z_][A-Za-z0-9_]*:[A-Za-z_][A-Za-z0-9_]*:v\d+$";

fn philosophy_id() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(PHILOSOPHY_ID).expect("invalid philosophy id pattern"))
}

fn rule_id() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(RULE_ID).expect("invalid rule id pattern"))
}

/// The kinds of documents with a fixed schema.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DocumentKind {
    Philosophy,
    Rule,
    Ruleset,
}

impl DocumentKind {
    /// Guess the kind of a document from its top-level keys.
    pub(crate) fn detect(root: &Yaml) -> Option<DocumentKind> {
        if root.has_key("rule_collection") {
            Some(DocumentKind::Ruleset)
        } else if root.has_key("philosophy_links") {
            Some(DocumentKind::Rule)
        } else if root.has_key("formal_proof") {
            Some(DocumentKind::Philosophy)
        } else {
            None
        }
    }

    /// The top-level keys a document of this kind must have.
    fn required_sections(self) -> &'static [&'static str] {
        match self {
            DocumentKind::Philosophy => {
                &["metadata", "description", "formal_proof", "implementation"]
            }
            DocumentKind::Rule => &["metadata", "philosophy_links", "validation"],
            DocumentKind::Ruleset => &["metadata", "philosophy_links", "rule_collection"],
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentKind::Philosophy => "philosophy",
            DocumentKind::Rule => "rule",
            DocumentKind::Ruleset => "ruleset",
        })
    }
}

/// Check `root` against the schema of `kind`.
///
/// With `strict`, empty sections are errors rather than warnings.
pub(crate) fn check(root: &Yaml, kind: DocumentKind, strict: bool, findings: &mut Findings) {
    let root = root.resolved();
    if !root.is_mapping() {
        findings.error(
            format!("an Akao {kind} document must be a mapping"),
            "/",
            Some(&root),
        );
        return;
    }
    let empty_severity = if strict {
        Severity::Error
    } else {
        Severity::Warning
    };

    for &section in kind.required_sections() {
        let path = child_path("/", section);
        let Some(node) = root.get(section) else {
            findings.error(format!("missing required '{section}' section"), &path, None);
            continue;
        };
        match section {
            "metadata" => check_metadata(&node, findings),
            "philosophy_links" => check_ids(
                &node,
                &path,
                "philosophy link",
                philosophy_id(),
                empty_severity,
                findings,
            ),
            "rule_collection" => {
                check_ids(&node, &path, "rule id", rule_id(), empty_severity, findings);
            }
            _ => {
                if is_empty(&node) {
                    findings.add(
                        empty_severity,
                        format!("required section '{section}' is empty"),
                        &path,
                        Some(&node),
                    );
                }
            }
        }
    }
}

fn check_metadata(metadata: &Yaml, findings: &mut Findings) {
    if !metadata.resolved().is_mapping() {
        findings.error("metadata must be a mapping", "/metadata", Some(metadata));
        return;
    }
    for field in ["id", "name", "version"] {
        if !metadata.has_key(field) {
            findings.error(
                format!("missing required '{field}' field in metadata"),
                &child_path("/metadata", field),
                None,
            );
        }
    }
}

/// Check a sequence of identifiers against `pattern`.
fn check_ids(
    node: &Yaml,
    path: &str,
    what: &str,
    pattern: &Regex,
    empty_severity: Severity,
    findings: &mut Findings,
) {
    let Ok(items) = node.resolved().as_sequence() else {
        findings.error(format!("{what}s must be a sequence"), path, Some(node));
        return;
    };
    if items.is_empty() {
        findings.add(
            empty_severity,
            format!("{what}s cannot be empty"),
            path,
            Some(node),
        );
    }
    for (i, item) in items.iter().enumerate() {
        let at = item_path(path, i);
        match item.resolved().as_string() {
            Ok(id) if pattern.is_match(&id) => {}
            Ok(id) => findings.error(format!("invalid {what} format: {id}"), &at, Some(item)),
            Err(_) => findings.error(format!("{what} must be a string"), &at, Some(item)),
        }
    }
}
