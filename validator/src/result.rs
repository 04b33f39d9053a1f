//! Validation findings.

use std::fmt;

use akao_yaml::Yaml;

/// How serious a finding is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The document does not satisfy the schema.
    Error,
    /// The document satisfies the schema, but something looks off.
    Warning,
}

impl Severity {
    /// The lowercase name of the severity.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding, located by its path in the tree.
///
/// `line` and `column` come from the [`SourceLocation`](akao_yaml::SourceLocation) of the
/// offending node, and are 0 when the node was not parsed (or does not exist).
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct ValidationError {
    /// A human-readable description.
    pub message: String,
    /// Where in the tree the finding is: `/`, `/a/b`, `/a[3]`.
    pub path: String,
    /// The line of the offending node, 1-based, or 0.
    pub line: usize,
    /// The column of the offending node, 1-based, or 0.
    pub column: usize,
    /// Whether the finding is an error or a warning.
    pub severity: Severity,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)?;
        if self.line > 0 {
            write!(f, " (line {}, column {})", self.line, self.column)?;
        }
        Ok(())
    }
}

/// The outcome of validating a tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct ValidationResult {
    /// Whether no error was found. Warnings do not make a tree invalid.
    pub is_valid: bool,
    /// The errors, in the order they were found.
    pub errors: Vec<ValidationError>,
    /// The warnings, in the order they were found.
    pub warnings: Vec<ValidationError>,
    /// A one-line summary of the findings.
    pub summary: String,
}

impl ValidationResult {
    /// Iterate over errors, then warnings.
    pub fn findings(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Return the first error reported at `path`, if any.
    #[must_use]
    pub fn error_at(&self, path: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.path == path)
    }
}

/// Accumulates findings during a validation pass.
#[derive(Debug, Default)]
pub(crate) struct Findings {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl Findings {
    pub(crate) fn add(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        path: &str,
        node: Option<&Yaml>,
    ) {
        let (line, column) = node
            .and_then(Yaml::location)
            .map_or((0, 0), |location| (location.line, location.column));
        let finding = ValidationError {
            message: message.into(),
            path: path.to_string(),
            line,
            column,
            severity,
        };
        log::debug!("{finding}");
        match severity {
            Severity::Error => self.errors.push(finding),
            Severity::Warning => self.warnings.push(finding),
        }
    }

    pub(crate) fn error(&mut self, message: impl Into<String>, path: &str, node: Option<&Yaml>) {
        self.add(Severity::Error, message, path, node);
    }

    pub(crate) fn warning(&mut self, message: impl Into<String>, path: &str, node: Option<&Yaml>) {
        self.add(Severity::Warning, message, path, node);
    }

    pub(crate) fn finish(self) -> ValidationResult {
        let summary = if self.errors.is_empty() && self.warnings.is_empty() {
            "YAML validation passed with no issues".to_string()
        } else {
            format!(
                "Validation completed with {} errors and {} warnings",
                self.errors.len(),
                self.warnings.len()
            )
        };
        ValidationResult {
            is_valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            summary,
        }
    }
}

/// Append a mapping key to a path.
pub(crate) fn child_path(base: &str, key: &str) -> String {
    if base == "/" {
        format!("/{key}")
    } else {
        format!("{base}/{key}")
    }
}

/// Append a sequence index to a path.
pub(crate) fn item_path(base: &str, index: usize) -> String {
    if base == "/" {
        format!("/[{index}]")
    } else {
        format!("{base}[{index}]")
    }
}
