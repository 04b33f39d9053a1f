//! Structured parse diagnostics.

use std::fmt;

use thiserror::Error;

use crate::Marker;

/// The category of a [`ParseError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Malformed tokens, bad indentation, tab in indentation, unterminated quote, ...
    Syntax,
    /// Well-formed input with invalid meaning: alias to an undefined anchor, duplicate anchor,
    /// duplicate key (when rejected), ...
    Semantic,
    /// A [`max_depth`] or [`max_size`] limit was exceeded.
    ///
    /// [`max_depth`]: https://docs.rs/akao-yaml/latest/akao_yaml/struct.ParseOptions.html
    /// [`max_size`]: https://docs.rs/akao-yaml/latest/akao_yaml/struct.ParseOptions.html
    Limit,
    /// The input bytes could not be decoded into text.
    Encoding,
}

impl ErrorType {
    /// The lowercase tag of the category (`syntax`, `semantic`, `limit`, `encoding`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorType::Syntax => "syntax",
            ErrorType::Semantic => "semantic",
            ErrorType::Limit => "limit",
            ErrorType::Encoding => "encoding",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error that occurred while parsing a YAML document.
///
/// Parse errors are fatal for the document being parsed. They carry the location of the
/// failure, a snippet of the surrounding source and, when one is known, a hint on how to fix the
/// input.
///
/// The alternate form (`{:#}`) of [`Display`] appends the context snippet:
/// ```
/// # use akao_yaml_parser::{ErrorType, Marker, ParseError};
/// let err = ParseError::new(ErrorType::Syntax, Marker::new(4, 2, 1), "tab character used for indentation")
///     .with_context("\tkey: value")
///     .with_suggestion("indent with spaces");
/// assert_eq!(
///     err.to_string(),
///     "YAML parse error at line 2, column 1: tab character used for indentation (indent with spaces)"
/// );
/// assert!(format!("{err:#}").ends_with("\nContext: \tkey: value"));
/// ```
///
/// [`Display`]: fmt::Display
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub struct ParseError {
    message: String,
    marker: Marker,
    context: String,
    error_type: ErrorType,
    suggestion: Option<String>,
    document: Option<usize>,
}

impl ParseError {
    /// Create a new error with no context nor suggestion.
    #[must_use]
    pub fn new(error_type: ErrorType, marker: Marker, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            marker,
            context: String::new(),
            error_type,
            suggestion: None,
            document: None,
        }
    }

    /// Attach a snippet of the source surrounding the error (builder-style).
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> ParseError {
        self.context = context.into();
        self
    }

    /// Attach a remediation hint (builder-style).
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> ParseError {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Record the index of the document within a multi-document stream (builder-style).
    #[must_use]
    pub fn in_document(mut self, index: usize) -> ParseError {
        self.document = Some(index);
        self
    }

    /// Return the human-readable description of the error.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Return the location at which the error occurred.
    #[must_use]
    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Return the line (1-based) at which the error occurred.
    #[must_use]
    pub fn line(&self) -> usize {
        self.marker.line()
    }

    /// Return the column (1-based) at which the error occurred.
    #[must_use]
    pub fn column(&self) -> usize {
        self.marker.col()
    }

    /// Return the source snippet surrounding the error.
    ///
    /// This may be empty, e.g. for limit errors raised before parsing starts.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Return the category of the error.
    #[must_use]
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// Return the remediation hint, if any.
    #[must_use]
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    /// Return the index of the failing document in a multi-document stream, if known.
    #[must_use]
    pub fn document(&self) -> Option<usize> {
        self.document
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(
            &self.message,
            &self.marker,
            &self.context,
            &self.error_type,
            &self.suggestion,
            &self.document,
            f,
        )
    }
}

/// Display body of [`ParseError`], called with the fields in declaration order.
#[allow(clippy::ptr_arg)]
fn render(
    message: &String,
    marker: &Marker,
    context: &String,
    _error_type: &ErrorType,
    suggestion: &Option<String>,
    document: &Option<usize>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    write!(
        f,
        "YAML parse error at line {}, column {}: {message}",
        marker.line(),
        marker.col()
    )?;
    if let Some(document) = document {
        write!(f, " in document {document}")?;
    }
    if let Some(suggestion) = suggestion {
        write!(f, " ({suggestion})")?;
    }
    if f.alternate() && !context.is_empty() {
        write!(f, "\nContext: {context}")?;
    }
    Ok(())
}
