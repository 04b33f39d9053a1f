// Copyright 2015, Yuheng Chen.
// Copyright 2023, Ethiraric.
// Copyright 2026, The akao-yaml contributors.
// See the LICENSE file at the top-level directory of this distribution.

//! A YAML document parser and emitter building shared, typed node trees.
//!
//! # Usage
//! Parse a string into a [`Yaml`] node and inspect it, then serialize it back to YAML.
//!
//! ```
//! use akao_yaml::{SafelyIndex, YamlEmitter};
//!
//! let doc = akao_yaml::parse("name: demo\nports: [80, 443]\n").unwrap();
//! assert_eq!(doc.get("name").unwrap().as_string().unwrap(), "demo");
//! assert_eq!(doc.get("ports").get(1).unwrap().as_integer(), Ok(443));
//!
//! let mut out_str = String::new();
//! let mut emitter = YamlEmitter::new(&mut out_str);
//! emitter.dump(&doc).unwrap();
//! assert_eq!(out_str, "name: demo\nports:\n  - 80\n  - 443\n");
//! ```
//!
//! # Nodes
//! A [`Yaml`] is a cheap handle to a node. Cloning it yields another handle to the same node, so
//! that aliases (`*name`) share the node their anchor (`&name`) designates instead of copying
//! it. [`Yaml::deep_clone`] makes an independent copy.
//!
//! ```
//! let doc = akao_yaml::parse("base: &b {x: 1}\nderived: *b\n").unwrap();
//! let base = doc.at_path("/base").unwrap();
//! let derived = doc.at_path("/derived").unwrap();
//! assert!(base.ptr_eq(&derived));
//! assert_eq!(base.anchor_name().as_deref(), Some("b"));
//! ```
//!
//! Scalars are resolved to [`YamlData::Null`], [`YamlData::Boolean`], [`YamlData::Integer`],
//! [`YamlData::Float`] or [`YamlData::String`] according to their text, unless they are quoted,
//! in which case they are always strings. See [`ScalarResolver`].
//!
//! # Documents
//! [`parse`] returns the first document of a stream, [`parse_multi_document`] returns all of
//! them. For finer control, use a [`YamlLoader`] configured with [`ParseOptions`]; it also keeps
//! the non-fatal [`Warning`]s raised while parsing.
//!
//! ```
//! use akao_yaml::{DuplicateKeyPolicy, ErrorType, ParseOptions};
//!
//! let options = ParseOptions::default().with_duplicate_keys(DuplicateKeyPolicy::Error);
//! let err = akao_yaml::parse_with_options("a: 1\na: 2\n", &options).unwrap_err();
//! assert_eq!(err.error_type(), ErrorType::Semantic);
//! assert_eq!(err.line(), 2);
//! ```
//!
//! # Features
//! #### `encoding` (_enabled by default_)
//! Enables encoding-aware decoding of files and byte buffers (UTF-8 and UTF-16, with or without
//! byte order mark). Without it, input bytes must be UTF-8.

#![warn(missing_docs, clippy::pedantic)]

#[macro_use]
mod macros;

mod anchors;
mod emitter;
mod index;
mod loader;
mod options;
mod parser;
mod scalar;
mod yaml;

#[cfg(feature = "encoding")]
pub mod encoding;

use std::path::Path;

// Re-export main components.
pub use crate::anchors::AnchorRegistry;
pub use crate::emitter::{EmitError, EmitResult, YamlEmitter};
pub use crate::index::{Accessor, SafelyIndex};
pub use crate::loader::{LoadError, YamlLoader};
pub use crate::options::{DuplicateKeyPolicy, ParseOptions};
pub use crate::parser::Warning;
pub use crate::scalar::{is_null, parse_float, parse_integer, ScalarResolver, ScalarStyle};
pub use crate::yaml::{Mapping, NodeError, NodeType, Sequence, SourceLocation, Yaml, YamlData};

#[cfg(feature = "encoding")]
pub use crate::encoding::DecodingTrap;

// Re-export the diagnostics types as they are part of our public API and we want consumers to be
// able to inspect them (e.g. perform a `match`).
pub use akao_yaml_parser::{ErrorType, Marker, ParseError};

/// Parse the first document of `text` with the default [`ParseOptions`].
///
/// # Errors
/// Returns the first [`ParseError`] encountered.
pub fn parse(text: &str) -> Result<Yaml, ParseError> {
    YamlLoader::default().parse(text)
}

/// Parse the first document of `text` with the given options.
///
/// # Errors
/// Returns the first [`ParseError`] encountered.
pub fn parse_with_options(text: &str, options: &ParseOptions) -> Result<Yaml, ParseError> {
    YamlLoader::new(options.clone()).parse(text)
}

/// Parse every document of `text` with the default [`ParseOptions`].
///
/// ```
/// let docs = akao_yaml::parse_multi_document("a: 1\n---\nb: 2\n...\n").unwrap();
/// assert_eq!(docs.len(), 2);
/// assert!(docs[1].has_key("b"));
/// ```
///
/// # Errors
/// Returns the first [`ParseError`] encountered.
pub fn parse_multi_document(text: &str) -> Result<Vec<Yaml>, ParseError> {
    YamlLoader::default().parse_multi_document(text)
}

/// Read and parse the first document of the file at `path` with the default [`ParseOptions`].
///
/// # Errors
/// Returns [`LoadError::Io`] if the file cannot be read, and [`LoadError::Parse`] if it cannot be
/// decoded or parsed.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Yaml, LoadError> {
    YamlLoader::default().parse_file(path)
}

/// Read and parse every document of the file at `path` with the default [`ParseOptions`].
///
/// # Errors
/// See [`parse_file`].
pub fn parse_multi_document_file(path: impl AsRef<Path>) -> Result<Vec<Yaml>, LoadError> {
    YamlLoader::default().parse_multi_document_file(path)
}
