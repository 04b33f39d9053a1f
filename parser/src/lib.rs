// Copyright 2015, Yuheng Chen.
// Copyright 2023, Ethiraric.
// Copyright 2026, The akao-yaml contributors.
// See the LICENSE file at the top-level directory of this distribution.

//! Character-level building blocks of the akao YAML parser.
//!
//! **If you want to load YAML text into a tree of nodes, use `akao-yaml` instead of
//! `akao-yaml-parser`. This crate contains only the lexing layer.**
//!
//! The crate provides:
//!   - [`Cursor`]: a position-tracking reader over a source buffer, with the whitespace, comment,
//!     line, quoted-string and indentation primitives the block parser is built on.
//!   - [`Marker`]: a location (byte offset, line, column) in the source.
//!   - [`ParseError`] and [`ErrorType`]: the structured diagnostics every parse failure is
//!     reported with.
//!
//! # Usage
//!
//! ```
//! use akao_yaml_parser::Cursor;
//!
//! let mut cursor = Cursor::new("  key: 'it''s'\n");
//! assert_eq!(cursor.indentation(false).unwrap(), 2);
//! assert_eq!(cursor.read_until(':'), "key");
//! cursor.advance();
//! cursor.skip_whitespace();
//! assert_eq!(cursor.read_quoted_string('\'').unwrap(), "it's");
//! ```

#![warn(missing_docs, clippy::pedantic)]

pub mod char_traits;
mod cursor;
mod error;

pub use crate::cursor::{Cursor, Marker};
pub use crate::error::{ErrorType, ParseError};
