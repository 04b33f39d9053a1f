// Copyright 2015, Yuheng Chen.
// Copyright 2023, Ethiraric.
// Copyright 2026, The akao-yaml contributors.
// See the LICENSE file at the top-level directory of this distribution.

//! Structural and schema validation of [`akao_yaml`] trees.
//!
//! A [`YamlValidator`] walks a parsed tree and reports what it finds as a [`ValidationResult`].
//! Validation never fails: parse failures, missing fields and type mismatches all become
//! [`ValidationError`]s located by a path (`/`, `/a/b`, `/a[3]`) and, for parsed nodes, by a
//! line and column.
//!
//! Checks come from two sources:
//!   - [`SchemaRule`]s, added one by one or loaded from a schema file
//!     ([`YamlValidator::load_schema`]),
//!   - the fixed schemas of Akao philosophy, rule and ruleset documents
//!     ([`YamlValidator::validate_akao_rule`] and friends).
//!
//! # Usage
//!
//! ```
//! use akao_yaml_validator::{ValidationLevel, YamlValidator};
//!
//! let doc = akao_yaml::parse(
//!     "metadata:
//!   id: akao:rule::naming:snake_case:v1
//!   name: snake case
//!   version: 1.0.0
//! philosophy_links:
//!   - akao:philosophy::naming:consistency:v1
//!   - naming consistency
//! validation: {}
//! ",
//! )
//! .unwrap();
//!
//! let validator = YamlValidator::new(ValidationLevel::Standard);
//! let result = validator.validate_akao_rule(&doc);
//! assert!(!result.is_valid);
//! assert_eq!(result.errors[0].path, "/philosophy_links[1]");
//! assert_eq!(result.summary, "Validation completed with 1 errors and 1 warnings");
//! ```

#![warn(missing_docs, clippy::pedantic)]

mod akao;
mod result;
mod schema;
mod validator;

pub use crate::result::{Severity, ValidationError, ValidationResult};
pub use crate::schema::{SchemaError, SchemaRule};
pub use crate::validator::{get_node_at_path, ValidationLevel, YamlValidator};
