//! Internal helpers for generating code.

/// Generate the accessor methods of [`Yaml`] for a scalar variant of [`YamlData`].
///
/// For a variant `V` holding a `T`, this generates:
///  - `as_x(&self) -> Result<T, NodeError>`, failing with [`NodeError::TypeMismatch`] when the
///    node holds another variant,
///  - `as_x_or_default(&self, default: T) -> T`, which never fails.
///
/// [`Yaml`]: crate::Yaml
/// [`YamlData`]: crate::YamlData
/// [`NodeError::TypeMismatch`]: crate::NodeError::TypeMismatch
macro_rules! define_as (
    ($fn_name:ident, $default_fn_name:ident, $t:ty, $variant:ident) => (
/// Get a copy of the value held by the node.
///
/// # Errors
/// Returns [`NodeError::TypeMismatch`] if the node does not hold the requested type.
pub fn $fn_name(&self) -> Result<$t, NodeError> {
    match *self.data() {
        YamlData::$variant(v) => Ok(v.into()),
        ref other => Err(NodeError::mismatch(NodeType::$variant, other)),
    }
}

/// Get a copy of the value held by the node, or `default` if it holds another type.
#[must_use]
pub fn $default_fn_name(&self, default: $t) -> $t {
    self.$fn_name().unwrap_or(default)
}
    );
);

/// Generate `is_TYPE` methods for [`Yaml`].
///
/// [`Yaml`]: crate::Yaml
macro_rules! define_is (
    ($fn_name:ident, $variant:pat) => (
/// Check whether the node holds the given variant.
///
/// Anchor wrappers are not looked through: a [`YamlData::Anchor`] node only answers `true` to
/// [`Yaml::is_anchor`].
#[must_use]
pub fn $fn_name(&self) -> bool {
    matches!(*self.data(), $variant)
}
    );
);
