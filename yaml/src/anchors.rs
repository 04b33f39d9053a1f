//! Anchor bookkeeping for a single document.

use std::collections::BTreeMap;

use akao_yaml_parser::Marker;

use crate::Yaml;

/// Maps anchor names to the nodes they were attached to.
///
/// A registry lives for the duration of one document: anchors never leak from one document of a
/// stream into the next.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    anchors: BTreeMap<String, (Yaml, Marker)>,
}

impl AnchorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        AnchorRegistry::default()
    }

    /// Bind `name` to `node`, defined at `marker`.
    ///
    /// If `name` was already bound, the new binding replaces it and the position of the previous
    /// definition is returned.
    pub fn register(&mut self, name: &str, node: Yaml, marker: Marker) -> Option<Marker> {
        self.anchors
            .insert(name.to_string(), (node, marker))
            .map(|(_, previous)| previous)
    }

    /// Return a handle to the node bound to `name`.
    ///
    /// The handle shares the node: no copy is made.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Yaml> {
        self.anchors.get(name).map(|(node, _)| node.clone())
    }

    /// Return where `name` was defined.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<Marker> {
        self.anchors.get(name).map(|(_, marker)| *marker)
    }

    /// Return the number of bound names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Check whether no name is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Forget every binding.
    pub fn clear(&mut self) {
        self.anchors.clear();
    }
}
