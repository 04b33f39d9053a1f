//! Non-panicking navigation through node trees.

use crate::{Yaml, YamlData};

/// A trait to index without panicking into a structure through an [`Accessor`].
///
/// [`SafelyIndex`] is implemented on [`Yaml`] and on `Option<Yaml>`, so that lookups chain:
///
/// ```
/// use akao_yaml::SafelyIndex;
///
/// let doc = akao_yaml::parse("servers:\n  - host: a\n  - host: b\n").unwrap();
/// assert_eq!(doc.get("servers").get(1).get("host").unwrap().as_string().unwrap(), "b");
/// assert!(doc.get("servers").get(2).get("host").is_none());
/// assert!(doc.get("clients").get(0).is_none());
/// ```
pub trait SafelyIndex {
    /// Access a field of the given YAML object.
    ///
    /// Anchor wrappers ([`YamlData::Anchor`]) are looked through.
    ///
    /// # Return
    /// If the given index is valid within `self`, [`Some`] is returned with a handle to the
    /// indexed node. If `self` is not indexable or the index is out of bounds, this function
    /// returns [`None`].
    fn get(&self, key: impl Into<Accessor>) -> Option<Yaml>;
}

/// A [`SafelyIndex`] accessor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Accessor {
    /// Accessing a string field from a mapping.
    Field(String),
    /// Accessing an element from a sequence, or the field with the decimal representation of
    /// the index from a mapping.
    Index(usize),
}

impl From<usize> for Accessor {
    fn from(val: usize) -> Self {
        Accessor::Index(val)
    }
}

impl From<String> for Accessor {
    fn from(val: String) -> Self {
        Accessor::Field(val)
    }
}

impl From<&str> for Accessor {
    fn from(val: &str) -> Self {
        Accessor::Field(val.to_string())
    }
}

impl SafelyIndex for Yaml {
    fn get(&self, key: impl Into<Accessor>) -> Option<Yaml> {
        let node = self.resolved();
        let data = node.data();
        match (&*data, key.into()) {
            (YamlData::Mapping(map), Accessor::Field(field)) => map.get(&field).cloned(),
            (YamlData::Mapping(map), Accessor::Index(index)) => {
                map.get(&index.to_string()).cloned()
            }
            (YamlData::Sequence(seq), Accessor::Index(index)) => seq.get(index).cloned(),
            _ => None,
        }
    }
}

impl SafelyIndex for Option<Yaml> {
    fn get(&self, key: impl Into<Accessor>) -> Option<Yaml> {
        self.as_ref().and_then(|node| node.get(key))
    }
}

impl Yaml {
    /// Look up the node at `path` below this node.
    ///
    /// A path is a list of segments separated by `/`. A segment is a mapping key, optionally
    /// followed by any number of `[index]` sequence subscripts; a segment made of digits only
    /// indexes a sequence. `/` and the empty path designate `self`.
    ///
    /// ```
    /// let doc = akao_yaml::parse("a:\n  b:\n    - x\n    - [y, z]\n").unwrap();
    /// assert_eq!(doc.at_path("/a/b[1][0]").unwrap().as_string().unwrap(), "y");
    /// assert_eq!(doc.at_path("a/b/0").unwrap().as_string().unwrap(), "x");
    /// assert!(doc.at_path("/a/c").is_none());
    /// assert!(doc.at_path("/").unwrap().is_mapping());
    /// ```
    #[must_use]
    pub fn at_path(&self, path: &str) -> Option<Yaml> {
        let mut current = self.clone();
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            let (name, mut subscripts) = match segment.find('[') {
                Some(open) => (&segment[..open], &segment[open..]),
                None => (segment, ""),
            };
            if !name.is_empty() {
                current = if current.resolved().is_sequence() {
                    current.get(name.parse::<usize>().ok()?)?
                } else {
                    current.get(name)?
                };
            }
            while !subscripts.is_empty() {
                let close = subscripts.find(']')?;
                let index = subscripts.get(1..close)?.parse::<usize>().ok()?;
                current = current.get(index)?;
                subscripts = &subscripts[close + 1..];
                if !subscripts.is_empty() && !subscripts.starts_with('[') {
                    return None;
                }
            }
        }
        Some(current)
    }
}
