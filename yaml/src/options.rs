//! Parser configuration.

/// What to do when a mapping contains the same key twice.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DuplicateKeyPolicy {
    /// Keep the last value, at the position of the first occurrence, and warn.
    #[default]
    LastWins,
    /// Keep the first value and warn.
    FirstWins,
    /// Fail with a semantic error.
    Error,
}

/// Options controlling how YAML text is parsed.
///
/// ```
/// # use akao_yaml::{DuplicateKeyPolicy, ParseOptions};
/// let options = ParseOptions::default()
///     .with_strict_mode(true)
///     .with_max_depth(16)
///     .with_duplicate_keys(DuplicateKeyPolicy::Error);
/// assert!(options.allow_anchors);
/// assert_eq!(options.max_depth, 16);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    /// Accept `&anchor` and `*alias`. When disabled, either is a syntax error.
    pub allow_anchors: bool,
    /// Accept more than one document in a stream. When disabled, a second document is a syntax
    /// error.
    pub allow_multi_document: bool,
    /// Turn lenient behaviors into errors: tabs on blank lines, redefined anchors and tags are
    /// rejected, and `yes`/`no` are strings.
    pub strict_mode: bool,
    /// Attach comments to the nodes that follow them (or that they trail).
    pub preserve_comments: bool,
    /// The maximum nesting depth of collections.
    pub max_depth: usize,
    /// The maximum size, in bytes, of the input.
    pub max_size: usize,
    /// How repeated mapping keys are handled.
    pub duplicate_keys: DuplicateKeyPolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            allow_anchors: true,
            allow_multi_document: true,
            strict_mode: false,
            preserve_comments: false,
            max_depth: 100,
            max_size: 10 * 1024 * 1024,
            duplicate_keys: DuplicateKeyPolicy::default(),
        }
    }
}

impl ParseOptions {
    /// Set [`Self::allow_anchors`] (builder-style).
    #[must_use]
    pub fn with_allow_anchors(mut self, allow: bool) -> Self {
        self.allow_anchors = allow;
        self
    }

    /// Set [`Self::allow_multi_document`] (builder-style).
    #[must_use]
    pub fn with_allow_multi_document(mut self, allow: bool) -> Self {
        self.allow_multi_document = allow;
        self
    }

    /// Set [`Self::strict_mode`] (builder-style).
    #[must_use]
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Set [`Self::preserve_comments`] (builder-style).
    #[must_use]
    pub fn with_preserve_comments(mut self, preserve: bool) -> Self {
        self.preserve_comments = preserve;
        self
    }

    /// Set [`Self::max_depth`] (builder-style).
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set [`Self::max_size`] (builder-style).
    #[must_use]
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Set [`Self::duplicate_keys`] (builder-style).
    #[must_use]
    pub fn with_duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.duplicate_keys = policy;
        self
    }
}
