//! The block structure parser.
//!
//! A [`DocumentParser`] turns the text of a single document into a node tree. It reads the
//! document line by line, using the indentation of each line to decide whether it continues,
//! nests into or closes the current block. The multi-document splitting happens beforehand, in
//! the [`loader`](crate::loader).

mod block;
mod flow;
mod scalars;

use std::{fmt, mem, rc::Rc};

use akao_yaml_parser::{
    char_traits::{is_anchor_char, is_blank_or_breakz, is_breakz},
    Cursor, ErrorType, Marker, ParseError,
};
use log::{trace, warn};

use crate::{
    anchors::AnchorRegistry, options::ParseOptions, scalar::ScalarResolver, DuplicateKeyPolicy,
    SourceLocation, Yaml, YamlData,
};

/// A non-fatal diagnostic raised while parsing.
///
/// Warnings are logged through the [`log`] facade as they are raised, and kept on the
/// [`YamlLoader`](crate::YamlLoader) that parsed the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    message: String,
    marker: Marker,
    document: usize,
}

impl Warning {
    /// Return the description of the warning.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Return where the warning was raised.
    #[must_use]
    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Return the index of the document in which the warning was raised.
    #[must_use]
    pub fn document(&self) -> usize {
        self.document
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}: {}",
            self.marker.line(),
            self.marker.col(),
            self.message
        )
    }
}

/// The state of the parse of one document.
pub(crate) struct DocumentParser<'input, 'opt> {
    cursor: Cursor<'input>,
    options: &'opt ParseOptions,
    resolver: ScalarResolver,
    anchors: AnchorRegistry,
    file: Option<Rc<str>>,
    document: usize,
    /// Current nesting depth of collections.
    depth: usize,
    /// Comment lines read since the last node.
    pending_comments: Vec<String>,
    /// The comment ending the line of the last scalar.
    trailing_comment: Option<String>,
    warnings: Vec<Warning>,
}

impl<'input, 'opt> DocumentParser<'input, 'opt> {
    /// Create a parser reading the document `cursor` spans.
    pub(crate) fn new(
        cursor: Cursor<'input>,
        options: &'opt ParseOptions,
        file: Option<Rc<str>>,
        document: usize,
    ) -> Self {
        DocumentParser {
            cursor,
            options,
            resolver: ScalarResolver::new(options.strict_mode),
            anchors: AnchorRegistry::new(),
            file,
            document,
            depth: 0,
            pending_comments: vec![],
            trailing_comment: None,
            warnings: vec![],
        }
    }

    /// Hand out the warnings raised so far.
    pub(crate) fn take_warnings(&mut self) -> Vec<Warning> {
        mem::take(&mut self.warnings)
    }

    /// Parse the document into a tree. An empty document is [`YamlData::Null`].
    pub(crate) fn parse_document(&mut self) -> Result<Yaml, ParseError> {
        let start = self.cursor.mark();
        if !self.skip_to_content()? {
            let root = self.node(YamlData::Null, start);
            let comments = mem::take(&mut self.pending_comments);
            self.attach_comments(&root, comments);
            return Ok(root);
        }
        let leading = mem::take(&mut self.pending_comments);
        let root = self.parse_block_node(None)?;
        let root_indent = root
            .location()
            .map_or(0, |location| location.column.saturating_sub(1));
        if self.skip_to_content()? {
            return Err(self.trailing_content_error(&root, root_indent));
        }
        self.attach_comments(&root, leading);
        let rest = mem::take(&mut self.pending_comments);
        self.attach_comments(&root, rest);
        Ok(root)
    }

    fn trailing_content_error(&self, root: &Yaml, root_indent: usize) -> ParseError {
        if self.cursor.column_offset() < root_indent {
            self.cursor
                .error_here(ErrorType::Syntax, "line is indented less than the document root")
                .with_suggestion(format!(
                    "align the line with the first node of the document (column {})",
                    root_indent + 1
                ))
        } else if root.is_sequence() {
            self.cursor
                .error_here(ErrorType::Syntax, "expected a sequence entry")
                .with_suggestion("start sequence entries with '- '")
        } else {
            self.cursor
                .error_here(ErrorType::Syntax, "unexpected content after the document root")
                .with_suggestion("separate documents with '---'")
        }
    }

    /// Create a node located at `mark`.
    fn node(&self, data: YamlData, mark: Marker) -> Yaml {
        let node = Yaml::new(data);
        node.set_location(SourceLocation {
            file: self.file.clone(),
            line: mark.line(),
            column: mark.col(),
        });
        node
    }

    /// Enter a nested collection.
    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        trace!("entering block at depth {}", self.depth);
        if self.depth > self.options.max_depth {
            return Err(self
                .cursor
                .error_here(
                    ErrorType::Limit,
                    format!(
                        "maximum nesting depth of {} exceeded",
                        self.options.max_depth
                    ),
                )
                .with_suggestion("flatten the document or raise max_depth"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Record a warning and log it.
    fn warn(&mut self, marker: Marker, message: String) {
        warn!(
            "line {}, column {}: {message}",
            marker.line(),
            marker.col()
        );
        self.warnings.push(Warning {
            message,
            marker,
            document: self.document,
        });
    }

    /// Either reject or warn about a lenient construct, depending on `strict_mode`.
    fn strict_or_warn(
        &mut self,
        marker: Marker,
        error_type: ErrorType,
        message: String,
        suggestion: &str,
    ) -> Result<(), ParseError> {
        if self.options.strict_mode {
            Err(self
                .cursor
                .error(error_type, marker, message)
                .with_suggestion(suggestion))
        } else {
            self.warn(marker, message);
            Ok(())
        }
    }

    fn collect_comment(&mut self, text: &str) {
        if self.options.preserve_comments {
            self.pending_comments.push(text.to_string());
        }
    }

    fn attach_comments(&mut self, node: &Yaml, comments: Vec<String>) {
        for comment in comments {
            node.add_comment(comment);
        }
        if let Some(trailing) = self.trailing_comment.take() {
            node.add_comment(trailing);
        }
    }

    /// Move to the first character of the next node, skipping blank and comment-only lines.
    ///
    /// When a line start is crossed, its indentation is consumed, so that
    /// [`Cursor::column_offset`] is the indentation of the line.
    ///
    /// # Return
    /// Returns `false` at the end of the document.
    fn skip_to_content(&mut self) -> Result<bool, ParseError> {
        loop {
            if self.cursor.is_at_end() {
                return Ok(false);
            }
            if self.cursor.is_at_line_start() {
                self.cursor.indentation(self.options.strict_mode)?;
            }
            self.cursor.skip_whitespace();
            if let Some(comment) = self.cursor.skip_comment() {
                self.collect_comment(comment);
            }
            if !is_breakz(self.cursor.peek()) {
                return Ok(true);
            }
            if !self.cursor.skip_line_break() {
                return Ok(false);
            }
        }
    }

    /// Check whether nothing but whitespace or a comment is left on the line.
    fn at_line_end(&self) -> bool {
        self.cursor.rest_is_blank_or_comment()
    }

    /// Consume the end of the line, which may only hold whitespace and a comment.
    ///
    /// The comment, if any, is kept to be attached to the node that was just read.
    fn finish_line(&mut self) -> Result<(), ParseError> {
        self.cursor.skip_whitespace();
        if let Some(comment) = self.cursor.skip_comment() {
            if self.options.preserve_comments {
                self.trailing_comment = Some(comment.to_string());
            }
        }
        if !is_breakz(self.cursor.peek()) {
            return Err(self
                .cursor
                .error_here(ErrorType::Syntax, "unexpected content after a value")
                .with_suggestion("put each entry on its own line"));
        }
        self.cursor.skip_line_break();
        Ok(())
    }

    /// Check whether the cursor is on a block sequence entry indicator (`- `).
    fn at_sequence_entry(&self) -> bool {
        self.cursor.peek() == '-' && is_blank_or_breakz(self.cursor.peek_nth(1))
    }

    /// Add `key: value` to `mapping`, honoring the duplicate key policy.
    fn insert_entry(
        &mut self,
        mapping: &Yaml,
        key: String,
        value: Yaml,
        mark: Marker,
    ) -> Result<(), ParseError> {
        if !mapping.has_key(&key) {
            mapping
                .set_mapping(key, value)
                .map_err(|e| self.cursor.error(ErrorType::Semantic, mark, e.to_string()))?;
            return Ok(());
        }
        match self.options.duplicate_keys {
            DuplicateKeyPolicy::Error => Err(self
                .cursor
                .error(ErrorType::Semantic, mark, format!("duplicate mapping key '{key}'"))
                .with_suggestion("remove or rename one of the entries")),
            DuplicateKeyPolicy::FirstWins => {
                self.warn(
                    mark,
                    format!("duplicate mapping key '{key}', keeping the first value"),
                );
                Ok(())
            }
            DuplicateKeyPolicy::LastWins => {
                self.warn(
                    mark,
                    format!("duplicate mapping key '{key}', keeping the last value"),
                );
                mapping
                    .set_mapping(key, value)
                    .map_err(|e| self.cursor.error(ErrorType::Semantic, mark, e.to_string()))
            }
        }
    }

    /// Read the name following an anchor (`&`) or alias (`*`) indicator.
    fn read_anchor_name(&mut self) -> Result<(String, Marker), ParseError> {
        let mark = self.cursor.mark();
        let sigil = self.cursor.peek();
        if !self.options.allow_anchors {
            return Err(self
                .cursor
                .error_here(ErrorType::Syntax, "anchors and aliases are disabled")
                .with_suggestion("enable allow_anchors in the parse options"));
        }
        self.cursor.advance();
        let mut name = String::new();
        while is_anchor_char(self.cursor.peek()) {
            name.push(self.cursor.peek());
            self.cursor.advance();
        }
        if name.is_empty() {
            let what = if sigil == '&' { "anchor" } else { "alias" };
            return Err(self
                .cursor
                .error(
                    ErrorType::Syntax,
                    mark,
                    format!("expected a name after the {what} indicator '{sigil}'"),
                )
                .with_suggestion("anchor names may not contain whitespace nor flow indicators"));
        }
        Ok((name, mark))
    }

    /// Read `*name` and return the node anchored as `name`.
    fn read_alias(&mut self) -> Result<Yaml, ParseError> {
        let (name, mark) = self.read_anchor_name()?;
        self.anchors.resolve(&name).ok_or_else(|| {
            self.cursor
                .error(ErrorType::Semantic, mark, format!("undefined alias '*{name}'"))
                .with_suggestion(format!(
                    "define the anchor with '&{name}' before referring to it"
                ))
        })
    }

    /// Bind `name` to `node` for the rest of the document.
    fn register_anchor(&mut self, name: &str, node: &Yaml, mark: Marker) -> Result<(), ParseError> {
        if let Some(previous) = self.anchors.definition(name) {
            self.strict_or_warn(
                mark,
                ErrorType::Semantic,
                format!(
                    "anchor '&{name}' redefined (previously defined at line {}, column {})",
                    previous.line(),
                    previous.col()
                ),
                "give each anchor a unique name",
            )?;
        }
        node.set_anchor_name(name);
        self.anchors.register(name, node.clone(), mark);
        Ok(())
    }

    /// Read the properties (anchor and tags) in front of a node, in any order.
    ///
    /// # Return
    /// Returns the anchor name and its position, if the node has one.
    fn read_properties(&mut self) -> Result<Option<(String, Marker)>, ParseError> {
        let mut anchor = None;
        loop {
            match self.cursor.peek() {
                '&' if anchor.is_some() => {
                    return Err(self
                        .cursor
                        .error_here(ErrorType::Syntax, "a node may only have one anchor"));
                }
                '&' => anchor = Some(self.read_anchor_name()?),
                '!' => self.skip_tag()?,
                _ => return Ok(anchor),
            }
            self.cursor.skip_whitespace();
        }
    }

    /// Skip a tag (`!name`, `!!str`, `!<uri>`), which is not supported.
    fn skip_tag(&mut self) -> Result<(), ParseError> {
        let mark = self.cursor.mark();
        let start = self.cursor.remaining();
        let mut length = 0;
        while !is_blank_or_breakz(self.cursor.peek()) {
            self.cursor.advance();
            length += 1;
        }
        let tag: String = start.chars().take(length).collect();
        self.strict_or_warn(
            mark,
            ErrorType::Syntax,
            format!("tag '{tag}' is not supported and is ignored"),
            "remove the tag",
        )?;
        self.cursor.skip_whitespace();
        Ok(())
    }
}

/// Compute the position of the byte `offset` of `line`, a line starting at `start`.
fn offset_marker(start: Marker, line: &str, offset: usize) -> Marker {
    Marker::new(
        start.index() + offset,
        start.line(),
        start.col() + line[..offset].chars().count(),
    )
}
