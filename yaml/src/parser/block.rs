//! Block mappings, block sequences and the values of their entries.

use std::mem;

use akao_yaml_parser::{
    char_traits::{is_blank, is_blank_or_breakz, is_quote, is_reserved_indicator},
    ErrorType, ParseError,
};

use super::DocumentParser;
use crate::{Yaml, YamlData};

impl<'input, 'opt> DocumentParser<'input, 'opt> {
    /// Parse the node the cursor is on. Its indentation is the column of the cursor.
    ///
    /// `parent` is the indentation of the enclosing block, `None` at the document root.
    pub(super) fn parse_block_node(&mut self, parent: Option<usize>) -> Result<Yaml, ParseError> {
        let indent = self.cursor.column_offset();
        if self.at_sequence_entry() {
            self.parse_sequence(indent)
        } else if find_key_separator(self.cursor.rest_of_line()).is_some() {
            self.parse_mapping(indent)
        } else {
            self.parse_value(parent, true)
        }
    }

    /// Parse a block mapping whose keys sit at column `indent`.
    fn parse_mapping(&mut self, indent: usize) -> Result<Yaml, ParseError> {
        self.enter()?;
        let mapping = self.node(YamlData::Mapping(crate::Mapping::new()), self.cursor.mark());
        while self.skip_to_content()? {
            let column = self.cursor.column_offset();
            if column < indent {
                break;
            }
            if column > indent {
                return Err(self
                    .cursor
                    .error_here(ErrorType::Syntax, "bad indentation of a mapping entry")
                    .with_suggestion(format!(
                        "align the key with the other keys of the mapping (column {})",
                        indent + 1
                    )));
            }
            if self.at_sequence_entry() {
                return Err(self
                    .cursor
                    .error_here(ErrorType::Syntax, "unexpected sequence entry in a mapping")
                    .with_suggestion("indent the sequence under the key it belongs to"));
            }
            let leading = mem::take(&mut self.pending_comments);
            let mark = self.cursor.mark();
            let key = self.parse_key()?;
            let value = self.parse_entry_value(indent)?;
            self.attach_comments(&value, leading);
            self.insert_entry(&mapping, key, value, mark)?;
        }
        self.leave();
        Ok(mapping)
    }

    /// Read a mapping key and the `:` following it.
    fn parse_key(&mut self) -> Result<String, ParseError> {
        let mark = self.cursor.mark();
        let line = self.cursor.rest_of_line();
        let Some(separator) = find_key_separator(line) else {
            let suggestion = if line.contains(':') {
                "add a space after ':' to separate the key from its value"
            } else {
                "write mapping entries as 'key: value'"
            };
            return Err(self
                .cursor
                .error(ErrorType::Syntax, mark, "expected a mapping key")
                .with_suggestion(suggestion));
        };
        let key = if is_quote(self.cursor.peek()) {
            let key = self.cursor.read_quoted_string(self.cursor.peek())?;
            self.cursor.skip_whitespace();
            key
        } else {
            let raw = &line[..separator];
            self.cursor.skip_n(raw.chars().count());
            let key = raw.trim_end_matches(is_blank);
            if key.is_empty() {
                return Err(self
                    .cursor
                    .error(ErrorType::Syntax, mark, "empty mapping key")
                    .with_suggestion("quote the key if it is meant to be empty: \"\": value"));
            }
            key.to_string()
        };
        if self.cursor.peek() != ':' {
            return Err(self
                .cursor
                .error_here(ErrorType::Syntax, "expected ':' after a mapping key"));
        }
        self.cursor.advance();
        Ok(key)
    }

    /// Parse the value of a mapping entry whose key sits at column `indent`. The cursor is right
    /// after the `:`.
    fn parse_entry_value(&mut self, indent: usize) -> Result<Yaml, ParseError> {
        self.cursor.skip_whitespace();
        if self.at_line_end() {
            self.finish_line()?;
            let comment = self.trailing_comment.take();
            let value = self.parse_nested(Some(indent), true)?;
            if let Some(comment) = comment {
                value.add_comment(comment);
            }
            return Ok(value);
        }
        self.parse_value(Some(indent), false)
    }

    /// Parse a block sequence whose `-` indicators sit at column `indent`.
    pub(super) fn parse_sequence(&mut self, indent: usize) -> Result<Yaml, ParseError> {
        self.enter()?;
        let sequence = self.node(YamlData::Sequence(crate::Sequence::new()), self.cursor.mark());
        while self.skip_to_content()? {
            let column = self.cursor.column_offset();
            if column < indent {
                break;
            }
            if column > indent {
                return Err(self
                    .cursor
                    .error_here(ErrorType::Syntax, "bad indentation of a sequence entry")
                    .with_suggestion(format!(
                        "align the '-' with the other entries of the sequence (column {})",
                        indent + 1
                    )));
            }
            if !self.at_sequence_entry() {
                break;
            }
            let leading = mem::take(&mut self.pending_comments);
            self.cursor.advance();
            self.cursor.skip_whitespace();
            let item = if self.at_line_end() {
                self.finish_line()?;
                let comment = self.trailing_comment.take();
                let item = self.parse_nested(Some(indent), false)?;
                if let Some(comment) = comment {
                    item.add_comment(comment);
                }
                item
            } else {
                self.parse_block_node(Some(indent))?
            };
            self.attach_comments(&item, leading);
            sequence
                .add_to_sequence(item)
                .map_err(|e| self.cursor.error_here(ErrorType::Semantic, e.to_string()))?;
        }
        self.leave();
        Ok(sequence)
    }

    /// Parse the block node starting on a following line, or return null if the next line does
    /// not belong to a node nested under `parent`.
    ///
    /// With `compact`, a sequence at the same indentation as `parent` is accepted (`key:\n- a`).
    pub(super) fn parse_nested(
        &mut self,
        parent: Option<usize>,
        compact: bool,
    ) -> Result<Yaml, ParseError> {
        let mark = self.cursor.mark();
        if !self.skip_to_content()? {
            return Ok(self.node(YamlData::Null, mark));
        }
        let column = self.cursor.column_offset();
        match parent {
            Some(parent) if column > parent => self.parse_block_node(Some(parent)),
            Some(parent) if column == parent && compact && self.at_sequence_entry() => {
                self.parse_sequence(column)
            }
            Some(_) => Ok(self.node(YamlData::Null, mark)),
            None => self.parse_block_node(None),
        }
    }

    /// Parse a node that is not a block collection starting on the current line: a scalar, a
    /// flow collection, an alias, or such a node (or a nested block) preceded by an anchor or a
    /// tag.
    ///
    /// With `block`, the node may itself be a block collection starting on the current line
    /// (this is the case after `- ` and at the document root).
    pub(super) fn parse_value(
        &mut self,
        parent: Option<usize>,
        block: bool,
    ) -> Result<Yaml, ParseError> {
        let mark = self.cursor.mark();
        match self.cursor.peek() {
            '&' | '!' => {
                let anchor = self.read_properties()?;
                let node = self.parse_properties_target(parent, block)?;
                if let Some((name, mark)) = anchor {
                    self.register_anchor(&name, &node, mark)?;
                }
                Ok(node)
            }
            '*' => {
                let node = self.read_alias()?;
                self.finish_line()?;
                Ok(node)
            }
            '|' | '>' => self.parse_block_scalar(parent),
            '[' | '{' => {
                let node = self.parse_flow_node()?;
                self.finish_line()?;
                Ok(node)
            }
            q if is_quote(q) => {
                let text = self.cursor.read_quoted_string(q)?;
                let style = if q == '"' {
                    crate::ScalarStyle::DoubleQuoted
                } else {
                    crate::ScalarStyle::SingleQuoted
                };
                let node = self.node(self.resolver.resolve(&text, style), mark);
                self.finish_line().map_err(|_| {
                    self.cursor
                        .error_here(ErrorType::Syntax, "unexpected characters after a quoted scalar")
                        .with_suggestion("quote the whole value")
                })?;
                Ok(node)
            }
            c if is_reserved_indicator(c) => Err(self
                .cursor
                .error_here(
                    ErrorType::Syntax,
                    format!("'{c}' is reserved and cannot start a plain scalar"),
                )
                .with_suggestion("quote the value")),
            '-' if !block && is_blank_or_breakz(self.cursor.peek_nth(1)) => Err(self
                .cursor
                .error_here(
                    ErrorType::Syntax,
                    "block sequence entries are not allowed on the line of a mapping key",
                )
                .with_suggestion("start the sequence on the next line")),
            _ => self.parse_plain_scalar(parent),
        }
    }

    /// Parse the node following an anchor or a tag.
    ///
    /// A node on the following lines counts as one nesting level, as lines made only of
    /// properties would otherwise nest without bound.
    fn parse_properties_target(
        &mut self,
        parent: Option<usize>,
        block: bool,
    ) -> Result<Yaml, ParseError> {
        if self.at_line_end() {
            self.finish_line()?;
            self.enter()?;
            let node = self.parse_nested(parent, !block && parent.is_some());
            self.leave();
            return node;
        }
        if block {
            self.parse_block_node(parent)
        } else {
            self.parse_value(parent, false)
        }
    }
}

/// Find the `:` separating a mapping key from its value on `line`.
///
/// The key may be plain or quoted. Flow collections, aliases and other indicators never start a
/// key.
///
/// # Return
/// Returns the byte offset of the `:`, or `None` if `line` does not start a mapping entry.
pub(super) fn find_key_separator(line: &str) -> Option<usize> {
    let mut chars = line.char_indices().peekable();
    let &(_, first) = chars.peek()?;
    let next_is_blank = |chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>| {
        is_blank_or_breakz(chars.peek().map_or('\0', |&(_, c)| c))
    };
    match first {
        '"' | '\'' => {
            chars.next();
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                if first == '"' && c == '\\' {
                    chars.next();
                } else if c == first {
                    if first == '\'' && chars.peek().is_some_and(|&(_, n)| n == '\'') {
                        chars.next();
                    } else {
                        closed = true;
                        break;
                    }
                }
            }
            if !closed {
                return None;
            }
            while chars.peek().is_some_and(|&(_, c)| is_blank(c)) {
                chars.next();
            }
            let (offset, c) = chars.next()?;
            (c == ':' && next_is_blank(&mut chars)).then_some(offset)
        }
        '[' | '{' | '#' | '|' | '>' | '*' | '&' | '!' | '?' | '%' | '@' | '`' => None,
        _ => {
            let mut previous_blank = false;
            while let Some((offset, c)) = chars.next() {
                if c == '#' && previous_blank {
                    return None;
                }
                if c == ':' && next_is_blank(&mut chars) {
                    return Some(offset);
                }
                previous_blank = is_blank(c);
            }
            None
        }
    }
}
