//! Flow collections (`[a, b]`, `{a: 1}`).

use akao_yaml_parser::{
    char_traits::{is_blank, is_blank_or_breakz, is_break, is_flow, is_quote},
    ErrorType, Marker, ParseError,
};

use super::DocumentParser;
use crate::{Mapping, ScalarStyle, Sequence, Yaml, YamlData};

impl<'input, 'opt> DocumentParser<'input, 'opt> {
    /// Parse the flow collection starting at the cursor (`[` or `{`).
    pub(super) fn parse_flow_node(&mut self) -> Result<Yaml, ParseError> {
        if self.cursor.peek() == '[' {
            self.parse_flow_sequence()
        } else {
            self.parse_flow_mapping()
        }
    }

    fn parse_flow_sequence(&mut self) -> Result<Yaml, ParseError> {
        let start = self.cursor.mark();
        self.enter()?;
        self.cursor.advance();
        let sequence = self.node(YamlData::Sequence(Sequence::new()), start);
        loop {
            self.skip_flow_whitespace(start, ']')?;
            if self.cursor.peek() == ']' {
                self.cursor.advance();
                break;
            }
            let item = self.parse_flow_item()?;
            sequence
                .add_to_sequence(item)
                .map_err(|e| self.cursor.error_here(ErrorType::Semantic, e.to_string()))?;
            if self.end_flow_entry(start, ']')? {
                break;
            }
        }
        self.leave();
        Ok(sequence)
    }

    fn parse_flow_mapping(&mut self) -> Result<Yaml, ParseError> {
        let start = self.cursor.mark();
        self.enter()?;
        self.cursor.advance();
        let mapping = self.node(YamlData::Mapping(Mapping::new()), start);
        loop {
            self.skip_flow_whitespace(start, '}')?;
            if self.cursor.peek() == '}' {
                self.cursor.advance();
                break;
            }
            let mark = self.cursor.mark();
            let key = self.read_flow_key()?;
            self.skip_flow_whitespace(start, '}')?;
            let value = if self.cursor.peek() == ':' {
                self.cursor.advance();
                self.skip_flow_whitespace(start, '}')?;
                if matches!(self.cursor.peek(), ',' | '}') {
                    self.node(YamlData::Null, self.cursor.mark())
                } else {
                    self.parse_flow_item()?
                }
            } else {
                self.node(YamlData::Null, mark)
            };
            self.insert_entry(&mapping, key, value, mark)?;
            if self.end_flow_entry(start, '}')? {
                break;
            }
        }
        self.leave();
        Ok(mapping)
    }

    /// Consume the `,` or closing bracket following an entry.
    ///
    /// # Return
    /// Returns `true` if the collection was closed.
    fn end_flow_entry(&mut self, start: Marker, close: char) -> Result<bool, ParseError> {
        self.skip_flow_whitespace(start, close)?;
        match self.cursor.peek() {
            ',' => {
                self.cursor.advance();
                Ok(false)
            }
            c if c == close => {
                self.cursor.advance();
                Ok(true)
            }
            c => Err(self
                .cursor
                .error_here(
                    ErrorType::Syntax,
                    format!("expected ',' or '{close}' in flow collection, found '{c}'"),
                )
                .with_suggestion("separate the entries of flow collections with ','")),
        }
    }

    /// Skip whitespace, line breaks and comments inside a flow collection opened at `start`.
    fn skip_flow_whitespace(&mut self, start: Marker, close: char) -> Result<(), ParseError> {
        loop {
            self.cursor.skip_whitespace();
            if let Some(comment) = self.cursor.skip_comment() {
                self.collect_comment(comment);
            }
            if self.cursor.is_at_end() {
                let what = if close == ']' { "sequence" } else { "mapping" };
                return Err(self
                    .cursor
                    .error(ErrorType::Syntax, start, format!("unterminated flow {what}"))
                    .with_suggestion(format!("close the {what} with '{close}'")));
            }
            if !self.cursor.skip_line_break() {
                return Ok(());
            }
        }
    }

    /// Parse a node inside a flow collection.
    fn parse_flow_item(&mut self) -> Result<Yaml, ParseError> {
        let mark = self.cursor.mark();
        match self.cursor.peek() {
            '[' | '{' => self.parse_flow_node(),
            '*' => self.read_alias(),
            '&' | '!' => {
                let anchor = self.read_properties()?;
                let node = self.parse_flow_item()?;
                if let Some((name, mark)) = anchor {
                    self.register_anchor(&name, &node, mark)?;
                }
                Ok(node)
            }
            q if is_quote(q) => {
                let text = self.cursor.read_quoted_string(q)?;
                let style = if q == '"' {
                    ScalarStyle::DoubleQuoted
                } else {
                    ScalarStyle::SingleQuoted
                };
                Ok(self.node(self.resolver.resolve(&text, style), mark))
            }
            ',' | ']' | '}' | ':' => Err(self
                .cursor
                .error_here(
                    ErrorType::Syntax,
                    format!("unexpected '{}' in flow collection", self.cursor.peek()),
                )
                .with_suggestion("remove the extra separator or add a value")),
            _ => {
                let text = self.read_flow_plain();
                Ok(self.node(self.resolver.resolve_plain(&text), mark))
            }
        }
    }

    /// Read a key of a flow mapping.
    fn read_flow_key(&mut self) -> Result<String, ParseError> {
        match self.cursor.peek() {
            q if is_quote(q) => self.cursor.read_quoted_string(q),
            '[' | '{' | '*' | '&' | '!' | ',' | ':' => Err(self
                .cursor
                .error_here(ErrorType::Syntax, "expected a scalar key in flow mapping")
                .with_suggestion("mapping keys must be plain or quoted strings")),
            _ => Ok(self.read_flow_plain()),
        }
    }

    /// Read a plain scalar inside a flow collection. It ends at a flow indicator, at a `:`
    /// followed by a blank or a flow indicator, at a comment or at the end of the line.
    fn read_flow_plain(&mut self) -> String {
        let mut text = String::new();
        let mut previous_blank = false;
        loop {
            let c = self.cursor.peek();
            let next = self.cursor.peek_nth(1);
            if self.cursor.is_at_end()
                || is_break(c)
                || is_flow(c)
                || (c == ':' && (is_blank_or_breakz(next) || is_flow(next)))
                || (c == '#' && previous_blank)
            {
                break;
            }
            text.push(c);
            previous_blank = is_blank(c);
            self.cursor.advance();
        }
        text.trim_end_matches(is_blank).to_string()
    }
}
