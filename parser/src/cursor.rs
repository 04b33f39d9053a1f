//! Position-tracking reader over a YAML source buffer.

use crate::{
    char_traits::{as_hex, is_blank, is_blank_or_breakz, is_break},
    ErrorType, ParseError,
};

/// A location in a YAML source.
///
/// Lines and columns are 1-based and count characters. The index is the byte offset from the
/// beginning of the source.
#[derive(Clone, Copy, PartialEq, Debug, Eq, PartialOrd, Ord, Hash)]
pub struct Marker {
    /// The byte offset of the location.
    index: usize,
    /// The line (1-based).
    line: usize,
    /// The column (1-based).
    col: usize,
}

impl Marker {
    /// Create a new [`Marker`] at the given position.
    #[must_use]
    pub fn new(index: usize, line: usize, col: usize) -> Marker {
        Marker { index, line, col }
    }

    /// Return the byte offset of the marker in the source.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Return the line of the marker in the source.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Return the column of the marker in the source.
    #[must_use]
    pub fn col(&self) -> usize {
        self.col
    }
}

impl Default for Marker {
    fn default() -> Self {
        Marker::new(0, 1, 1)
    }
}

/// A reader over a YAML source, tracking its position as it goes.
///
/// The cursor may be restricted to a sub-range of its source (e.g. a single document in a
/// stream). Positions are always reported relative to the full source, so that diagnostics
/// point at the right line of the input.
///
/// Peeking past the end of the readable range yields `\0`.
#[derive(Clone, Debug)]
pub struct Cursor<'input> {
    /// The whole source.
    buffer: &'input str,
    /// The byte offset past which the cursor may not read.
    end: usize,
    /// The current position.
    mark: Marker,
}

impl<'input> Cursor<'input> {
    /// Create a cursor reading the whole `input`.
    #[must_use]
    pub fn new(input: &'input str) -> Self {
        Self {
            buffer: input,
            end: input.len(),
            mark: Marker::default(),
        }
    }

    /// Create a cursor reading `input` from `start` up to the byte offset `end`.
    ///
    /// `end` is clamped to the length of `input`.
    #[must_use]
    pub fn with_bounds(input: &'input str, start: Marker, end: usize) -> Self {
        Self {
            buffer: input,
            end: end.min(input.len()),
            mark: start,
        }
    }

    /// Return the full source the cursor reads from.
    #[must_use]
    pub fn source(&self) -> &'input str {
        self.buffer
    }

    /// Return the current position.
    #[must_use]
    pub fn mark(&self) -> Marker {
        self.mark
    }

    /// Move back (or forward) to a position previously returned by [`Self::mark`].
    pub fn reset(&mut self, mark: Marker) {
        self.mark = mark;
    }

    /// Return whether there is nothing left to read.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.mark.index >= self.end
    }

    /// Return whether the cursor sits at the first column of a line.
    #[must_use]
    pub fn is_at_line_start(&self) -> bool {
        self.mark.col == 1
    }

    /// Return the number of characters between the start of the line and the cursor.
    ///
    /// When the cursor sits on the first character of a block node, this is the indentation of
    /// that node.
    #[must_use]
    pub fn column_offset(&self) -> usize {
        self.mark.col - 1
    }

    /// Return the unread part of the source.
    #[must_use]
    pub fn remaining(&self) -> &'input str {
        &self.buffer[self.mark.index.min(self.end)..self.end]
    }

    /// Return the next character, without consuming it.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> char {
        self.remaining().chars().next().unwrap_or('\0')
    }

    /// Return the `n`-th next character, without consuming it.
    #[inline]
    #[must_use]
    pub fn peek_nth(&self, n: usize) -> char {
        self.remaining().chars().nth(n).unwrap_or('\0')
    }

    /// Consume the next character and return it.
    ///
    /// `\r\n` counts as a single line break; a lone `\r` is a line break as well.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.remaining().chars().next()?;
        self.mark.index += c.len_utf8();
        if c == '\n' || (c == '\r' && self.peek() != '\n') {
            self.mark.line += 1;
            self.mark.col = 1;
        } else {
            self.mark.col += 1;
        }
        Some(c)
    }

    /// Consume the next `count` characters.
    pub fn skip_n(&mut self, count: usize) {
        for _ in 0..count {
            if self.advance().is_none() {
                break;
            }
        }
    }

    /// Skip spaces and tabs, stopping at line breaks.
    ///
    /// # Return
    /// Returns the number of characters skipped.
    pub fn skip_whitespace(&mut self) -> usize {
        let mut count = 0;
        while is_blank(self.peek()) {
            self.advance();
            count += 1;
        }
        count
    }

    /// Skip a comment, if the cursor is on a `#`.
    ///
    /// The line break ending the comment is not consumed. The caller is responsible for only
    /// calling this outside of quoted scalars.
    ///
    /// # Return
    /// Returns the text of the comment, without the leading `#` and surrounding whitespace.
    pub fn skip_comment(&mut self) -> Option<&'input str> {
        if self.peek() != '#' {
            return None;
        }
        self.advance();
        let start = self.mark.index;
        while !self.is_at_end() && !is_break(self.peek()) {
            self.advance();
        }
        Some(self.buffer[start..self.mark.index].trim())
    }

    /// Consume a line break (`\n`, `\r\n` or `\r`), if the cursor is on one.
    ///
    /// # Return
    /// Returns whether a line break was consumed.
    pub fn skip_line_break(&mut self) -> bool {
        match self.peek() {
            '\r' => {
                self.advance();
                if self.peek() == '\n' {
                    self.advance();
                }
                true
            }
            '\n' => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    /// Consume the rest of the current line, including its line break.
    pub fn skip_to_next_line(&mut self) {
        while !self.is_at_end() && !is_break(self.peek()) {
            self.advance();
        }
        self.skip_line_break();
    }

    /// Return the rest of the current line, without consuming it.
    #[must_use]
    pub fn rest_of_line(&self) -> &'input str {
        let rest = self.remaining();
        rest.find(is_break).map_or(rest, |end| &rest[..end])
    }

    /// Return whether the rest of the current line is only whitespace and/or a comment.
    #[must_use]
    pub fn rest_is_blank_or_comment(&self) -> bool {
        let rest = self.rest_of_line().trim_start_matches(is_blank);
        rest.is_empty() || rest.starts_with('#')
    }

    /// Consume the rest of the current line and its line break.
    ///
    /// # Return
    /// Returns the content of the line, without the line break.
    pub fn read_line(&mut self) -> &'input str {
        let start = self.mark.index;
        while !self.is_at_end() && !is_break(self.peek()) {
            self.advance();
        }
        let line = &self.buffer[start..self.mark.index];
        self.skip_line_break();
        line
    }

    /// Consume characters up to (not including) `delimiter` or the end of the input.
    ///
    /// # Return
    /// Returns the consumed characters.
    pub fn read_until(&mut self, delimiter: char) -> &'input str {
        let start = self.mark.index;
        while !self.is_at_end() && self.peek() != delimiter {
            self.advance();
        }
        &self.buffer[start..self.mark.index]
    }

    /// Return whether the cursor is at a document marker (`---` or `...` at the start of a line,
    /// followed by a blank or the end of the line).
    #[must_use]
    pub fn is_document_marker(&self) -> bool {
        let rest = self.remaining();
        self.is_at_line_start()
            && (rest.starts_with("---") || rest.starts_with("..."))
            && is_blank_or_breakz(self.peek_nth(3))
    }

    /// Count the leading spaces of `line`.
    ///
    /// # Errors
    /// Returns the character offset of the first tab if a tab appears in the leading whitespace
    /// of a line that has content (YAML forbids tab indentation).
    pub fn measure_indent(line: &str) -> Result<usize, usize> {
        let mut indent = 0;
        let mut first_tab = None;
        for (offset, c) in line.chars().enumerate() {
            match c {
                ' ' => indent += 1,
                '\t' => {
                    first_tab.get_or_insert(offset);
                }
                _ => break,
            }
        }
        let content = line.trim_start_matches(is_blank);
        match first_tab {
            Some(offset) if !content.is_empty() && !content.starts_with('#') => Err(offset),
            _ => Ok(indent),
        }
    }

    /// Consume the indentation of the current line.
    ///
    /// The cursor must be at the start of a line. Leading spaces are consumed and counted. Tabs
    /// are only tolerated on lines without content (blank or comment-only lines), and not at all
    /// when `strict` is set.
    ///
    /// # Errors
    /// Returns a [`ErrorType::Syntax`] error pointing at the first tab of the indentation.
    pub fn indentation(&mut self, strict: bool) -> Result<usize, ParseError> {
        let measured = Cursor::measure_indent(self.rest_of_line());
        let start = self.mark;
        let mut spaces = 0;
        while is_blank(self.peek()) {
            if self.peek() == ' ' {
                spaces += 1;
            } else if strict || measured.is_err() {
                let err = self.error_here(ErrorType::Syntax, "tab character used for indentation");
                self.reset(start);
                return Err(err.with_suggestion("YAML indentation must use spaces only"));
            }
            self.advance();
        }
        Ok(spaces)
    }

    /// Read a quoted scalar.
    ///
    /// The cursor must be on the opening `quote`. On success, the cursor is placed right after
    /// the closing quote.
    ///
    /// Double-quoted scalars support backslash escapes. Single-quoted scalars are literal, except
    /// for `''` which stands for a single quote. Line breaks inside the scalar are folded: a
    /// single break becomes a space, `n` consecutive breaks become `n - 1` newlines.
    ///
    /// # Errors
    /// Returns a [`ErrorType::Syntax`] error on unterminated scalars and invalid escapes.
    pub fn read_quoted_string(&mut self, quote: char) -> Result<String, ParseError> {
        let start = self.mark;
        self.advance();
        let mut out = String::new();
        // Literal whitespace is only kept if something follows it on the same line.
        let mut pending_ws = String::new();

        loop {
            if self.is_at_end() {
                return Err(self
                    .error(ErrorType::Syntax, start, "unterminated quoted string")
                    .with_suggestion(format!("close the string with a matching {quote}")));
            }
            match self.peek() {
                c if c == quote => {
                    out.push_str(&pending_ws);
                    pending_ws.clear();
                    if quote == '\'' && self.peek_nth(1) == '\'' {
                        out.push('\'');
                        self.skip_n(2);
                        continue;
                    }
                    self.advance();
                    return Ok(out);
                }
                '\\' if quote == '"' => {
                    out.push_str(&pending_ws);
                    pending_ws.clear();
                    self.read_escape(&mut out)?;
                }
                c if is_break(c) => {
                    pending_ws.clear();
                    self.skip_line_break();
                    let mut breaks = 0;
                    loop {
                        self.skip_whitespace();
                        if !self.skip_line_break() {
                            break;
                        }
                        breaks += 1;
                    }
                    if breaks == 0 {
                        out.push(' ');
                    } else {
                        out.extend(std::iter::repeat('\n').take(breaks));
                    }
                }
                c if is_blank(c) => {
                    pending_ws.push(c);
                    self.advance();
                }
                c => {
                    out.push_str(&pending_ws);
                    pending_ws.clear();
                    out.push(c);
                    self.advance();
                }
            }
        }
    }

    /// Read an escape sequence in a double-quoted scalar. The cursor must be on the `\`.
    fn read_escape(&mut self, out: &mut String) -> Result<(), ParseError> {
        let start = self.mark;
        self.advance();
        let c = self.peek();
        if is_break(c) {
            // Escaped line break: the lines are joined without a space.
            self.skip_line_break();
            self.skip_whitespace();
            return Ok(());
        }
        if self.advance().is_none() {
            return Err(self.error(ErrorType::Syntax, start, "unterminated quoted string"));
        }
        let resolved = match c {
            '0' => '\0',
            'a' => '\x07',
            'b' => '\x08',
            't' | '\t' => '\t',
            'n' => '\n',
            'v' => '\x0b',
            'f' => '\x0c',
            'r' => '\r',
            'e' => '\x1b',
            ' ' => ' ',
            '"' => '"',
            '/' => '/',
            '\\' => '\\',
            'N' => '\u{85}',
            '_' => '\u{a0}',
            'L' => '\u{2028}',
            'P' => '\u{2029}',
            'x' => self.read_hex_escape(start, 2)?,
            'u' => self.read_hex_escape(start, 4)?,
            'U' => self.read_hex_escape(start, 8)?,
            _ => {
                return Err(self
                    .error(ErrorType::Syntax, start, format!("invalid escape sequence '\\{c}'"))
                    .with_suggestion("escape a literal backslash as '\\\\'"));
            }
        };
        out.push(resolved);
        Ok(())
    }

    /// Read the `length` hexadecimal digits of a `\x`, `\u` or `\U` escape.
    fn read_hex_escape(&mut self, start: Marker, length: usize) -> Result<char, ParseError> {
        let mut value: u32 = 0;
        for _ in 0..length {
            let Some(digit) = as_hex(self.peek()) else {
                return Err(self.error(
                    ErrorType::Syntax,
                    start,
                    format!("expected {length} hexadecimal digits in escape sequence"),
                ));
            };
            value = value * 16 + digit;
            self.advance();
        }
        char::from_u32(value).ok_or_else(|| {
            self.error(
                ErrorType::Syntax,
                start,
                format!("invalid unicode code point {value:#x} in escape sequence"),
            )
        })
    }

    /// Return the source line containing `marker`, without its line break.
    #[must_use]
    pub fn context(&self, marker: Marker) -> String {
        let index = marker.index.min(self.buffer.len());
        let start = self.buffer[..index].rfind(is_break).map_or(0, |i| i + 1);
        let line = &self.buffer[start..];
        let end = line.find(is_break).unwrap_or(line.len());
        line[..end].to_string()
    }

    /// Create an error located at `marker`, with the line at `marker` as context.
    #[must_use]
    pub fn error(
        &self,
        error_type: ErrorType,
        marker: Marker,
        message: impl Into<String>,
    ) -> ParseError {
        ParseError::new(error_type, marker, message).with_context(self.context(marker))
    }

    /// Create an error located at the current position.
    #[must_use]
    pub fn error_here(&self, error_type: ErrorType, message: impl Into<String>) -> ParseError {
        self.error(error_type, self.mark, message)
    }
}

#[cfg(test)]
mod test {
    use super::{Cursor, Marker};
    use crate::ErrorType;

    #[test]
    fn test_advance_tracks_lines() {
        let mut cursor = Cursor::new("ab\ncd\r\ne");
        cursor.skip_n(3);
        assert_eq!(cursor.mark(), Marker::new(3, 2, 1));
        cursor.skip_n(2);
        assert_eq!(cursor.mark().col(), 3);
        assert!(cursor.skip_line_break());
        assert_eq!(cursor.mark(), Marker::new(7, 3, 1));
        assert_eq!(cursor.advance(), Some('e'));
        assert_eq!(cursor.advance(), None);
        assert!(cursor.is_at_end());
        assert_eq!(cursor.peek(), '\0');
    }

    #[test]
    fn test_utf8_columns() {
        let mut cursor = Cursor::new("é: 你好");
        cursor.skip_n(3);
        assert_eq!(cursor.mark().col(), 4);
        assert_eq!(cursor.mark().index(), 4);
        assert_eq!(cursor.peek(), '你');
    }

    #[test]
    fn test_read_line_and_until() {
        let mut cursor = Cursor::new("key: value # note\nnext");
        assert_eq!(cursor.read_until(':'), "key");
        assert_eq!(cursor.rest_of_line(), ": value # note");
        cursor.advance();
        cursor.skip_whitespace();
        assert_eq!(cursor.read_until(' '), "value");
        cursor.skip_whitespace();
        assert_eq!(cursor.skip_comment(), Some("note"));
        assert!(cursor.skip_line_break());
        assert_eq!(cursor.read_line(), "next");
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_measure_indent() {
        assert_eq!(Cursor::measure_indent("    a: 1"), Ok(4));
        assert_eq!(Cursor::measure_indent("a"), Ok(0));
        assert_eq!(Cursor::measure_indent("  \ta: 1"), Err(2));
        assert_eq!(Cursor::measure_indent("\t# only a comment"), Ok(0));
        assert_eq!(Cursor::measure_indent(" \t "), Ok(2));
    }

    #[test]
    fn test_indentation_rejects_tabs() {
        let mut cursor = Cursor::new("a:\n\tb: 1\n");
        cursor.read_line();
        let err = cursor.indentation(false).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Syntax);
        assert_eq!(err.line(), 2);
        assert_eq!(err.column(), 1);
        assert_eq!(err.context(), "\tb: 1");

        let mut cursor = Cursor::new("\t\n");
        assert_eq!(cursor.indentation(false).unwrap(), 0);
        let mut cursor = Cursor::new("\t\n");
        assert!(cursor.indentation(true).is_err());
    }

    #[test]
    fn test_double_quoted_escapes() {
        let mut cursor = Cursor::new(r#""a\tb\n\x41\u00e9\"" rest"#);
        assert_eq!(cursor.read_quoted_string('"').unwrap(), "a\tb\nAé\"");
        assert_eq!(cursor.rest_of_line(), " rest");
    }

    #[test]
    fn test_single_quoted() {
        let mut cursor = Cursor::new(r"'it''s \n'");
        assert_eq!(cursor.read_quoted_string('\'').unwrap(), r"it's \n");
    }

    #[test]
    fn test_quoted_folding() {
        let mut cursor = Cursor::new("\"first   \n   second\n\n  third\\\n  fourth\"");
        assert_eq!(
            cursor.read_quoted_string('"').unwrap(),
            "first second\nthirdfourth"
        );
        assert_eq!(cursor.mark().line(), 5);
    }

    #[test]
    fn test_quoted_errors() {
        let mut cursor = Cursor::new("\"never closed\n");
        let err = cursor.read_quoted_string('"').unwrap_err();
        assert_eq!(err.line(), 1);
        assert_eq!(err.column(), 1);
        assert!(err.suggestion().is_some());

        let mut cursor = Cursor::new(r#""bad \q""#);
        let err = cursor.read_quoted_string('"').unwrap_err();
        assert_eq!(err.column(), 6);
        assert!(err.message().contains("\\q"));
    }

    #[test]
    fn test_document_marker() {
        let mut cursor = Cursor::new("---\n--- # c\n----\n...");
        assert!(cursor.is_document_marker());
        cursor.read_line();
        assert!(cursor.is_document_marker());
        cursor.read_line();
        assert!(!cursor.is_document_marker());
        cursor.read_line();
        assert!(cursor.is_document_marker());
    }

    #[test]
    fn test_bounds_and_context() {
        let source = "a: 1\n---\nb: 2\n";
        let mut cursor = Cursor::with_bounds(source, Marker::new(9, 3, 1), source.len());
        assert_eq!(cursor.read_until(':'), "b");
        let err = cursor.error_here(ErrorType::Syntax, "boom");
        assert_eq!(err.line(), 3);
        assert_eq!(err.context(), "b: 2");

        let cursor = Cursor::with_bounds(source, Marker::default(), 4);
        assert_eq!(cursor.rest_of_line(), "a: 1");
        assert_eq!(cursor.peek_nth(4), '\0');
    }
}
