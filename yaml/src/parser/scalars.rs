//! Plain and block scalars.

use akao_yaml_parser::{
    char_traits::{is_blank, is_blank_or_breakz},
    ErrorType, ParseError,
};

use super::{offset_marker, DocumentParser};
use crate::{ScalarStyle, Yaml};

/// How trailing line breaks of a block scalar are kept.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Chomping {
    /// `-`: no trailing line break.
    Strip,
    /// Default: a single trailing line break.
    Clip,
    /// `+`: every trailing line break.
    Keep,
}

impl<'input, 'opt> DocumentParser<'input, 'opt> {
    /// Parse a plain scalar in block context.
    ///
    /// Following lines indented deeper than `parent` continue the scalar. Lines are folded: a
    /// single line break becomes a space, each empty line becomes a newline.
    pub(super) fn parse_plain_scalar(&mut self, parent: Option<usize>) -> Result<Yaml, ParseError> {
        let mark = self.cursor.mark();
        let mut text = self.read_plain_line()?;
        self.finish_line()?;

        loop {
            let save = self.cursor.mark();
            let mut breaks = 0;
            while !self.cursor.is_at_end()
                && self.cursor.rest_of_line().trim_matches(is_blank).is_empty()
            {
                self.cursor.skip_to_next_line();
                breaks += 1;
            }
            if self.cursor.is_at_end() {
                self.cursor.reset(save);
                break;
            }
            let indent = self.cursor.indentation(self.options.strict_mode)?;
            let continues = parent.map_or(true, |parent| indent > parent)
                && self.cursor.peek() != '#';
            if !continues {
                self.cursor.reset(save);
                break;
            }
            if breaks == 0 {
                text.push(' ');
            } else {
                text.extend(std::iter::repeat('\n').take(breaks));
            }
            text.push_str(&self.read_plain_line()?);
            self.finish_line()?;
        }

        Ok(self.node(self.resolver.resolve(&text, ScalarStyle::Plain), mark))
    }

    /// Read the plain scalar text on the rest of the line, up to a comment.
    ///
    /// # Errors
    /// Returns a syntax error if the text contains `: `, which would start a mapping value.
    fn read_plain_line(&mut self) -> Result<String, ParseError> {
        let start = self.cursor.mark();
        let line = self.cursor.rest_of_line();
        let mut end = line.len();
        let mut previous_blank = false;
        let mut chars = line.char_indices().peekable();
        while let Some((offset, c)) = chars.next() {
            if c == '#' && previous_blank {
                end = offset;
                break;
            }
            if c == ':' && is_blank_or_breakz(chars.peek().map_or('\0', |&(_, n)| n)) {
                let marker = offset_marker(start, line, offset);
                return Err(self
                    .cursor
                    .error(ErrorType::Syntax, marker, "mapping values are not allowed here")
                    .with_suggestion("quote the value if it contains ': '"));
            }
            previous_blank = is_blank(c);
        }
        let text = &line[..end];
        self.cursor.skip_n(text.chars().count());
        Ok(text.trim_end_matches(is_blank).to_string())
    }

    /// Parse a literal (`|`) or folded (`>`) block scalar.
    ///
    /// The content lines are the following lines indented deeper than `parent`. Their
    /// indentation is given by an indentation indicator or, by default, by the first non-empty
    /// line.
    pub(super) fn parse_block_scalar(&mut self, parent: Option<usize>) -> Result<Yaml, ParseError> {
        let mark = self.cursor.mark();
        let literal = self.cursor.advance() == Some('|');
        let mut chomping = Chomping::Clip;
        let mut explicit_indent = None;
        for _ in 0..2 {
            match self.cursor.peek() {
                '-' if chomping == Chomping::Clip => chomping = Chomping::Strip,
                '+' if chomping == Chomping::Clip => chomping = Chomping::Keep,
                c @ '1'..='9' if explicit_indent.is_none() => {
                    explicit_indent = c.to_digit(10).map(|d| d as usize);
                }
                _ => break,
            }
            self.cursor.advance();
        }
        if !self.at_line_end() {
            return Err(self
                .cursor
                .error_here(ErrorType::Syntax, "invalid block scalar header")
                .with_suggestion(
                    "use '|' or '>', optionally followed by '-' or '+' and an indentation digit",
                ));
        }
        self.finish_line()?;

        let minimum = parent.map_or(0, |parent| parent + 1);
        let indent = match explicit_indent {
            Some(n) => parent.map_or(n, |parent| parent + n),
            None => self.detect_block_indent().max(minimum),
        };

        let mut lines: Vec<String> = vec![];
        while !self.cursor.is_at_end() {
            let line = self.cursor.rest_of_line();
            let spaces = line.chars().take_while(|&c| c == ' ').count();
            if spaces >= indent {
                lines.push(line.chars().skip(indent).collect());
            } else if line.trim_start_matches(is_blank).is_empty() {
                lines.push(String::new());
            } else if line[spaces..].starts_with('\t') && spaces >= minimum {
                let tab = self.cursor.mark();
                return Err(self
                    .cursor
                    .error(
                        ErrorType::Syntax,
                        offset_marker(tab, line, spaces),
                        "tab character used for indentation",
                    )
                    .with_suggestion("YAML indentation must use spaces only"));
            } else {
                break;
            }
            self.cursor.skip_to_next_line();
        }

        let mut trailing = 0;
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
            trailing += 1;
        }
        let mut text = if literal {
            lines.join("\n")
        } else {
            fold_lines(&lines)
        };
        match chomping {
            Chomping::Strip => {}
            Chomping::Clip => {
                if !lines.is_empty() {
                    text.push('\n');
                }
            }
            Chomping::Keep => {
                if !lines.is_empty() {
                    text.push('\n');
                }
                text.extend(std::iter::repeat('\n').take(trailing));
            }
        }

        let style = if literal {
            ScalarStyle::Literal
        } else {
            ScalarStyle::Folded
        };
        Ok(self.node(self.resolver.resolve(&text, style), mark))
    }

    /// Return the indentation of the first non-empty line ahead, without consuming anything.
    fn detect_block_indent(&self) -> usize {
        self.cursor
            .remaining()
            .lines()
            .find(|line| !line.trim_start_matches(is_blank).is_empty())
            .map_or(0, |line| line.chars().take_while(|&c| c == ' ').count())
    }
}

/// Fold the lines of a `>` scalar.
///
/// Adjacent lines are joined with a space and each empty line is a newline, except around
/// "more indented" lines (starting with a blank), whose line breaks are all kept.
fn fold_lines(lines: &[String]) -> String {
    let mut out = String::new();
    let mut empty_lines = 0;
    let mut previous_more_indented = false;
    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            empty_lines += 1;
            continue;
        }
        let more_indented = line.starts_with(is_blank);
        if i > 0 {
            if more_indented || previous_more_indented {
                out.extend(std::iter::repeat('\n').take(empty_lines + 1));
            } else if empty_lines > 0 {
                out.extend(std::iter::repeat('\n').take(empty_lines));
            } else {
                out.push(' ');
            }
        } else {
            out.extend(std::iter::repeat('\n').take(empty_lines));
        }
        out.push_str(line);
        empty_lines = 0;
        previous_more_indented = more_indented;
    }
    out
}
