//! YAML serialization helpers.

use std::fmt;

use thiserror::Error;

use crate::{Mapping, ScalarResolver, Sequence, Yaml, YamlData};

/// The maximum nesting depth the emitter follows before giving up.
///
/// Trees built through [`Yaml::set_mapping`] or [`Yaml::add_to_sequence`] may be cyclic; this
/// bounds the recursion on such trees.
const MAX_DEPTH: usize = 512;

/// The YAML serializer.
///
/// Collections are written in block style, one entry per line. Empty collections are written
/// `{}` and `[]`, multi-line strings use literal block scalars when possible.
///
/// ```
/// # use akao_yaml::YamlEmitter;
/// let doc = akao_yaml::parse("a: [1, 2]\nb: {c: text}").unwrap();
///
/// let mut output = String::new();
/// YamlEmitter::new(&mut output).dump(&doc).unwrap();
///
/// assert_eq!(output, "a:\n  - 1\n  - 2\nb:\n  c: text\n");
/// ```
#[allow(clippy::module_name_repetitions)]
pub struct YamlEmitter<'a> {
    writer: &'a mut dyn fmt::Write,
    /// Number of spaces per nesting level.
    indent: usize,
    /// Current recursion depth.
    depth: usize,
}

/// What precedes the node being emitted on its line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Position {
    /// Nothing: the node is a document root.
    Root,
    /// A `key:` at the given level.
    Value,
    /// A `-` at the given level.
    Item,
    /// An `&anchor`. Block collections start on the next line, at the given level.
    Anchored,
}

impl<'a> YamlEmitter<'a> {
    /// Create a new emitter serializing into `writer`.
    pub fn new(writer: &'a mut dyn fmt::Write) -> Self {
        YamlEmitter {
            writer,
            indent: 2,
            depth: 0,
        }
    }

    /// Set the number of spaces per nesting level. Values below 2 are raised to 2.
    pub fn indent(&mut self, width: usize) {
        self.indent = width.max(2);
    }

    /// Return the number of spaces per nesting level.
    #[must_use]
    pub fn indent_width(&self) -> usize {
        self.indent
    }

    /// Dump the given YAML node as a single document, followed by a newline.
    ///
    /// # Errors
    /// Returns [`EmitError`] when an error occurs.
    pub fn dump(&mut self, doc: &Yaml) -> EmitResult {
        self.emit_node(doc, 0, Position::Root)?;
        self.writer.write_char('\n')?;
        Ok(())
    }

    /// Dump each node as a document of a stream, each starting with `---`.
    ///
    /// # Errors
    /// Returns [`EmitError`] when an error occurs.
    pub fn dump_documents(&mut self, docs: &[Yaml]) -> EmitResult {
        for doc in docs {
            self.writer.write_str("---\n")?;
            self.dump(doc)?;
        }
        Ok(())
    }

    fn emit_node(&mut self, node: &Yaml, level: usize, position: Position) -> EmitResult {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EmitError::Recursion(MAX_DEPTH));
        }
        let data = node.data();
        match *data {
            YamlData::Mapping(ref map) if !map.is_empty() => match position {
                Position::Root => self.emit_mapping(map, level, true)?,
                Position::Value => self.emit_mapping(map, level + 1, false)?,
                Position::Item => {
                    self.write_item_padding()?;
                    self.emit_mapping(map, level + 1, true)?;
                }
                Position::Anchored => self.emit_mapping(map, level, false)?,
            },
            YamlData::Sequence(ref seq) if !seq.is_empty() => match position {
                Position::Root => self.emit_sequence(seq, level, true)?,
                Position::Value => self.emit_sequence(seq, level + 1, false)?,
                Position::Item => {
                    self.write_item_padding()?;
                    self.emit_sequence(seq, level + 1, true)?;
                }
                Position::Anchored => self.emit_sequence(seq, level, false)?,
            },
            YamlData::Anchor(ref name, ref target) => {
                self.write_separator(position)?;
                write!(self.writer, "&{name}")?;
                let child_level = match position {
                    Position::Root | Position::Anchored => level,
                    Position::Value | Position::Item => level + 1,
                };
                self.emit_node(target, child_level, Position::Anchored)?;
            }
            ref scalar => {
                self.write_separator(position)?;
                let block_level = match position {
                    Position::Anchored => level.max(1),
                    _ => level + 1,
                };
                self.emit_scalar(scalar, block_level)?;
            }
        }
        self.depth -= 1;
        Ok(())
    }

    fn emit_mapping(&mut self, map: &Mapping, level: usize, inline_first: bool) -> EmitResult {
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 || !inline_first {
                self.write_newline(level)?;
            }
            if needs_quotes(key) {
                escape_str(self.writer, key)?;
            } else {
                self.writer.write_str(key)?;
            }
            self.writer.write_char(':')?;
            self.emit_node(value, level, Position::Value)?;
        }
        Ok(())
    }

    fn emit_sequence(&mut self, seq: &Sequence, level: usize, inline_first: bool) -> EmitResult {
        for (i, item) in seq.iter().enumerate() {
            if i > 0 || !inline_first {
                self.write_newline(level)?;
            }
            self.writer.write_char('-')?;
            self.emit_node(item, level, Position::Item)?;
        }
        Ok(())
    }

    /// Emit a value that is written on a single line, except for literal block scalars whose
    /// lines are indented at `block_level`.
    fn emit_scalar(&mut self, data: &YamlData, block_level: usize) -> EmitResult {
        match *data {
            YamlData::String(ref v) => {
                if v.contains('\n') && is_valid_literal_block_scalar(v) {
                    self.emit_literal(v, block_level)?;
                } else if needs_quotes(v) {
                    escape_str(self.writer, v)?;
                } else {
                    self.writer.write_str(v)?;
                }
            }
            YamlData::Integer(v) => write!(self.writer, "{v}")?,
            YamlData::Float(v) => self.writer.write_str(&format_float(v.into_inner()))?,
            YamlData::Boolean(v) => self.writer.write_str(if v { "true" } else { "false" })?,
            YamlData::Null => self.writer.write_str("null")?,
            YamlData::Sequence(_) => self.writer.write_str("[]")?,
            YamlData::Mapping(_) => self.writer.write_str("{}")?,
            YamlData::Alias(ref name) => write!(self.writer, "*{name}")?,
            YamlData::Anchor(_, ref target) => self.emit_scalar(&target.data(), block_level)?,
        }
        Ok(())
    }

    /// Emit `text` as a literal block scalar. The chomping indicator is picked so that trailing
    /// line breaks are preserved exactly.
    fn emit_literal(&mut self, text: &str, level: usize) -> EmitResult {
        let body = text.trim_end_matches('\n');
        let trailing = text.len() - body.len();
        self.writer.write_str(match trailing {
            0 => "|-",
            1 => "|",
            _ => "|+",
        })?;
        for line in body.split('\n') {
            if line.is_empty() {
                self.writer.write_char('\n')?;
            } else {
                self.write_newline(level)?;
                self.writer.write_str(line)?;
            }
        }
        for _ in 1..trailing {
            self.writer.write_char('\n')?;
        }
        Ok(())
    }

    fn write_separator(&mut self, position: Position) -> EmitResult {
        if position != Position::Root {
            self.writer.write_char(' ')?;
        }
        Ok(())
    }

    fn write_newline(&mut self, level: usize) -> EmitResult {
        self.writer.write_char('\n')?;
        for _ in 0..level * self.indent {
            self.writer.write_char(' ')?;
        }
        Ok(())
    }

    /// Pad after a `-` so that an inline collection lines up with the next nesting level.
    fn write_item_padding(&mut self) -> EmitResult {
        for _ in 1..self.indent {
            self.writer.write_char(' ')?;
        }
        Ok(())
    }
}

/// A convenience alias for emitter functions that may fail without returning a value.
pub type EmitResult = Result<(), EmitError>;

/// An error when emitting YAML.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum EmitError {
    /// A formatting error.
    #[error(transparent)]
    FmtError(#[from] fmt::Error),
    /// The tree is nested deeper than the emitter follows, which happens for cyclic trees.
    #[error("nesting exceeds {0} levels; the tree may contain a cycle")]
    Recursion(usize),
}

/// Format a float so that it reads back as the same float.
fn format_float(v: f64) -> String {
    if v.is_nan() {
        ".nan".to_string()
    } else if v == f64::INFINITY {
        ".inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-.inf".to_string()
    } else {
        // `Debug` always includes a fractional part or an exponent (`1.0`, `1e300`).
        format!("{v:?}")
    }
}

/// Check if the string can be expressed as a literal block scalar that reads back unchanged.
///
/// The YAML spec supports all of the following in block literals except `#xFEFF`:
/// ```no_compile
///     #x9 | #xA | [#x20-#x7E]                /* 8 bit */
///   | #x85 | [#xA0-#xD7FF] | [#xE000-#xFFFD] /* 16 bit */
///   | [#x10000-#x10FFFF]                     /* 32 bit */
/// ```
/// On top of that, the first line with content may not start with a blank (it would be taken
/// for indentation), and there must be some content.
fn is_valid_literal_block_scalar(string: &str) -> bool {
    let body = string.trim_end_matches('\n');
    string.chars().all(|character: char| {
        matches!(character, '\t' | '\n' | '\x20'..='\x7e' | '\u{0085}' | '\u{00a0}'..='\u{d7ff}' | '\u{e000}'..='\u{fffd}' | '\u{10000}'..='\u{10ffff}')
    }) && body
        .split('\n')
        .find(|line| !line.is_empty())
        .is_some_and(|line| !line.starts_with(|c: char| c == ' ' || c == '\t'))
}

/// Write `v` as a double-quoted scalar.
fn escape_str(wr: &mut dyn fmt::Write, v: &str) -> fmt::Result {
    wr.write_char('"')?;
    let mut start = 0;
    for (i, c) in v.char_indices() {
        let escaped: String = match c {
            '"' => "\\\"".into(),
            '\\' => "\\\\".into(),
            '\x08' => "\\b".into(),
            '\t' => "\\t".into(),
            '\n' => "\\n".into(),
            '\x0c' => "\\f".into(),
            '\r' => "\\r".into(),
            '\0'..='\x1f' | '\x7f' | '\u{85}' | '\u{2028}' | '\u{2029}' | '\u{feff}' => {
                format!("\\u{:04x}", c as u32)
            }
            _ => continue,
        };
        if start < i {
            wr.write_str(&v[start..i])?;
        }
        wr.write_str(&escaped)?;
        start = i + c.len_utf8();
    }
    if start != v.len() {
        wr.write_str(&v[start..])?;
    }
    wr.write_char('"')
}

/// Check if the string requires quoting.
///
/// Strings starting with any of the following characters must be quoted.
/// :, &, *, ?, |, -, <, >, =, !, %, @, ., `
/// Strings containing any of the following characters must be quoted.
/// {, }, \[, \], ,, #, `, ", ', \, :, or control characters.
///
/// Finally, strings that would be read back as another type (`true`, `~`, `12`, `0x1F`, `.inf`,
/// ...) and strings with leading or trailing spaces are quoted as well.
#[allow(clippy::doc_markdown)]
fn needs_quotes(string: &str) -> bool {
    string.is_empty()
        || string.starts_with(|character: char| {
            matches!(
                character,
                ' ' | '&' | '*' | '?' | '|' | '-' | '<' | '>' | '=' | '!' | '%' | '@' | '.' | '`'
            )
        })
        || string.ends_with(' ')
        || string.contains(|character: char| {
            matches!(character, ':'
            | '{'
            | '}'
            | '['
            | ']'
            | ','
            | '#'
            | '`'
            | '\"'
            | '\''
            | '\\'
            | '\0'..='\x1f'
            | '\x7f'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{feff}')
        })
        || ["on", "On", "ON", "off", "Off", "OFF"].contains(&string)
        || !matches!(
            ScalarResolver::new(false).resolve_plain(string),
            YamlData::String(_)
        )
}

#[cfg(test)]
mod test {
    use super::{escape_str, format_float, is_valid_literal_block_scalar, needs_quotes};

    #[test]
    fn test_needs_quotes() {
        for s in [
            "", " a", "a ", "- a", "a: b", "a #b", "true", "yes", "~", "null", "12", "-3", "0x1F",
            "1e5", ".inf", "on", "[a]", "it's", "tab\there", "@at", "...",
        ] {
            assert!(needs_quotes(s), "{s:?} should be quoted");
        }
        for s in ["a", "hello world", "a-b", "http//x", "1.2.3", "ноль", "a!b"] {
            assert!(!needs_quotes(s), "{s:?} should not be quoted");
        }
    }

    #[test]
    fn test_escape_str() {
        let mut out = String::new();
        escape_str(&mut out, "a\"b\\c\n\u{1}é").unwrap();
        assert_eq!(out, r#""a\"b\\c\n\u0001é""#);
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(-0.5), "-0.5");
        assert_eq!(format_float(1e300), "1e300");
        assert_eq!(format_float(f64::NAN), ".nan");
        assert_eq!(format_float(f64::NEG_INFINITY), "-.inf");
    }

    #[test]
    fn test_literal_candidates() {
        assert!(is_valid_literal_block_scalar("a\nb"));
        assert!(is_valid_literal_block_scalar("\na\n\n"));
        assert!(!is_valid_literal_block_scalar("  indented\nb"));
        assert!(!is_valid_literal_block_scalar("\n\n"));
        assert!(!is_valid_literal_block_scalar("a\r\nb"));
    }
}
