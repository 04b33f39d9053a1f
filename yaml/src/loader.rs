//! The multi-document driver.

use std::{fs, path::Path, rc::Rc};

use akao_yaml_parser::{
    char_traits::{is_blank_or_breakz, is_bom},
    Cursor, ErrorType, Marker, ParseError,
};
use log::{debug, warn};
use thiserror::Error;

#[cfg(feature = "encoding")]
use crate::encoding::{self, DecodingTrap};
use crate::{
    parser::{DocumentParser, Warning},
    ParseOptions, Yaml,
};

/// An error that occurred while loading YAML from a file.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The file that was being read.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file was read, but could not be decoded or parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The span of one document within a stream.
#[derive(Copy, Clone, Debug)]
struct Segment {
    /// The first character of the document, after its `---` line if it has one.
    start: Marker,
    /// The byte offset past the last character of the document.
    end: usize,
    /// The `---` line that opened the document, if any.
    marker: Option<Marker>,
}

/// Main structure for parsing YAML.
///
/// A loader holds the [`ParseOptions`] and collects the [`Warning`]s raised by the documents it
/// parses. Each call parses its input from scratch: no state but the warnings is kept from one
/// call to the next.
///
/// ```
/// use akao_yaml::{ParseOptions, SafelyIndex, YamlLoader};
///
/// let mut loader = YamlLoader::new(ParseOptions::default());
/// let docs = loader.parse_multi_document("a: 1\na: 2\n---\n- x\n").unwrap();
/// assert_eq!(docs.len(), 2);
/// assert_eq!(docs[0].get("a").unwrap().as_integer(), Ok(2));
/// assert_eq!(loader.warnings().len(), 1);
/// ```
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct YamlLoader {
    options: ParseOptions,
    warnings: Vec<Warning>,
    #[cfg(feature = "encoding")]
    trap: DecodingTrap,
}

impl YamlLoader {
    /// Create a loader parsing with the given options.
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        YamlLoader {
            options,
            ..YamlLoader::default()
        }
    }

    /// Return the options the loader parses with.
    #[must_use]
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Return the warnings raised by all documents parsed so far.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Set the behavior of the decoder on invalid byte sequences.
    #[cfg(feature = "encoding")]
    pub fn decoding_trap(&mut self, trap: DecodingTrap) -> &mut Self {
        self.trap = trap;
        self
    }

    /// Parse the first document of `text`.
    ///
    /// A stream with no document yields [`YamlData::Null`](crate::YamlData::Null). With
    /// [`ParseOptions::allow_multi_document`] set, the following documents are not parsed.
    ///
    /// # Errors
    /// Returns the first [`ParseError`] encountered.
    pub fn parse(&mut self, text: &str) -> Result<Yaml, ParseError> {
        self.parse_source(text, None)
    }

    /// Parse every document of `text`, in order.
    ///
    /// # Errors
    /// Returns the first [`ParseError`] encountered, tagged with the index of the failing
    /// document. See [`Self::parse_documents`] to collect the errors of every document.
    pub fn parse_multi_document(&mut self, text: &str) -> Result<Vec<Yaml>, ParseError> {
        self.parse_multi_document_source(text, None)
    }

    /// Parse every document of `text`, reporting the outcome of each.
    ///
    /// The documents of a stream are independent: a failure in one does not prevent the
    /// following ones from being parsed, unless [`ParseOptions::strict_mode`] is set, in which
    /// case parsing stops after the first failure.
    ///
    /// # Errors
    /// Returns an error if the stream itself is invalid (e.g. it exceeds
    /// [`ParseOptions::max_size`] or has misplaced document markers).
    pub fn parse_documents(
        &mut self,
        text: &str,
    ) -> Result<Vec<Result<Yaml, ParseError>>, ParseError> {
        let segments = self.split_documents(text)?;
        let mut results = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            let result = self
                .parse_segment(text, segment, index, None)
                .map_err(|e| e.in_document(index));
            let failed = result.is_err();
            results.push(result);
            if failed && self.options.strict_mode {
                break;
            }
        }
        Ok(results)
    }

    /// Read and parse the first document of the file at `path`.
    ///
    /// The nodes of the tree record `path` in their [`SourceLocation`](crate::SourceLocation).
    ///
    /// # Errors
    /// Returns [`LoadError::Io`] if the file cannot be read, and [`LoadError::Parse`] if it
    /// cannot be decoded or parsed.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<Yaml, LoadError> {
        let path = path.as_ref();
        let text = self.read_file(path)?;
        let file: Rc<str> = Rc::from(path.display().to_string());
        Ok(self.parse_source(&text, Some(file))?)
    }

    /// Read and parse every document of the file at `path`.
    ///
    /// # Errors
    /// See [`Self::parse_file`].
    pub fn parse_multi_document_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<Yaml>, LoadError> {
        let path = path.as_ref();
        let text = self.read_file(path)?;
        let file: Rc<str> = Rc::from(path.display().to_string());
        Ok(self.parse_multi_document_source(&text, Some(file))?)
    }

    /// Decode `bytes` (UTF-8 or UTF-16, see [`encoding::decode`]) and parse every document.
    ///
    /// # Errors
    /// Returns an [`ErrorType::Encoding`] error if `bytes` are not valid text, or the first
    /// [`ParseError`] encountered.
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Result<Vec<Yaml>, ParseError> {
        let text = self.decode(bytes)?;
        self.parse_multi_document(&text)
    }

    fn read_file(&self, path: &Path) -> Result<String, LoadError> {
        debug!("loading {}", path.display());
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.check_size(bytes.len())?;
        Ok(self.decode(&bytes)?)
    }

    #[cfg(feature = "encoding")]
    fn decode(&self, bytes: &[u8]) -> Result<String, ParseError> {
        encoding::decode(bytes, self.trap)
    }

    #[cfg(not(feature = "encoding"))]
    fn decode(&self, bytes: &[u8]) -> Result<String, ParseError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            let valid = &bytes[..e.utf8_error().valid_up_to()];
            let text = String::from_utf8_lossy(valid);
            let line_start = text.rfind('\n').map_or(0, |i| i + 1);
            ParseError::new(
                ErrorType::Encoding,
                Marker::new(
                    valid.len(),
                    text.matches('\n').count() + 1,
                    text[line_start..].chars().count() + 1,
                ),
                format!("invalid UTF-8 at byte {}", valid.len()),
            )
        })
    }

    fn check_size(&self, size: usize) -> Result<(), ParseError> {
        if size > self.options.max_size {
            return Err(ParseError::new(
                ErrorType::Limit,
                Marker::default(),
                format!(
                    "input of {size} bytes exceeds the maximum size of {} bytes",
                    self.options.max_size
                ),
            )
            .with_suggestion("split the input or raise max_size"));
        }
        Ok(())
    }

    fn parse_source(&mut self, text: &str, file: Option<Rc<str>>) -> Result<Yaml, ParseError> {
        let segments = self.split_documents(text)?;
        match segments.first() {
            Some(segment) => self.parse_segment(text, segment, 0, file),
            None => Ok(Yaml::null()),
        }
    }

    fn parse_multi_document_source(
        &mut self,
        text: &str,
        file: Option<Rc<str>>,
    ) -> Result<Vec<Yaml>, ParseError> {
        self.split_documents(text)?
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                self.parse_segment(text, segment, index, file.clone())
                    .map_err(|e| e.in_document(index))
            })
            .collect()
    }

    fn parse_segment(
        &mut self,
        text: &str,
        segment: &Segment,
        index: usize,
        file: Option<Rc<str>>,
    ) -> Result<Yaml, ParseError> {
        debug!(
            "document {index} starts at line {}",
            segment.start.line()
        );
        let cursor = Cursor::with_bounds(text, segment.start, segment.end);
        let mut parser = DocumentParser::new(cursor, &self.options, file, index);
        let result = parser.parse_document();
        self.warnings.extend(parser.take_warnings());
        debug!("document {index} ends at byte {}", segment.end);
        result
    }

    /// Cut `text` into documents along `---` and `...` lines.
    ///
    /// Directive lines (`%YAML`, `%TAG`) before a document are skipped. A document only made of
    /// blank and comment lines is not a document, unless it was opened with `---`.
    fn split_documents(&mut self, text: &str) -> Result<Vec<Segment>, ParseError> {
        self.check_size(text.len())?;
        let start = match text.chars().next() {
            Some(c) if is_bom(c) => Marker::new(c.len_utf8(), 1, 1),
            _ => Marker::default(),
        };
        let mut cursor = Cursor::with_bounds(text, start, text.len());
        if let Some(offset) = text.find('\0') {
            cursor.skip_n(text[start.index()..offset].chars().count());
            return Err(cursor
                .error_here(ErrorType::Encoding, "invalid character U+0000 in input")
                .with_suggestion("remove the NUL character or escape it as \"\\0\""));
        }
        let mut segments = vec![];
        let mut current = Segment {
            start,
            end: text.len(),
            marker: None,
        };
        let mut has_content = false;

        while !cursor.is_at_end() {
            let line_mark = cursor.mark();
            let line = cursor.rest_of_line();
            let is_marker = |prefix: &str| {
                line.starts_with(prefix)
                    && is_blank_or_breakz(line[prefix.len()..].chars().next().unwrap_or('\0'))
            };
            if is_marker("---") || is_marker("...") {
                let rest = line[3..].trim_start();
                if !rest.is_empty() && !rest.starts_with('#') {
                    let offset = line.len() - rest.len();
                    return Err(cursor
                        .error(
                            ErrorType::Syntax,
                            Marker::new(
                                line_mark.index() + offset,
                                line_mark.line(),
                                line_mark.col() + line[..offset].chars().count(),
                            ),
                            "content is not allowed on a document marker line",
                        )
                        .with_suggestion("move the content to the next line"));
                }
                if has_content || current.marker.is_some() {
                    current.end = line_mark.index();
                    segments.push(current);
                }
                cursor.read_line();
                current = Segment {
                    start: cursor.mark(),
                    end: text.len(),
                    marker: line.starts_with("---").then_some(line_mark),
                };
                has_content = false;
            } else if line.starts_with('%') && !has_content {
                warn!(
                    "line {}: ignoring directive '{}'",
                    line_mark.line(),
                    line.trim_end()
                );
                cursor.read_line();
                current.start = cursor.mark();
            } else {
                let trimmed = line.trim();
                if !trimmed.is_empty() && !trimmed.starts_with('#') {
                    has_content = true;
                }
                cursor.read_line();
            }
        }
        if has_content || current.marker.is_some() {
            segments.push(current);
        }

        if !self.options.allow_multi_document && segments.len() > 1 {
            let second = segments[1];
            let marker = second.marker.unwrap_or(second.start);
            return Err(cursor
                .error(ErrorType::Syntax, marker, "multiple documents are not allowed")
                .with_suggestion("enable allow_multi_document or split the stream")
                .in_document(1));
        }
        Ok(segments)
    }
}
