#[macro_use]
extern crate quickcheck;

use quickcheck::TestResult;

use akao_yaml_parser::{Cursor, ErrorType, Marker};

fn read_lines(input: &str) -> Vec<&str> {
    read_lines_of(&mut Cursor::new(input))
}

fn read_lines_of<'a>(cursor: &mut Cursor<'a>) -> Vec<&'a str> {
    let mut lines = vec![];
    while !cursor.is_at_end() {
        lines.push(cursor.read_line());
    }
    lines
}

#[test]
fn test_nul_is_ordinary_content() {
    assert_eq!(read_lines("a\0b\nc"), vec!["a\0b", "c"]);

    let mut cursor = Cursor::new("# x\0y\nz");
    assert_eq!(cursor.skip_comment(), Some("x\0y"));
    cursor.skip_to_next_line();
    assert_eq!(cursor.peek(), 'z');
}

#[test]
fn test_bounded_cursor() {
    let input = "a: 1\n---\nb: 2\n";
    let mut cursor = Cursor::with_bounds(input, Marker::new(9, 3, 1), input.len());
    assert_eq!(cursor.read_line(), "b: 2");
    assert!(cursor.is_at_end());

    let mut cursor = Cursor::with_bounds(input, Marker::default(), 5);
    assert_eq!(read_lines_of(&mut cursor), vec!["a: 1"]);
}

#[test]
fn test_document_markers() {
    let mut cursor = Cursor::new("---\n--- # c\n----\n...");
    assert!(cursor.is_document_marker());
    cursor.read_line();
    assert!(cursor.is_document_marker());
    cursor.read_line();
    assert!(!cursor.is_document_marker());
    cursor.read_line();
    assert!(cursor.is_document_marker());

    let mut cursor = Cursor::new(" ---");
    cursor.advance();
    assert!(!cursor.is_document_marker());
}

#[test]
fn test_error_location_and_context() {
    let mut cursor = Cursor::new("a: 1\nb: 'open\n");
    cursor.read_line();
    cursor.skip_n(3);
    let err = cursor.read_quoted_string('\'').unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Syntax);
    assert_eq!((err.line(), err.column()), (2, 4));
    assert_eq!(err.marker().index(), 8);
    assert_eq!(err.context(), "b: 'open");
    assert_eq!(err.document(), None);
    assert_eq!(
        err.to_string(),
        "YAML parse error at line 2, column 4: unterminated quoted string (close the string with a matching ')"
    );
}

#[test]
fn test_invalid_escapes() {
    for (input, message) in [
        (r#""\q""#, "invalid escape sequence '\\q'"),
        (r#""\x4""#, "expected 2 hexadecimal digits in escape sequence"),
        (r#""\UFFFFFFFF""#, "invalid unicode code point 0xffffffff in escape sequence"),
    ] {
        let err = Cursor::new(input).read_quoted_string('"').unwrap_err();
        assert_eq!(err.message(), message, "{input}");
        assert_eq!(err.column(), 2, "{input}");
    }
}

quickcheck! {
    fn test_read_line_matches_lines(input: String) -> TestResult {
        if input.contains('\r') {
            return TestResult::discard();
        }
        TestResult::from_bool(read_lines(&input) == input.lines().collect::<Vec<_>>())
    }

    fn test_advance_counts_lines(input: String) -> TestResult {
        if input.contains('\r') {
            return TestResult::discard();
        }
        let mut cursor = Cursor::new(&input);
        cursor.skip_n(input.chars().count());
        let last_line = input.rsplit('\n').next().unwrap_or("");
        TestResult::from_bool(
            cursor.is_at_end()
                && cursor.mark().index() == input.len()
                && cursor.mark().line() == input.matches('\n').count() + 1
                && cursor.mark().col() == last_line.chars().count() + 1,
        )
    }

    fn test_single_quoted_round_trip(value: String) -> TestResult {
        if value.contains(['\n', '\r']) {
            return TestResult::discard();
        }
        let quoted = format!("'{}'", value.replace('\'', "''"));
        let mut cursor = Cursor::new(&quoted);
        match cursor.read_quoted_string('\'') {
            Ok(read) => TestResult::from_bool(read == value && cursor.is_at_end()),
            Err(err) => TestResult::error(err.to_string()),
        }
    }
}
