use akao_yaml::{DuplicateKeyPolicy, ErrorType, ParseError, ParseOptions, SafelyIndex, YamlLoader};

fn error(s: &str) -> ParseError {
    akao_yaml::parse(s).unwrap_err()
}

fn position(err: &ParseError) -> (usize, usize) {
    (err.line(), err.column())
}

#[test]
fn test_tab_indentation() {
    let err = error("a:\n\tb: 1\n");
    assert_eq!(err.error_type(), ErrorType::Syntax);
    assert_eq!(err.message(), "tab character used for indentation");
    assert_eq!(position(&err), (2, 1));
    assert_eq!(err.context(), "\tb: 1");

    // Tabs are tolerated on lines without content.
    assert!(akao_yaml::parse("a: 1\n\t\nb: 2\n").is_ok());
}

#[test]
fn test_bad_indentation() {
    let err = error("a:\n  b: 1\n c: 2\n");
    assert_eq!(err.message(), "bad indentation of a mapping entry");
    assert_eq!(position(&err), (3, 2));

    let err = error("- x: 1\n - y\n");
    assert_eq!(err.message(), "bad indentation of a sequence entry");
    assert_eq!(position(&err), (2, 2));

    let err = error("a:\n  - x\n  b: 1\n");
    assert_eq!(err.message(), "bad indentation of a mapping entry");
    assert_eq!(position(&err), (3, 3));
}

#[test]
fn test_mapping_value_in_plain_scalar() {
    let err = error("a: 1\n  b: 2\n");
    assert_eq!(err.message(), "mapping values are not allowed here");
    assert_eq!(position(&err), (2, 4));

    let err = error("a: b: c\n");
    assert_eq!(position(&err), (1, 5));
}

#[test]
fn test_document_root_errors() {
    let err = error("- a\nb: 1\n");
    assert_eq!(err.message(), "expected a sequence entry");
    assert_eq!(position(&err), (2, 1));

    let err = error("  a: 1\nb: 2\n");
    assert_eq!(err.message(), "line is indented less than the document root");
    assert_eq!(position(&err), (2, 1));

    let err = error("a: 1\n- b\n");
    assert_eq!(err.message(), "unexpected sequence entry in a mapping");

    let err = error("a: - b\n");
    assert_eq!(position(&err), (1, 4));
}

#[test]
fn test_flow_errors() {
    let err = error("a: [1, 2\n");
    assert_eq!(err.message(), "unterminated flow sequence");
    assert_eq!(position(&err), (1, 4));
    assert_eq!(
        err.to_string(),
        "YAML parse error at line 1, column 4: unterminated flow sequence (close the sequence with ']')"
    );

    let err = error("{a: 1\n");
    assert_eq!(err.message(), "unterminated flow mapping");
    assert_eq!(position(&err), (1, 1));

    let err = error("[\"a\" \"b\"]\n");
    assert_eq!(err.message(), "expected ',' or ']' in flow collection, found '\"'");
    assert_eq!(akao_yaml::parse("[1 2]").unwrap().get(0).unwrap().as_string().unwrap(), "1 2");

    let err = error("[1, , 2]\n");
    assert_eq!(position(&err), (1, 5));

    let err = error("[1] x\n");
    assert_eq!(err.message(), "unexpected content after a value");
}

#[test]
fn test_quoted_errors() {
    let err = error("a: \"abc\n");
    assert_eq!(err.message(), "unterminated quoted string");
    assert_eq!(position(&err), (1, 4));

    let err = error("a: \"\\q\"\n");
    assert_eq!(err.message(), "invalid escape sequence '\\q'");
    assert_eq!(position(&err), (1, 5));

    let err = error("a: 'x' y\n");
    assert_eq!(err.message(), "unexpected characters after a quoted scalar");
}

#[test]
fn test_reserved_and_invalid_keys() {
    let err = error("a: @x\n");
    assert_eq!(err.message(), "'@' is reserved and cannot start a plain scalar");
    assert_eq!(position(&err), (1, 4));

    let err = error("a: 1\n: 2\n");
    assert_eq!(err.message(), "empty mapping key");
    assert_eq!(position(&err), (2, 1));

    let err = error("a: |x\n  text\n");
    assert_eq!(err.message(), "invalid block scalar header");
}

#[test]
fn test_duplicate_keys() {
    let s = "a: 1\nb: 2\na: 3\n";

    let mut loader = YamlLoader::default();
    let doc = loader.parse(s).unwrap();
    assert_eq!(doc.keys(), vec!["a", "b"]);
    assert_eq!(doc.get("a").unwrap().as_integer(), Ok(3));
    assert_eq!(loader.warnings().len(), 1);
    assert_eq!(
        loader.warnings()[0].to_string(),
        "line 3, column 1: duplicate mapping key 'a', keeping the last value"
    );

    let options = ParseOptions::default().with_duplicate_keys(DuplicateKeyPolicy::FirstWins);
    let doc = akao_yaml::parse_with_options(s, &options).unwrap();
    assert_eq!(doc.get("a").unwrap().as_integer(), Ok(1));

    let options = ParseOptions::default().with_duplicate_keys(DuplicateKeyPolicy::Error);
    let err = akao_yaml::parse_with_options(s, &options).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Semantic);
    assert_eq!(err.message(), "duplicate mapping key 'a'");
    assert_eq!(position(&err), (3, 1));

    let err = akao_yaml::parse_with_options("{x: 1, x: 2}", &options).unwrap_err();
    assert_eq!(position(&err), (1, 8));
}

#[test]
fn test_tags_are_ignored() {
    let mut loader = YamlLoader::default();
    let doc = loader.parse("a: !!str 1\nb: !custom\n  c: d\n").unwrap();
    assert_eq!(doc.get("a").unwrap().as_integer(), Ok(1));
    assert_eq!(doc.get("b").get("c").unwrap().as_string().unwrap(), "d");
    assert_eq!(loader.warnings().len(), 2);
    assert_eq!(
        loader.warnings()[0].message(),
        "tag '!!str' is not supported and is ignored"
    );

    let mut strict = YamlLoader::new(ParseOptions::default().with_strict_mode(true));
    let err = strict.parse("a: !!str 1\n").unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Syntax);
    assert_eq!(position(&err), (1, 4));
}

#[test]
fn test_long_property_chains() {
    let mut loader = YamlLoader::default();
    let doc = loader
        .parse(&format!("a: {}x\n", "!t ".repeat(200_000)))
        .unwrap();
    assert_eq!(doc.get("a").unwrap().as_string().unwrap(), "x");
    assert_eq!(loader.warnings().len(), 200_000);

    let doc = akao_yaml::parse(&format!("a: [{}1]\n", "!t ".repeat(200_000))).unwrap();
    assert_eq!(doc.get("a").get(0).unwrap().as_integer(), Ok(1));

    let err = error(&format!("a: [{}1]\n", "&x ".repeat(200_000)));
    assert_eq!(err.message(), "a node may only have one anchor");
    assert_eq!(position(&err), (1, 8));

    let err = error("a: &x !t &y 1\n");
    assert_eq!(err.message(), "a node may only have one anchor");
    assert_eq!(position(&err), (1, 10));

    // Lines made only of properties nest their node one level deeper each.
    let err = error(&"!t\n".repeat(200_000));
    assert_eq!(err.error_type(), ErrorType::Limit);
}

#[test]
fn test_alternate_display_has_context() {
    let err = error("key: [1,\n");
    let text = format!("{err:#}");
    assert!(text.starts_with("YAML parse error at line 1, column 6: "));
    assert!(text.ends_with("\nContext: key: [1,"));
}
