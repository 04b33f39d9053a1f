use akao_yaml::{
    DecodingTrap, ErrorType, ParseOptions, SafelyIndex, Yaml, YamlEmitter, YamlLoader,
};

#[test]
fn test_multi_document_stream() {
    let s = "# leading comment
a: 1
---
b: 2
...
--- # a comment on the marker line
- c
";
    let docs = akao_yaml::parse_multi_document(s).unwrap();
    assert_eq!(docs.len(), 3);
    assert_eq!(docs[0].get("a").unwrap().as_integer(), Ok(1));
    assert_eq!(docs[1].get("b").unwrap().as_integer(), Ok(2));
    assert_eq!(docs[2].get(0).unwrap().as_string().unwrap(), "c");

    // `parse` only returns the first document.
    assert_eq!(akao_yaml::parse(s).unwrap(), docs[0]);
}

#[test]
fn test_empty_documents() {
    assert!(akao_yaml::parse("").unwrap().is_null());
    assert!(akao_yaml::parse("# nothing\n\n").unwrap().is_null());
    assert!(akao_yaml::parse_multi_document("").unwrap().is_empty());
    assert!(akao_yaml::parse_multi_document("# nothing\n").unwrap().is_empty());

    let docs = akao_yaml::parse_multi_document("---\n---\na\n").unwrap();
    assert_eq!(docs.len(), 2);
    assert!(docs[0].is_null());
    assert_eq!(docs[1].as_string().unwrap(), "a");
}

#[test]
fn test_directives_are_skipped() {
    let docs = akao_yaml::parse_multi_document("%YAML 1.2\n---\na: 1\n").unwrap();
    assert_eq!(docs.len(), 1);
    assert!(docs[0].has_key("a"));
}

#[test]
fn test_multi_document_disabled() {
    let options = ParseOptions::default().with_allow_multi_document(false);
    assert!(akao_yaml::parse_with_options("---\na: 1\n", &options).is_ok());
    let err = akao_yaml::parse_with_options("a: 1\n---\nb: 2\n", &options).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Syntax);
    assert_eq!(err.line(), 2);
    assert_eq!(err.document(), Some(1));
}

#[test]
fn test_per_document_results() {
    let s = "a: 1\n---\nb: *x\n---\nc: 3\n";
    let mut loader = YamlLoader::default();
    let results = loader.parse_documents(s).unwrap();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    let err = results[1].as_ref().unwrap_err();
    assert_eq!(err.document(), Some(1));
    assert_eq!(err.line(), 3);
    assert_eq!(results[2].as_ref().unwrap().get("c").unwrap().as_integer(), Ok(3));

    let err = loader.parse_multi_document(s).unwrap_err();
    assert_eq!(err.document(), Some(1));

    let mut strict = YamlLoader::new(ParseOptions::default().with_strict_mode(true));
    assert_eq!(strict.parse_documents(s).unwrap().len(), 2);
}

#[test]
fn test_limits() {
    let options = ParseOptions::default().with_max_size(4);
    let err = akao_yaml::parse_with_options("a: 12\n", &options).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Limit);

    let options = ParseOptions::default().with_max_depth(3);
    assert!(akao_yaml::parse_with_options("[[[1]]]", &options).is_ok());
    let err = akao_yaml::parse_with_options("[[[[1]]]]", &options).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Limit);
    assert_eq!(err.message(), "maximum nesting depth of 3 exceeded");

    let options = ParseOptions::default().with_max_depth(2);
    let err = akao_yaml::parse_with_options("a:\n  b:\n    c: 1\n", &options).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Limit);
    assert_eq!(err.line(), 3);
}

#[test]
fn test_deep_nesting_is_rejected_by_default() {
    let s = format!("{}{}", "[".repeat(150), "]".repeat(150));
    let err = akao_yaml::parse(&s).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Limit);

    let s = format!("{}{}", "[".repeat(100), "]".repeat(100));
    assert!(akao_yaml::parse(&s).is_ok());
}

#[test]
fn test_line_endings_and_bom() {
    let doc = akao_yaml::parse("a: 1\r\nb:\r\n  - x\r\n").unwrap();
    assert_eq!(doc.at_path("/b[0]").unwrap().as_string().unwrap(), "x");
    assert_eq!(doc.get("a").unwrap().as_integer(), Ok(1));

    let doc = akao_yaml::parse("\u{feff}a: 1\n").unwrap();
    assert_eq!(doc.keys(), vec!["a"]);
}

#[test]
fn test_parse_bytes() {
    let mut loader = YamlLoader::default();
    let docs = loader.parse_bytes(b"\xff\xfea\x00:\x00 \x001\x00\n\x00").unwrap();
    assert_eq!(docs[0].get("a").unwrap().as_integer(), Ok(1));

    let err = loader.parse_bytes(b"a: \xff\n").unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Encoding);
    assert_eq!((err.line(), err.column()), (1, 4));

    loader.decoding_trap(DecodingTrap::Replace);
    let docs = loader.parse_bytes(b"a: \xff\n").unwrap();
    assert_eq!(docs[0].get("a").unwrap().as_string().unwrap(), "\u{fffd}");

    loader.decoding_trap(DecodingTrap::Ignore);
    let docs = loader.parse_bytes(b"a: 1\nb: \xff\n").unwrap();
    assert!(docs[0].get("b").unwrap().is_null());
}

#[test]
fn test_dump_documents() {
    let docs = akao_yaml::parse_multi_document("a: 1\n---\n- x\n").unwrap();
    let mut out = String::new();
    YamlEmitter::new(&mut out).dump_documents(&docs).unwrap();
    assert_eq!(out, "---\na: 1\n---\n- x\n");
    assert_eq!(akao_yaml::parse_multi_document(&out).unwrap(), docs);

    let mut out = String::new();
    YamlEmitter::new(&mut out)
        .dump_documents(&[Yaml::null()])
        .unwrap();
    assert_eq!(out, "---\nnull\n");
}
