#![allow(clippy::bool_assert_comparison)]
#![allow(clippy::float_cmp)]

use std::fs;

use akao_yaml::{
    NodeError, NodeType, ParseOptions, SafelyIndex, Yaml, YamlData, YamlEmitter, YamlLoader,
};

#[test]
fn test_api() {
    let s = "
# from yaml-cpp example
- name: Ogre
  position: [0, 5, 0]
  powers:
    - name: Club
      damage: 10
    - name: Fist
      damage: 8
- name: Dragon
  position: [1, 0, 10]
  powers:
    - name: Fire Breath
      damage: 25
    - name: Claws
      damage: 15
- name: Wizard
  position: [5, -3, 0]
  powers:
    - name: Acid Rain
      damage: 50
    - name: Staff
      damage: 3
";
    let doc = akao_yaml::parse(s).unwrap();

    assert_eq!(doc.size(), 3);
    assert_eq!(doc.get(0).get("name").unwrap().as_string().unwrap(), "Ogre");
    assert_eq!(
        doc.get(1).get("powers").get(0).get("name").unwrap().as_string().unwrap(),
        "Fire Breath"
    );
    assert_eq!(doc.get(2).get("position").get(1).unwrap().as_integer(), Ok(-3));
    assert_eq!(doc.at_path("/2/powers[1]/damage").unwrap().as_integer(), Ok(3));

    let mut writer = String::new();
    {
        let mut emitter = YamlEmitter::new(&mut writer);
        emitter.dump(&doc).unwrap();
    }

    assert!(!writer.is_empty());
    assert_eq!(akao_yaml::parse(&writer).unwrap(), doc);
}

#[test]
fn test_coerce() {
    let s = "---
a: 1
b: 2.2
c: [1, 2]
";
    let doc = akao_yaml::parse(s).unwrap();
    assert_eq!(doc.get("a").unwrap().as_integer().unwrap(), 1i64);
    assert_eq!(doc.get("b").unwrap().as_float().unwrap(), 2.2f64);
    assert_eq!(doc.get("c").get(1).unwrap().as_integer().unwrap(), 2i64);
    assert!(!doc.has_key("d"));
}

#[test]
fn test_type_mismatch() {
    let doc = akao_yaml::parse("name: demo\ncount: 3\n").unwrap();
    let name = doc.get("name").unwrap();
    assert_eq!(
        name.as_integer(),
        Err(NodeError::TypeMismatch {
            expected: NodeType::Integer,
            found: NodeType::String,
        })
    );
    assert_eq!(
        name.as_sequence().unwrap_err().to_string(),
        "type mismatch: expected sequence, found string"
    );
    assert_eq!(name.as_integer_or_default(7), 7);
    assert_eq!(doc.get("count").unwrap().as_string_or_default("none"), "none");
    assert_eq!(doc.get("count").unwrap().as_integer_or_default(7), 3);
    assert!(doc.as_mapping().is_ok());
}

#[test]
fn test_mapping_order_and_keys() {
    let doc = akao_yaml::parse("zeta: 1\nalpha: 2\nmid: 3\n").unwrap();
    assert_eq!(doc.keys(), vec!["zeta", "alpha", "mid"]);
    assert_eq!(doc.size(), 3);
    assert!(doc.has_key("alpha"));
    assert_eq!(Yaml::string("x").size(), 0);
    assert!(Yaml::string("x").keys().is_empty());
}

#[test]
fn test_nested_blocks() {
    let s = "
server:
  host: localhost
  ports:
  - 80
  - 443
  tls:
    enabled: true
    cert: ~
clients:
  -
    name: a
  - - inner
    - list
empty:
last: value
";
    let doc = akao_yaml::parse(s).unwrap();
    assert_eq!(doc.keys(), vec!["server", "clients", "empty", "last"]);
    assert_eq!(doc.at_path("/server/host").unwrap().as_string().unwrap(), "localhost");
    assert_eq!(doc.at_path("/server/ports[1]").unwrap().as_integer(), Ok(443));
    assert_eq!(doc.at_path("/server/tls/enabled").unwrap().as_boolean(), Ok(true));
    assert!(doc.at_path("/server/tls/cert").unwrap().is_null());
    assert_eq!(doc.at_path("/clients[0]/name").unwrap().as_string().unwrap(), "a");
    assert_eq!(doc.at_path("/clients[1][1]").unwrap().as_string().unwrap(), "list");
    assert!(doc.get("empty").unwrap().is_null());
    assert_eq!(doc.get("last").unwrap().as_string().unwrap(), "value");
}

#[test]
fn test_flow_collections() {
    let doc = akao_yaml::parse("{a: [1, 2, {b: c}], 'd e': \"f\", g: , h}").unwrap();
    assert_eq!(doc.keys(), vec!["a", "d e", "g", "h"]);
    assert_eq!(doc.at_path("a[2]/b").unwrap().as_string().unwrap(), "c");
    assert_eq!(doc.get("d e").unwrap().as_string().unwrap(), "f");
    assert!(doc.get("g").unwrap().is_null());
    assert!(doc.get("h").unwrap().is_null());

    let doc = akao_yaml::parse("list: [\n  one,\n  two, # comment\n]\n").unwrap();
    assert_eq!(doc.get("list").unwrap().size(), 2);
    assert_eq!(akao_yaml::parse("[]").unwrap().size(), 0);
    assert!(akao_yaml::parse("{}").unwrap().is_mapping());
}

#[test]
fn test_locations() {
    let doc = akao_yaml::parse("a: 1\nb:\n  c: x\n").unwrap();
    let location = doc.location().unwrap();
    assert_eq!((location.line, location.column), (1, 1));
    assert!(location.file.is_none());

    let a = doc.get("a").unwrap().location().unwrap();
    assert_eq!((a.line, a.column), (1, 4));
    let b = doc.get("b").unwrap().location().unwrap();
    assert_eq!((b.line, b.column), (3, 3));
    let c = doc.at_path("/b/c").unwrap().location().unwrap();
    assert_eq!((c.line, c.column), (3, 6));

    assert!(Yaml::integer(1).location().is_none());
}

#[test]
fn test_comments() {
    let s = "# header\na: 1 # trailing\nb: 2\n";
    let mut loader = YamlLoader::new(ParseOptions::default().with_preserve_comments(true));
    let doc = loader.parse(s).unwrap();
    assert_eq!(doc.comments(), vec!["header"]);
    assert_eq!(doc.get("a").unwrap().comments(), vec!["trailing"]);
    assert!(doc.get("b").unwrap().comments().is_empty());

    let doc = akao_yaml::parse(s).unwrap();
    assert!(doc.comments().is_empty());
    assert!(doc.get("a").unwrap().comments().is_empty());
}

#[test]
fn test_comment_only_document() {
    let mut loader = YamlLoader::new(ParseOptions::default().with_preserve_comments(true));
    let doc = loader.parse("# nothing here
# yet
").unwrap();
    assert_eq!(doc.node_type(), NodeType::Null);
    assert_eq!(doc.comments(), vec!["nothing here", "yet"]);
}

#[test]
fn test_build_tree() {
    let root = Yaml::mapping();
    root.set_mapping("name", Yaml::string("demo")).unwrap();
    root.set_mapping("ratio", Yaml::float(0.5)).unwrap();
    let list = Yaml::sequence();
    list.add_to_sequence(Yaml::boolean(false)).unwrap();
    list.add_to_sequence(Yaml::null()).unwrap();
    root.set_mapping("list", list).unwrap();
    root.set_mapping("name", Yaml::string("renamed")).unwrap();

    assert_eq!(root.keys(), vec!["name", "ratio", "list"]);
    assert_eq!(root.get("name").unwrap().as_string().unwrap(), "renamed");
    assert_eq!(root.get("ratio").unwrap().as_float(), Ok(0.5));
    assert_eq!(root.get("list").get(0).unwrap().as_boolean(), Ok(false));

    assert!(Yaml::string("x").add_to_sequence(Yaml::null()).is_err());
    assert!(Yaml::sequence().set_mapping("k", Yaml::null()).is_err());

    let parsed = akao_yaml::parse("name: renamed\nratio: 0.5\nlist:\n  - false\n  - null\n");
    assert_eq!(parsed.unwrap(), root);
}

#[test]
fn test_shared_mutation_and_deep_clone() {
    let doc = akao_yaml::parse("a: 1\n").unwrap();
    let handle = doc.clone();
    handle.set_mapping("b", Yaml::integer(2)).unwrap();
    assert!(doc.has_key("b"));

    let copy = doc.deep_clone();
    copy.set_mapping("c", Yaml::integer(3)).unwrap();
    assert!(!doc.has_key("c"));
    assert!(!copy.ptr_eq(&doc));
    assert_eq!(copy.get("a").unwrap().location(), doc.get("a").unwrap().location());

    doc.get("a").unwrap().set_data(YamlData::String("changed".into()));
    assert_eq!(doc.get("a").unwrap().as_string().unwrap(), "changed");
    assert_eq!(copy.get("a").unwrap().as_integer(), Ok(1));
}

#[test]
fn test_display() {
    let doc = akao_yaml::parse("a: [1, 2]\nb: {}\nc: text\nd: 1.5\n").unwrap();
    assert_eq!(doc.to_string(), "{mapping with 4 keys}");
    assert_eq!(doc.get("a").unwrap().to_string(), "[sequence with 2 elements]");
    assert_eq!(doc.get("c").unwrap().to_string(), "text");
    assert_eq!(doc.get("d").unwrap().to_string(), "1.5");
    assert_eq!(Yaml::alias("x").to_string(), "*x");
}

#[test]
fn test_parse_file() {
    let path = std::env::temp_dir().join(format!("akao-yaml-basic-{}.yaml", std::process::id()));
    fs::write(&path, "a:\n  b: 1\n---\nc: 2\n").unwrap();

    let doc = akao_yaml::parse_file(&path).unwrap();
    let location = doc.at_path("/a/b").unwrap().location().unwrap();
    assert_eq!(location.file.as_deref(), Some(path.display().to_string().as_str()));
    assert_eq!(location.line, 2);

    let docs = akao_yaml::parse_multi_document_file(&path).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1].get("c").unwrap().as_integer(), Ok(2));

    fs::remove_file(&path).unwrap();
    let err = akao_yaml::parse_file(&path).unwrap_err();
    assert!(matches!(err, akao_yaml::LoadError::Io { .. }));
}
