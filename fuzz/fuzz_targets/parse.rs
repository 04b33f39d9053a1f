#![no_main]

use libfuzzer_sys::fuzz_target;

use akao_yaml::YamlEmitter;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(docs) = akao_yaml::parse_multi_document(s) else {
        return;
    };

    let mut emitted = String::new();
    YamlEmitter::new(&mut emitted).dump_documents(&docs).unwrap();
    let reparsed = akao_yaml::parse_multi_document(&emitted)
        .unwrap_or_else(|e| panic!("emitted output does not parse: {e:#}\n{emitted}"));
    assert_eq!(docs, reparsed, "round trip changed the documents:\n{emitted}");
});
