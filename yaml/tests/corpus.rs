use std::fs::{self, DirEntry};

use libtest_mimic::{Arguments, Failed, Trial};

use akao_yaml::{SafelyIndex, Yaml, YamlEmitter};

type Result<T, E = Box<dyn std::error::Error>> = std::result::Result<T, E>;

/// A case read from `tests/corpus/*.yaml`.
///
/// Each file holds a sequence of mappings. `yaml` is the input. A case either expects an error
/// (`fail: true`, optionally with `message`, `line` and `column`) or expects the input to parse,
/// in which case `emit` (the emitted stream) and `documents` (the number of documents) are
/// checked when present.
#[derive(Debug, Clone)]
struct CorpusCase {
    yaml: String,
    emit: Option<String>,
    documents: Option<usize>,
    fail: bool,
    message: Option<String>,
    position: Option<(usize, usize)>,
}

fn main() -> Result<()> {
    let arguments = Arguments::from_args();
    let mut entries = fs::read_dir("tests/corpus")?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(DirEntry::file_name);

    let mut trials = vec![];
    for entry in &entries {
        trials.extend(load_cases_from_file(entry)?);
    }
    libtest_mimic::run(&arguments, trials).exit();
}

fn run_case(case: &CorpusCase) -> Result<(), Failed> {
    let result = akao_yaml::parse_multi_document(&case.yaml);
    let outcome = match (result, case.fail) {
        (Ok(docs), true) => Err(format!("no error when expected, got {docs:?}")),
        (Err(err), true) => check_error(case, &err),
        (Err(err), false) => Err(format!("unexpected error: {err:#}")),
        (Ok(docs), false) => check_documents(case, &docs),
    };
    outcome.map_err(|msg| format!("{msg}\n### Input:\n{}### End", case.yaml).into())
}

fn check_error(case: &CorpusCase, err: &akao_yaml::ParseError) -> Result<(), String> {
    if let Some(message) = &case.message {
        if err.message() != message.as_str() {
            return Err(format!("expected error '{message}', got '{}'", err.message()));
        }
    }
    if let Some(position) = case.position {
        let actual = (err.line(), err.column());
        if actual != position {
            return Err(format!("expected error at {position:?}, got it at {actual:?}"));
        }
    }
    Ok(())
}

fn check_documents(case: &CorpusCase, docs: &[Yaml]) -> Result<(), String> {
    if let Some(count) = case.documents {
        if docs.len() != count {
            return Err(format!("expected {count} documents, got {}", docs.len()));
        }
    }
    let Some(expected) = &case.emit else {
        return Ok(());
    };
    let mut emitted = String::new();
    let mut emitter = YamlEmitter::new(&mut emitted);
    let dumped = match docs {
        [doc] => emitter.dump(doc),
        _ => emitter.dump_documents(docs),
    };
    dumped.map_err(|e| format!("emitter failed: {e}"))?;
    if &emitted != expected {
        return Err(format!(
            "emitted output differs\n### Expected:\n{expected}### Actual:\n{emitted}### End"
        ));
    }
    let reparsed = akao_yaml::parse_multi_document(&emitted)
        .map_err(|e| format!("emitted output does not parse: {e:#}"))?;
    if reparsed != docs {
        return Err("emitted output does not parse back to the same documents".to_string());
    }
    Ok(())
}

fn load_cases_from_file(entry: &DirEntry) -> Result<Vec<Trial>> {
    let file_name = entry.file_name().to_string_lossy().to_string();
    let Some(group) = file_name.strip_suffix(".yaml") else {
        return Ok(vec![]);
    };
    let cases = akao_yaml::parse(&fs::read_to_string(entry.path())?)
        .map_err(|e| format!("while reading {file_name}: {e}"))?;
    let cases = cases
        .as_sequence()
        .map_err(|e| format!("{file_name}: no case list found: {e}"))?;

    let mut trials = vec![];
    for (idx, data) in cases.iter().enumerate() {
        let name = data
            .get("name")
            .and_then(|name| name.as_string().ok())
            .map_or_else(|| format!("{group}-{idx:02}"), |name| format!("{group}::{name}"));
        if data.has_key("skip") {
            trials.push(Trial::test(name, || Ok(())).with_ignored_flag(true));
            continue;
        }
        let case = read_case(data).map_err(|e| format!("{name}: {e}"))?;
        trials.push(Trial::test(name, move || run_case(&case)));
    }
    Ok(trials)
}

fn read_case(data: &Yaml) -> Result<CorpusCase> {
    let string = |key: &str| data.get(key).and_then(|v| v.as_string().ok());
    let number = |key: &str| {
        data.get(key)
            .and_then(|v| v.as_integer().ok())
            .and_then(|v| usize::try_from(v).ok())
    };
    let yaml = string("yaml").ok_or("missing 'yaml' field")?;
    let position = match (number("line"), number("column")) {
        (Some(line), Some(column)) => Some((line, column)),
        (None, None) => None,
        _ => return Err("'line' and 'column' must be given together".into()),
    };
    Ok(CorpusCase {
        yaml,
        emit: string("emit"),
        documents: number("documents"),
        fail: data
            .get("fail")
            .is_some_and(|v| v.as_boolean_or_default(false)),
        message: string("message"),
        position,
    })
}
