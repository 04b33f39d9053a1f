use std::process::ExitCode;

use akao_yaml::{ParseError, ParseOptions, YamlLoader};
use akao_yaml_validator::{ValidationLevel, YamlValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

const USAGE: &str = "Usage: check [--strict] [--single] [--akao] [--schema <schema.yaml>] <file.yaml>...

Parse each file and report errors and warnings. Documents are validated when --akao or
--schema is given.

  --strict    parse and validate in strict mode
  --single    reject streams with more than one document
  --akao      check Akao philosophy, rule and ruleset documents against their schema
  --schema    check every document against the rules of a schema file";

/// Parse and validate YAML files, printing diagnostics.
fn main() -> ExitCode {
    let args: Vec<_> = std::env::args().skip(1).collect();
    let options = match Options::from_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    let validator = match options.validator() {
        Ok(validator) => validator,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            return ExitCode::from(2);
        }
    };

    let mut failed = false;
    for file in &options.files {
        failed |= !check_file(file, &options, validator.as_ref());
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[derive(Debug, Default)]
struct Options {
    strict: bool,
    single: bool,
    akao: bool,
    schema: Option<String>,
    files: Vec<String>,
}

impl Options {
    fn from_args(args: &[String]) -> Result<Options, String> {
        let mut options = Options::default();
        let mut args = args.iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--strict" => options.strict = true,
                "--single" => options.single = true,
                "--akao" => options.akao = true,
                "--schema" => {
                    let schema = args.next().ok_or("--schema requires a file")?;
                    options.schema = Some(schema.clone());
                }
                "-h" | "--help" => return Err("YAML checker".to_string()),
                flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
                file => options.files.push(file.to_string()),
            }
        }
        if options.files.is_empty() {
            return Err("no file given".to_string());
        }
        Ok(options)
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions::default()
            .with_strict_mode(self.strict)
            .with_allow_multi_document(!self.single)
    }

    /// Build the validator the documents are checked with, if any check was requested.
    fn validator(&self) -> Result<Option<YamlValidator>, SchemaDiagnostic> {
        if !self.akao && self.schema.is_none() {
            return Ok(None);
        }
        let level = match (self.akao, self.strict) {
            (true, _) => ValidationLevel::AkaoSpec,
            (false, true) => ValidationLevel::Strict,
            (false, false) => ValidationLevel::Standard,
        };
        let mut validator = YamlValidator::new(level);
        if let Some(schema) = &self.schema {
            validator
                .load_schema(schema)
                .map_err(|err| SchemaDiagnostic {
                    file: schema.clone(),
                    message: err.to_string(),
                })?;
        }
        Ok(Some(validator))
    }
}

/// Check one file. Return whether it is free of errors.
fn check_file(file: &str, options: &Options, validator: Option<&YamlValidator>) -> bool {
    let contents = match std::fs::read_to_string(file) {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!("{file}: cannot read: {err}");
            return false;
        }
    };

    let mut loader = YamlLoader::new(options.parse_options());
    let results = match loader.parse_documents(&contents) {
        Ok(results) => results,
        Err(err) => {
            report_parse_error(file, &contents, err);
            return false;
        }
    };
    for warning in loader.warnings() {
        eprintln!("{file}: warning: {warning}");
    }

    let mut ok = true;
    for (index, result) in results.into_iter().enumerate() {
        let doc = match result {
            Ok(doc) => doc,
            Err(err) => {
                report_parse_error(file, &contents, err);
                ok = false;
                continue;
            }
        };
        let Some(validator) = validator else {
            continue;
        };
        let validation = validator.validate(&doc);
        for finding in validation.findings() {
            if finding.line > 0 {
                eprintln!(
                    "{file}:{}:{}: {}: {} (at {})",
                    finding.line, finding.column, finding.severity, finding.message, finding.path
                );
            } else {
                eprintln!(
                    "{file}: document {index}: {}: {} (at {})",
                    finding.severity, finding.message, finding.path
                );
            }
        }
        ok &= validation.is_valid;
    }
    if ok {
        println!("{file}: ok");
    }
    ok
}

fn report_parse_error(file: &str, contents: &str, err: ParseError) {
    let diagnostic = ParseDiagnostic::new(file, contents, &err);
    eprintln!("{:?}", miette::Report::new(diagnostic));
}

/// A [`ParseError`] pointing into the file it was raised for.
#[derive(Error, Debug, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(akao_yaml::parse))]
struct ParseDiagnostic {
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("{kind} error here")]
    span: SourceSpan,
    kind: String,
    #[help]
    help: Option<String>,
}

impl ParseDiagnostic {
    fn new(file: &str, contents: &str, err: &ParseError) -> Self {
        let index = err.marker().index().min(contents.len());
        let len = contents[index..].chars().next().map_or(0, char::len_utf8);
        let message = match err.document() {
            Some(document) => format!("{} (document {document})", err.message()),
            None => err.message().to_string(),
        };
        ParseDiagnostic {
            message,
            src: NamedSource::new(file, contents.to_string()),
            span: (index, len).into(),
            kind: err.error_type().to_string(),
            help: err.suggestion().map(str::to_string),
        }
    }
}

/// A schema file that could not be loaded.
#[derive(Error, Debug, Diagnostic)]
#[error("cannot load schema {file}: {message}")]
#[diagnostic(code(akao_yaml::schema))]
struct SchemaDiagnostic {
    file: String,
    message: String,
}

#[cfg(test)]
mod test {
    use super::{Options, ParseDiagnostic};

    fn args(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_options() {
        let options =
            Options::from_args(&args(&["--strict", "--schema", "s.yaml", "a.yaml"])).unwrap();
        assert!(options.strict);
        assert_eq!(options.schema.as_deref(), Some("s.yaml"));
        assert_eq!(options.files, vec!["a.yaml"]);
        assert!(options.parse_options().strict_mode);

        assert!(Options::from_args(&args(&[])).is_err());
        assert!(Options::from_args(&args(&["--schema"])).is_err());
        assert!(Options::from_args(&args(&["--bogus", "a.yaml"])).is_err());
    }

    #[test]
    fn test_diagnostic_span() {
        let contents = "a: [1, 2\n";
        let err = akao_yaml::parse(contents).unwrap_err();
        let diagnostic = ParseDiagnostic::new("a.yaml", contents, &err);
        assert_eq!(diagnostic.span.offset(), 3);
        assert_eq!(diagnostic.span.len(), 1);
        assert_eq!(diagnostic.kind, "syntax");
        assert_eq!(diagnostic.message, "unterminated flow sequence");
        assert!(diagnostic.help.is_some());
    }
}
