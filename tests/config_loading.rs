mod common;
use crate::common::init_tracing;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::NamedTempFile;

use coderun::config::{ConfigFile, load_and_validate, load_optional};
use coderun::errors::CoderunError;
use coderun::resolve::Resolver;
use coderun::types::StepPolicy;
use coderun_test_utils::builders::ConfigFileBuilder;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn expect_config_error(contents: &str) -> String {
    let file = write_config(contents);
    match load_and_validate(file.path()) {
        Err(CoderunError::ConfigError(msg)) => msg,
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn demo_config_loads_and_registers_languages() {
    init_tracing();

    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cfg = load_and_validate(manifest.join("demos/Coderun.toml")).unwrap();

    assert_eq!(cfg.timeout(), Some(Duration::from_secs(10)));
    assert_eq!(cfg.max_output_bytes(), Some(50_000));
    assert_eq!(cfg.config.on_step_failure, StepPolicy::Stop);
    assert!(!cfg.config.shell);

    let ids: Vec<&str> = cfg.language.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["ruby", "rust", "typescript"]);

    let resolver = Resolver::with_configured(&cfg.language);
    assert_eq!(
        resolver.resolve("app.ts").unwrap().commands(),
        vec!["tsc app.ts", "node app.js"]
    );
}

#[test]
fn empty_file_gives_defaults() {
    let file = write_config("");
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.timeout(), None);
    assert_eq!(cfg.max_output_bytes(), Some(50_000));
    assert_eq!(cfg.config.on_step_failure, StepPolicy::Stop);
    assert!(cfg.language.is_empty());
}

#[test]
fn zero_output_cap_means_unlimited() {
    let file = write_config("[config]\nmax_output_bytes = 0\n");
    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.max_output_bytes(), None);
}

#[test]
fn continue_policy_is_parsed() {
    let file = write_config("[config]\non_step_failure = \"continue\"\n");
    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.config.on_step_failure, StepPolicy::Continue);
}

#[test]
fn unknown_policy_is_a_toml_error() {
    let file = write_config("[config]\non_step_failure = \"retry\"\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(CoderunError::TomlError(_))
    ));
}

#[test]
fn invalid_timeout_is_rejected() {
    let msg = expect_config_error("[config]\ntimeout = \"soon\"\n");
    assert!(msg.contains("[config].timeout"));

    let msg = expect_config_error("[config]\ntimeout = \"10 parsecs\"\n");
    assert!(msg.contains("unsupported duration unit"));

    let msg = expect_config_error("[config]\ntimeout = \"0s\"\n");
    assert!(msg.contains("greater than zero"));

    let msg = expect_config_error("[config]\ntimeout = \"5124095576030432h\"\n");
    assert!(msg.contains("duration too large"));
}

#[test]
fn extension_must_start_with_dot() {
    let msg = expect_config_error(
        r#"
[language.ruby]
extensions = ["rb"]
run = "ruby {file}"
"#,
    );
    assert!(msg.contains("invalid extension 'rb'"));

    let msg = expect_config_error(
        r#"
[language.dot]
extensions = ["."]
run = "cat {file}"
"#,
    );
    assert!(msg.contains("invalid extension '.'"));
}

#[test]
fn language_needs_an_extension() {
    let msg = expect_config_error(
        r#"
[language.ruby]
extensions = []
run = "ruby {file}"
"#,
    );
    assert!(msg.contains("at least one extension"));
}

#[test]
fn extension_claimed_twice_is_rejected() {
    let msg = expect_config_error(
        r#"
[language.ruby]
extensions = [".rb"]
run = "ruby {file}"

[language.truffle]
extensions = [".rb"]
run = "truffleruby {file}"
"#,
    );
    assert!(msg.contains("claimed by both 'ruby' and 'truffle'"));
}

#[test]
fn unknown_placeholder_is_rejected() {
    let msg = expect_config_error(
        r#"
[language.rust]
extensions = [".rs"]
compile = "rustc {source} -o {stem}"
run = "{exe}"
"#,
    );
    assert!(msg.contains("`compile`"));
    assert!(msg.contains("source"));
}

#[test]
fn empty_run_command_is_rejected() {
    let msg = expect_config_error(
        r#"
[language.noop]
extensions = [".noop"]
run = "   "
"#,
    );
    assert!(msg.contains("empty `run` command"));
}

#[test]
fn missing_run_field_is_a_toml_error() {
    let file = write_config("[language.ruby]\nextensions = [\".rb\"]\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(CoderunError::TomlError(_))
    ));
}

#[test]
fn explicit_missing_config_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    assert!(matches!(
        load_optional(Some(missing.as_path())),
        Err(CoderunError::IoError(_))
    ));
}

#[test]
fn builder_config_matches_parsed_config() {
    let built = ConfigFileBuilder::new()
        .timeout("250ms")
        .language("ruby", &[".rb"], None, "ruby {file}")
        .build();

    let file = write_config(
        r#"
[config]
timeout = "250ms"

[language.ruby]
extensions = [".rb"]
run = "ruby {file}"
"#,
    );
    let parsed = load_and_validate(file.path()).unwrap();

    assert_eq!(built.timeout(), parsed.timeout());
    assert_eq!(built.language, parsed.language);
}

#[test]
fn default_config_has_no_languages() {
    let cfg = ConfigFile::default();
    assert!(cfg.language.is_empty());
    assert_eq!(cfg.timeout(), None);

    let resolver = Resolver::with_configured(&BTreeMap::new());
    assert_eq!(resolver.languages().len(), 6);
}
