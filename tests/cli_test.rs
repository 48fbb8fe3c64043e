//! End-to-end tests of the command handlers (no subprocess).

use clap::Parser;
use tempfile::TempDir;

use rbtrace::cli::{execute, Cli, CliError};
use rbtrace::exitcode;
use rbtrace::util::testing;

fn run(args: &[&str]) -> Result<(), CliError> {
    let cli = Cli::try_parse_from(args.iter().copied()).expect("parse args");
    execute(&cli)
}

#[test]
fn given_ops_when_running_with_export_then_file_written_and_convertible() {
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    let dir = temp.path().to_str().unwrap();
    let txt = temp.path().join("out.txt");
    let xml = temp.path().join("out.xml");

    run(&[
        "rbtrace",
        "-C",
        dir,
        "run",
        "--export",
        txt.to_str().unwrap(),
        "i:5",
        "i:3",
        "i:8",
        "f:3",
        "d:4",
    ])
    .unwrap();
    assert_eq!(
        std::fs::read_to_string(&txt).unwrap(),
        "N\n5 B 3 R NIL NIL 8 R NIL NIL"
    );

    run(&["rbtrace", "-C", dir, "convert", txt.to_str().unwrap(), xml.to_str().unwrap()]).unwrap();
    run(&["rbtrace", "-C", dir, "validate", xml.to_str().unwrap()]).unwrap();
}

#[test]
fn given_invalid_tree_file_when_validating_then_data_error() {
    let temp = TempDir::new().unwrap();
    let bad = temp.path().join("bad.txt");
    std::fs::write(&bad, "N 5 R NIL NIL").unwrap();

    let err = run(&[
        "rbtrace",
        "-C",
        temp.path().to_str().unwrap(),
        "validate",
        bad.to_str().unwrap(),
    ])
    .unwrap_err();
    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_local_config_disabling_validation_when_showing_then_invalid_tree_loads() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(".rbtrace.toml"), "validation = false\n").unwrap();
    let bad = temp.path().join("bad.json");
    std::fs::write(
        &bad,
        r#"{"dataType":"N","tree":[{"value":1,"color":"R","left":null,"right":null}]}"#,
    )
    .unwrap();

    run(&[
        "rbtrace",
        "-C",
        temp.path().to_str().unwrap(),
        "show",
        bad.to_str().unwrap(),
    ])
    .unwrap();
}

#[test]
fn given_unknown_extension_when_exporting_then_usage_error() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out.csv");
    let err = run(&[
        "rbtrace",
        "-C",
        temp.path().to_str().unwrap(),
        "run",
        "-e",
        out.to_str().unwrap(),
        "i:1",
    ])
    .unwrap_err();
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_deep_unvalidated_chain_when_showing_then_completes() {
    let temp = TempDir::new().unwrap();
    let deep = temp.path().join("deep.txt");
    std::fs::write(&deep, format!("N {}", "1 B ".repeat(300_000))).unwrap();

    run(&[
        "rbtrace",
        "-C",
        temp.path().to_str().unwrap(),
        "show",
        "--no-validate",
        deep.to_str().unwrap(),
    ])
    .unwrap();
}
