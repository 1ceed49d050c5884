//! Tests for the `docgen` binary.
#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const SERVICES: &str = r#"
sqs:
  long: "&SQSlong;"
  short: "&SQS;"
  expanded:
    long: Amazon Simple Queue Service (Amazon SQS)
    short: Amazon SQS
  sort: SQS
  version: sqs-2012-11-05
"#;

const METADATA: &str = r"
sqs_SendMessage:
  languages:
    Go:
      versions:
        - sdk_version: 2
          block_content: sqs_SendMessage.xml
  services:
    sqs: {SendMessage}
";

fn tributary(metadata: &str) -> tempfile::TempDir {
    let dir = tempfile::Builder::new().prefix("tributary").tempdir().unwrap();
    let doc_gen = dir.path().join(".doc_gen");
    for sub in ["config", "metadata", "cross-content"] {
        fs::create_dir_all(doc_gen.join(sub)).unwrap();
    }
    fs::write(doc_gen.join("config/services.yaml"), SERVICES).unwrap();
    fs::write(
        doc_gen.join("config/sdks.yaml"),
        "Go:\n  property: go\n  sdk:\n    2:\n      long: \"&Go2long;\"\n      short: \"&Go2;\"\n",
    )
    .unwrap();
    fs::write(doc_gen.join("metadata/sqs_metadata.yaml"), metadata).unwrap();
    fs::write(doc_gen.join("cross-content/sqs_SendMessage.xml"), "<para/>").unwrap();
    dir
}

fn docgen(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docgen").unwrap();
    cmd.arg(root);
    cmd
}

#[test]
fn clean_build_prints_stats() {
    let dir = tributary(METADATA);
    docgen(dir.path())
        .arg("--strict")
        .assert()
        .success()
        .stdout(predicate::str::contains("examples: 1"))
        .stdout(predicate::str::contains("0 errors"));
}

#[test]
fn strict_build_fails_on_errors() {
    let dir = tributary(&METADATA.replace("Go:", "Cobol:"));
    docgen(dir.path())
        .arg("--strict")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Cobol"));
}

#[test]
fn lenient_build_reports_but_succeeds() {
    let dir = tributary(&METADATA.replace("Go:", "Cobol:"));
    docgen(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 errors"));
}

#[test]
fn export_writes_json() {
    let dir = tributary(METADATA);
    let out = dir.path().join("catalog.json");
    docgen(dir.path())
        .arg("--export")
        .arg(&out)
        .assert()
        .success();

    let json = fs::read_to_string(&out).unwrap();
    let catalog = docgen::from_json(&json).unwrap();
    assert!(catalog.examples.contains_key("sqs_SendMessage"));
}
