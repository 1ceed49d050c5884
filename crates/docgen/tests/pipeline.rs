//! End-to-end builds over real directory trees.
use docgen::{
    from_json, to_json, BuildConfig, Diagnostic, ErrorKind, PathFs, Pipeline, ValidationConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SERVICES: &str = r#"
s3:
  long: "&S3long;"
  short: "&S3;"
  expanded:
    long: Amazon Simple Storage Service (Amazon S3)
    short: Amazon S3
  sort: S3
  version: s3-2006-03-01
"#;

const SDKS: &str = r#"
Python:
  property: python
  sdk:
    3:
      long: "&PyBoto3long;"
      short: "&PyBoto3;"
"#;

const METADATA: &str = r"
s3_PutObject:
  languages:
    Python:
      versions:
        - sdk_version: 3
          excerpts:
            - description: Upload an object.
              snippet_tags:
                - python.s3.put_object
              snippet_files:
                - python/s3/helpers.py
  services:
    s3: {PutObject}
";

const SOURCE: &str = "\
# Copyright Example Corp. All Rights Reserved.
# SPDX-License-Identifier: Apache-2.0

# snippet-start:[python.s3.put_object]
def put_object(bucket, key):
    bucket.put_object(Key=key)
# snippet-end:[python.s3.put_object]
";

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn tributary() -> TempDir {
    let dir = tempfile::Builder::new().prefix("tributary").tempdir().unwrap();
    let root = dir.path();
    write(root, ".doc_gen/config/services.yaml", SERVICES);
    write(root, ".doc_gen/config/sdks.yaml", SDKS);
    write(root, ".doc_gen/metadata/s3_metadata.yaml", METADATA);
    write(root, "python/s3/put_object.py", SOURCE);
    write(root, "python/s3/helpers.py", "def helper():\n    pass\n");
    dir
}

#[test]
fn builds_a_clean_tributary() {
    let dir = tributary();
    let roots = [dir.path().to_path_buf()];
    let build = Pipeline::new(&PathFs, BuildConfig::default()).build(&roots);

    assert!(build.diagnostics.is_empty(), "{}", build.diagnostics);
    let snippet = &build.catalog.snippets["python.s3.put_object"];
    assert_eq!(
        snippet.code,
        "def put_object(bucket, key):\n    bucket.put_object(Key=key)"
    );
    assert_eq!(snippet.file, "python/s3/put_object.py");
    assert!(build.catalog.snippets.contains_key("python.s3.helpers.py"));
    assert_eq!(build.catalog.stats().examples, 1);
}

#[test]
fn reports_malformed_markers_and_keeps_going() {
    let dir = tributary();
    write(
        dir.path(),
        "python/s3/broken.py",
        "# snippet-start:[a]\n# snippet-start:[b]\n# snippet-end:[a]\n# snippet-end:[b]\n",
    );
    let build = Pipeline::new(&PathFs, BuildConfig::default()).build(&[dir.path().to_path_buf()]);

    let kinds: Vec<_> = build.diagnostics.metadata_errors().map(|e| &e.kind).collect();
    assert!(
        matches!(
            kinds[..],
            [
                ErrorKind::SnippetMismatchedEnd { line: 3, .. },
                ErrorKind::SnippetUnopenedEnd { line: 4, .. }
            ]
        ),
        "{}",
        build.diagnostics
    );
    assert!(build.catalog.snippets.contains_key("python.s3.put_object"));
}

#[test]
fn unreadable_document_does_not_stop_the_build() {
    let dir = tributary();
    write(dir.path(), ".doc_gen/metadata/sqs_metadata.yaml", "- not\n- a mapping\n");
    let build = Pipeline::new(&PathFs, BuildConfig::default()).build(&[dir.path().to_path_buf()]);

    assert_eq!(build.diagnostics.len(), 1);
    assert!(matches!(
        build.diagnostics.iter().next(),
        Some(Diagnostic::Document(_))
    ));
    assert_eq!(build.catalog.examples.len(), 1);
}

#[test]
fn validation_overrides_are_read_per_root() {
    let dir = tributary();
    write(dir.path(), ".doc_gen/validation.yaml", "strict_titles: true\n");
    write(
        dir.path(),
        ".doc_gen/metadata/s3_metadata.yaml",
        &METADATA.replace("s3_PutObject:\n", "s3_PutObject:\n  title: Put an object\n"),
    );
    let build = Pipeline::new(&PathFs, BuildConfig::default()).build(&[dir.path().to_path_buf()]);

    assert!(build.catalog.validation.strict_titles);
    let kinds: Vec<_> = build.diagnostics.metadata_errors().map(|e| &e.kind).collect();
    assert_eq!(kinds, vec![&ErrorKind::ApiCannotHaveTitleFields]);
}

#[test]
fn missing_roots_produce_an_empty_catalog() {
    let roots = [PathBuf::from("/definitely/not/a/tributary")];
    let config = BuildConfig {
        validation: ValidationConfig::strict(),
        config_dir: None,
    };
    let build = Pipeline::new(&PathFs, config).build(&roots);

    assert!(build.catalog.examples.is_empty());
    assert!(build.diagnostics.is_empty(), "{}", build.diagnostics);
}

#[test]
fn export_round_trips_everything_but_the_root() {
    let dir = tributary();
    let build = Pipeline::new(&PathFs, BuildConfig::default()).build(&[dir.path().to_path_buf()]);

    let mut imported = from_json(&to_json(&build.catalog)).unwrap();
    assert_eq!(imported.root, PathBuf::from(dir.path().file_name().unwrap()));
    assert_ne!(imported.root, build.catalog.root);

    imported.root.clone_from(&build.catalog.root);
    assert_eq!(imported, build.catalog);
}
