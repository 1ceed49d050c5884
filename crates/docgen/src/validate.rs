//! Whole-catalog checks over a merged, snippet-resolved [`Catalog`].
//!
//! Parsing validates one document at a time. The passes here look across
//! documents and tributaries: registry entries, duplicate API examples,
//! colliding navigation titles and snippet references that never resolved.
//! Every finding is appended to the shared [`Diagnostics`]; no pass stops the
//! others.

use crate::catalog::Catalog;
use crate::config::{SDKS_FILE, SERVICES_FILE};
use crate::error::{Diagnostics, ErrorKind, MetadataError};
use crate::metadata::Example;
use crate::snippets::snippet_file_key;
use std::collections::{BTreeMap, BTreeSet};

/// Runs every catalog-level pass over `catalog`.
///
/// - Re-checks each SDK and service registry entry.
/// - Reports `service:action` pairs claimed by more than one API example.
/// - Reports examples sharing a `title_abbrev` within the same services and
///   category.
/// - Reports excerpts whose snippet tags or files were never resolved.
pub fn validate(catalog: &Catalog, diagnostics: &mut Diagnostics) {
    let before = diagnostics.len();

    check_registries(catalog, diagnostics);
    check_duplicate_api_examples(catalog, diagnostics);
    check_duplicate_title_abbrevs(catalog, diagnostics);
    check_snippet_references(catalog, diagnostics);

    tracing::info!(
        examples = catalog.examples.len(),
        findings = diagnostics.len() - before,
        "validated catalog"
    );
}

fn check_registries(catalog: &Catalog, diagnostics: &mut Diagnostics) {
    for (name, sdk) in &catalog.registries.sdks {
        diagnostics.extend(
            sdk.validate()
                .into_iter()
                .map(|e| e.with_file(SDKS_FILE).with_id(name)),
        );
    }
    for (name, service) in &catalog.registries.services {
        diagnostics.extend(
            service
                .validate()
                .into_iter()
                .map(|e| e.with_file(SERVICES_FILE).with_id(name)),
        );
    }
}

/// Groups with two or more examples, as `(key, sorted ids, sorted files)`.
fn duplicates<K>(groups: BTreeMap<K, Vec<&Example>>) -> Vec<(K, Vec<String>, String)> {
    groups
        .into_iter()
        .filter(|(_, examples)| examples.len() > 1)
        .map(|(key, examples)| {
            let ids: BTreeSet<&str> = examples.iter().map(|e| e.id.as_str()).collect();
            let files: BTreeSet<&str> = examples.iter().map(|e| e.file.as_str()).collect();
            let ids = ids.into_iter().map(str::to_string).collect();
            let files = files.into_iter().collect::<Vec<_>>().join(", ");
            (key, ids, files)
        })
        .collect()
}

fn check_duplicate_api_examples(catalog: &Catalog, diagnostics: &mut Diagnostics) {
    let mut groups: BTreeMap<String, Vec<&Example>> = BTreeMap::new();
    for example in catalog.examples.values().filter(|e| e.is_api()) {
        for svc_action in example.svc_actions() {
            groups.entry(svc_action).or_default().push(example);
        }
    }

    for (svc_action, ids, files) in duplicates(groups) {
        let id = ids.join(", ");
        diagnostics.push(
            MetadataError::new(ErrorKind::DuplicateApiExample { svc_action, ids })
                .with_file(files)
                .with_id(id),
        );
    }
}

fn check_duplicate_title_abbrevs(catalog: &Catalog, diagnostics: &mut Diagnostics) {
    let mut groups: BTreeMap<(String, String, String), Vec<&Example>> = BTreeMap::new();
    for example in catalog.examples.values() {
        if example.title_abbrev.is_empty() {
            continue;
        }
        let services = example.services.keys().cloned().collect::<Vec<_>>().join(",");
        let key = (
            example.title_abbrev.clone(),
            services,
            example.category.as_str().to_string(),
        );
        groups.entry(key).or_default().push(example);
    }

    for ((title_abbrev, _, _), ids, files) in duplicates(groups) {
        let id = ids.join(", ");
        diagnostics.push(
            MetadataError::new(ErrorKind::DuplicateTitleAbbrev { title_abbrev, ids })
                .with_file(files)
                .with_id(id),
        );
    }
}

fn check_snippet_references(catalog: &Catalog, diagnostics: &mut Diagnostics) {
    for example in catalog.examples.values() {
        for language in example.languages.values() {
            for version in &language.versions {
                let context = |kind| {
                    MetadataError::new(kind)
                        .with_file(&example.file)
                        .with_id(&example.id)
                        .with_language(&language.name)
                        .with_sdk_version(version.sdk_version)
                };
                for excerpt in &version.excerpts {
                    for tag in &excerpt.snippet_tags {
                        if !catalog.snippets.contains_key(tag) {
                            diagnostics
                                .push(context(ErrorKind::MissingSnippetTag { tag: tag.clone() }));
                        }
                    }
                    for file in &excerpt.snippet_files {
                        if !catalog.snippets.contains_key(&snippet_file_key(file, "")) {
                            diagnostics.push(context(ErrorKind::MissingSnippetFile {
                                file: file.clone(),
                            }));
                        }
                    }
                }
            }
        }
    }
}
