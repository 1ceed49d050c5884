//! Folding one partial catalog into another.
//!
//! The receiving side always wins. Anything the incoming side would have
//! overwritten is dropped and reported as a [`MergeWarning`], so merging is
//! neither commutative nor associative: callers fold tributaries in priority
//! order, most authoritative first.

use crate::catalog::Catalog;
use crate::entities;
use crate::error::{MergeConflict, MergeWarning};
use crate::metadata::{Example, Language};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

impl Language {
    /// Appends the versions of `other` that `self` does not have.
    ///
    /// Returns the SDK versions both sides define; those are kept from `self`.
    /// Languages with different names are left untouched.
    pub fn merge(&mut self, other: Language) -> Vec<u32> {
        if self.name != other.name {
            tracing::warn!(
                language = %self.name,
                other = %other.name,
                "refusing to merge versions of a different language"
            );
            return Vec::new();
        }

        let mut conflicts = Vec::new();
        for version in other.versions {
            if self.version(version.sdk_version).is_some() {
                conflicts.push(version.sdk_version);
            } else {
                self.versions.push(version);
            }
        }
        conflicts
    }
}

impl Example {
    /// Absorbs another view of the same example.
    ///
    /// Services and languages missing from `self` are adopted. Languages on
    /// both sides are merged version by version. Every scalar field is kept
    /// from `self`.
    pub fn merge(&mut self, other: Example, warnings: &mut Vec<MergeWarning>) {
        if self.id != other.id {
            warnings.push(MergeWarning {
                source: self.file.clone(),
                other_source: other.file.clone(),
                conflict: MergeConflict::MismatchedId {
                    id: self.id.clone(),
                    other_id: other.id,
                },
            });
            return;
        }

        for (service, actions) in other.services {
            self.services.entry(service).or_insert(actions);
        }

        for (name, language) in other.languages {
            match self.languages.entry(name) {
                Entry::Vacant(entry) => {
                    entry.insert(language);
                }
                Entry::Occupied(mut entry) => {
                    for sdk_version in entry.get_mut().merge(language) {
                        warnings.push(MergeWarning {
                            source: self.file.clone(),
                            other_source: other.file.clone(),
                            conflict: MergeConflict::Version {
                                id: self.id.clone(),
                                language: entry.key().clone(),
                                sdk_version,
                            },
                        });
                    }
                }
            }
        }
    }
}

/// Adds the entries of `other` that `table` lacks.
///
/// Returns every key present on both sides; `other`'s value for it is dropped.
fn merge_table<V>(
    table: &mut BTreeMap<String, V>,
    other: BTreeMap<String, V>,
) -> Vec<String> {
    let mut conflicts = Vec::new();
    for (key, value) in other {
        match table.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(entry) => conflicts.push(entry.key().clone()),
        }
    }
    conflicts
}

impl Catalog {
    /// Folds `other` into `self`, returning every conflict.
    ///
    /// SDKs, services, entities and snippets are unioned; a key present on
    /// both sides keeps `self`'s value and is reported, except for the static
    /// entities every catalog starts with. Cross-content blocks
    /// and snippet file references are plain unions. Examples are merged by
    /// id with [`Example::merge`].
    pub fn merge(&mut self, other: Catalog) -> Vec<MergeWarning> {
        let source = self.root.display().to_string();
        let other_source = other.root.display().to_string();
        let warning = |conflict| MergeWarning {
            source: source.clone(),
            other_source: other_source.clone(),
            conflict,
        };

        let mut warnings = Vec::new();
        warnings.extend(
            merge_table(&mut self.registries.sdks, other.registries.sdks)
                .into_iter()
                .map(|name| warning(MergeConflict::Sdk { name })),
        );
        warnings.extend(
            merge_table(&mut self.registries.services, other.registries.services)
                .into_iter()
                .map(|name| warning(MergeConflict::Service { name })),
        );
        for (entity, expansion) in other.registries.entities {
            if !self.registries.entities.insert_if_absent(entity.clone(), expansion)
                && !entities::is_static(&entity)
            {
                warnings.push(warning(MergeConflict::Entity { entity }));
            }
        }
        warnings.extend(
            merge_table(&mut self.snippets, other.snippets)
                .into_iter()
                .map(|id| warning(MergeConflict::Snippet { id })),
        );

        self.snippet_files.extend(other.snippet_files);
        self.cross_blocks.extend(other.cross_blocks);
        self.extend_examples(other.examples.into_values(), &mut warnings);

        for conflict in &warnings {
            tracing::warn!(warning = %conflict, "merge conflict");
        }
        warnings
    }

    /// Adds examples, merging any whose id is already present.
    pub fn extend_examples(
        &mut self,
        examples: impl IntoIterator<Item = Example>,
        warnings: &mut Vec<MergeWarning>,
    ) {
        for example in examples {
            match self.examples.entry(example.id.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(example);
                }
                Entry::Occupied(mut entry) => entry.get_mut().merge(example, warnings),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Version;
    use crate::registry::{Registries, Sdk, Service, ServiceExpanded};
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn version(sdk_version: u32, block: &str) -> Version {
        Version {
            sdk_version,
            block_content: Some(block.to_string()),
            ..Version::default()
        }
    }

    fn language(name: &str, versions: Vec<Version>) -> Language {
        Language {
            name: name.to_string(),
            property: name.to_lowercase(),
            versions,
        }
    }

    fn example(id: &str, file: &str, title: &str, languages: Vec<Language>) -> Example {
        Example {
            id: id.to_string(),
            file: file.to_string(),
            title: title.to_string(),
            languages: languages.into_iter().map(|l| (l.name.clone(), l)).collect(),
            ..Example::default()
        }
    }

    fn catalog(root: &str, examples: Vec<Example>) -> Catalog {
        let mut catalog = Catalog::empty();
        catalog.root = PathBuf::from(root);
        catalog.examples = examples.into_iter().map(|e| (e.id.clone(), e)).collect();
        catalog
    }

    #[test]
    fn test_language_merge_appends_new_versions() {
        let mut java = language("Java", vec![version(1, "v1.xml")]);
        let conflicts = java.merge(language(
            "Java",
            vec![version(1, "other.xml"), version(2, "v2.xml")],
        ));

        assert_eq!(conflicts, vec![1]);
        assert_eq!(java.versions, vec![version(1, "v1.xml"), version(2, "v2.xml")]);
    }

    #[test]
    fn test_language_merge_ignores_other_language() {
        let mut java = language("Java", vec![version(1, "v1.xml")]);
        assert!(java.merge(language("Kotlin", vec![version(2, "k.xml")])).is_empty());
        assert_eq!(java.versions.len(), 1);
    }

    #[test]
    fn test_example_merge_keeps_self_fields() {
        let mut mine = example(
            "s3_PutObject",
            "a.yaml",
            "Mine",
            vec![language("Java", vec![version(2, "j.xml")])],
        );
        mine.services.insert("s3".into(), BTreeSet::from(["PutObject".to_string()]));

        let mut theirs = example(
            "s3_PutObject",
            "b.yaml",
            "Theirs",
            vec![
                language("Java", vec![version(2, "other.xml")]),
                language("Rust", vec![version(1, "r.xml")]),
            ],
        );
        theirs.services.insert("s3".into(), BTreeSet::from(["GetObject".to_string()]));
        theirs.services.insert("sqs".into(), BTreeSet::new());

        let mut warnings = Vec::new();
        mine.merge(theirs, &mut warnings);

        assert_eq!(mine.title, "Mine");
        assert_eq!(mine.services["s3"], BTreeSet::from(["PutObject".to_string()]));
        assert!(mine.services.contains_key("sqs"));
        assert_eq!(mine.languages["Java"].versions, vec![version(2, "j.xml")]);
        assert!(mine.languages.contains_key("Rust"));
        assert_eq!(
            warnings,
            vec![MergeWarning {
                source: "a.yaml".into(),
                other_source: "b.yaml".into(),
                conflict: MergeConflict::Version {
                    id: "s3_PutObject".into(),
                    language: "Java".into(),
                    sdk_version: 2,
                },
            }]
        );
    }

    #[test]
    fn test_example_merge_mismatched_id() {
        let mut a = example("s3_PutObject", "a.yaml", "", vec![]);
        let b = example("s3_GetObject", "b.yaml", "", vec![language("Java", vec![])]);
        let mut warnings = Vec::new();
        a.merge(b, &mut warnings);

        assert!(a.languages.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].is_error());
    }

    #[test]
    fn test_merge_is_not_associative() {
        let a = || catalog("/a", vec![example("sns_Publish", "a.yaml", "Title A", vec![])]);
        let b = || catalog("/b", vec![example("sns_Publish", "b.yaml", "Title B", vec![])]);

        let mut ab = a();
        ab.merge(b());
        let mut ba = b();
        ba.merge(a());

        assert_eq!(ab.examples["sns_Publish"].title, "Title A");
        assert_eq!(ba.examples["sns_Publish"].title, "Title B");
        assert_ne!(ab.examples, ba.examples);
    }

    #[test]
    fn test_catalog_merge_registries() {
        let sdk = |guide: &str| Sdk {
            name: "a".into(),
            property: "a_prop".into(),
            guide: Some(guide.into()),
            versions: vec![],
        };

        let mut a = catalog("/a", vec![]);
        a.registries.sdks.insert("a".into(), sdk("guide_a"));
        let mut b = catalog("/b", vec![]);
        b.registries.sdks.insert("a".into(), sdk("guide_other"));
        b.registries.sdks.insert("b".into(), sdk("guide_b"));
        b.cross_blocks.insert("block.xml".into());

        let warnings = a.merge(b);

        assert_eq!(a.registries.sdks.len(), 2);
        assert_eq!(a.registries.sdks["a"].guide.as_deref(), Some("guide_a"));
        assert!(a.cross_blocks.contains("block.xml"));
        assert_eq!(
            warnings,
            vec![MergeWarning {
                source: "/a".into(),
                other_source: "/b".into(),
                conflict: MergeConflict::Sdk { name: "a".into() },
            }]
        );
    }

    #[test]
    fn test_shared_registry_entries_conflict() {
        let mut a = catalog("/a", vec![]);
        a.registries = Registries::new(
            BTreeMap::from([("Go".to_string(), Sdk::default())]),
            BTreeMap::from([(
                "sns".to_string(),
                Service {
                    short: "&SNS;".into(),
                    expanded: ServiceExpanded {
                        long: String::new(),
                        short: "Amazon SNS".into(),
                    },
                    ..Service::default()
                },
            )]),
        );
        let b = a.clone_registries();

        let conflicts: Vec<_> = a.merge(b).into_iter().map(|w| w.conflict).collect();

        assert_eq!(
            conflicts,
            vec![
                MergeConflict::Sdk { name: "Go".into() },
                MergeConflict::Service { name: "sns".into() },
                MergeConflict::Entity {
                    entity: "&SNS;".into()
                },
            ]
        );
        assert_eq!(a.registries.entities.get("&SNS;"), Some("Amazon SNS"));
    }

    #[test]
    fn test_static_entities_do_not_conflict() {
        let mut a = catalog("/a", vec![]);
        assert!(a.merge(catalog("/b", vec![])).is_empty());
    }
}
