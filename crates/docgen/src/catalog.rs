//! The canonical catalog and the per-root loader that produces one.

use crate::config::{
    BuildConfig, ValidationConfig, CROSS_CONTENT_DIR, DOC_GEN_DIR, METADATA_DIR, METADATA_SUFFIX,
};
use crate::entities::Expansion;
use crate::error::{Diagnostics, MergeConflict, MergeWarning};
use crate::fs::Fs;
use crate::metadata::parse::parse;
use crate::metadata::Example;
use crate::registry::Registries;
use crate::snippets::{self, Snippet};
use crate::yaml;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Every example, registry and snippet known to one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Root the catalog was loaded from.
    pub root: PathBuf,
    /// Settings the examples were validated with.
    pub validation: ValidationConfig,
    /// SDK, service and entity tables.
    pub registries: Registries,
    /// Resolved snippets, by tag or by whole-file key.
    pub snippets: BTreeMap<String, Snippet>,
    /// Paths referenced by `snippet_files` excerpts.
    pub snippet_files: BTreeSet<String>,
    /// Examples by id.
    pub examples: BTreeMap<String, Example>,
    /// Names of the cross-content blocks available to `block_content`.
    pub cross_blocks: BTreeSet<String>,
}

/// Size summary of a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of SDKs.
    pub sdks: usize,
    /// Number of services.
    pub services: usize,
    /// Number of examples.
    pub examples: usize,
    /// Number of language versions across all examples.
    pub versions: usize,
    /// Number of resolved snippets, tagged and whole-file.
    pub snippets: usize,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "sdks: {}, services: {}, examples: {}, versions: {}, snippets: {}",
            self.sdks, self.services, self.examples, self.versions, self.snippets
        )
    }
}

impl Catalog {
    /// A catalog with no root, no examples and only the static entities.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            registries: Registries::empty(),
            ..Self::default()
        }
    }

    /// A catalog sharing this one's root and registries, with nothing else.
    #[must_use]
    pub fn clone_registries(&self) -> Self {
        Self {
            root: self.root.clone(),
            validation: self.validation,
            registries: self.registries.clone(),
            ..Self::default()
        }
    }

    /// Loads one tributary.
    ///
    /// Reads the registries, the cross-content block names and every
    /// `*_metadata.yaml` document below `<root>/.doc_gen`. Documents that
    /// cannot be parsed are skipped; every finding lands in `diagnostics`.
    pub fn for_root<F: Fs + ?Sized>(
        fs: &F,
        root: &Path,
        config: &BuildConfig,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let doc_gen = root.join(DOC_GEN_DIR);
        let validation = config.validation.overlay(fs, root);
        let registries = Registries::load(fs, &config.registry_dir(root), diagnostics);

        let cross_blocks = fs
            .list_files(&doc_gen.join(CROSS_CONTENT_DIR))
            .iter()
            .filter(|path| path.extension().is_some_and(|ext| ext == "xml"))
            .map(|path| yaml::file_name(path))
            .collect();

        let mut catalog = Self {
            root: root.to_path_buf(),
            validation,
            registries,
            cross_blocks,
            ..Self::default()
        };

        let documents = fs
            .list_files(&doc_gen.join(METADATA_DIR))
            .into_iter()
            .filter(|path| yaml::file_name(path).ends_with(METADATA_SUFFIX));
        for path in documents {
            catalog.load_document(fs, &path, diagnostics);
        }

        tracing::info!(
            root = %root.display(),
            examples = catalog.examples.len(),
            "loaded tributary"
        );
        catalog
    }

    fn load_document<F: Fs + ?Sized>(&mut self, fs: &F, path: &Path, diagnostics: &mut Diagnostics) {
        let file = yaml::file_name(path);
        let mapping = match yaml::read_mapping(fs, path) {
            Ok(mapping) => mapping,
            Err(err) => {
                tracing::warn!(file = %file, error = %err, "skipping metadata document");
                diagnostics.push(err);
                return;
            }
        };

        let (examples, errors) = parse(
            &file,
            &mapping,
            &self.registries,
            &self.cross_blocks,
            self.validation,
        );
        tracing::debug!(file = %file, examples = examples.len(), errors = errors.len(), "parsed metadata");
        diagnostics.extend(errors);

        for example in &examples {
            for excerpt in example.excerpts() {
                self.snippet_files.extend(excerpt.snippet_files.iter().cloned());
            }
        }

        let mut warnings = Vec::new();
        self.extend_examples(examples, &mut warnings);
        diagnostics.extend(warnings);
    }

    /// Resolves every snippet reference against `roots`, in order.
    ///
    /// Tagged regions are collected from every root; a tag already resolved
    /// from an earlier root keeps its first definition, and every later root
    /// defining it is reported as a [`MergeConflict::Snippet`]. Whole-file references
    /// resolve against the first root holding the file.
    pub fn collect_snippets<F: Fs + ?Sized>(
        &mut self,
        fs: &F,
        roots: &[PathBuf],
        diagnostics: &mut Diagnostics,
    ) {
        for root in roots {
            let (found, errors) = snippets::collect_snippets(fs, root, "");
            diagnostics.extend(errors);
            for (id, snippet) in found {
                match self.snippets.entry(id) {
                    Entry::Vacant(entry) => {
                        entry.insert(snippet);
                    }
                    Entry::Occupied(entry) => {
                        diagnostics.push(MergeWarning {
                            source: self.root.display().to_string(),
                            other_source: root.display().to_string(),
                            conflict: MergeConflict::Snippet {
                                id: entry.key().clone(),
                            },
                        });
                    }
                }
            }
        }

        let (files, errors) = snippets::collect_snippet_files(fs, self.examples.values(), roots, "");
        diagnostics.extend(errors);
        for (key, snippet) in files {
            self.snippets.entry(key).or_insert(snippet);
        }

        tracing::info!(snippets = self.snippets.len(), "resolved snippets");
    }

    /// Runs the whole-catalog checks. See [`validate`](crate::validate::validate).
    pub fn validate(&self, diagnostics: &mut Diagnostics) {
        crate::validate::validate(self, diagnostics);
    }

    /// Counts the catalog's contents.
    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            sdks: self.registries.sdks.len(),
            services: self.registries.services.len(),
            examples: self.examples.len(),
            versions: self
                .examples
                .values()
                .flat_map(|example| example.languages.values())
                .map(|language| language.versions.len())
                .sum(),
            snippets: self.snippets.len(),
        }
    }

    /// Every `<sdk>:<version>` pair the SDK registry knows.
    #[must_use]
    pub fn languages(&self) -> BTreeSet<String> {
        self.registries
            .sdks
            .iter()
            .flat_map(|(name, sdk)| {
                sdk.versions
                    .iter()
                    .map(move |version| format!("{name}:{}", version.version))
            })
            .collect()
    }

    /// Expands the entities in `text` with this catalog's dictionary.
    #[must_use]
    pub fn expand(&self, text: &str) -> Expansion {
        self.registries.entities.expand(text)
    }
}
