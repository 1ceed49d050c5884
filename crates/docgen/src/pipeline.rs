//! The ordered, multi-tributary build.

use crate::catalog::Catalog;
use crate::config::BuildConfig;
use crate::error::Diagnostics;
use crate::fs::Fs;
use std::path::PathBuf;

/// The outcome of a build: the catalog and everything found along the way.
#[derive(Debug)]
pub struct Build {
    /// The merged, snippet-resolved catalog.
    pub catalog: Catalog,
    /// Every parse error, merge warning, document failure and validation
    /// finding, in the order they were produced.
    pub diagnostics: Diagnostics,
}

/// Builds one catalog out of several tributary roots.
#[derive(Debug)]
pub struct Pipeline<'a, F: Fs + ?Sized> {
    fs: &'a F,
    config: BuildConfig,
}

impl<'a, F: Fs + ?Sized> Pipeline<'a, F> {
    /// A pipeline reading through `fs` with `config`.
    #[must_use]
    pub fn new(fs: &'a F, config: BuildConfig) -> Self {
        Self { fs, config }
    }

    /// Loads, merges, resolves and validates `roots`.
    ///
    /// `roots` is in priority order. The first root receives every later one,
    /// so its values win each conflict. The order is never changed.
    #[must_use]
    pub fn build(&self, roots: &[PathBuf]) -> Build {
        let mut diagnostics = Diagnostics::new();

        let mut tributaries = roots
            .iter()
            .map(|root| Catalog::for_root(self.fs, root, &self.config, &mut diagnostics))
            .collect::<Vec<_>>()
            .into_iter();
        let mut catalog = tributaries.next().unwrap_or_else(Catalog::empty);
        for tributary in tributaries {
            diagnostics.extend(catalog.merge(tributary));
        }

        catalog.collect_snippets(self.fs, roots, &mut diagnostics);
        catalog.validate(&mut diagnostics);

        tracing::info!(
            roots = roots.len(),
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            "build finished"
        );
        Build {
            catalog,
            diagnostics,
        }
    }
}
