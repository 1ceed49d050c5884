//! Build and validation settings.

use crate::fs::Fs;
use crate::yaml;
use std::path::{Path, PathBuf};

/// Directory, relative to a tributary root, holding all catalog inputs.
pub const DOC_GEN_DIR: &str = ".doc_gen";
/// Subdirectory of [`DOC_GEN_DIR`] holding metadata documents.
pub const METADATA_DIR: &str = "metadata";
/// Subdirectory of [`DOC_GEN_DIR`] holding cross-content blocks.
pub const CROSS_CONTENT_DIR: &str = "cross-content";
/// Subdirectory of [`DOC_GEN_DIR`] holding the registry files.
pub const CONFIG_DIR: &str = "config";
/// Suffix every metadata document name ends with.
pub const METADATA_SUFFIX: &str = "_metadata.yaml";
/// The SDK registry file.
pub const SDKS_FILE: &str = "sdks.yaml";
/// The services registry file.
pub const SERVICES_FILE: &str = "services.yaml";
/// Optional per-root validation overrides.
pub const VALIDATION_FILE: &str = "validation.yaml";

/// How strictly authored metadata is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Forbid title fields on API examples and require them elsewhere.
    pub strict_titles: bool,
}

impl ValidationConfig {
    /// The settings used for the authoritative examples repository.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            strict_titles: true,
        }
    }

    /// Applies `<root>/.doc_gen/validation.yaml` on top of `self`.
    ///
    /// A missing or unreadable file leaves the settings unchanged.
    #[must_use]
    pub fn overlay<F: Fs + ?Sized>(self, fs: &F, root: &Path) -> Self {
        let path = root.join(DOC_GEN_DIR).join(VALIDATION_FILE);
        if !fs.exists(&path) {
            return self;
        }
        match yaml::read_mapping(fs, &path) {
            Ok(mapping) => {
                let strict_titles = mapping
                    .get("strict_titles")
                    .and_then(serde_yaml::Value::as_bool)
                    .unwrap_or(self.strict_titles);
                Self { strict_titles }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring validation overrides");
                self
            }
        }
    }
}

/// Settings for one catalog build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildConfig {
    /// Validation settings applied to every tributary.
    pub validation: ValidationConfig,
    /// Where `sdks.yaml` and `services.yaml` live. Defaults to each root's
    /// `.doc_gen/config`.
    pub config_dir: Option<PathBuf>,
}

impl BuildConfig {
    /// Directory holding the registry files for `root`.
    #[must_use]
    pub fn registry_dir(&self, root: &Path) -> PathBuf {
        self.config_dir
            .clone()
            .unwrap_or_else(|| root.join(DOC_GEN_DIR).join(CONFIG_DIR))
    }
}
