//! Aggregation, validation and snippet resolution for code example metadata.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::multiple_crate_versions)]

/// The merged catalog and the loader that builds one per root.
///
/// A [`Catalog`] is the unit everything else works on: parsing fills it,
/// merging folds several into one, and validation inspects the result.
pub mod catalog;

/// Validation and build settings, and the on-disk layout of a root.
pub mod config;

/// Placeholder (`&Name;`) discovery and expansion.
pub mod entities;

/// Diagnostics shared by every stage.
///
/// Nothing in the build stops at the first problem. Parse errors, merge
/// warnings and document failures all accumulate in one ordered list that the
/// caller inspects at the end.
pub mod error;

/// JSON export and re-import of a catalog.
pub mod export;

/// File-system access behind a trait, with disk and in-memory backends.
pub mod fs;

/// Combining partial catalogs, self-wins.
pub mod merge;

/// The typed example model and the metadata document parser.
pub mod metadata;

/// The ordered multi-root build entry point.
pub mod pipeline;

/// SDK and service registries, and the entity dictionary derived from them.
pub mod registry;

/// Tagged source regions and whole-file snippets.
pub mod snippets;

/// Catalog-wide checks run after merging and snippet resolution.
pub mod validate;

mod yaml;

pub use catalog::{Catalog, Stats};
pub use config::{BuildConfig, ValidationConfig};
pub use entities::{EntityMap, Expansion, MissingEntity};
pub use error::{
    Diagnostic, Diagnostics, DocumentError, ErrorKind, MergeConflict, MergeWarning, MetadataError,
};
pub use export::{from_json, to_json, ExportError};
pub use fs::{Fs, PathFs, RecordFs};
pub use metadata::parse::{parse, parse_document};
pub use metadata::{Category, Example, Excerpt, Genai, Language, Url, Version};
pub use pipeline::{Build, Pipeline};
pub use registry::{Registries, Sdk, Service};
pub use snippets::{collect_snippet_files, collect_snippets, parse_snippets, Snippet};
pub use validate::validate;
