//! Reference data every other stage validates against.
//!
//! A [`Registries`] value is built once per tributary root from `sdks.yaml`
//! and `services.yaml` and then passed by reference into the parser, the
//! merge engine and the validator. Nothing mutates it after construction
//! except a merge, which only ever adds entries.

mod sdks;
mod services;

pub use sdks::{parse_sdks, Sdk, SdkExpanded, SdkVersion};
pub use services::{parse_services, Service, ServiceExpanded, ServiceGuide};

use crate::config::{SDKS_FILE, SERVICES_FILE};
use crate::entities::{is_entity, EntityMap};
use crate::error::{Diagnostics, ErrorKind, MetadataError};
use crate::fs::Fs;
use crate::yaml::{self, scalar};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Reads a registry display name that must be written as an entity.
///
/// The value is kept even when it is not an entity, so a later
/// `validate()` reports the same finding.
pub(crate) fn check_mapping(
    value: Option<&Value>,
    field: &str,
    errors: &mut Vec<MetadataError>,
) -> String {
    match value.and_then(scalar) {
        Some(value) if !value.is_empty() => {
            if !is_entity(&value) {
                errors.push(
                    ErrorKind::MappingMustBeEntity {
                        field: field.to_string(),
                        value: value.clone(),
                    }
                    .into(),
                );
            }
            value
        }
        _ => {
            errors.push(
                ErrorKind::MissingField {
                    field: field.to_string(),
                }
                .into(),
            );
            String::new()
        }
    }
}

/// The SDK, service and entity tables of one catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registries {
    /// SDKs by display name.
    pub sdks: BTreeMap<String, Sdk>,
    /// Services by id.
    pub services: BTreeMap<String, Service>,
    /// Placeholder expansions derived from both tables.
    pub entities: EntityMap,
}

impl Registries {
    /// Builds the registries and derives the entity dictionary from them.
    #[must_use]
    pub fn new(sdks: BTreeMap<String, Sdk>, services: BTreeMap<String, Service>) -> Self {
        let mut entities = EntityMap::with_static_entries();

        for service in services.values() {
            for (entity, expansion) in [
                (&service.long, &service.expanded.long),
                (&service.short, &service.expanded.short),
            ] {
                if !entity.is_empty() && !expansion.is_empty() {
                    entities.insert_if_absent(entity.clone(), expansion.clone());
                }
            }
        }

        for version in sdks.values().flat_map(|sdk| &sdk.versions) {
            if let Some(expanded) = &version.expanded {
                for (entity, expansion) in [
                    (&version.long, &expanded.long),
                    (&version.short, &expanded.short),
                ] {
                    if !entity.is_empty() {
                        entities.insert_if_absent(entity.clone(), expansion.clone());
                    }
                }
            }
        }

        Self {
            sdks,
            services,
            entities,
        }
    }

    /// Registries with no SDKs or services, only the static entities.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(BTreeMap::new(), BTreeMap::new())
    }

    /// Whether `entity` can be expanded by this catalog.
    #[must_use]
    pub fn knows_entity(&self, entity: &str) -> bool {
        self.entities.contains(entity)
    }

    /// Loads `sdks.yaml` and `services.yaml` from `dir`.
    ///
    /// A missing registry file yields an empty table without a diagnostic.
    /// Unreadable or malformed files, and every per-entry finding, are
    /// appended to `diagnostics`.
    pub fn load<F: Fs + ?Sized>(fs: &F, dir: &Path, diagnostics: &mut Diagnostics) -> Self {
        let sdks = load_table(fs, &dir.join(SDKS_FILE), diagnostics, parse_sdks);
        let services = load_table(fs, &dir.join(SERVICES_FILE), diagnostics, parse_services);
        tracing::debug!(
            dir = %dir.display(),
            sdks = sdks.len(),
            services = services.len(),
            "loaded registries"
        );
        Self::new(sdks, services)
    }
}

fn load_table<F, T>(
    fs: &F,
    path: &Path,
    diagnostics: &mut Diagnostics,
    parse: fn(&str, &serde_yaml::Mapping) -> (BTreeMap<String, T>, Vec<MetadataError>),
) -> BTreeMap<String, T>
where
    F: Fs + ?Sized,
{
    if !fs.exists(path) {
        tracing::debug!(path = %path.display(), "registry file absent, using an empty table");
        return BTreeMap::new();
    }
    match yaml::read_mapping(fs, path) {
        Ok(mapping) => {
            let (table, errors) = parse(&yaml::file_name(path), &mapping);
            diagnostics.extend(errors);
            table
        }
        Err(err) => {
            diagnostics.push(err);
            BTreeMap::new()
        }
    }
}
