//! The SDK registry (`sdks.yaml`).

use super::check_mapping;
use crate::error::{ErrorKind, MetadataError};
use crate::yaml::{field, optional_string, scalar};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Resolved display names of one SDK version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdkExpanded {
    /// Long display name, e.g. `AWS SDK for Java 2.x`.
    pub long: String,
    /// Short display name, e.g. `SDK for Java 2.x`.
    pub short: String,
}

/// One major version of an SDK.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdkVersion {
    /// Major version number.
    pub version: u32,
    /// Long name placeholder.
    pub long: String,
    /// Short name placeholder.
    pub short: String,
    /// What the placeholders expand to, when known.
    pub expanded: Option<SdkExpanded>,
    /// Relative developer guide link.
    pub guide: Option<String>,
    /// Warning shown next to this version's examples.
    pub caveat: Option<String>,
}

impl SdkVersion {
    fn from_yaml(version: u32, body: &Value) -> (Self, Vec<MetadataError>) {
        let mut errors = Vec::new();
        let long = check_mapping(field(body, "long"), "long", &mut errors);
        let short = check_mapping(field(body, "short"), "short", &mut errors);
        let expanded = field(body, "expanded").map(|e| SdkExpanded {
            long: field(e, "long").and_then(scalar).unwrap_or_default(),
            short: field(e, "short").and_then(scalar).unwrap_or_default(),
        });
        let guide = optional_string(body, "guide", &mut errors);
        let caveat = optional_string(body, "caveat", &mut errors);

        for error in &mut errors {
            error.sdk_version = Some(version);
        }

        let sdk_version = Self {
            version,
            long,
            short,
            expanded,
            guide,
            caveat,
        };
        (sdk_version, errors)
    }

    fn validate(&self) -> Vec<MetadataError> {
        let mut errors = Vec::new();
        for (value, name) in [(&self.long, "long"), (&self.short, "short")] {
            let kind = if value.is_empty() {
                ErrorKind::MissingField {
                    field: name.to_string(),
                }
            } else if !crate::entities::is_entity(value) {
                ErrorKind::MappingMustBeEntity {
                    field: name.to_string(),
                    value: value.clone(),
                }
            } else {
                continue;
            };
            errors.push(MetadataError::new(kind).with_sdk_version(self.version));
        }
        errors
    }
}

/// One SDK (language) known to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sdk {
    /// Display name, also the key examples use, e.g. `Java`.
    pub name: String,
    /// Normalized key, e.g. `java`.
    pub property: String,
    /// Relative landing page for the SDK.
    pub guide: Option<String>,
    /// Known major versions, in document order.
    pub versions: Vec<SdkVersion>,
}

impl Sdk {
    /// Builds an SDK from its registry body.
    #[must_use]
    pub fn from_yaml(name: &str, body: &Value) -> (Self, Vec<MetadataError>) {
        let mut errors = Vec::new();

        let property = optional_string(body, "property", &mut errors).unwrap_or_else(|| {
            errors.push(MetadataError::new(ErrorKind::MissingField {
                field: "property".to_string(),
            }));
            String::new()
        });
        let guide = optional_string(body, "guide", &mut errors);

        let mut versions = Vec::new();
        match field(body, "sdk") {
            Some(Value::Mapping(yaml_versions)) if !yaml_versions.is_empty() => {
                for (key, version_body) in yaml_versions {
                    let number = scalar(key).unwrap_or_default();
                    match number.parse::<u32>() {
                        Ok(version) if version > 0 => {
                            let (sdk_version, version_errors) =
                                SdkVersion::from_yaml(version, version_body);
                            errors.extend(version_errors);
                            versions.push(sdk_version);
                        }
                        _ => errors.push(MetadataError::new(ErrorKind::InvalidSdkVersion {
                            value: number,
                        })),
                    }
                }
            }
            _ => errors.push(MetadataError::new(ErrorKind::MissingField {
                field: "sdk".to_string(),
            })),
        }

        let sdk = Self {
            name: name.to_string(),
            property,
            guide,
            versions,
        };
        (sdk, errors)
    }

    /// Whether `version` is listed for this SDK.
    #[must_use]
    pub fn has_version(&self, version: u32) -> bool {
        self.versions.iter().any(|v| v.version == version)
    }

    /// Re-checks the required fields of an already built SDK.
    #[must_use]
    pub fn validate(&self) -> Vec<MetadataError> {
        let mut errors = Vec::new();
        if self.property.is_empty() {
            errors.push(MetadataError::new(ErrorKind::MissingField {
                field: "property".to_string(),
            }));
        }
        if self.versions.is_empty() {
            errors.push(MetadataError::new(ErrorKind::MissingField {
                field: "sdk".to_string(),
            }));
        }
        for version in &self.versions {
            errors.extend(version.validate());
        }
        errors
    }
}

/// Parses a whole SDK document.
///
/// Every error carries `file` and the SDK name.
#[must_use]
pub fn parse_sdks(file: &str, yaml: &Mapping) -> (BTreeMap<String, Sdk>, Vec<MetadataError>) {
    let mut sdks = BTreeMap::new();
    let mut errors = Vec::new();

    for (name, body) in yaml {
        let Some(name) = scalar(name) else { continue };
        if matches!(body, Value::Null) {
            errors.push(
                MetadataError::new(ErrorKind::MissingSdkBody)
                    .with_file(file)
                    .with_id(&name),
            );
            continue;
        }
        let (sdk, sdk_errors) = Sdk::from_yaml(&name, body);
        errors.extend(sdk_errors.into_iter().map(|e| e.with_file(file).with_id(&name)));
        sdks.insert(name, sdk);
    }

    (sdks, errors)
}
