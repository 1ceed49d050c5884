//! The services registry (`services.yaml`).

use super::check_mapping;
use crate::error::{ErrorKind, MetadataError};
use crate::yaml::{field, optional_string, scalar};
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Resolved display names of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceExpanded {
    /// Long display name, e.g. `Amazon Simple Storage Service (Amazon S3)`.
    pub long: String,
    /// Short display name, e.g. `Amazon S3`.
    pub short: String,
}

/// Link to a service's user guide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceGuide {
    /// Guide subtitle.
    pub subtitle: String,
    /// Relative guide URL.
    pub url: String,
}

/// One service known to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Service {
    /// Long name placeholder, e.g. `&S3long;`.
    pub long: String,
    /// Short name placeholder, e.g. `&S3;`.
    pub short: String,
    /// What the placeholders expand to.
    pub expanded: ServiceExpanded,
    /// Sort key.
    pub sort: String,
    /// API version identifier, e.g. `s3-2006-03-01`.
    pub version: String,
    /// Relative API reference link.
    pub api_ref: Option<String>,
    /// One-sentence description.
    pub blurb: Option<String>,
    /// Service this one is documented together with.
    pub bundle: Option<String>,
    /// Warning shown next to the service's examples.
    pub caveat: Option<String>,
    /// User guide link.
    pub guide: Option<ServiceGuide>,
    /// Free-form tag sets, e.g. product categories.
    pub tags: BTreeMap<String, BTreeSet<String>>,
}

impl Service {
    /// Builds a service from its registry body.
    #[must_use]
    pub fn from_yaml(body: &Value) -> (Self, Vec<MetadataError>) {
        let mut errors = Vec::new();

        let long = check_mapping(field(body, "long"), "long", &mut errors);
        let short = check_mapping(field(body, "short"), "short", &mut errors);

        let expanded = field(body, "expanded");
        let expanded_long = expanded.and_then(|e| field(e, "long")).and_then(scalar);
        let expanded_short = expanded.and_then(|e| field(e, "short")).and_then(scalar);
        let sort = optional_string(body, "sort", &mut errors);
        let version = optional_string(body, "version", &mut errors);

        let mut required = |value: Option<String>, name: &str| {
            value.unwrap_or_else(|| {
                errors.push(
                    ErrorKind::MissingField {
                        field: name.to_string(),
                    }
                    .into(),
                );
                String::new()
            })
        };
        let expanded = ServiceExpanded {
            long: required(expanded_long, "expanded_long"),
            short: required(expanded_short, "expanded_short"),
        };
        let sort = required(sort, "sort");
        let version = required(version, "version");

        let api_ref = optional_string(body, "api_ref", &mut errors);
        let blurb = optional_string(body, "blurb", &mut errors);
        let bundle = optional_string(body, "bundle", &mut errors);
        let caveat = optional_string(body, "caveat", &mut errors);

        let guide = field(body, "guide").map(|guide| {
            let subtitle = optional_string(guide, "subtitle", &mut errors);
            let url = optional_string(guide, "url", &mut errors);
            for (value, name) in [(&subtitle, "guide.subtitle"), (&url, "guide.url")] {
                if value.is_none() {
                    errors.push(
                        ErrorKind::MissingField {
                            field: name.to_string(),
                        }
                        .into(),
                    );
                }
            }
            ServiceGuide {
                subtitle: subtitle.unwrap_or_default(),
                url: url.unwrap_or_default(),
            }
        });

        let mut tags = BTreeMap::new();
        if let Some(Value::Mapping(yaml_tags)) = field(body, "tags") {
            for (tag, values) in yaml_tags {
                let Some(tag) = scalar(tag) else { continue };
                let values = match values {
                    Value::Mapping(m) => m.keys().filter_map(scalar).collect(),
                    Value::Sequence(s) => s.iter().filter_map(scalar).collect(),
                    _ => BTreeSet::new(),
                };
                tags.insert(tag, values);
            }
        }

        let service = Self {
            long,
            short,
            expanded,
            sort,
            version,
            api_ref,
            blurb,
            bundle,
            caveat,
            guide,
            tags,
        };
        (service, errors)
    }

    /// Re-checks the required fields of an already built service.
    #[must_use]
    pub fn validate(&self) -> Vec<MetadataError> {
        let mut errors = Vec::new();
        for (value, name) in [(&self.long, "long"), (&self.short, "short")] {
            if value.is_empty() {
                errors.push(MetadataError::new(ErrorKind::MissingField {
                    field: name.to_string(),
                }));
            } else if !crate::entities::is_entity(value) {
                errors.push(MetadataError::new(ErrorKind::MappingMustBeEntity {
                    field: name.to_string(),
                    value: value.clone(),
                }));
            }
        }
        for (value, name) in [
            (&self.expanded.long, "expanded_long"),
            (&self.expanded.short, "expanded_short"),
            (&self.sort, "sort"),
            (&self.version, "version"),
        ] {
            if value.is_empty() {
                errors.push(MetadataError::new(ErrorKind::MissingField {
                    field: name.to_string(),
                }));
            }
        }
        errors
    }
}

/// Parses a whole services document.
///
/// Every error carries `file` and the service id.
#[must_use]
pub fn parse_services(
    file: &str,
    yaml: &Mapping,
) -> (BTreeMap<String, Service>, Vec<MetadataError>) {
    let mut services = BTreeMap::new();
    let mut errors = Vec::new();

    for (name, body) in yaml {
        let Some(name) = scalar(name) else { continue };
        if matches!(body, Value::Null) {
            errors.push(
                MetadataError::new(ErrorKind::MissingServiceBody)
                    .with_file(file)
                    .with_id(&name),
            );
            continue;
        }
        let (service, service_errors) = Service::from_yaml(body);
        errors.extend(
            service_errors
                .into_iter()
                .map(|e| e.with_file(file).with_id(&name)),
        );
        services.insert(name, service);
    }

    (services, errors)
}
