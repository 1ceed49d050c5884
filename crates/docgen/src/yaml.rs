//! Small accessors over untyped YAML documents.

use crate::error::{DocumentError, ErrorKind, MetadataError};
use crate::fs::Fs;
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Strips YAML tags such as `!!set`, leaving the tagged value.
pub(crate) fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

/// Looks up `key`, treating an explicit `null` like an absent key.
pub(crate) fn field<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    match untag(body).get(key).map(untag) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

/// Renders a scalar as a string. Mappings and sequences yield `None`.
pub(crate) fn scalar(value: &Value) -> Option<String> {
    match untag(value) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads an optional scalar field, reporting a wrongly shaped value.
pub(crate) fn optional_string(
    body: &Value,
    key: &str,
    errors: &mut Vec<MetadataError>,
) -> Option<String> {
    let value = field(body, key)?;
    if let Some(s) = scalar(value) {
        Some(s)
    } else {
        errors.push(
            ErrorKind::InvalidFieldType {
                field: key.to_string(),
                expected: "a string",
            }
            .into(),
        );
        None
    }
}

/// Reads an optional list of scalars. A lone scalar counts as a list of one.
pub(crate) fn string_list(body: &Value, key: &str, errors: &mut Vec<MetadataError>) -> Vec<String> {
    match field(body, key) {
        None => Vec::new(),
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar).collect(),
        Some(value) => {
            if let Some(s) = scalar(value) {
                vec![s]
            } else {
                errors.push(
                    ErrorKind::InvalidFieldType {
                        field: key.to_string(),
                        expected: "a list of strings",
                    }
                    .into(),
                );
                Vec::new()
            }
        }
    }
}

/// Parses a whole document whose top level must be a mapping.
///
/// An empty document is an empty mapping.
pub(crate) fn parse_mapping(name: &str, source: &str) -> Result<Mapping, DocumentError> {
    let value: Value = serde_yaml::from_str(source).map_err(|source| DocumentError::Yaml {
        path: name.to_string(),
        source,
    })?;
    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        Value::Tagged(tagged) => match tagged.value {
            Value::Mapping(mapping) => Ok(mapping),
            _ => Err(DocumentError::NotAMapping {
                path: name.to_string(),
            }),
        },
        _ => Err(DocumentError::NotAMapping {
            path: name.to_string(),
        }),
    }
}

/// Reads and parses a document through `fs`.
pub(crate) fn read_mapping<F: Fs + ?Sized>(fs: &F, path: &Path) -> Result<Mapping, DocumentError> {
    let source = fs.read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mapping(&file_name(path), &source)
}

/// The bare file name of `path`, or the whole path when it has none.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
