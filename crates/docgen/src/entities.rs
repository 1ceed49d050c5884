//! Expansion of `&Name;` placeholders into full product names.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use thiserror::Error;

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[A-Za-z0-9_-]+;").expect("entity pattern is valid"));

/// Placeholders that authors may type by hand.
pub const ALLOWED: [&str; 3] = ["&AWS;", "&AWS-Region;", "&AWS-Regions;"];

/// Expansions that exist independently of any registry.
const STATIC_ENTITIES: [(&str, &str); 5] = [
    ("&AWS;", "AWS"),
    ("&AWS-Region;", "AWS Region"),
    ("&AWS-Regions;", "AWS Regions"),
    ("&AWS-Account;", "AWS account"),
    ("&AWS-Accounts;", "AWS accounts"),
];

/// A placeholder that has no entry in the dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity} not found.")]
pub struct MissingEntity {
    /// The placeholder, including `&` and `;`.
    pub entity: String,
}

/// The result of expanding one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Text with every known placeholder replaced.
    pub text: String,
    /// One entry per distinct placeholder that could not be expanded.
    pub errors: Vec<MissingEntity>,
}

/// Placeholder to expansion dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityMap {
    entries: BTreeMap<String, String>,
}

impl EntityMap {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dictionary holding only the registry-independent entries.
    #[must_use]
    pub fn with_static_entries() -> Self {
        STATIC_ENTITIES
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    /// Adds an entry unless the placeholder is already defined.
    ///
    /// Returns `false` when an existing entry was kept.
    pub fn insert_if_absent(&mut self, entity: impl Into<String>, expansion: impl Into<String>) -> bool {
        let entity = entity.into();
        if self.entries.contains_key(&entity) {
            return false;
        }
        self.entries.insert(entity, expansion.into());
        true
    }

    /// Looks up the expansion of a placeholder.
    #[must_use]
    pub fn get(&self, entity: &str) -> Option<&str> {
        self.entries.get(entity).map(String::as_str)
    }

    /// Whether the placeholder has an expansion.
    #[must_use]
    pub fn contains(&self, entity: &str) -> bool {
        self.entries.contains_key(entity)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in placeholder order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Expands every placeholder in `text`. See [`expand_all`].
    #[must_use]
    pub fn expand(&self, text: &str) -> Expansion {
        expand_all(text, self)
    }
}

impl FromIterator<(String, String)> for EntityMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for EntityMap {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Returns the distinct placeholders in `text`.
#[must_use]
pub fn find_all(text: &str) -> BTreeSet<&str> {
    ENTITY.find_iter(text).map(|m| m.as_str()).collect()
}

/// Whether `text` is exactly one placeholder.
#[must_use]
pub fn is_entity(text: &str) -> bool {
    ENTITY
        .find(text)
        .is_some_and(|m| m.start() == 0 && m.end() == text.len())
}

/// Whether `entity` is one of the expansions every catalog starts with.
#[must_use]
pub fn is_static(entity: &str) -> bool {
    STATIC_ENTITIES.iter().any(|(name, _)| *name == entity)
}

/// Replaces every known placeholder in `text` with its expansion.
///
/// Placeholders are replaced in one pass over `text`, so an expansion is never
/// itself expanded. Unknown placeholders are left in place and reported once.
#[must_use]
pub fn expand_all(text: &str, entities: &EntityMap) -> Expansion {
    let mut missing = BTreeSet::new();
    let expanded = ENTITY.replace_all(text, |caps: &regex::Captures<'_>| {
        let entity = &caps[0];
        match entities.get(entity) {
            Some(expansion) => expansion.to_string(),
            None => {
                missing.insert(entity.to_string());
                entity.to_string()
            }
        }
    });

    Expansion {
        text: expanded.into_owned(),
        errors: missing
            .into_iter()
            .map(|entity| MissingEntity { entity })
            .collect(),
    }
}
