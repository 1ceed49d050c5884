//! The typed model of an example catalog.
//!
//! An [`Example`] owns one [`Language`] per SDK, each owning the [`Version`]s
//! that render it, each listing the [`Excerpt`]s of source it shows. Values are
//! built by [`parse`](crate::metadata::parse::parse) and only ever mutated by
//! the merge engine.

pub mod parse;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Service id to the set of actions an example exercises on it.
pub type ServiceActions = BTreeMap<String, BTreeSet<String>>;

/// Where an example appears in the generated documentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// A single service action. Titles are generated.
    Api,
    /// A guided walkthrough of a service's core actions.
    Basics,
    /// A multi-step workflow within a service.
    Scenarios,
    /// An example spanning several services.
    #[default]
    Cross,
    /// A usage pattern.
    Usage,
    /// An example maintained outside the main repository.
    Curated,
    /// Any other label, kept verbatim.
    Other(String),
}

impl Category {
    /// Interprets an authored category label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "Api" => Self::Api,
            "Basics" => Self::Basics,
            "Scenarios" => Self::Scenarios,
            "Cross" => Self::Cross,
            "Usage" => Self::Usage,
            "Curated" => Self::Curated,
            other => Self::Other(other.to_string()),
        }
    }

    /// The label as it is written in metadata.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Api => "Api",
            Self::Basics => "Basics",
            Self::Scenarios => "Scenarios",
            Self::Cross => "Cross",
            Self::Usage => "Usage",
            Self::Curated => "Curated",
            Self::Other(label) => label.as_str(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much of an excerpt was machine generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Genai {
    /// Written entirely by hand.
    #[default]
    None,
    /// Partly generated.
    Some,
    /// Mostly generated.
    Most,
    /// Entirely generated.
    All,
}

impl Genai {
    /// Parses a `genai` value, returning `None` for unknown levels.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "none" => Some(Self::None),
            "some" => Some(Self::Some),
            "most" => Some(Self::Most),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// The level as it is written in metadata.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Some => "some",
            Self::Most => "most",
            Self::All => "all",
        }
    }
}

/// A titled link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Url {
    /// Link text.
    pub title: String,
    /// Target, possibly relative.
    pub url: Option<String>,
}

/// One reference to source material.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Excerpt {
    /// Prose shown before the code.
    pub description: Option<String>,
    /// Tags of regions to extract from source files.
    pub snippet_tags: Vec<String>,
    /// Paths of files to show whole.
    pub snippet_files: Vec<String>,
    /// How much of the excerpt was generated.
    pub genai: Genai,
}

/// One SDK-version-specific rendering of an example.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Version {
    /// Major SDK version.
    pub sdk_version: u32,
    /// Cross-content block rendered instead of excerpts.
    pub block_content: Option<String>,
    /// Source excerpts, mutually exclusive with `block_content`.
    pub excerpts: Vec<Excerpt>,
    /// Folder on GitHub holding the example's README.
    pub github: Option<String>,
    /// Deprecated relative SDK guide link.
    pub sdkguide: Option<String>,
    /// Services used beyond the example's own.
    pub add_services: ServiceActions,
    /// Further reading.
    pub more_info: Vec<Url>,
}

/// One SDK's presentation of an example.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Language {
    /// SDK display name.
    pub name: String,
    /// Normalized SDK key.
    pub property: String,
    /// Renderings, in document order.
    pub versions: Vec<Version>,
}

impl Language {
    /// The rendering for `sdk_version`, if any.
    #[must_use]
    pub fn version(&self, sdk_version: u32) -> Option<&Version> {
        self.versions.iter().find(|v| v.sdk_version == sdk_version)
    }
}

/// One documented code example.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Example {
    /// Catalog-wide identifier, e.g. `s3_PutObject`.
    pub id: String,
    /// Name of the document that defined it.
    pub file: String,
    /// Full title. Empty when not authored.
    pub title: String,
    /// Navigation title. Empty when not authored.
    pub title_abbrev: String,
    /// One-paragraph summary. Empty when not authored.
    pub synopsis: String,
    /// Bulleted summary.
    pub synopsis_list: Vec<String>,
    /// Navigation group.
    pub category: Category,
    /// Guide topic to link from the example.
    pub guide_topic: Option<Url>,
    /// Primary service when several are used.
    pub service_main: Option<String>,
    /// Services and actions the example exercises.
    pub services: ServiceActions,
    /// Key into an external curated-examples index.
    pub source_key: Option<String>,
    /// Renderings by SDK name.
    pub languages: BTreeMap<String, Language>,
}

impl Example {
    /// Whether this is a single-action API example.
    #[must_use]
    pub fn is_api(&self) -> bool {
        self.category == Category::Api
    }

    /// Every declared `service:action` pair.
    #[must_use]
    pub fn svc_actions(&self) -> Vec<String> {
        svc_actions(&self.services)
    }

    /// Every excerpt of every version of every language.
    pub fn excerpts(&self) -> impl Iterator<Item = &Excerpt> {
        self.languages
            .values()
            .flat_map(|language| &language.versions)
            .flat_map(|version| &version.excerpts)
    }
}

pub(crate) fn svc_actions(services: &ServiceActions) -> Vec<String> {
    services
        .iter()
        .flat_map(|(service, actions)| actions.iter().map(move |a| format!("{service}:{a}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels_round_trip() {
        for label in ["Api", "Basics", "Cross", "Curated examples"] {
            assert_eq!(Category::from_label(label).as_str(), label);
        }
        assert_eq!(
            Category::from_label("Cross-service examples"),
            Category::Other("Cross-service examples".into())
        );
    }

    #[test]
    fn test_svc_actions() {
        let example = Example {
            services: ServiceActions::from([
                ("s3".into(), BTreeSet::from(["GetObject".into(), "PutObject".into()])),
                ("sqs".into(), BTreeSet::new()),
            ]),
            ..Example::default()
        };
        assert_eq!(example.svc_actions(), vec!["s3:GetObject", "s3:PutObject"]);
    }

    #[test]
    fn test_genai_labels() {
        assert_eq!(Genai::from_label("most"), Some(Genai::Most));
        assert_eq!(Genai::from_label("lots"), None);
        assert_eq!(Genai::default().as_str(), "none");
    }
}
