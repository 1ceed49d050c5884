//! JSON export and import of a [`Catalog`].
//!
//! The exported document is a plain mirror of the catalog built from
//! dedicated [`Facet`] records. Two things differ from the in-memory value:
//! the root is redacted to its bare directory name, and every set is written
//! as a `{"set": [...]}` wrapper so it stays distinguishable from a list.
//!
//! Importing an export therefore yields the original catalog in every field
//! except `root`, which comes back as the bare directory name.

use crate::catalog::Catalog;
use crate::config::ValidationConfig;
use crate::metadata::{Category, Example, Excerpt, Genai, Language, ServiceActions, Url, Version};
use crate::registry::{
    Registries, Sdk, SdkExpanded, SdkVersion, Service, ServiceExpanded, ServiceGuide,
};
use crate::snippets::Snippet;
use crate::yaml::file_name;
use facet::Facet;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read an exported catalog back.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The document is not valid JSON or does not match the export layout.
    #[error("JSON parse error: {0}")]
    Json(String),

    /// An excerpt carries a `genai` level this version does not know.
    #[error("unknown genai level '{0}'")]
    InvalidGenai(String),
}

#[derive(Debug, Facet)]
struct TaggedSet {
    set: Vec<String>,
}

impl TaggedSet {
    fn new(values: &BTreeSet<String>) -> Self {
        Self {
            set: values.iter().cloned().collect(),
        }
    }

    fn into_set(self) -> BTreeSet<String> {
        self.set.into_iter().collect()
    }
}

#[derive(Debug, Facet)]
struct CatalogRecord {
    root: String,
    strict_titles: bool,
    sdks: HashMap<String, SdkRecord>,
    services: HashMap<String, ServiceRecord>,
    entities: HashMap<String, String>,
    snippets: HashMap<String, SnippetRecord>,
    snippet_files: TaggedSet,
    examples: HashMap<String, ExampleRecord>,
    cross_blocks: TaggedSet,
}

#[derive(Debug, Facet)]
struct NamesRecord {
    long: String,
    short: String,
}

#[derive(Debug, Facet)]
struct SdkVersionRecord {
    version: u32,
    long: String,
    short: String,
    expanded: Option<NamesRecord>,
    guide: Option<String>,
    caveat: Option<String>,
}

#[derive(Debug, Facet)]
struct SdkRecord {
    name: String,
    property: String,
    guide: Option<String>,
    versions: Vec<SdkVersionRecord>,
}

#[derive(Debug, Facet)]
struct GuideRecord {
    subtitle: String,
    url: String,
}

#[derive(Debug, Facet)]
struct ServiceRecord {
    long: String,
    short: String,
    expanded: NamesRecord,
    sort: String,
    version: String,
    api_ref: Option<String>,
    blurb: Option<String>,
    bundle: Option<String>,
    caveat: Option<String>,
    guide: Option<GuideRecord>,
    tags: HashMap<String, TaggedSet>,
}

#[derive(Debug, Facet)]
struct SnippetRecord {
    id: String,
    file: String,
    line_start: usize,
    line_end: usize,
    code: String,
}

#[derive(Debug, Facet)]
struct UrlRecord {
    title: String,
    url: Option<String>,
}

#[derive(Debug, Facet)]
struct ExcerptRecord {
    description: Option<String>,
    snippet_tags: Vec<String>,
    snippet_files: Vec<String>,
    genai: String,
}

#[derive(Debug, Facet)]
struct VersionRecord {
    sdk_version: u32,
    block_content: Option<String>,
    excerpts: Vec<ExcerptRecord>,
    github: Option<String>,
    sdkguide: Option<String>,
    add_services: HashMap<String, TaggedSet>,
    more_info: Vec<UrlRecord>,
}

#[derive(Debug, Facet)]
struct LanguageRecord {
    name: String,
    property: String,
    versions: Vec<VersionRecord>,
}

#[derive(Debug, Facet)]
struct ExampleRecord {
    id: String,
    file: String,
    title: String,
    title_abbrev: String,
    synopsis: String,
    synopsis_list: Vec<String>,
    category: String,
    guide_topic: Option<UrlRecord>,
    service_main: Option<String>,
    services: HashMap<String, TaggedSet>,
    source_key: Option<String>,
    languages: HashMap<String, LanguageRecord>,
}

/// Serializes `catalog` to JSON.
#[must_use]
pub fn to_json(catalog: &Catalog) -> String {
    facet_json::to_string(&CatalogRecord::from(catalog))
}

/// Reads a catalog written by [`to_json`].
///
/// # Errors
///
/// Returns [`ExportError::Json`] if the input is not a catalog export, and
/// [`ExportError::InvalidGenai`] if an excerpt's `genai` level is unknown.
pub fn from_json(json: &str) -> Result<Catalog, ExportError> {
    let record: CatalogRecord =
        facet_json::from_str(json).map_err(|e| ExportError::Json(e.to_string()))?;
    record.into_catalog()
}

fn export_actions(services: &ServiceActions) -> HashMap<String, TaggedSet> {
    services
        .iter()
        .map(|(service, actions)| (service.clone(), TaggedSet::new(actions)))
        .collect()
}

fn import_actions(services: HashMap<String, TaggedSet>) -> ServiceActions {
    services
        .into_iter()
        .map(|(service, actions)| (service, actions.into_set()))
        .collect()
}

impl From<&Url> for UrlRecord {
    fn from(url: &Url) -> Self {
        Self {
            title: url.title.clone(),
            url: url.url.clone(),
        }
    }
}

impl From<UrlRecord> for Url {
    fn from(record: UrlRecord) -> Self {
        Self {
            title: record.title,
            url: record.url,
        }
    }
}

impl From<&Sdk> for SdkRecord {
    fn from(sdk: &Sdk) -> Self {
        let versions = sdk
            .versions
            .iter()
            .map(|v| SdkVersionRecord {
                version: v.version,
                long: v.long.clone(),
                short: v.short.clone(),
                expanded: v.expanded.as_ref().map(|e| NamesRecord {
                    long: e.long.clone(),
                    short: e.short.clone(),
                }),
                guide: v.guide.clone(),
                caveat: v.caveat.clone(),
            })
            .collect();
        Self {
            name: sdk.name.clone(),
            property: sdk.property.clone(),
            guide: sdk.guide.clone(),
            versions,
        }
    }
}

impl From<SdkRecord> for Sdk {
    fn from(record: SdkRecord) -> Self {
        let versions = record
            .versions
            .into_iter()
            .map(|v| SdkVersion {
                version: v.version,
                long: v.long,
                short: v.short,
                expanded: v.expanded.map(|e| SdkExpanded {
                    long: e.long,
                    short: e.short,
                }),
                guide: v.guide,
                caveat: v.caveat,
            })
            .collect();
        Self {
            name: record.name,
            property: record.property,
            guide: record.guide,
            versions,
        }
    }
}

impl From<&Service> for ServiceRecord {
    fn from(service: &Service) -> Self {
        Self {
            long: service.long.clone(),
            short: service.short.clone(),
            expanded: NamesRecord {
                long: service.expanded.long.clone(),
                short: service.expanded.short.clone(),
            },
            sort: service.sort.clone(),
            version: service.version.clone(),
            api_ref: service.api_ref.clone(),
            blurb: service.blurb.clone(),
            bundle: service.bundle.clone(),
            caveat: service.caveat.clone(),
            guide: service.guide.as_ref().map(|g| GuideRecord {
                subtitle: g.subtitle.clone(),
                url: g.url.clone(),
            }),
            tags: export_actions(&service.tags),
        }
    }
}

impl From<ServiceRecord> for Service {
    fn from(record: ServiceRecord) -> Self {
        Self {
            long: record.long,
            short: record.short,
            expanded: ServiceExpanded {
                long: record.expanded.long,
                short: record.expanded.short,
            },
            sort: record.sort,
            version: record.version,
            api_ref: record.api_ref,
            blurb: record.blurb,
            bundle: record.bundle,
            caveat: record.caveat,
            guide: record.guide.map(|g| ServiceGuide {
                subtitle: g.subtitle,
                url: g.url,
            }),
            tags: import_actions(record.tags),
        }
    }
}

impl From<&Snippet> for SnippetRecord {
    fn from(snippet: &Snippet) -> Self {
        Self {
            id: snippet.id.clone(),
            file: snippet.file.clone(),
            line_start: snippet.line_start,
            line_end: snippet.line_end,
            code: snippet.code.clone(),
        }
    }
}

impl From<SnippetRecord> for Snippet {
    fn from(record: SnippetRecord) -> Self {
        Self {
            id: record.id,
            file: record.file,
            line_start: record.line_start,
            line_end: record.line_end,
            code: record.code,
        }
    }
}

impl From<&Version> for VersionRecord {
    fn from(version: &Version) -> Self {
        let excerpts = version
            .excerpts
            .iter()
            .map(|e| ExcerptRecord {
                description: e.description.clone(),
                snippet_tags: e.snippet_tags.clone(),
                snippet_files: e.snippet_files.clone(),
                genai: e.genai.as_str().to_string(),
            })
            .collect();
        Self {
            sdk_version: version.sdk_version,
            block_content: version.block_content.clone(),
            excerpts,
            github: version.github.clone(),
            sdkguide: version.sdkguide.clone(),
            add_services: export_actions(&version.add_services),
            more_info: version.more_info.iter().map(UrlRecord::from).collect(),
        }
    }
}

impl VersionRecord {
    fn into_version(self) -> Result<Version, ExportError> {
        let excerpts = self
            .excerpts
            .into_iter()
            .map(|e| {
                let genai = Genai::from_label(&e.genai).ok_or(ExportError::InvalidGenai(e.genai))?;
                Ok(Excerpt {
                    description: e.description,
                    snippet_tags: e.snippet_tags,
                    snippet_files: e.snippet_files,
                    genai,
                })
            })
            .collect::<Result<_, ExportError>>()?;
        Ok(Version {
            sdk_version: self.sdk_version,
            block_content: self.block_content,
            excerpts,
            github: self.github,
            sdkguide: self.sdkguide,
            add_services: import_actions(self.add_services),
            more_info: self.more_info.into_iter().map(Url::from).collect(),
        })
    }
}

impl From<&Example> for ExampleRecord {
    fn from(example: &Example) -> Self {
        let languages = example
            .languages
            .iter()
            .map(|(name, language)| {
                let record = LanguageRecord {
                    name: language.name.clone(),
                    property: language.property.clone(),
                    versions: language.versions.iter().map(VersionRecord::from).collect(),
                };
                (name.clone(), record)
            })
            .collect();
        Self {
            id: example.id.clone(),
            file: example.file.clone(),
            title: example.title.clone(),
            title_abbrev: example.title_abbrev.clone(),
            synopsis: example.synopsis.clone(),
            synopsis_list: example.synopsis_list.clone(),
            category: example.category.as_str().to_string(),
            guide_topic: example.guide_topic.as_ref().map(UrlRecord::from),
            service_main: example.service_main.clone(),
            services: export_actions(&example.services),
            source_key: example.source_key.clone(),
            languages,
        }
    }
}

impl ExampleRecord {
    fn into_example(self) -> Result<Example, ExportError> {
        let mut languages = BTreeMap::new();
        for (name, record) in self.languages {
            let versions = record
                .versions
                .into_iter()
                .map(VersionRecord::into_version)
                .collect::<Result<_, _>>()?;
            let language = Language {
                name: record.name,
                property: record.property,
                versions,
            };
            languages.insert(name, language);
        }
        Ok(Example {
            id: self.id,
            file: self.file,
            title: self.title,
            title_abbrev: self.title_abbrev,
            synopsis: self.synopsis,
            synopsis_list: self.synopsis_list,
            category: Category::from_label(&self.category),
            guide_topic: self.guide_topic.map(Url::from),
            service_main: self.service_main,
            services: import_actions(self.services),
            source_key: self.source_key,
            languages,
        })
    }
}

impl From<&Catalog> for CatalogRecord {
    fn from(catalog: &Catalog) -> Self {
        let registries = &catalog.registries;
        Self {
            root: file_name(&catalog.root),
            strict_titles: catalog.validation.strict_titles,
            sdks: registries
                .sdks
                .iter()
                .map(|(name, sdk)| (name.clone(), SdkRecord::from(sdk)))
                .collect(),
            services: registries
                .services
                .iter()
                .map(|(name, service)| (name.clone(), ServiceRecord::from(service)))
                .collect(),
            entities: registries
                .entities
                .iter()
                .map(|(entity, expansion)| (entity.to_string(), expansion.to_string()))
                .collect(),
            snippets: catalog
                .snippets
                .iter()
                .map(|(id, snippet)| (id.clone(), SnippetRecord::from(snippet)))
                .collect(),
            snippet_files: TaggedSet::new(&catalog.snippet_files),
            examples: catalog
                .examples
                .iter()
                .map(|(id, example)| (id.clone(), ExampleRecord::from(example)))
                .collect(),
            cross_blocks: TaggedSet::new(&catalog.cross_blocks),
        }
    }
}

impl CatalogRecord {
    fn into_catalog(self) -> Result<Catalog, ExportError> {
        let registries = Registries {
            sdks: self
                .sdks
                .into_iter()
                .map(|(name, sdk)| (name, Sdk::from(sdk)))
                .collect(),
            services: self
                .services
                .into_iter()
                .map(|(name, service)| (name, Service::from(service)))
                .collect(),
            entities: self.entities.into_iter().collect(),
        };
        let examples = self
            .examples
            .into_iter()
            .map(|(id, record)| Ok((id, record.into_example()?)))
            .collect::<Result<_, ExportError>>()?;
        Ok(Catalog {
            root: PathBuf::from(self.root),
            validation: ValidationConfig {
                strict_titles: self.strict_titles,
            },
            registries,
            snippets: self
                .snippets
                .into_iter()
                .map(|(id, snippet)| (id, Snippet::from(snippet)))
                .collect(),
            snippet_files: self.snippet_files.into_set(),
            examples,
            cross_blocks: self.cross_blocks.into_set(),
        })
    }
}
