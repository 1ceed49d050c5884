//! Builds [`Example`]s from one metadata document.
//!
//! Every field-level rule is checked here, and every finding is collected
//! rather than raised: a broken example never stops its siblings from being
//! parsed. Findings carry the document name and example id, plus the language
//! and SDK version when they come from inside a language block.

use super::{Category, Example, Excerpt, Genai, Language, ServiceActions, Url, Version};
use crate::config::ValidationConfig;
use crate::entities::{find_all, ALLOWED};
use crate::error::{annotate, DocumentError, ErrorKind, MetadataError};
use crate::registry::{Registries, Sdk};
use crate::yaml::{self, field, optional_string, scalar, string_list, untag};
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Id prefixes accepted without a matching declared service.
const FREE_PREFIXES: [&str; 2] = ["cross", "serverless"];

/// Documentation host that `sdkguide` links must not start with.
const DOCS_HOST: &str = "https://docs.aws.amazon.com";

/// Parses every example in `yaml`, in document order.
///
/// `blocks` is the set of cross-content block names known to the catalog.
#[must_use]
pub fn parse(
    file: &str,
    yaml: &Mapping,
    registries: &Registries,
    blocks: &BTreeSet<String>,
    validation: ValidationConfig,
) -> (Vec<Example>, Vec<MetadataError>) {
    let parser = Parser {
        registries,
        blocks,
        validation,
    };

    let mut examples = Vec::new();
    let mut errors = Vec::new();

    for (id, body) in yaml {
        let Some(id) = scalar(id) else { continue };
        let (mut example, mut example_errors) = parser.example(body);
        check_id_format(
            &id,
            &example.services,
            validation.strict_titles && example.is_api(),
            &mut example_errors,
        );
        for error in &mut example_errors {
            error.file = Some(file.to_string());
            error.id = Some(id.clone());
        }
        errors.extend(example_errors);

        example.id = id;
        example.file = file.to_string();
        examples.push(example);
    }

    (examples, errors)
}

/// Parses a metadata document from source text.
///
/// # Errors
///
/// Returns a [`DocumentError`] when the text is not YAML or its top level is
/// not a mapping. Per-example findings are returned alongside the examples.
pub fn parse_document(
    file: &str,
    source: &str,
    registries: &Registries,
    blocks: &BTreeSet<String>,
    validation: ValidationConfig,
) -> Result<(Vec<Example>, Vec<MetadataError>), DocumentError> {
    let yaml = yaml::parse_mapping(file, source)?;
    Ok(parse(file, &yaml, registries, blocks, validation))
}

struct Parser<'a> {
    registries: &'a Registries,
    blocks: &'a BTreeSet<String>,
    validation: ValidationConfig,
}

impl Parser<'_> {
    fn example(&self, body: &Value) -> (Example, Vec<MetadataError>) {
        let mut errors = Vec::new();

        let title = self.authored(body, "title", &mut errors);
        let title_abbrev = self.authored(body, "title_abbrev", &mut errors);
        let synopsis = self.authored(body, "synopsis", &mut errors);
        let synopsis_list = string_list(body, "synopsis_list", &mut errors);
        for line in &synopsis_list {
            self.check_authored("synopsis_list", line, &mut errors);
        }

        let source_key = optional_string(body, "source_key", &mut errors);
        let guide_topic = field(body, "guide_topic").and_then(|value| url(value, &mut errors));

        let services = self.services(field(body, "services"), "services", &mut errors);
        let category = match optional_string(body, "category", &mut errors) {
            Some(label) if !label.is_empty() => Category::from_label(&label),
            _ if services.len() == 1 => Category::Api,
            _ => Category::Cross,
        };

        let service_main = optional_string(body, "service_main", &mut errors);

        let mut example = Example {
            id: String::new(),
            file: String::new(),
            title,
            title_abbrev,
            synopsis,
            synopsis_list,
            category,
            guide_topic,
            service_main,
            services,
            source_key,
            languages: BTreeMap::new(),
        };
        self.check_category(&example, &mut errors);
        if let Some(service) = &example.service_main {
            if !self.registries.services.contains_key(service) {
                errors.push(
                    ErrorKind::UnknownService {
                        service: service.clone(),
                    }
                    .into(),
                );
            }
        }
        example.languages = self.languages(body, example.is_api(), &mut errors);

        (example, errors)
    }

    /// Category rules: one action for API examples, and the title fields
    /// each category must or must not author.
    fn check_category(&self, example: &Example, errors: &mut Vec<MetadataError>) {
        if example.is_api() {
            let svc_actions = example.svc_actions();
            if svc_actions.len() != 1 {
                errors.push(
                    ErrorKind::ApiMustHaveOneServiceOneAction {
                        svc_actions: svc_actions.join(", "),
                    }
                    .into(),
                );
            }
        }

        if !self.validation.strict_titles {
            return;
        }
        let has_title = !example.title.is_empty();
        let has_abbrev = !example.title_abbrev.is_empty();
        let has_synopsis = !example.synopsis.is_empty() || !example.synopsis_list.is_empty();
        let kind = match example.category {
            Category::Api => (has_title || has_abbrev || has_synopsis)
                .then_some(ErrorKind::ApiCannotHaveTitleFields),
            Category::Basics => (!has_synopsis).then_some(ErrorKind::BasicsMustHaveSynopsis),
            _ => (!has_title || !has_abbrev || !has_synopsis)
                .then_some(ErrorKind::NonApiMustHaveTitleFields),
        };
        errors.extend(kind.map(MetadataError::from));
    }

    fn languages(
        &self,
        body: &Value,
        is_api: bool,
        errors: &mut Vec<MetadataError>,
    ) -> BTreeMap<String, Language> {
        let mut languages = BTreeMap::new();
        match field(body, "languages") {
            Some(Value::Mapping(yaml_languages)) => {
                for (name, language_body) in yaml_languages {
                    let Some(name) = scalar(name) else { continue };
                    let (language, language_errors) = self.language(&name, language_body, is_api);
                    errors.extend(language_errors);
                    languages.insert(name, language);
                }
            }
            Some(_) => errors.push(
                ErrorKind::InvalidFieldType {
                    field: "languages".to_string(),
                    expected: "a mapping of languages",
                }
                .into(),
            ),
            None => errors.push(
                ErrorKind::MissingField {
                    field: "languages".to_string(),
                }
                .into(),
            ),
        }
        languages
    }

    fn language(&self, name: &str, body: &Value, is_api: bool) -> (Language, Vec<MetadataError>) {
        let mut errors = Vec::new();

        let sdk = self.registries.sdks.get(name);
        if sdk.is_none() {
            errors.push(
                ErrorKind::UnknownLanguage {
                    language: name.to_string(),
                }
                .into(),
            );
        }
        let property = sdk
            .map(|sdk| sdk.property.clone())
            .filter(|property| !property.is_empty())
            .unwrap_or_else(|| property_slug(name));

        let mut versions = Vec::new();
        match field(body, "versions") {
            Some(Value::Sequence(items)) if !items.is_empty() => {
                for item in items {
                    let (version, version_errors) = self.version(item, sdk, is_api);
                    errors.extend(version_errors);
                    versions.push(version);
                }
            }
            _ => errors.push(
                ErrorKind::MissingField {
                    field: "versions".to_string(),
                }
                .into(),
            ),
        }

        annotate(&mut errors, Some(name), None);

        let language = Language {
            name: name.to_string(),
            property,
            versions,
        };
        (language, errors)
    }

    fn version(&self, body: &Value, sdk: Option<&Sdk>, is_api: bool) -> (Version, Vec<MetadataError>) {
        let mut errors = Vec::new();

        let missing = || -> MetadataError {
            ErrorKind::MissingField {
                field: "sdk_version".to_string(),
            }
            .into()
        };
        let sdk_version = match field(body, "sdk_version").and_then(scalar) {
            None => {
                errors.push(missing());
                0
            }
            Some(raw) => match raw.parse::<u32>() {
                Ok(0) => {
                    errors.push(missing());
                    0
                }
                Ok(version) => {
                    if sdk.is_some_and(|sdk| !sdk.versions.is_empty() && !sdk.has_version(version)) {
                        errors.push(ErrorKind::InvalidSdkVersion { value: raw }.into());
                    }
                    version
                }
                Err(_) => {
                    errors.push(ErrorKind::InvalidSdkVersion { value: raw }.into());
                    0
                }
            },
        };

        let block_content = optional_string(body, "block_content", &mut errors);
        let github = optional_string(body, "github", &mut errors);
        let sdkguide = optional_string(body, "sdkguide", &mut errors);

        if let Some(guide) = &sdkguide {
            if guide.starts_with(DOCS_HOST) {
                errors.push(
                    ErrorKind::InvalidSdkGuideStart {
                        guide: guide.clone(),
                    }
                    .into(),
                );
            }
        }
        if let Some(link) = &github {
            if Path::new(link).extension().is_some() {
                errors.push(ErrorKind::InvalidGithubLink { link: link.clone() }.into());
            }
        }

        let excerpts = match field(body, "excerpts") {
            None => Vec::new(),
            Some(Value::Sequence(items)) => items.iter().map(|item| excerpt(item, &mut errors)).collect(),
            Some(_) => {
                errors.push(
                    ErrorKind::InvalidFieldType {
                        field: "excerpts".to_string(),
                        expected: "a list of excerpts",
                    }
                    .into(),
                );
                Vec::new()
            }
        };

        match (block_content.is_some(), excerpts.is_empty()) {
            (false, true) => errors.push(ErrorKind::MissingBlockContentAndExcerpt.into()),
            (true, false) => errors.push(ErrorKind::BlockContentAndExcerptConflict.into()),
            _ => {}
        }

        let mut more_info = Vec::new();
        if let Some(Value::Sequence(items)) = field(body, "more_info") {
            more_info.extend(items.iter().filter_map(|item| url(item, &mut errors)));
        }

        let add_services = self.services(field(body, "add_services"), "add_services", &mut errors);
        if is_api && !add_services.is_empty() {
            errors.push(ErrorKind::ApiExampleCannotAddService.into());
        }

        if let Some(block) = &block_content {
            if !self.blocks.contains(block) {
                errors.push(
                    ErrorKind::MissingCrossContent {
                        block: block.clone(),
                    }
                    .into(),
                );
            }
        }

        annotate(&mut errors, None, (sdk_version != 0).then_some(sdk_version));

        let version = Version {
            sdk_version,
            block_content,
            excerpts,
            github,
            sdkguide,
            add_services,
            more_info,
        };
        (version, errors)
    }

    /// Normalizes a service declaration into service to action set.
    ///
    /// Accepts a mapping (values may be null, a set, a mapping or a list), a
    /// list of service ids, or nothing at all.
    fn services(
        &self,
        value: Option<&Value>,
        key: &str,
        errors: &mut Vec<MetadataError>,
    ) -> ServiceActions {
        let declared: Vec<(String, Option<&Value>)> = match value {
            None => return ServiceActions::new(),
            Some(Value::Mapping(mapping)) => mapping
                .iter()
                .filter_map(|(name, actions)| scalar(name).map(|name| (name, Some(actions))))
                .collect(),
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(scalar)
                .map(|name| (name, None))
                .collect(),
            Some(_) => {
                errors.push(
                    ErrorKind::InvalidFieldType {
                        field: key.to_string(),
                        expected: "a mapping of services to actions",
                    }
                    .into(),
                );
                return ServiceActions::new();
            }
        };

        let mut services = ServiceActions::new();
        for (name, actions) in declared {
            if !self.registries.services.contains_key(&name) {
                errors.push(ErrorKind::UnknownService { service: name }.into());
                continue;
            }
            services.insert(name, actions.map(action_set).unwrap_or_default());
        }
        services
    }

    /// Reads an authored string field, checking its entity usage.
    ///
    /// The value is kept even when it fails a check.
    fn authored(&self, body: &Value, key: &str, errors: &mut Vec<MetadataError>) -> String {
        let Some(value) = optional_string(body, key, errors) else {
            return String::new();
        };
        self.check_authored(key, &value, errors);
        value
    }

    fn check_authored(&self, key: &str, value: &str, errors: &mut Vec<MetadataError>) {
        if has_bare_aws(value) {
            errors.push(
                ErrorKind::AwsNotEntity {
                    field: key.to_string(),
                    value: value.to_string(),
                }
                .into(),
            );
        }
        for entity in find_all(value) {
            if !ALLOWED.contains(&entity) && !self.registries.knows_entity(entity) {
                errors.push(
                    ErrorKind::UnknownEntity {
                        field: key.to_string(),
                        entity: entity.to_string(),
                    }
                    .into(),
                );
            }
        }
    }
}

fn excerpt(body: &Value, errors: &mut Vec<MetadataError>) -> Excerpt {
    let description = optional_string(body, "description", errors);
    let snippet_tags = string_list(body, "snippet_tags", errors);
    let snippet_files = string_list(body, "snippet_files", errors);
    let genai = match optional_string(body, "genai", errors) {
        None => Genai::None,
        Some(label) => match Genai::from_label(&label) {
            Some(genai) => genai,
            None => {
                errors.push(ErrorKind::InvalidGenai { value: label }.into());
                Genai::None
            }
        },
    };
    Excerpt {
        description,
        snippet_tags,
        snippet_files,
        genai,
    }
}

/// Reads a titled link. A missing title is reported and drops the link.
fn url(value: &Value, errors: &mut Vec<MetadataError>) -> Option<Url> {
    let url = field(value, "url").and_then(scalar);
    if let Some(title) = field(value, "title").and_then(scalar) {
        Some(Url { title, url })
    } else {
        errors.push(
            ErrorKind::UrlMissingTitle {
                url: url.unwrap_or_default(),
            }
            .into(),
        );
        None
    }
}

fn action_set(value: &Value) -> BTreeSet<String> {
    match untag(value) {
        Value::Null => BTreeSet::new(),
        Value::Mapping(actions) => actions.keys().filter_map(scalar).collect(),
        Value::Sequence(actions) => actions.iter().filter_map(scalar).collect(),
        other => scalar(other).into_iter().collect(),
    }
}

/// Whether `text` uses "AWS" as a standalone word rather than an entity.
fn has_bare_aws(text: &str) -> bool {
    let bytes = text.as_bytes();
    text.match_indices("AWS").any(|(start, _)| {
        let before = start.checked_sub(1).and_then(|i| bytes.get(i)).copied();
        let after = bytes.get(start + 3).copied();
        !before.is_some_and(|b| b == b'&' || b.is_ascii_alphanumeric())
            && !after.is_some_and(|b| b == b';' || b.is_ascii_alphanumeric())
    })
}

/// Fallback SDK key for languages missing from the registry.
fn property_slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn check_id_format(
    id: &str,
    services: &ServiceActions,
    check_action: bool,
    errors: &mut Vec<MetadataError>,
) {
    let Some((prefix, rest)) = id.split_once('_') else {
        errors.push(ErrorKind::NameFormat.into());
        return;
    };
    let tokens: Vec<&str> = rest.split('_').collect();

    if !services.contains_key(prefix) && !FREE_PREFIXES.contains(&prefix) {
        errors.push(
            ErrorKind::ServiceNameFormat {
                service: prefix.to_string(),
                services: services.keys().cloned().collect(),
            }
            .into(),
        );
    } else if check_action {
        let declared = services
            .get(prefix)
            .is_some_and(|actions| tokens.first().is_some_and(|action| actions.contains(*action)));
        if tokens.len() > 1 || !declared {
            errors.push(ErrorKind::ActionNameFormat.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Service, ServiceExpanded, SdkVersion};

    fn service(id: &str, name: &str) -> (String, Service) {
        let service = Service {
            long: format!("&{name}long;"),
            short: format!("&{name};"),
            expanded: ServiceExpanded {
                long: format!("Amazon {name} (long)"),
                short: format!("Amazon {name}"),
            },
            sort: name.to_string(),
            version: "1".to_string(),
            ..Service::default()
        };
        (id.to_string(), service)
    }

    fn sdk(name: &str, versions: &[u32]) -> (String, Sdk) {
        let sdk = Sdk {
            name: name.to_string(),
            property: String::new(),
            guide: None,
            versions: versions
                .iter()
                .map(|&version| SdkVersion {
                    version,
                    ..SdkVersion::default()
                })
                .collect(),
        };
        (name.to_string(), sdk)
    }

    fn registries() -> Registries {
        Registries::new(
            BTreeMap::from([
                sdk("C++", &[]),
                sdk("Java", &[]),
                sdk("JavaScript", &[]),
                sdk("PHP", &[]),
                sdk("Kotlin", &[1]),
            ]),
            BTreeMap::from([
                service("ses", "SES"),
                service("sns", "SNS"),
                service("sqs", "SQS"),
                service("s3", "S3"),
            ]),
        )
    }

    fn blocks() -> BTreeSet<String> {
        BTreeSet::from(["test/block".to_string(), "cross_DeleteTopic_block.xml".to_string()])
    }

    fn run(source: &str, validation: ValidationConfig) -> (Vec<Example>, Vec<MetadataError>) {
        parse_document("test_metadata.yaml", source, &registries(), &blocks(), validation).unwrap()
    }

    fn kinds(errors: &[MetadataError]) -> Vec<&ErrorKind> {
        errors.iter().map(|e| &e.kind).collect()
    }

    const GOOD_SINGLE_CPP: &str = r"
sns_DeleteTopic:
   title: Deleting an &SNS; topic
   title_abbrev: Deleting a topic
   synopsis: |-
     Shows how to delete an &SNS; topic.
   languages:
     C++:
       versions:
         - sdk_version: 1
           github: cpp/example_code/sns
           sdkguide: sdkguide/link
           excerpts:
             - description: test excerpt description
               snippet_tags:
                 - test.excerpt
   services:
     sns:
       ? Operation1
       ? Operation2
     ses: { Operation1, Operation2 }
     sqs:
";

    #[test]
    fn test_parse_single_example() {
        let (examples, errors) = run(GOOD_SINGLE_CPP, ValidationConfig::default());
        assert!(errors.is_empty(), "{errors:?}");

        let operations = BTreeSet::from(["Operation1".to_string(), "Operation2".to_string()]);
        let expected = Example {
            id: "sns_DeleteTopic".into(),
            file: "test_metadata.yaml".into(),
            title: "Deleting an &SNS; topic".into(),
            title_abbrev: "Deleting a topic".into(),
            synopsis: "Shows how to delete an &SNS; topic.".into(),
            category: Category::Cross,
            services: ServiceActions::from([
                ("ses".into(), operations.clone()),
                ("sns".into(), operations),
                ("sqs".into(), BTreeSet::new()),
            ]),
            languages: BTreeMap::from([(
                "C++".to_string(),
                Language {
                    name: "C++".into(),
                    property: "c__".into(),
                    versions: vec![Version {
                        sdk_version: 1,
                        github: Some("cpp/example_code/sns".into()),
                        sdkguide: Some("sdkguide/link".into()),
                        excerpts: vec![Excerpt {
                            description: Some("test excerpt description".into()),
                            snippet_tags: vec!["test.excerpt".into()],
                            ..Excerpt::default()
                        }],
                        ..Version::default()
                    }],
                },
            )]),
            ..Example::default()
        };
        assert_eq!(examples, vec![expected]);
    }

    #[test]
    fn test_parse_cross_with_block_content() {
        let source = r"
cross_DeleteTopic:
  title: Delete Topic
  title_abbrev: delete topic
  category: Cross-service examples
  languages:
     Java:
       versions:
         - sdk_version: 3
           block_content: cross_DeleteTopic_block.xml
  services:
     sns:
";
        let (examples, errors) = run(source, ValidationConfig::default());
        assert!(errors.is_empty(), "{errors:?}");

        let example = &examples[0];
        assert_eq!(
            example.category,
            Category::Other("Cross-service examples".into())
        );
        assert_eq!(example.synopsis, "");
        assert_eq!(example.services["sns"], BTreeSet::new());
        assert_eq!(
            example.languages["Java"].versions[0].block_content.as_deref(),
            Some("cross_DeleteTopic_block.xml")
        );
    }

    #[test]
    fn test_parse_curated_keeps_source_key() {
        let source = r"
autogluon_tabular_with_sagemaker_pipelines:
  title: AutoGluon Tabular with SageMaker Pipelines
  title_abbrev: AutoGluon Tabular with SageMaker Pipelines
  synopsis: use AutoGluon with SageMaker Pipelines.
  source_key: amazon-sagemaker-examples
  category: Curated examples
  guide_topic:
    title: Test guide topic title
    url: test-guide/url
  languages:
     Java:
       versions:
         - sdk_version: 2
           block_content: test/block
  services:
     s3:
";
        let (examples, errors) = run(source, ValidationConfig::default());

        // The id prefix names no declared service.
        assert_eq!(
            kinds(&errors),
            vec![&ErrorKind::ServiceNameFormat {
                service: "autogluon".into(),
                services: vec!["s3".into()],
            }]
        );
        assert_eq!(
            examples[0].source_key.as_deref(),
            Some("amazon-sagemaker-examples")
        );
        assert_eq!(
            examples[0].guide_topic,
            Some(Url {
                title: "Test guide topic title".into(),
                url: Some("test-guide/url".into()),
            })
        );
    }

    const ERRORS: &str = r#"
sqs_WrongServiceSlug:
  title: Wrong
  title_abbrev: Wrong
  languages:
    Perl:
      versions:
        - sdk_version: 1
          sdkguide: "https://docs.aws.amazon.com/absolute/link-to-my-guide"
          add_services:
            s3:
  services:
    sqs:
sns_TestExample2:
  title: Title
  title_abbrev: Title
  synopsis: does a thing.
  category: Usage
  languages:
    Java:
      versions:
        - sdk_version: 2
          github: github/link/to/README.md
          block_content: test/block
  services:
    sns:
    garbled:
snsBadFormat:
  title: Bad
  title_abbrev: Bad
  category: Usage
  languages:
    Java:
      versions:
        - sdk_version: 2
          block_content: missing_block_content.xml
  services:
    sns:
"#;

    #[test]
    fn test_common_errors() {
        let (examples, errors) = run(ERRORS, ValidationConfig::default());

        assert_eq!(examples.len(), 3);
        assert_eq!(
            kinds(&errors),
            vec![
                &ErrorKind::ApiMustHaveOneServiceOneAction {
                    svc_actions: String::new()
                },
                &ErrorKind::UnknownLanguage {
                    language: "Perl".into()
                },
                &ErrorKind::InvalidSdkGuideStart {
                    guide: "https://docs.aws.amazon.com/absolute/link-to-my-guide".into()
                },
                &ErrorKind::MissingBlockContentAndExcerpt,
                &ErrorKind::ApiExampleCannotAddService,
                &ErrorKind::UnknownService {
                    service: "garbled".into()
                },
                &ErrorKind::InvalidGithubLink {
                    link: "github/link/to/README.md".into()
                },
                &ErrorKind::MissingCrossContent {
                    block: "missing_block_content.xml".into()
                },
                &ErrorKind::NameFormat,
            ]
        );

        let guide = &errors[2];
        assert_eq!(guide.file.as_deref(), Some("test_metadata.yaml"));
        assert_eq!(guide.id.as_deref(), Some("sqs_WrongServiceSlug"));
        assert_eq!(guide.language.as_deref(), Some("Perl"));
        assert_eq!(guide.sdk_version, Some(1));

        let unknown = &errors[5];
        assert_eq!(unknown.id.as_deref(), Some("sns_TestExample2"));
        assert_eq!(unknown.language, None);

        assert_eq!(errors[8].id.as_deref(), Some("snsBadFormat"));
    }

    #[test]
    fn test_missing_fields() {
        let (_, errors) = run(
            "sns_EmptyExample:\n  services:\n    sns: { Publish }\n  languages:\n    Java:\n      versions:\n        - excerpts: []\n",
            ValidationConfig::default(),
        );
        assert_eq!(
            kinds(&errors),
            vec![
                &ErrorKind::MissingField {
                    field: "sdk_version".into()
                },
                &ErrorKind::MissingBlockContentAndExcerpt,
            ]
        );
        assert_eq!(errors[0].sdk_version, None);

        let (_, errors) = run("cross_Empty:\n  category: Usage\n", ValidationConfig::default());
        assert_eq!(
            kinds(&errors),
            vec![&ErrorKind::MissingField {
                field: "languages".into()
            }]
        );
    }

    #[test]
    fn test_block_content_and_excerpts_are_exclusive() {
        let both = r"
sns_Publish:
  services: { sns: { Publish } }
  languages:
    Java:
      versions:
        - sdk_version: 2
          block_content: test/block
          excerpts:
            - snippet_tags: [java.sns.publish]
";
        let (_, errors) = run(both, ValidationConfig::default());
        assert_eq!(kinds(&errors), vec![&ErrorKind::BlockContentAndExcerptConflict]);

        let neither = r"
sns_Publish:
  services: { sns: { Publish } }
  languages:
    Java:
      versions:
        - sdk_version: 2
";
        let (_, errors) = run(neither, ValidationConfig::default());
        assert_eq!(kinds(&errors), vec![&ErrorKind::MissingBlockContentAndExcerpt]);
    }

    #[test]
    fn test_strict_titles() {
        let source = r"
sns_Publish:
  title: Publish a message
  services: { sns: { Publish } }
  languages:
    Java:
      versions:
        - sdk_version: 2
          block_content: test/block
sns_Publish_Batch:
  services: { sns: { PublishBatch } }
  languages:
    Java:
      versions:
        - sdk_version: 2
          block_content: test/block
sns_Basics:
  title: Learn the basics
  category: Basics
  services: { sns: { Publish } }
  languages:
    Java:
      versions:
        - sdk_version: 2
          block_content: test/block
sns_Usage:
  title: Use topics
  synopsis_list: [Create a topic.]
  category: Usage
  services: { sns: }
  languages:
    Java:
      versions:
        - sdk_version: 2
          block_content: test/block
";
        let (_, errors) = run(source, ValidationConfig::strict());
        let found: Vec<_> = errors
            .iter()
            .map(|e| (e.id.as_deref().unwrap_or_default(), &e.kind))
            .collect();
        assert_eq!(
            found,
            vec![
                ("sns_Publish", &ErrorKind::ApiCannotHaveTitleFields),
                ("sns_Publish_Batch", &ErrorKind::ActionNameFormat),
                ("sns_Basics", &ErrorKind::BasicsMustHaveSynopsis),
                ("sns_Usage", &ErrorKind::NonApiMustHaveTitleFields),
            ]
        );

        let (_, errors) = run(source, ValidationConfig::default());
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_authored_strings_use_entities() {
        let source = r"
sns_Usage:
  title: Use the AWS SDK with &Nope;
  title_abbrev: Use &AWS; and AWSJavaScriptSDK
  synopsis: publish to &SNS; in an &AWS-Region;.
  category: Usage
  services: { sns: }
  languages:
    Java:
      versions:
        - sdk_version: 2
          block_content: test/block
";
        let (examples, errors) = run(source, ValidationConfig::default());
        assert_eq!(
            kinds(&errors),
            vec![
                &ErrorKind::AwsNotEntity {
                    field: "title".into(),
                    value: "Use the AWS SDK with &Nope;".into()
                },
                &ErrorKind::UnknownEntity {
                    field: "title".into(),
                    entity: "&Nope;".into()
                },
            ]
        );
        assert_eq!(examples[0].title, "Use the AWS SDK with &Nope;");
    }

    #[test]
    fn test_service_shapes() {
        let source = r"
cross_List:
  title: t
  title_abbrev: t
  services: [sns, sqs, nope]
  languages:
    Java:
      versions:
        - sdk_version: 2
          block_content: test/block
cross_Scalar:
  title: t
  title_abbrev: t
  services: sns
  languages:
    Java:
      versions:
        - sdk_version: 2
          block_content: test/block
";
        let (examples, errors) = run(source, ValidationConfig::default());
        assert_eq!(
            examples[0].services.keys().collect::<Vec<_>>(),
            vec!["sns", "sqs"]
        );
        assert_eq!(examples[0].category, Category::Cross);
        assert!(examples[1].services.is_empty());
        assert_eq!(
            kinds(&errors),
            vec![
                &ErrorKind::UnknownService {
                    service: "nope".into()
                },
                &ErrorKind::InvalidFieldType {
                    field: "services".into(),
                    expected: "a mapping of services to actions"
                },
            ]
        );
    }

    #[test]
    fn test_sdk_versions_checked_against_registry() {
        let source = r"
sns_Publish:
  services: { sns: { Publish } }
  languages:
    Kotlin:
      versions:
        - sdk_version: 3
          block_content: test/block
        - sdk_version: two
          block_content: test/block
        - sdk_version: 1
          block_content: test/block
";
        let (examples, errors) = run(source, ValidationConfig::default());
        assert_eq!(
            kinds(&errors),
            vec![
                &ErrorKind::InvalidSdkVersion { value: "3".into() },
                &ErrorKind::InvalidSdkVersion { value: "two".into() },
            ]
        );
        assert_eq!(errors[0].sdk_version, Some(3));
        assert_eq!(errors[1].sdk_version, None);
        assert_eq!(examples[0].languages["Kotlin"].versions.len(), 3);
    }

    #[test]
    fn test_excerpt_details() {
        let source = r"
sns_Publish:
  services: { sns: { Publish } }
  languages:
    PHP:
      versions:
        - sdk_version: 3
          excerpts:
            - snippet_files: [php/sns/publish.php]
              genai: most
            - snippet_tags: [php.sns.publish]
              genai: lots
          more_info:
            - title: Publishing
              url: sns/latest/dg/publish.html
            - url: sns/untitled.html
";
        let (examples, errors) = run(source, ValidationConfig::default());
        assert_eq!(
            kinds(&errors),
            vec![
                &ErrorKind::InvalidGenai {
                    value: "lots".into()
                },
                &ErrorKind::UrlMissingTitle {
                    url: "sns/untitled.html".into()
                },
            ]
        );

        let version = &examples[0].languages["PHP"].versions[0];
        assert_eq!(version.excerpts[0].genai, Genai::Most);
        assert_eq!(version.excerpts[1].genai, Genai::None);
        assert_eq!(version.more_info.len(), 1);
    }

    #[test]
    fn test_id_format() {
        let services = ServiceActions::from([(
            "test".to_string(),
            BTreeSet::from(["Test".to_string()]),
        )]);
        let check = |id: &str, check_action: bool| {
            let mut errors = Vec::new();
            check_id_format(id, &services, check_action, &mut errors);
            errors.into_iter().map(|e| e.kind).collect::<Vec<_>>()
        };

        assert!(check("serverless_Snippet", false).is_empty());
        assert!(check("test_Test", true).is_empty());
        assert!(check("cross_Cross", false).is_empty());
        assert_eq!(check("test", false), vec![ErrorKind::NameFormat]);
        assert!(matches!(
            check("other_Other", false).as_slice(),
            [ErrorKind::ServiceNameFormat { .. }]
        ));
        assert_eq!(check("test_Other", true), vec![ErrorKind::ActionNameFormat]);
        assert_eq!(check("test_Test_Extra", true), vec![ErrorKind::ActionNameFormat]);
        assert!(check("test_Test_Extra", false).is_empty());
    }

    #[test]
    fn test_bare_aws() {
        assert!(has_bare_aws("AWS"));
        assert!(has_bare_aws("the AWS SDK"));
        assert!(has_bare_aws("AWS-Region"));
        assert!(!has_bare_aws("&AWS;"));
        assert!(!has_bare_aws("AWSJavaScriptSDK"));
        assert!(!has_bare_aws("NOAWS"));
    }

    #[test]
    fn test_malformed_document() {
        let result = parse_document(
            "broken.yaml",
            "key: [unclosed",
            &registries(),
            &blocks(),
            ValidationConfig::default(),
        );
        assert!(matches!(result, Err(DocumentError::Yaml { .. })));
    }
}
