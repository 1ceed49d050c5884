//! Diagnostics produced while building a catalog.
//!
//! Two families travel through a build: [`MetadataError`] for every parse and
//! validation finding, and [`MergeWarning`] for every conflict the merge engine
//! refuses to resolve silently. A third, narrower channel, [`DocumentError`],
//! aborts the contribution of a single document. All three land in one ordered
//! [`Diagnostics`] list that every stage appends to.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The specific problem behind a [`MetadataError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A required field is absent or empty.
    #[error("missing field {field}")]
    MissingField {
        /// Name of the absent field.
        field: String,
    },

    /// A field is present but holds the wrong YAML shape.
    #[error("field {field} must be {expected}")]
    InvalidFieldType {
        /// Name of the offending field.
        field: String,
        /// Human-readable description of the accepted shape.
        expected: &'static str,
    },

    /// An authored string uses "AWS" outside of an entity.
    #[error("field {field} is '{value}', which has a validation issue: it contains a non-entity usage of \"AWS\".")]
    AwsNotEntity {
        /// Name of the offending field.
        field: String,
        /// The authored text.
        value: String,
    },

    /// An authored string contains a placeholder nobody can expand.
    #[error("field {field} uses entity {entity}, which is neither allowed nor defined by a registry")]
    UnknownEntity {
        /// Name of the offending field.
        field: String,
        /// The placeholder, including `&` and `;`.
        entity: String,
    },

    /// A registry display name must be written as an entity.
    #[error("mapping field {field} with value {value} must be an entity")]
    MappingMustBeEntity {
        /// Name of the offending field.
        field: String,
        /// The literal value found.
        value: String,
    },

    /// A services registry entry has no body.
    #[error("service definition missing body")]
    MissingServiceBody,

    /// An SDK registry entry has no body.
    #[error("sdk definition missing body")]
    MissingSdkBody,

    /// An example id does not split into a prefix and at least one token.
    #[error("name does not match the required format of 'svc_Operation', 'svc_Operation_Specialization', or 'cross_Title'")]
    NameFormat,

    /// An example id's prefix is neither a declared service nor `cross`/`serverless`.
    #[error("name does not match the required format of 'svc_Operation', 'svc_Operation_Specialization', or 'cross_Title' (service {service}, services {})", .services.join(", "))]
    ServiceNameFormat {
        /// The prefix parsed from the id.
        service: String,
        /// The services the example declares.
        services: Vec<String>,
    },

    /// An API example id does not name its declared action.
    #[error("name of API example does not match the required format of 'svc_Action'")]
    ActionNameFormat,

    /// A language is missing from the SDK registry.
    #[error("contains {language} as a language, which is not listed in sdks.yaml")]
    UnknownLanguage {
        /// The unknown language name.
        language: String,
    },

    /// A service is missing from the services registry.
    #[error("has unknown service {service}")]
    UnknownService {
        /// The unknown service id.
        service: String,
    },

    /// An `sdk_version` is malformed or not listed for its SDK.
    #[error("lists version {value}, which is not listed in sdks.yaml")]
    InvalidSdkVersion {
        /// The version as written.
        value: String,
    },

    /// A `block_content` reference names no known cross-content block.
    #[error("missing cross content block {block}")]
    MissingCrossContent {
        /// The block that could not be found.
        block: String,
    },

    /// A version declares both `block_content` and excerpts.
    #[error("contains both block_content and excerpt data. You cannot use both.")]
    BlockContentAndExcerptConflict,

    /// A version declares neither `block_content` nor excerpts.
    #[error("must contain either block_content or excerpt data.")]
    MissingBlockContentAndExcerpt,

    /// A `github` link points at a file instead of a folder.
    #[error("has link {link}, which looks like a file. Links to Github should be to the folder that contains the README that describes the example.")]
    InvalidGithubLink {
        /// The offending link.
        link: String,
    },

    /// A deprecated `sdkguide` link is an absolute documentation URL.
    #[error("contains an sdkguide link of '{guide}'. Use a relative link instead and let the tool insert a 'type=documentation' attribute in the link on your behalf.")]
    InvalidSdkGuideStart {
        /// The offending link.
        guide: String,
    },

    /// An API example lists `add_services`.
    #[error("is an API example but lists additional services in the add_service field.")]
    ApiExampleCannotAddService,

    /// An API example does not declare exactly one service action.
    #[error("is an API example but lists svc:actions as '{svc_actions}'. API examples must contain exactly one service and one action.")]
    ApiMustHaveOneServiceOneAction {
        /// The declared `svc:action` pairs, comma separated.
        svc_actions: String,
    },

    /// An API example authors fields that are generated for it.
    #[error("is an API example and defines title, title_abbrev, or synopsis. API examples cannot define these fields because they are generated.")]
    ApiCannotHaveTitleFields,

    /// A non-API example omits its title fields.
    #[error("is not an API example and does not define title, title_abbrev, or synopsis. Non-API examples must define these fields.")]
    NonApiMustHaveTitleFields,

    /// A basics example omits its synopsis.
    #[error("is a basics example and does not define synopsis or synopsis_list.")]
    BasicsMustHaveSynopsis,

    /// A `more_info` or `guide_topic` link has no title.
    #[error("URL {url} is missing a title")]
    UrlMissingTitle {
        /// The untitled URL.
        url: String,
    },

    /// An excerpt declares an unknown `genai` level.
    #[error("has genai level '{value}', expected one of none, some, most, all")]
    InvalidGenai {
        /// The level as written.
        value: String,
    },

    /// More than one API example claims the same service action.
    #[error("multiple API examples found for service:action {svc_action} ({})", .ids.join(", "))]
    DuplicateApiExample {
        /// The contested `svc:action` pair.
        svc_action: String,
        /// Every colliding example id.
        ids: Vec<String>,
    },

    /// More than one example shares a short title in the same navigation group.
    #[error("title_abbrev '{title_abbrev}' is shared by {}", .ids.join(", "))]
    DuplicateTitleAbbrev {
        /// The shared short title.
        title_abbrev: String,
        /// Every colliding example id.
        ids: Vec<String>,
    },

    /// An excerpt references a snippet tag that was never extracted.
    #[error("excerpt {tag} not found in the snippets folder.")]
    MissingSnippetTag {
        /// The dangling tag.
        tag: String,
    },

    /// An excerpt references a snippet file that was never extracted.
    #[error("snippet file {file} not found.")]
    MissingSnippetFile {
        /// The dangling file reference.
        file: String,
    },

    /// A file explicitly required to exist could not be read.
    #[error("could not read {path}: {reason}")]
    FileRead {
        /// The path that failed.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// A `snippet-start` marker is never closed.
    #[error("snippet-start:[{tag}] at line {line} is never closed")]
    SnippetUnclosed {
        /// The open tag.
        tag: String,
        /// Line of the start marker.
        line: usize,
    },

    /// A `snippet-end` marker closes a tag other than the innermost open one.
    #[error("snippet-end:[{tag}] at line {line} does not close the innermost open tag {open}")]
    SnippetMismatchedEnd {
        /// The tag named by the end marker.
        tag: String,
        /// The innermost open tag.
        open: String,
        /// Line of the end marker.
        line: usize,
    },

    /// A `snippet-end` marker appears with no tag open.
    #[error("snippet-end:[{tag}] at line {line} has no matching snippet-start")]
    SnippetUnopenedEnd {
        /// The tag named by the end marker.
        tag: String,
        /// Line of the end marker.
        line: usize,
    },

    /// A tag is opened again while still open.
    #[error("snippet-start:[{tag}] at line {line} is already open")]
    SnippetDuplicateOpen {
        /// The reopened tag.
        tag: String,
        /// Line of the second start marker.
        line: usize,
    },

    /// A tag is defined in more than one place.
    #[error("snippet tag {tag} is also defined in {other_file}")]
    DuplicateSnippetTag {
        /// The duplicated tag.
        tag: String,
        /// Where the tag was first defined.
        other_file: String,
    },
}

/// A parse or validation finding, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataError {
    /// Document or source file the finding belongs to.
    pub file: Option<String>,
    /// Example (or registry entry) id.
    pub id: Option<String>,
    /// Language the finding was raised under.
    pub language: Option<String>,
    /// SDK version the finding was raised under.
    pub sdk_version: Option<u32>,
    /// What went wrong.
    pub kind: ErrorKind,
}

impl MetadataError {
    /// Creates an error with no provenance attached yet.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            file: None,
            id: None,
            language: None,
            sdk_version: None,
            kind,
        }
    }

    /// Sets the originating file.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets the originating example id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the language context.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the SDK version context.
    #[must_use]
    pub fn with_sdk_version(mut self, sdk_version: u32) -> Self {
        self.sdk_version = Some(sdk_version);
        self
    }
}

impl From<ErrorKind> for MetadataError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "In {} at {}",
            self.file.as_deref().unwrap_or("<unknown>"),
            self.id.as_deref().unwrap_or("<unknown>")
        )?;
        if let Some(language) = &self.language {
            write!(f, " {language}")?;
        }
        if let Some(version) = self.sdk_version {
            write!(f, ":{version}")?;
        }
        write!(f, ", {}", self.kind)
    }
}

impl std::error::Error for MetadataError {}

/// Fills in provenance that inner parsers could not know about.
///
/// Fields already set on an error are left alone.
pub(crate) fn annotate(
    errors: &mut [MetadataError],
    language: Option<&str>,
    sdk_version: Option<u32>,
) {
    for error in errors {
        if let (None, Some(language)) = (&error.language, language) {
            error.language = Some(language.to_string());
        }
        if error.sdk_version.is_none() {
            error.sdk_version = sdk_version;
        }
    }
}

/// The collection a merge refused to overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeConflict {
    /// Both sides define the same SDK.
    #[error("conflict in sdk {name}")]
    Sdk {
        /// SDK name.
        name: String,
    },

    /// Both sides define the same service.
    #[error("conflict in service {name}")]
    Service {
        /// Service id.
        name: String,
    },

    /// Both sides define the same snippet.
    #[error("conflict in snippet {id}")]
    Snippet {
        /// Snippet key.
        id: String,
    },

    /// Both sides define the same entity.
    #[error("conflict in entity {entity}")]
    Entity {
        /// The placeholder.
        entity: String,
    },

    /// Both sides define the same SDK version of one example language.
    #[error("conflict in example {id} {language}:{sdk_version}")]
    Version {
        /// Example id.
        id: String,
        /// Language name.
        language: String,
        /// The shared SDK version.
        sdk_version: u32,
    },

    /// Two different examples were handed to a single example merge.
    #[error("cannot merge example {other_id} into {id}")]
    MismatchedId {
        /// Id of the receiving example.
        id: String,
        /// Id of the incoming example.
        other_id: String,
    },
}

/// A conflict reported by the merge engine. The receiving side always wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeWarning {
    /// Identifier of the receiving (winning) source.
    pub source: String,
    /// Identifier of the incoming (discarded) source.
    pub other_source: String,
    /// What collided.
    pub conflict: MergeConflict,
}

impl MergeWarning {
    /// Whether this finding is a caller bug rather than a data conflict.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.conflict, MergeConflict::MismatchedId { .. })
    }
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Merging {} into {}: {}",
            self.other_source, self.source, self.conflict
        )
    }
}

impl std::error::Error for MergeWarning {}

/// A failure that prevents one document from being parsed at all.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document could not be read.
    #[error("could not read {}: {source}", .path.display())]
    Io {
        /// Path of the document.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML.
    #[error("could not parse {path} as YAML: {source}")]
    Yaml {
        /// Name of the document.
        path: String,
        /// The underlying parse failure.
        #[source]
        source: serde_yaml::Error,
    },

    /// The document parsed, but its top level is not a mapping.
    #[error("{path} must be a mapping at the top level")]
    NotAMapping {
        /// Name of the document.
        path: String,
    },
}

/// One entry of the shared diagnostics list.
#[derive(Debug)]
pub enum Diagnostic {
    /// A parse or validation finding.
    Metadata(MetadataError),
    /// A merge conflict.
    Merge(MergeWarning),
    /// A document that could not be parsed.
    Document(DocumentError),
}

impl Diagnostic {
    /// Whether this entry should fail a strict build.
    #[must_use]
    pub fn is_error(&self) -> bool {
        match self {
            Self::Metadata(_) | Self::Document(_) => true,
            Self::Merge(warning) => warning.is_error(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Metadata(e) => write!(f, "{e}"),
            Self::Merge(w) => write!(f, "{w}"),
            Self::Document(e) => write!(f, "{e}"),
        }
    }
}

impl From<MetadataError> for Diagnostic {
    fn from(value: MetadataError) -> Self {
        Self::Metadata(value)
    }
}

impl From<MergeWarning> for Diagnostic {
    fn from(value: MergeWarning) -> Self {
        Self::Merge(value)
    }
}

impl From<DocumentError> for Diagnostic {
    fn from(value: DocumentError) -> Self {
        Self::Document(value)
    }
}

/// The ordered, append-only list shared by every stage of a build.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one entry.
    pub fn push(&mut self, diagnostic: impl Into<Diagnostic>) {
        self.entries.push(diagnostic.into());
    }

    /// Number of entries of any severity.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that fail a strict build.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|d| d.is_error()).count()
    }

    /// Number of entries that are informational only.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.len() - self.error_count()
    }

    /// Whether any entry fails a strict build.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_error)
    }

    /// Iterates entries in the order they were recorded.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Iterates only the parse and validation findings.
    pub fn metadata_errors(&self) -> impl Iterator<Item = &MetadataError> {
        self.entries.iter().filter_map(|d| match d {
            Diagnostic::Metadata(e) => Some(e),
            _ => None,
        })
    }

    /// Iterates only the merge findings.
    pub fn merge_warnings(&self) -> impl Iterator<Item = &MergeWarning> {
        self.entries.iter().filter_map(|d| match d {
            Diagnostic::Merge(w) => Some(w),
            _ => None,
        })
    }
}

impl<T: Into<Diagnostic>> Extend<T> for Diagnostics {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.entries.extend(iter.into_iter().map(Into::into));
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Diagnostics with {} entries:", self.len())?;
        for entry in &self.entries {
            writeln!(f, "\t{entry}")?;
        }
        Ok(())
    }
}
