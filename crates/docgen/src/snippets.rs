//! Extraction of tagged source regions and whole source files.
//!
//! A region is delimited by `snippet-start:[TAG]` and `snippet-end:[TAG]`
//! markers, usually inside comments. Regions nest with strict stack
//! discipline: an end marker must close the innermost open region. Every
//! malformed marker becomes a diagnostic and scanning carries on.

use crate::error::{ErrorKind, MetadataError};
use crate::fs::Fs;
use crate::metadata::Example;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

const START: &str = "snippet-start";
const END: &str = "snippet-end";

/// A resolved region of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// Tag, or normalized path for whole-file snippets.
    pub id: String,
    /// File the code came from.
    pub file: String,
    /// First line of code, 1-based.
    pub line_start: usize,
    /// Last line of code, 1-based and inclusive.
    pub line_end: usize,
    /// The code, with markers and license header removed.
    pub code: String,
}

struct OpenRegion {
    tag: String,
    line: usize,
    reported: bool,
}

/// The tag named by a `kind:[TAG]` marker on `line`, if any.
fn marker<'a>(line: &'a str, kind: &str) -> Option<&'a str> {
    let at = line.find(kind)?;
    let rest = line[at + kind.len()..].strip_prefix(":[")?;
    let end = rest.find(']')?;
    Some(&rest[..end])
}

/// Extracts every tagged region from the lines of one file.
///
/// Region ids are `prefix` followed by the tag. `file` labels the snippets
/// and the diagnostics.
#[must_use]
pub fn parse_snippets(
    lines: &[&str],
    file: &str,
    prefix: &str,
) -> (BTreeMap<String, Snippet>, Vec<MetadataError>) {
    let mut snippets = BTreeMap::new();
    let mut errors = Vec::new();
    let mut stack: Vec<OpenRegion> = Vec::new();

    let report = |kind: ErrorKind, errors: &mut Vec<MetadataError>| {
        errors.push(MetadataError::new(kind).with_file(file));
    };

    for (index, line) in lines.iter().enumerate() {
        let number = index + 1;

        if let Some(tag) = marker(line, START) {
            if let Some(open) = stack.iter_mut().find(|open| open.tag == tag) {
                open.reported = true;
                report(
                    ErrorKind::SnippetDuplicateOpen {
                        tag: tag.to_string(),
                        line: number,
                    },
                    &mut errors,
                );
            } else {
                stack.push(OpenRegion {
                    tag: tag.to_string(),
                    line: number,
                    reported: false,
                });
            }
        } else if let Some(tag) = marker(line, END) {
            match stack.last().map(|open| open.tag.clone()) {
                Some(open) if open == tag => {
                    let Some(region) = stack.pop() else { continue };
                    if region.reported {
                        continue;
                    }
                    let body = &lines[region.line..index];
                    let code = strip_snippet_tags(body);
                    let id = format!("{prefix}{tag}");
                    let snippet = Snippet {
                        id: id.clone(),
                        file: file.to_string(),
                        line_start: region.line + 1,
                        line_end: index,
                        code: strip_spdx_header(&code).join("\n"),
                    };
                    match snippets.entry(id) {
                        Entry::Vacant(entry) => {
                            entry.insert(snippet);
                        }
                        Entry::Occupied(_) => report(
                            ErrorKind::DuplicateSnippetTag {
                                tag: tag.to_string(),
                                other_file: file.to_string(),
                            },
                            &mut errors,
                        ),
                    }
                }
                Some(open) => {
                    // An end naming an outer region closes it and abandons
                    // everything opened inside it.
                    if let Some(depth) = stack.iter().rposition(|region| region.tag == tag) {
                        stack.truncate(depth);
                    }
                    report(
                        ErrorKind::SnippetMismatchedEnd {
                            tag: tag.to_string(),
                            open,
                            line: number,
                        },
                        &mut errors,
                    );
                }
                None => report(
                    ErrorKind::SnippetUnopenedEnd {
                        tag: tag.to_string(),
                        line: number,
                    },
                    &mut errors,
                ),
            }
        }
    }

    for open in stack.into_iter().filter(|open| !open.reported) {
        report(
            ErrorKind::SnippetUnclosed {
                tag: open.tag,
                line: open.line,
            },
            &mut errors,
        );
    }

    (snippets, errors)
}

/// Drops every line that carries a snippet marker.
#[must_use]
pub fn strip_snippet_tags<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    lines
        .iter()
        .filter(|line| !line.contains(START) && !line.contains(END))
        .copied()
        .collect()
}

/// Drops a leading copyright / SPDX license block and one blank line after it.
#[must_use]
pub fn strip_spdx_header<'a, 'b>(lines: &'b [&'a str]) -> &'b [&'a str] {
    let header = lines
        .iter()
        .take_while(|line| line.contains("Copyright") || line.contains("SPDX-License-Identifier"))
        .count();
    if header == 0 {
        return lines;
    }
    let rest = &lines[header..];
    match rest.first() {
        Some(line) if line.trim().is_empty() => &rest[1..],
        _ => rest,
    }
}

/// Reads `path` and extracts its tagged regions.
///
/// An unreadable file is reported as [`ErrorKind::FileRead`].
#[must_use]
pub fn find_snippets<F: Fs + ?Sized>(
    fs: &F,
    path: &Path,
    prefix: &str,
) -> (BTreeMap<String, Snippet>, Vec<MetadataError>) {
    let label = path.display().to_string();
    match fs.read_to_string(path) {
        Ok(source) => {
            let lines: Vec<&str> = source.lines().collect();
            parse_snippets(&lines, &label, prefix)
        }
        Err(err) => {
            let error = MetadataError::new(ErrorKind::FileRead {
                path: label.clone(),
                reason: err.to_string(),
            })
            .with_file(label);
            (BTreeMap::new(), vec![error])
        }
    }
}

/// Extracts the tagged regions of every text file below `root`.
///
/// Files that cannot be read as text are skipped. Snippet files are labelled
/// relative to `root`. A tag defined in two files is reported once per extra
/// definition, and the first definition in walk order is kept.
#[must_use]
pub fn collect_snippets<F: Fs + ?Sized>(
    fs: &F,
    root: &Path,
    prefix: &str,
) -> (BTreeMap<String, Snippet>, Vec<MetadataError>) {
    let mut snippets: BTreeMap<String, Snippet> = BTreeMap::new();
    let mut errors = Vec::new();

    for path in fs.walk_files(root) {
        let source = match fs.read_to_string(&path) {
            Ok(source) => source,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "skipping unreadable file");
                continue;
            }
        };
        if !source.contains(START) && !source.contains(END) {
            continue;
        }

        let label = relative_label(root, &path);
        let lines: Vec<&str> = source.lines().collect();
        let (found, file_errors) = parse_snippets(&lines, &label, prefix);
        errors.extend(file_errors);

        for (id, snippet) in found {
            match snippets.entry(id) {
                Entry::Vacant(entry) => {
                    entry.insert(snippet);
                }
                Entry::Occupied(existing) => errors.push(
                    MetadataError::new(ErrorKind::DuplicateSnippetTag {
                        tag: existing.key().clone(),
                        other_file: existing.get().file.clone(),
                    })
                    .with_file(label.clone()),
                ),
            }
        }
    }

    tracing::debug!(root = %root.display(), snippets = snippets.len(), "collected tagged snippets");
    (snippets, errors)
}

/// The catalog key of a whole-file snippet.
#[must_use]
pub fn snippet_file_key(path: &str, prefix: &str) -> String {
    format!("{prefix}{}", path.replace(['/', '\\'], "."))
}

/// Resolves every `snippet_files` reference of `examples` against `roots`.
///
/// The first root holding a file wins. A file found in no root is a
/// [`ErrorKind::FileRead`] error, reported once, against the first example
/// that references it.
#[must_use]
pub fn collect_snippet_files<'e, F: Fs + ?Sized>(
    fs: &F,
    examples: impl IntoIterator<Item = &'e Example>,
    roots: &[PathBuf],
    prefix: &str,
) -> (BTreeMap<String, Snippet>, Vec<MetadataError>) {
    let mut snippets = BTreeMap::new();
    let mut errors = Vec::new();
    let mut seen = BTreeSet::new();

    for example in examples {
        for file in example.excerpts().flat_map(|excerpt| &excerpt.snippet_files) {
            if !seen.insert(file.clone()) {
                continue;
            }
            let key = snippet_file_key(file, prefix);
            match read_from_roots(fs, roots, file) {
                Ok(source) => {
                    let lines: Vec<&str> = source.lines().collect();
                    let snippet = Snippet {
                        id: key.clone(),
                        file: file.clone(),
                        line_start: 1,
                        line_end: lines.len(),
                        code: strip_spdx_header(&lines).join("\n"),
                    };
                    snippets.insert(key, snippet);
                }
                Err(reason) => errors.push(
                    MetadataError::new(ErrorKind::FileRead {
                        path: file.clone(),
                        reason,
                    })
                    .with_file(example.file.clone())
                    .with_id(example.id.clone()),
                ),
            }
        }
    }

    (snippets, errors)
}

fn read_from_roots<F: Fs + ?Sized>(fs: &F, roots: &[PathBuf], file: &str) -> Result<String, String> {
    let Some(path) = roots
        .iter()
        .map(|root| root.join(file))
        .find(|path| fs.exists(path))
    else {
        return Err("not found in any root".to_string());
    };
    fs.read_to_string(&path).map_err(|err| err.to_string())
}

fn relative_label(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
