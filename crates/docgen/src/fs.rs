//! File-system access used by catalog loading and snippet extraction.
//!
//! Everything that touches disk goes through [`Fs`], so the same pipeline runs
//! against a real tree ([`PathFs`]) or an in-memory one ([`RecordFs`]).

use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Read-only view of a file tree.
pub trait Fs {
    /// Reads a whole file as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file is missing, unreadable,
    /// or not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Whether a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Files directly inside `dir`, sorted. A missing directory has none.
    fn list_files(&self, dir: &Path) -> Vec<PathBuf>;

    /// Every non-hidden file below `root`, sorted.
    fn walk_files(&self, root: &Path) -> Vec<PathBuf>;
}

/// The real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathFs;

impl Fs for PathFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_files(&self, dir: &Path) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(dir = %dir.display(), error = %err, "directory not listed");
                return Vec::new();
            }
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| entry.path())
            .collect();
        files.sort();
        files
    }

    fn walk_files(&self, root: &Path) -> Vec<PathBuf> {
        let walker = WalkBuilder::new(root)
            .standard_filters(true)
            .follow_links(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "walk entry error");
                    continue;
                }
            };
            if entry.file_type().is_some_and(|t| t.is_file()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        files
    }
}

/// An in-memory file tree keyed by path.
#[derive(Debug, Clone, Default)]
pub struct RecordFs {
    files: BTreeMap<PathBuf, String>,
}

impl RecordFs {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, builder style.
    #[must_use]
    pub fn with(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    /// Adds or replaces a file.
    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl<P: Into<PathBuf>, C: Into<String>> FromIterator<(P, C)> for RecordFs {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        Self {
            files: iter
                .into_iter()
                .map(|(p, c)| (p.into(), c.into()))
                .collect(),
        }
    }
}

impl Fs for RecordFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not recorded", path.display()),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.keys().any(|file| file.starts_with(path))
    }

    fn list_files(&self, dir: &Path) -> Vec<PathBuf> {
        self.files
            .keys()
            .filter(|file| file.parent() == Some(dir))
            .cloned()
            .collect()
    }

    fn walk_files(&self, root: &Path) -> Vec<PathBuf> {
        self.files
            .keys()
            .filter(|file| {
                file.strip_prefix(root).is_ok_and(|rel| {
                    !rel.components().any(|c| match c {
                        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
                        _ => false,
                    })
                })
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> RecordFs {
        RecordFs::new()
            .with("/project/.doc_gen/metadata/s3_metadata.yaml", "")
            .with("/project/src/main.py", "print()")
            .with("/project/src/lib/util.py", "")
            .with("/other/file.txt", "")
    }

    #[test]
    fn test_walk_skips_hidden_and_foreign() {
        let files = tree().walk_files(Path::new("/project"));
        assert_eq!(
            files,
            vec![
                PathBuf::from("/project/src/lib/util.py"),
                PathBuf::from("/project/src/main.py"),
            ]
        );
    }

    #[test]
    fn test_list_is_shallow() {
        let files = tree().list_files(Path::new("/project/src"));
        assert_eq!(files, vec![PathBuf::from("/project/src/main.py")]);
    }

    #[test]
    fn test_exists_covers_directories() {
        let fs = tree();
        assert!(fs.exists(Path::new("/project/src")));
        assert!(fs.exists(Path::new("/project/src/main.py")));
        assert!(!fs.exists(Path::new("/project/docs")));
        assert!(fs.read_to_string(Path::new("/project/docs/a.md")).is_err());
    }
}
