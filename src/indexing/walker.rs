//! Source provider: directory walking and file access for the indexer
//!
//! The index never touches the filesystem directly. It goes through a
//! [`SourceProvider`], which lets hosts supply their own view of a project
//! and lets tests count walks and reads.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::{DirEntry, WalkDir};

pub trait SourceProvider: Send + Sync {
    /// Every file under `root`, top-down.
    ///
    /// Directories whose name is in `ignored_dirs` must be pruned when they
    /// are reached, so nothing beneath them is ever visited.
    fn walk<'a>(
        &'a self,
        root: &'a Path,
        ignored_dirs: &'a HashSet<String>,
    ) -> Box<dyn Iterator<Item = PathBuf> + 'a>;

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn modified(&self, path: &Path) -> io::Result<SystemTime>;

    fn is_file(&self, path: &Path) -> bool;
}

/// [`SourceProvider`] backed by the local filesystem.
///
/// Symlinks are followed; `walkdir` reports loops as errors, which are skipped.
#[derive(Debug, Clone, Default)]
pub struct FsSourceProvider;

impl FsSourceProvider {
    pub fn new() -> Self {
        Self
    }
}

fn is_ignored_dir(entry: &DirEntry, ignored_dirs: &HashSet<String>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| ignored_dirs.contains(name))
}

impl SourceProvider for FsSourceProvider {
    fn walk<'a>(
        &'a self,
        root: &'a Path,
        ignored_dirs: &'a HashSet<String>,
    ) -> Box<dyn Iterator<Item = PathBuf> + 'a> {
        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !is_ignored_dir(entry, ignored_dirs))
            .filter_map(|result| match result {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("[walker] skipping unreadable entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(DirEntry::into_path);

        Box::new(walker)
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn ignored(names: &[&str]) -> HashSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_walk_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("pkg/sub")).unwrap();
        fs::write(root.join("main.py"), "def main(): pass").unwrap();
        fs::write(root.join("pkg/util.py"), "def util(): pass").unwrap();
        fs::write(root.join("pkg/sub/deep.py"), "class Deep: pass").unwrap();
        fs::write(root.join("README.md"), "# Test").unwrap();

        let ignored = ignored(&[]);
        let provider = FsSourceProvider::new();
        let files: Vec<_> = provider.walk(root, &ignored).collect();

        assert_eq!(files.len(), 4);
        assert!(files.iter().any(|p| p.ends_with("pkg/sub/deep.py")));
        assert!(files.iter().any(|p| p.ends_with("README.md")));
    }

    #[test]
    fn test_ignored_directories_are_pruned() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::create_dir_all(root.join("src/.git")).unwrap();
        fs::write(root.join(".git/objects/blob.py"), "def hidden(): pass").unwrap();
        fs::write(root.join("src/.git/nested.py"), "def nested(): pass").unwrap();
        fs::write(root.join("src/visible.py"), "def visible(): pass").unwrap();
        // A *file* named like an ignored directory is still walked
        fs::write(root.join("src/.git.py"), "def odd(): pass").unwrap();

        let ignored = ignored(&[".git"]);
        let provider = FsSourceProvider::new();
        let files: Vec<_> = provider.walk(root, &ignored).collect();

        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|p| p.ends_with("src/visible.py")));
        assert!(files.iter().any(|p| p.ends_with("src/.git.py")));
    }

    #[test]
    fn test_root_named_like_ignored_dir_is_walked() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("build");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("a.py"), "def a(): pass").unwrap();

        let ignored = ignored(&["build"]);
        let provider = FsSourceProvider::new();
        assert_eq!(provider.walk(&root, &ignored).count(), 1);
    }

    #[test]
    fn test_walk_is_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for name in ["c.py", "a.py", "b.py"] {
            fs::write(root.join(name), "").unwrap();
        }

        let ignored = ignored(&[]);
        let provider = FsSourceProvider::new();
        let names: Vec<_> = provider
            .walk(root, &ignored)
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.py", "b.py", "c.py"]);
    }

    #[test]
    fn test_file_access() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.py");
        fs::write(&path, "x = 1").unwrap();

        let provider = FsSourceProvider::new();
        assert!(provider.is_file(&path));
        assert!(!provider.is_file(temp_dir.path()));
        assert_eq!(provider.read_file(&path).unwrap(), b"x = 1");
        assert!(provider.modified(&path).is_ok());
        assert!(provider.modified(&temp_dir.path().join("missing.py")).is_err());
    }
}
