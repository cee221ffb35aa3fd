//! Shared fixtures for integration tests

#![allow(dead_code)]

use defindex::{
    ExtractorRegistry, FsSourceProvider, IndexConfig, ParseError, ProjectIndex, PythonExtractor,
    SourceProvider, Symbol, SymbolExtractor,
};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

/// Filesystem provider that counts directory walks.
#[derive(Default)]
pub struct CountingProvider {
    inner: FsSourceProvider,
    walks: AtomicUsize,
}

impl CountingProvider {
    pub fn walks(&self) -> usize {
        self.walks.load(Ordering::SeqCst)
    }
}

impl SourceProvider for CountingProvider {
    fn walk<'a>(
        &'a self,
        root: &'a Path,
        ignored_dirs: &'a HashSet<String>,
    ) -> Box<dyn Iterator<Item = PathBuf> + 'a> {
        self.walks.fetch_add(1, Ordering::SeqCst);
        self.inner.walk(root, ignored_dirs)
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.inner.read_file(path)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        self.inner.modified(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }
}

/// Python extractor that counts how many files it was asked to parse.
#[derive(Default)]
pub struct CountingExtractor {
    inner: PythonExtractor,
    calls: AtomicUsize,
}

impl CountingExtractor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SymbolExtractor for CountingExtractor {
    fn language(&self) -> &'static str {
        "Python (counting)"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn extract(&self, source: &str) -> Result<Vec<Symbol>, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.extract(source)
    }
}

/// A project index wired to counting collaborators.
pub struct Instrumented {
    pub index: ProjectIndex,
    pub provider: Arc<CountingProvider>,
    pub extractor: Arc<CountingExtractor>,
}

pub fn instrumented(root: &Path, config: IndexConfig) -> Instrumented {
    let provider = Arc::new(CountingProvider::default());
    let extractor = Arc::new(CountingExtractor::default());

    let mut registry = ExtractorRegistry::new();
    registry.register(extractor.clone());

    let index = ProjectIndex::open(root, config, provider.clone(), Arc::new(registry));
    Instrumented {
        index,
        provider,
        extractor,
    }
}

/// Config that never rate-limits rescans
pub fn eager_config() -> IndexConfig {
    IndexConfig {
        rescan_interval_secs: 0,
        ..IndexConfig::default()
    }
}

/// Write a file, creating parent directories.
pub fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Rewrite a file with its own content and move its mtime forward.
pub fn touch(path: &Path) {
    let content = fs::read(path).unwrap();
    fs::write(path, content).unwrap();
    bump_mtime(path);
}

/// Move a file's mtime a few seconds forward so coarse clocks still differ.
pub fn bump_mtime(path: &Path) {
    let file = fs::File::options().write(true).open(path).unwrap();
    let current = file.metadata().unwrap().modified().unwrap();
    file.set_modified(current + Duration::from_secs(5)).unwrap();
}

/// Canonical project root with a `.git` marker directory.
pub fn project_root(temp_dir: &tempfile::TempDir) -> PathBuf {
    let root = temp_dir.path().canonicalize().unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    root
}
