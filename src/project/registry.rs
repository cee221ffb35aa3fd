//! Project root discovery and the root -> index registry.
//!
//! A registry is an explicit value owned by the host rather than a global, so
//! independent hosts (and tests) never share indexes by accident.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::IndexConfig;
use crate::indexing::{FsSourceProvider, ProjectIndex, SourceProvider};
use crate::parsing::ExtractorRegistry;

/// Find the project root for a file.
///
/// Starting at the file's directory and walking upward, the first directory
/// containing one of `marker_dirs` as a subdirectory is the root. The
/// filesystem root itself is never considered a project.
pub fn find_project_root(file_path: &Path, marker_dirs: &[String]) -> Option<PathBuf> {
    let absolute = std::path::absolute(file_path).ok()?;
    let dir = absolute.parent()?;
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());

    dir.ancestors()
        .filter(|ancestor| ancestor.parent().is_some())
        .find(|ancestor| marker_dirs.iter().any(|marker| ancestor.join(marker).is_dir()))
        .map(Path::to_path_buf)
}

/// Maps each project root to its single [`ProjectIndex`].
///
/// Indexes are created lazily on first use and kept until evicted.
pub struct ProjectRegistry {
    config: IndexConfig,
    provider: Arc<dyn SourceProvider>,
    extractors: Arc<ExtractorRegistry>,
    projects: DashMap<PathBuf, Arc<ProjectIndex>>,
}

impl std::fmt::Debug for ProjectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectRegistry")
            .field("projects", &self.roots())
            .field("extractors", &self.extractors)
            .finish()
    }
}

impl ProjectRegistry {
    pub fn new(
        config: IndexConfig,
        provider: Arc<dyn SourceProvider>,
        extractors: Arc<ExtractorRegistry>,
    ) -> Self {
        Self {
            config,
            provider,
            extractors,
            projects: DashMap::new(),
        }
    }

    /// Registry over the local filesystem with the built-in extractors
    pub fn with_defaults(config: IndexConfig) -> Self {
        Self::new(
            config,
            Arc::new(FsSourceProvider::new()),
            Arc::new(ExtractorRegistry::with_defaults()),
        )
    }

    /// Index of the project containing `file_path`, if it is in a project.
    pub fn project_for(&self, file_path: &Path) -> Option<Arc<ProjectIndex>> {
        let Some(root) = find_project_root(file_path, &self.config.marker_dirs) else {
            tracing::debug!("[registry] no project for {}", file_path.display());
            return None;
        };
        Some(self.get_or_create(&root))
    }

    /// Cached index for `root`, opening it on first request.
    ///
    /// Concurrent callers for the same root wait on the map shard lock, so
    /// the index (and its cache load) is created exactly once.
    pub fn get_or_create(&self, root: &Path) -> Arc<ProjectIndex> {
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

        let project = self.projects.entry(root.clone()).or_insert_with(|| {
            tracing::debug!("[registry] opening project {}", root.display());
            Arc::new(ProjectIndex::open(
                root.clone(),
                self.config.clone(),
                Arc::clone(&self.provider),
                Arc::clone(&self.extractors),
            ))
        });
        Arc::clone(project.value())
    }

    /// Drop a project from the registry. Holders of its `Arc` keep using it.
    pub fn evict(&self, root: &Path) -> Option<Arc<ProjectIndex>> {
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        self.projects.remove(&root).map(|(_, project)| project)
    }

    /// Roots of all open projects, sorted
    pub fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self.projects.iter().map(|item| item.key().clone()).collect();
        roots.sort();
        roots
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }
}
