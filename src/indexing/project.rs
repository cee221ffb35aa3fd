//! Per-project symbol index with incremental, rate-limited rescans
//!
//! A [`ProjectIndex`] owns the file entries of one project root. Scans build
//! a new entry map from the current snapshot and publish it in one swap, so
//! readers never observe a half-updated index. Scans themselves are
//! serialised: at most one runs per project at any time.

use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tokio_util::sync::CancellationToken;

use crate::config::IndexConfig;
use crate::indexing::{FileIndexEntry, FileOutcome, IndexStats, ScanOutcome, SourceProvider};
use crate::parsing::{ExtractorRegistry, SymbolExtractor};
use crate::storage::{self, CacheFile};
use crate::{IndexError, IndexResult, Symbol, SymbolLocation, debug_event, log_event};

/// Entries keyed by absolute path. Ordered so lookups return results sorted
/// by path.
pub type EntryMap = BTreeMap<PathBuf, FileIndexEntry>;

pub struct ProjectIndex {
    root: PathBuf,
    cache_path: PathBuf,
    config: IndexConfig,
    ignored_dirs: HashSet<String>,
    provider: Arc<dyn SourceProvider>,
    extractors: Arc<ExtractorRegistry>,
    entries: RwLock<Arc<EntryMap>>,
    last_full_scan_at: RwLock<Option<Instant>>,
    /// Held for the whole of a scan or single-file refresh
    scan_lock: Mutex<()>,
    /// Held while reading or writing the cache file
    cache_lock: Mutex<()>,
}

impl std::fmt::Debug for ProjectIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectIndex")
            .field("root", &self.root)
            .field("cache_path", &self.cache_path)
            .field("files", &self.file_count())
            .finish()
    }
}

impl ProjectIndex {
    /// Open the index for `root`, loading its cache if there is one.
    ///
    /// Never fails: an unusable cache is discarded and the index starts
    /// empty. The first non-forced [`index`](Self::index) always walks, even
    /// when entries were loaded.
    pub fn open(
        root: impl Into<PathBuf>,
        config: IndexConfig,
        provider: Arc<dyn SourceProvider>,
        extractors: Arc<ExtractorRegistry>,
    ) -> Self {
        let root = root.into();
        let root = root.canonicalize().unwrap_or(root);
        let cache_path = config.cache_path(&root);

        if let Some(cache_dir) = cache_path.parent() {
            if let Err(e) = std::fs::create_dir_all(cache_dir) {
                tracing::warn!(
                    "[index] failed to create cache directory {}: {e}",
                    cache_dir.display()
                );
            }
        }

        let ignored_dirs = config.ignored_dirs.iter().cloned().collect();
        let index = Self {
            root,
            cache_path,
            config,
            ignored_dirs,
            provider,
            extractors,
            entries: RwLock::new(Arc::new(EntryMap::new())),
            last_full_scan_at: RwLock::new(None),
            scan_lock: Mutex::new(()),
            cache_lock: Mutex::new(()),
        };
        index.load();
        index
    }

    fn load(&self) {
        let loaded = {
            let _cache = self.cache_lock.lock();
            storage::load_or_discard(&self.cache_path)
        };
        debug_event!("index", "loaded", "{} files for {}", loaded.len(), self.root.display());
        *self.entries.write() = Arc::new(loaded);
    }

    /// Persist the current entries to the cache file.
    ///
    /// A failure leaves the in-memory index untouched; only durability is lost.
    pub fn save(&self) -> IndexResult<()> {
        let _cache = self.cache_lock.lock();
        // Taken under the lock so concurrent saves land in publish order
        let snapshot = self.entries();
        CacheFile::from_entries(&snapshot).write(&self.cache_path)?;
        debug_event!("index", "saved", "{} files to {}", snapshot.len(), self.cache_path.display());
        Ok(())
    }

    /// Bring the index up to date with the project tree.
    ///
    /// Unless `force` is set, nothing happens if the previous full scan is
    /// younger than the configured rescan interval. Unchanged files (same
    /// mtime as their entry) are not re-extracted unless `force` is set.
    pub fn index(&self, force: bool) -> ScanOutcome {
        self.index_with_cancel(force, &CancellationToken::new())
    }

    /// [`index`](Self::index) that stops between files once `cancel` fires.
    pub fn index_with_cancel(&self, force: bool, cancel: &CancellationToken) -> ScanOutcome {
        let _scan = self.scan_lock.lock();

        // Checked under the scan lock so queued triggers coalesce into the
        // scan that just finished.
        if !force && self.scanned_within_interval() {
            debug_event!("index", "skipped", "last scan is younger than {:?}", self.config.rescan_interval());
            return ScanOutcome::Skipped;
        }

        let started = Instant::now();
        let mut stats = IndexStats::new();
        let mut entries: EntryMap = (*self.entries()).clone();

        self.prune(&mut entries, &mut stats);

        for path in self.provider.walk(&self.root, &self.ignored_dirs) {
            if cancel.is_cancelled() {
                stats.elapsed = started.elapsed();
                self.publish(entries);
                log_event!("index", "cancelled", "{}: {stats}", self.root.display());
                return ScanOutcome::Cancelled(stats);
            }

            stats.files_seen += 1;
            self.scan_file(&mut entries, &path, force, &mut stats);
        }

        stats.elapsed = started.elapsed();
        self.publish(entries);
        *self.last_full_scan_at.write() = Some(Instant::now());

        log_event!("index", "finished", "{}: {stats}", self.root.display());
        ScanOutcome::Completed(stats)
    }

    /// Re-extract one file right away, regardless of the rescan interval.
    ///
    /// The entry is keyed by `path` as given (made absolute), the same way a
    /// scan keys the files it walks, so symlinks are not resolved.
    pub fn index_file(&self, path: &Path) -> IndexResult<FileOutcome> {
        let path = self.project_path(path).ok_or_else(|| IndexError::OutsideProject {
            path: path.to_path_buf(),
            root: self.root.clone(),
        })?;

        let _scan = self.scan_lock.lock();
        let mut entries: EntryMap = (*self.entries()).clone();

        let outcome = self.refresh_file(&mut entries, &path);
        self.publish(entries);
        Ok(outcome)
    }

    /// `path` as the walk would name it, or `None` if it is not under the root.
    ///
    /// The file itself is never resolved. Its parent directory is
    /// canonicalised only when the lexical path falls outside the root, which
    /// covers roots reached through a symlinked ancestor.
    fn project_path(&self, path: &Path) -> Option<PathBuf> {
        let lexical = normalize(&std::path::absolute(path).ok()?);
        if lexical.starts_with(&self.root) {
            return Some(lexical);
        }

        let parent = lexical.parent()?.canonicalize().ok()?;
        let resolved = parent.join(lexical.file_name()?);
        resolved.starts_with(&self.root).then_some(resolved)
    }

    fn refresh_file(&self, entries: &mut EntryMap, path: &Path) -> FileOutcome {
        let extractor = match self.extractors.find_for_path(path) {
            Some(extractor) if !self.is_ignored(path) => extractor,
            _ => {
                entries.remove(path);
                return FileOutcome::Skipped;
            }
        };

        let extracted = self
            .provider
            .modified(path)
            .map_err(|source| IndexError::FileRead {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|mtime| Ok((mtime, self.extract(path, extractor.as_ref())?)));

        match extracted {
            Ok((mtime, symbols)) if !symbols.is_empty() => {
                let count = symbols.len();
                store(entries, path, symbols, mtime);
                FileOutcome::Indexed(count)
            }
            Ok(_) => {
                entries.remove(path);
                FileOutcome::Removed
            }
            Err(e) => {
                tracing::debug!("[index] {e}");
                entries.remove(path);
                FileOutcome::Removed
            }
        }
    }

    /// Every definition named exactly `name` (case-sensitive).
    ///
    /// Results are ordered by path, then by position within the file.
    pub fn find_symbol_locations(&self, name: &str) -> Vec<SymbolLocation> {
        let snapshot = self.entries();
        snapshot
            .values()
            .flat_map(|entry| {
                entry
                    .symbols_named(name)
                    .map(|symbol| SymbolLocation::new(&entry.path, symbol))
            })
            .collect()
    }

    /// Drop entries for files that are gone, ignored, or not under the root.
    fn prune(&self, entries: &mut EntryMap, stats: &mut IndexStats) {
        entries.retain(|path, _| {
            let keep = path.starts_with(&self.root)
                && !self.is_ignored(path)
                && self.provider.is_file(path);
            if !keep {
                debug_event!("index", "pruned", "{}", path.display());
                stats.removed += 1;
            }
            keep
        });
    }

    fn scan_file(&self, entries: &mut EntryMap, path: &Path, force: bool, stats: &mut IndexStats) {
        let Some(extractor) = self.extractors.find_for_path(path) else {
            stats.unsupported += 1;
            if entries.remove(path).is_some() {
                stats.removed += 1;
            }
            return;
        };

        let mtime = match self.provider.modified(path) {
            Ok(mtime) => mtime,
            Err(e) => {
                tracing::debug!("[index] cannot stat {}: {e}", path.display());
                stats.failed += 1;
                if entries.remove(path).is_some() {
                    stats.removed += 1;
                }
                return;
            }
        };

        let stale = force
            || entries
                .get(path)
                .is_none_or(|entry| !entry.is_fresh(mtime));
        if !stale {
            debug_event!("index", "unchanged", "{}", path.display());
            stats.unchanged += 1;
            return;
        }

        match self.extract(path, extractor.as_ref()) {
            Ok(symbols) if !symbols.is_empty() => {
                debug_event!("index", "indexed", "{} ({} symbols)", path.display(), symbols.len());
                store(entries, path, symbols, mtime);
                stats.reindexed += 1;
            }
            Ok(_) => {
                debug_event!("index", "no symbols", "{}", path.display());
                stats.reindexed += 1;
                if entries.remove(path).is_some() {
                    stats.removed += 1;
                }
            }
            Err(e) => {
                tracing::debug!("[index] {e}");
                stats.failed += 1;
                if entries.remove(path).is_some() {
                    stats.removed += 1;
                }
            }
        }
    }

    fn extract(&self, path: &Path, extractor: &dyn SymbolExtractor) -> IndexResult<Vec<Symbol>> {
        let bytes = self
            .provider
            .read_file(path)
            .map_err(|source| IndexError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;

        extractor
            .extract_bytes(&bytes)
            .map_err(|source| IndexError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    fn publish(&self, entries: EntryMap) {
        *self.entries.write() = Arc::new(entries);
    }

    fn scanned_within_interval(&self) -> bool {
        let interval = self.config.rescan_interval();
        self.last_full_scan_at
            .read()
            .is_some_and(|at| at.elapsed() < interval)
    }

    /// Whether any directory between the root and `path` is ignored
    fn is_ignored(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        let mut components = relative.components().peekable();
        while let Some(component) = components.next() {
            // The last component is the file itself
            if components.peek().is_none() {
                break;
            }
            if let Component::Normal(name) = component {
                if name.to_str().is_some_and(|name| self.ignored_dirs.contains(name)) {
                    return true;
                }
            }
        }
        false
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Immutable snapshot of the current entries
    pub fn entries(&self) -> Arc<EntryMap> {
        Arc::clone(&self.entries.read())
    }

    pub fn entry(&self, path: &Path) -> Option<FileIndexEntry> {
        self.entries.read().get(path).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.entries.read().len()
    }

    pub fn symbol_count(&self) -> usize {
        self.entries
            .read()
            .values()
            .map(|entry| entry.symbols.len())
            .sum()
    }

    /// When the last completed full scan finished, if any
    pub fn last_full_scan_at(&self) -> Option<Instant> {
        *self.last_full_scan_at.read()
    }
}

/// Drop `.` components and fold `..` into its parent without touching the disk.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn store(entries: &mut EntryMap, path: &Path, symbols: Vec<Symbol>, mtime: SystemTime) {
    match entries.get_mut(path) {
        Some(entry) => entry.update(symbols, mtime),
        None => {
            entries.insert(path.to_path_buf(), FileIndexEntry::new(path, symbols, mtime));
        }
    }
}
