//! On-disk cache of a project's file entries
//!
//! One JSON document per project. A format tag and version number come first
//! so an unknown or outdated cache is detected and rebuilt instead of being
//! half-read.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::indexing::{EntryMap, FileIndexEntry};
use crate::{IndexError, IndexResult};

pub const CACHE_FORMAT: &str = "defindex-cache";

/// Bump when the shape of [`FileIndexEntry`] or [`CacheFile`] changes.
pub const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    pub format: String,
    pub version: u32,
    /// Unix timestamp (seconds) of when the cache was written
    pub created_at: i64,
    pub entries: Vec<FileIndexEntry>,
}

/// Just enough of the document to validate it before a full decode.
#[derive(Deserialize)]
struct CacheHeader {
    format: String,
    version: u32,
}

impl CacheFile {
    pub fn new(entries: Vec<FileIndexEntry>) -> Self {
        Self {
            format: CACHE_FORMAT.to_string(),
            version: CACHE_FORMAT_VERSION,
            created_at: chrono::Utc::now().timestamp(),
            entries,
        }
    }

    pub fn from_entries(entries: &EntryMap) -> Self {
        Self::new(entries.values().cloned().collect())
    }

    pub fn into_entries(self) -> EntryMap {
        self.entries
            .into_iter()
            .map(|entry| (entry.path.clone(), entry))
            .collect()
    }

    /// Read a cache file. `Ok(None)` means there is no cache yet.
    pub fn read(path: &Path) -> IndexResult<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }

        let corrupted = |reason: String| IndexError::CacheCorrupted {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = fs::read(path).map_err(|e| corrupted(format!("unreadable: {e}")))?;

        let header: CacheHeader = serde_json::from_slice(&bytes)
            .map_err(|e| corrupted(format!("invalid header: {e}")))?;
        if header.format != CACHE_FORMAT {
            return Err(corrupted(format!("unknown format '{}'", header.format)));
        }
        if header.version != CACHE_FORMAT_VERSION {
            return Err(corrupted(format!(
                "format version {} (expected {CACHE_FORMAT_VERSION})",
                header.version
            )));
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| corrupted(format!("invalid entries: {e}")))
    }

    /// Write atomically: a sibling temp file is renamed over `path`.
    pub fn write(&self, path: &Path) -> IndexResult<()> {
        let write_error = |source: std::io::Error| IndexError::CacheWrite {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let json = serde_json::to_vec(self)
            .map_err(|e| write_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        let tmp_path = temp_path(path);
        let result = fs::File::create(&tmp_path)
            .and_then(|mut file| {
                file.write_all(&json)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp_path, path));

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_error(e));
        }

        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Load the entries stored at `path`.
///
/// A missing cache gives an empty map. A corrupt or outdated one is deleted
/// and also gives an empty map; the caller only loses a rescan.
pub fn load_or_discard(path: &Path) -> EntryMap {
    match CacheFile::read(path) {
        Ok(Some(cache)) => {
            let entries = cache.into_entries();
            tracing::debug!(
                "[cache] loaded {} entries from {}",
                entries.len(),
                path.display()
            );
            entries
        }
        Ok(None) => {
            tracing::debug!("[cache] no cache at {}", path.display());
            EntryMap::new()
        }
        Err(e) => {
            tracing::warn!("[cache] {e}; removing it");
            if let Err(remove_err) = fs::remove_file(path) {
                tracing::warn!(
                    "[cache] failed to remove {}: {remove_err}",
                    path.display()
                );
            }
            EntryMap::new()
        }
    }
}
