//! Per-file index record

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::Symbol;

/// Symbols of one file, tagged with the modification time they were read at.
///
/// The entry can be trusted only while `last_modified_at` equals the file's
/// current on-disk mtime; otherwise it is stale and must be recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIndexEntry {
    pub path: PathBuf,
    pub symbols: Vec<Symbol>,
    pub last_modified_at: SystemTime,
}

impl FileIndexEntry {
    pub fn new(path: impl Into<PathBuf>, symbols: Vec<Symbol>, last_modified_at: SystemTime) -> Self {
        Self {
            path: path.into(),
            symbols,
            last_modified_at,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the symbol list after a re-extraction
    pub fn update(&mut self, symbols: Vec<Symbol>, last_modified_at: SystemTime) {
        self.symbols = symbols;
        self.last_modified_at = last_modified_at;
    }

    /// Whether the entry still matches a file with the given mtime
    pub fn is_fresh(&self, current_mtime: SystemTime) -> bool {
        self.last_modified_at == current_mtime
    }

    /// Symbols with exactly this name, in extraction order
    pub fn symbols_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.symbols.iter().filter(move |symbol| symbol.name == name)
    }
}
