//! Scan statistics and outcomes

use std::time::Duration;

/// Counters collected during one scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    /// Files yielded by the directory walk
    pub files_seen: usize,
    /// Files whose symbols were (re)extracted and stored
    pub reindexed: usize,
    /// Files skipped because their mtime matched the stored entry
    pub unchanged: usize,
    /// Entries dropped (file gone, ignored, failed or without symbols)
    pub removed: usize,
    /// Files with no extractor for their extension
    pub unsupported: usize,
    /// Files that could not be read or parsed
    pub failed: usize,
    pub elapsed: Duration,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files that went through an extractor this scan
    pub fn extracted(&self) -> usize {
        self.reindexed + self.failed
    }
}

impl std::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files seen, {} reindexed, {} unchanged, {} removed, {} failed in {:.2?}",
            self.files_seen, self.reindexed, self.unchanged, self.removed, self.failed, self.elapsed
        )
    }
}

/// Result of [`ProjectIndex::index`](crate::ProjectIndex::index).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The last full scan is younger than the rescan interval
    Skipped,
    Completed(IndexStats),
    /// Stopped early; work done so far is published, the scan time is not
    Cancelled(IndexStats),
}

impl ScanOutcome {
    /// Whether a directory walk actually ran to the end
    pub fn is_completed(&self) -> bool {
        matches!(self, ScanOutcome::Completed(_))
    }

    pub fn stats(&self) -> Option<&IndexStats> {
        match self {
            ScanOutcome::Skipped => None,
            ScanOutcome::Completed(stats) | ScanOutcome::Cancelled(stats) => Some(stats),
        }
    }
}

/// Result of refreshing a single file with
/// [`ProjectIndex::index_file`](crate::ProjectIndex::index_file).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Stored with this many symbols
    Indexed(usize),
    /// File missing, unparsable or without symbols; any entry was dropped
    Removed,
    /// No extractor for the file, or it sits under an ignored directory
    Skipped,
}
