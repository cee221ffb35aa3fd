pub mod entry;
pub mod progress;
pub mod project;
pub mod walker;

pub use entry::FileIndexEntry;
pub use progress::{FileOutcome, IndexStats, ScanOutcome};
pub use project::{EntryMap, ProjectIndex};
pub use walker::{FsSourceProvider, SourceProvider};
