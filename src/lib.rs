//! Incremental per-project symbol index for jump-to-definition.
//!
//! Source files are parsed into flat lists of class and function
//! definitions, cached per project on disk, and refreshed by comparing file
//! modification times, so a lookup never re-parses the whole project.
//!
//! # Example
//!
//! ```no_run
//! use defindex::{DefinitionFinder, DefinitionMatch, ProjectRegistry, Settings};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let settings = Settings::load().unwrap_or_default();
//! let registry = Arc::new(ProjectRegistry::with_defaults(settings.index));
//! let finder = DefinitionFinder::new(registry);
//!
//! match finder.find_definition(Path::new("/work/app/src/main.py"), "Config") {
//!     Ok(DefinitionMatch::Single(location)) => println!("{location}"),
//!     Ok(DefinitionMatch::Multiple(locations)) => println!("{} candidates", locations.len()),
//!     Ok(DefinitionMatch::NotFound) => println!("not found"),
//!     Err(e) if e.is_not_applicable() => println!("not in a project"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

pub mod config;
pub mod definition;
pub mod error;
pub mod indexing;
pub mod logging;
pub mod parsing;
pub mod project;
pub mod storage;
pub mod types;

pub use config::{IndexConfig, LoggingConfig, Settings};
pub use definition::{DefinitionFinder, DefinitionMatch, query_symbol};
pub use error::{IndexError, IndexResult, ParseError};
pub use indexing::{
    EntryMap, FileIndexEntry, FileOutcome, FsSourceProvider, IndexStats, ProjectIndex,
    ScanOutcome, SourceProvider,
};
pub use parsing::{ExtractorRegistry, PythonExtractor, SymbolExtractor};
pub use project::{ProjectRegistry, find_project_root};
pub use types::{Symbol, SymbolKind, SymbolLocation};
