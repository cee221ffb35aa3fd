//! Extension-based extractor dispatch
//!
//! Maps a file extension to the [`SymbolExtractor`] that understands it.
//! Files with no registered extractor are simply not indexable.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::SymbolExtractor;

#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    by_extension: HashMap<String, Arc<dyn SymbolExtractor>>,
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}

impl ExtractorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in extractor
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        super::python::register(&mut registry);
        registry
    }

    /// Register an extractor for all of its extensions.
    ///
    /// Replaces any extractor previously registered for the same extension.
    pub fn register(&mut self, extractor: Arc<dyn SymbolExtractor>) {
        for ext in extractor.extensions() {
            self.by_extension
                .insert(ext.to_ascii_lowercase(), Arc::clone(&extractor));
        }
    }

    /// Extractor for a path, matched case-insensitively on its extension
    pub fn find_for_path(&self, path: &Path) -> Option<Arc<dyn SymbolExtractor>> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.by_extension.get(&ext).cloned()
    }

    pub fn supports(&self, path: &Path) -> bool {
        self.find_for_path(path).is_some()
    }

    /// Registered extensions, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.by_extension.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}
