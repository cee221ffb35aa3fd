//! Python symbol extraction

pub mod extractor;

pub use extractor::PythonExtractor;

use crate::parsing::ExtractorRegistry;
use std::sync::Arc;

/// Register the Python extractor with the registry
pub(crate) fn register(registry: &mut ExtractorRegistry) {
    registry.register(Arc::new(PythonExtractor::new()));
}
