//! Symbol extractor trait
//!
//! This module defines the common interface that every language extractor
//! implements to take part in project indexing.

use crate::{ParseError, Symbol};

/// Turns the contents of one source file into a flat symbol list.
///
/// Implementations are pure: they never touch the filesystem, so they can be
/// exercised with string literals and shared freely between scan workers.
pub trait SymbolExtractor: Send + Sync {
    /// Human readable language name, used in log output
    fn language(&self) -> &'static str;

    /// Lower-case file extensions (without the dot) this extractor handles
    fn extensions(&self) -> &'static [&'static str];

    /// Extract every class and function definition in document order.
    ///
    /// A node's own symbol comes before the symbols nested inside it.
    fn extract(&self, source: &str) -> Result<Vec<Symbol>, ParseError>;

    /// Extract from raw file bytes. Non UTF-8 input is a [`ParseError::Encoding`].
    fn extract_bytes(&self, bytes: &[u8]) -> Result<Vec<Symbol>, ParseError> {
        let source = std::str::from_utf8(bytes).map_err(|_| ParseError::Encoding)?;
        self.extract(source)
    }
}
