use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kind of declaration a [`Symbol`] was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    ClassDefinition,
    FunctionDefinition,
    AsyncFunctionDefinition,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::ClassDefinition => "class",
            SymbolKind::FunctionDefinition => "function",
            SymbolKind::AsyncFunctionDefinition => "async function",
        }
    }

    /// True for both plain and async function definitions.
    pub fn is_function(&self) -> bool {
        matches!(
            self,
            SymbolKind::FunctionDefinition | SymbolKind::AsyncFunctionDefinition
        )
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named declaration found by static parsing.
///
/// `line` is 1-based and `column` is a 0-based byte offset into the line,
/// which is what editors expect when scrolling to a definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: String,
    pub line: u32,
    pub column: u32,
}

impl Symbol {
    pub fn new(kind: SymbolKind, name: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            name: name.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} at {}:{}", self.kind, self.name, self.line, self.column)
    }
}

/// Where a symbol is defined. Returned by name lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolLocation {
    pub path: PathBuf,
    pub line: u32,
    pub column: u32,
    pub kind: SymbolKind,
}

impl SymbolLocation {
    pub fn new(path: impl Into<PathBuf>, symbol: &Symbol) -> Self {
        Self {
            path: path.into(),
            line: symbol.line,
            column: symbol.column,
            kind: symbol.kind,
        }
    }

    /// The `(path, line)` pair an editor needs to open and scroll.
    pub fn position(&self) -> (&std::path::Path, u32) {
        (self.path.as_path(), self.line)
    }
}

impl fmt::Display for SymbolLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_symbol_display() {
        let symbol = Symbol::new(SymbolKind::ClassDefinition, "Foo", 1, 0);
        assert_eq!(symbol.to_string(), "class Foo at 1:0");
    }

    #[test]
    fn test_function_kinds() {
        assert!(SymbolKind::FunctionDefinition.is_function());
        assert!(SymbolKind::AsyncFunctionDefinition.is_function());
        assert!(!SymbolKind::ClassDefinition.is_function());
    }

    #[test]
    fn test_location_from_symbol() {
        let symbol = Symbol::new(SymbolKind::FunctionDefinition, "bar", 2, 4);
        let location = SymbolLocation::new("/project/b.py", &symbol);

        assert_eq!(location.position(), (Path::new("/project/b.py"), 2));
        assert_eq!(location.column, 4);
        assert_eq!(location.kind, SymbolKind::FunctionDefinition);
        assert_eq!(location.to_string(), "/project/b.py:2");
    }

    #[test]
    fn test_symbol_kind_serializes_by_name() {
        let json = serde_json::to_string(&SymbolKind::AsyncFunctionDefinition).unwrap();
        assert_eq!(json, "\"AsyncFunctionDefinition\"");
    }
}
