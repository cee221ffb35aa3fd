use crate::parsing::SymbolExtractor;
use crate::{ParseError, Symbol, SymbolKind};
use tree_sitter::{Language, Node, Parser, Tree};

/// Extracts `class` and `def` declarations from Python source.
///
/// Any syntax error makes the whole file unindexable, matching the
/// all-or-nothing behaviour of the Python compiler itself.
#[derive(Clone)]
pub struct PythonExtractor {
    language: Language,
}

impl std::fmt::Debug for PythonExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PythonExtractor")
            .field("language", &"Python")
            .finish()
    }
}

impl PythonExtractor {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn parse(&self, code: &str) -> Result<Tree, ParseError> {
        // Parser is !Sync, so each call gets its own
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseError::Parser(format!("Failed to set Python language: {e}")))?;

        parser
            .parse(code, None)
            .ok_or_else(|| ParseError::Parser("parser produced no tree".to_string()))
    }
}

/// Pre-order walk over the whole tree.
///
/// Iterative, so nesting depth is bounded by the heap and not the stack.
fn collect_symbols(root: Node, code: &str) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    let mut cursor = root.walk();

    loop {
        if let Some(symbol) = definition_symbol(cursor.node(), code) {
            symbols.push(symbol);
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return symbols;
            }
        }
    }
}

fn definition_symbol(node: Node, code: &str) -> Option<Symbol> {
    let kind = match node.kind() {
        "class_definition" => SymbolKind::ClassDefinition,
        "function_definition" if node.child(0).is_some_and(|first| first.kind() == "async") => {
            SymbolKind::AsyncFunctionDefinition
        }
        "function_definition" => SymbolKind::FunctionDefinition,
        _ => return None,
    };

    let name = node.child_by_field_name("name")?;
    let start = node.start_position();
    Some(Symbol::new(
        kind,
        &code[name.byte_range()],
        start.row as u32 + 1,
        start.column as u32,
    ))
}

impl Default for PythonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First ERROR or MISSING node in document order.
///
/// Only descends into subtrees that contain an error.
fn first_error(root: Node) -> Option<Node> {
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }

        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

impl SymbolExtractor for PythonExtractor {
    fn language(&self) -> &'static str {
        "Python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py", "pyi"]
    }

    fn extract(&self, source: &str) -> Result<Vec<Symbol>, ParseError> {
        let tree = self.parse(source)?;
        let root = tree.root_node();

        if root.has_error() {
            let position = first_error(root)
                .map(|node| node.start_position())
                .unwrap_or_else(|| root.start_position());
            return Err(ParseError::Syntax {
                line: position.row as u32 + 1,
                column: position.column as u32,
            });
        }

        Ok(collect_symbols(root, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(code: &str) -> Vec<(SymbolKind, String, u32, u32)> {
        PythonExtractor::new()
            .extract(code)
            .unwrap()
            .into_iter()
            .map(|s| (s.kind, s.name, s.line, s.column))
            .collect()
    }

    #[test]
    fn test_top_level_definitions() {
        let code = "import os\n\ndef foo(): pass\n\nclass Bar:\n    pass\n";
        assert_eq!(
            extract(code),
            vec![
                (SymbolKind::FunctionDefinition, "foo".to_string(), 3, 0),
                (SymbolKind::ClassDefinition, "Bar".to_string(), 5, 0),
            ]
        );
    }

    #[test]
    fn test_nested_definitions_in_pre_order() {
        let code = r#"class Foo:
    def bar(self):
        def inner():
            pass
        return inner

    class Meta:
        pass

def after():
    pass
"#;
        let names: Vec<_> = extract(code)
            .into_iter()
            .map(|(_, name, line, column)| (name, line, column))
            .collect();

        assert_eq!(
            names,
            vec![
                ("Foo".to_string(), 1, 0),
                ("bar".to_string(), 2, 4),
                ("inner".to_string(), 3, 8),
                ("Meta".to_string(), 7, 4),
                ("after".to_string(), 10, 0),
            ]
        );
    }

    #[test]
    fn test_definitions_inside_blocks() {
        let code = r#"if True:
    def conditional():
        pass

try:
    class Guarded:
        pass
except ImportError:
    pass
"#;
        let names: Vec<_> = extract(code).into_iter().map(|s| s.1).collect();
        assert_eq!(names, vec!["conditional", "Guarded"]);
    }

    #[test]
    fn test_async_function() {
        let code = "async def fetch():\n    pass\n\ndef plain():\n    pass\n";
        assert_eq!(
            extract(code),
            vec![
                (SymbolKind::AsyncFunctionDefinition, "fetch".to_string(), 1, 0),
                (SymbolKind::FunctionDefinition, "plain".to_string(), 4, 0),
            ]
        );
    }

    #[test]
    fn test_decorated_definition_points_at_def() {
        let code = "@decorator\n@other(1)\ndef wrapped():\n    pass\n";
        assert_eq!(
            extract(code),
            vec![(SymbolKind::FunctionDefinition, "wrapped".to_string(), 3, 0)]
        );
    }

    #[test]
    fn test_empty_source() {
        assert!(extract("").is_empty());
        assert!(extract("x = 1\nprint(x)\n").is_empty());
    }

    #[test]
    fn test_syntax_error() {
        let result = PythonExtractor::new().extract("def broken(:\n    pass\n");
        assert!(matches!(result, Err(ParseError::Syntax { .. })));
    }

    #[test]
    fn test_invalid_utf8() {
        let result = PythonExtractor::new().extract_bytes(&[0x64, 0x65, 0x66, 0xff, 0xfe]);
        assert_eq!(result, Err(ParseError::Encoding));
    }

    /// Extract on a thread with the stack size tokio gives blocking workers.
    fn extract_on_small_stack(code: String) -> Result<Vec<Symbol>, ParseError> {
        std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || PythonExtractor::new().extract(&code))
            .unwrap()
            .join()
            .unwrap()
    }

    #[test]
    fn test_deeply_nested_expression() {
        let code = format!("x = {}1\n\ndef after():\n    pass\n", "-".repeat(50_000));
        let symbols = extract_on_small_stack(code).unwrap();

        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "after");
        assert_eq!(symbols[0].line, 3);
    }

    #[test]
    fn test_deeply_nested_syntax_error() {
        // Unary chain with no operand
        let code = format!("def ok():\n    pass\n\nx = {}\n", "-".repeat(20_000));
        let result = extract_on_small_stack(code);
        assert!(matches!(result, Err(ParseError::Syntax { .. })));
    }

    #[test]
    fn test_extract_bytes() {
        let symbols = PythonExtractor::new()
            .extract_bytes(b"class Foo:\n    def bar(self):\n        pass\n")
            .unwrap();
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[1].name, "bar");
        assert_eq!(symbols[1].line, 2);
    }
}
