pub mod parser;
pub mod python;
pub mod registry;

pub use parser::SymbolExtractor;
pub use python::PythonExtractor;
pub use registry::ExtractorRegistry;
