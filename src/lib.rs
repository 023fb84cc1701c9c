//! # iborb-idl
//!
//! A CORBA IDL to C++11 compiler, implementing the "IDL to C++11 Language
//! Mapping": IDL modules become namespaces, interfaces become abstract
//! classes with pure virtual operations, structs gain equality operators,
//! unions become discriminated accessor classes, and so on.
//!
//! ## Compiler Pipeline
//!
//! ```text
//! Source -> Preprocessor (external) -> Lexer -> Parser -> AST + Symbols -> Generator -> C++
//! ```
//!
//! One translation unit is processed per invocation, single-threaded, from
//! lexing through emission. All stages accumulate diagnostics instead of
//! aborting; the driver decides the exit code.
//!
//! ## Quick Start
//!
//! ```rust
//! let header = iborb_idl::compile_idl(
//!     "module M { const long ANSWER = 42; };",
//!     "m.idl",
//! )
//! .expect("compilation failed");
//!
//! assert!(header.contains("namespace M {"));
//! assert!(header.contains("constexpr int32_t ANSWER = 42;"));
//! ```
//!
//! ## Module Overview
//!
//! - [`span`] - source spans and logical locations
//! - [`lexer`] - tokenization, `#line` handling, literal decoding
//! - [`ast`] - the syntax tree shared by parser and generator
//! - [`symbols`] - the scope tree built during parsing
//! - [`parser`] - recursive descent parsing with panic-mode recovery
//! - [`generator`] - C++11 header emission
//! - [`preprocessor`] - external C preprocessor integration
//! - [`diagnostics`] - error codes, diagnostics, pretty rendering

pub mod ast;
pub mod diagnostics;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod preprocessor;
pub mod span;
pub mod symbols;

pub use diagnostics::{Diagnostic, DiagnosticEmitter, DiagnosticKind, ErrorCode};
pub use generator::{Cpp11Generator, GeneratorConfig};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use preprocessor::Preprocessor;
pub use span::{SourceLocation, Span};
pub use symbols::{Symbol, SymbolKind, SymbolTable};

/// Compile already-preprocessed IDL text to C++ header text.
///
/// A convenience wrapper over the parse and generate stages. Warnings are
/// discarded; any error returns the full diagnostic list instead.
pub fn compile_idl(source: &str, filename: &str) -> Result<String, Vec<Diagnostic>> {
    let mut parser = Parser::new(source, filename);
    let unit = parser.parse();
    if parser.has_errors() {
        return Err(parser.take_diagnostics());
    }

    let mut generator =
        Cpp11Generator::new(GeneratorConfig::default()).with_symbol_table(parser.symbol_table());
    if !generator.generate(&unit) {
        return Err(generator.diagnostics().to_vec());
    }

    Ok(generator.header_content().to_string())
}
