//! Recursive descent parser for IDL.
//!
//! The parser consumes tokens from the [`Lexer`](crate::lexer::Lexer),
//! builds a [`TranslationUnit`], and keeps the [`SymbolTable`] synchronized
//! with the lexical scope it is currently inside. Constant expressions are
//! folded as they are parsed, consulting the symbol table for references to
//! previously declared constants and enumerators.
//!
//! # Parser Architecture
//!
//! - `item` - definition parsing (modules, interfaces, structs, unions, ...)
//! - `types` - type specifications, declarators and scoped names
//! - `expr` - constant-expression folding
//!
//! # Error Recovery
//!
//! The parser implements panic-mode recovery: the first error in a bad
//! region is reported and `panic_mode` suppresses the cascade until
//! [`Parser::synchronize`] reaches a recovery point: just past a `;`, past
//! a `}` (optionally followed by `;`), or at a token that starts a new
//! definition.
//!
//! # Example
//!
//! ```rust
//! use iborb_idl::parser::Parser;
//!
//! let mut parser = Parser::new("module M { const long C = 2 + 3; };", "m.idl");
//! let unit = parser.parse();
//! assert!(!parser.has_errors());
//! assert_eq!(unit.definitions.len(), 1);
//! ```

mod expr;
mod item;
mod types;

#[cfg(test)]
mod tests;

use crate::ast::{ConstValue, TranslationUnit};
use crate::diagnostics::{Diagnostic, ErrorCode};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::symbols::{SymbolKind, SymbolTable};

/// The IDL parser.
pub struct Parser<'src> {
    /// The lexer producing tokens.
    lexer: Lexer<'src>,
    /// Live scope model, updated as definitions open and close.
    symbols: SymbolTable,
    /// Current token.
    current: Token,
    /// Previous token.
    previous: Token,
    /// Accumulated diagnostics (errors and warnings).
    errors: Vec<Diagnostic>,
    /// Whether we're suppressing cascading errors.
    panic_mode: bool,
}

impl<'src> Parser<'src> {
    /// Create a parser over `source`, reporting positions against
    /// `filename`.
    pub fn new(source: &'src str, filename: impl Into<String>) -> Self {
        let mut parser = Self {
            lexer: Lexer::new(source, filename),
            symbols: SymbolTable::new(),
            current: Token::dummy(TokenKind::Eof),
            previous: Token::dummy(TokenKind::Eof),
            errors: Vec::new(),
            panic_mode: false,
        };
        parser.advance(); // prime the first token
        parser
    }

    /// Parse a complete translation unit. Diagnostics accumulate; inspect
    /// [`Parser::has_errors`] afterwards.
    #[must_use = "parsing has no effect if the result is not used"]
    pub fn parse(&mut self) -> TranslationUnit {
        let mut unit = TranslationUnit {
            filename: self.current.location.file.clone(),
            definitions: Vec::new(),
        };

        while !self.check(TokenKind::Eof) {
            if let Some(def) = self.parse_definition() {
                unit.definitions.push(def);
            } else {
                self.synchronize();
            }
        }

        // Fold lexical errors into the diagnostic stream.
        for err in self.lexer.take_errors() {
            self.errors.push(err.into());
        }

        unit
    }

    /// All accumulated diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Drain the accumulated diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.errors)
    }

    /// True when any non-warning diagnostic was reported.
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|d| !d.is_warning())
    }

    /// The warnings among the accumulated diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().filter(|d| d.is_warning())
    }

    /// The symbol table populated during parsing.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    // ============================================================
    // Token handling
    // ============================================================

    /// Advance to the next meaningful token, returning the one consumed.
    /// Line directives and pragmas are skipped; unrecognized input was
    /// already reported by the lexer and is skipped as well.
    fn advance(&mut self) -> Token {
        self.previous = std::mem::replace(&mut self.current, Token::dummy(TokenKind::Eof));
        loop {
            let token = self.lexer.next_token();
            match token.kind {
                TokenKind::LineDirective | TokenKind::Pragma | TokenKind::Unknown => continue,
                _ => {
                    self.current = token;
                    break;
                }
            }
        }
        self.previous.clone()
    }

    /// Check if the current token matches the given kind.
    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Consume the current token if it matches, returning whether it did.
    fn try_consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the expected kind, or report `message`.
    fn expect(&mut self, kind: TokenKind, message: &str) {
        if self.check(kind) {
            self.advance();
            return;
        }
        self.error_at_current(message, ErrorCode::UnexpectedToken);
    }

    fn expect_semicolon(&mut self) {
        self.expect(TokenKind::Semicolon, "Expected ';'");
    }

    /// Consume an identifier token, or report `message`.
    fn expect_identifier(&mut self, message: &str) -> Option<Token> {
        if self.check(TokenKind::Identifier) {
            Some(self.advance())
        } else {
            self.error_at_current(message, ErrorCode::ExpectedIdentifier);
            None
        }
    }

    // ============================================================
    // Error handling
    // ============================================================

    fn error_at_current(&mut self, message: &str, code: ErrorCode) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;

        let mut full = message.to_string();
        if self.current.kind == TokenKind::Eof {
            full.push_str(" at end of file");
        } else {
            full.push_str(&format!(" (got '{}')", self.current.text));
        }

        let location = self.current.location.clone();
        self.errors
            .push(Diagnostic::error(full, self.current.span, location).with_error_code(code));
    }

    /// Report a warning at the current token. Warnings are not gated by
    /// panic mode and never affect the exit code.
    fn warn_at_current(&mut self, message: impl Into<String>, code: ErrorCode) {
        let location = self.current.location.clone();
        self.errors
            .push(Diagnostic::warning(message, self.current.span, location).with_error_code(code));
    }

    /// Skip tokens until a recovery point and clear panic mode.
    fn synchronize(&mut self) {
        self.panic_mode = false;

        while !self.check(TokenKind::Eof) {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            if self.previous.kind == TokenKind::RightBrace {
                // A closing brace may be followed by the definition's ';'.
                if self.check(TokenKind::Semicolon) {
                    self.advance();
                }
                return;
            }
            if self.current.kind.is_definition_start() {
                return;
            }
            self.advance();
        }
    }

    // ============================================================
    // Symbol table interaction
    // ============================================================

    /// Insert a definition symbol into the current scope, reporting
    /// duplicates. Re-opening a module and completing a forward-declared
    /// interface or struct are not duplicates; all openings share one
    /// symbol.
    fn define(&mut self, token: &Token, kind: SymbolKind, value: Option<ConstValue>) {
        if self.symbols.add_symbol(&token.text, kind, value) {
            return;
        }
        let existing = self.symbols.lookup_local(&token.text).map(|s| s.kind);
        let reopening = matches!(
            (existing, kind),
            (Some(SymbolKind::Module), SymbolKind::Module)
                | (Some(SymbolKind::Interface), SymbolKind::Interface)
                | (Some(SymbolKind::Struct), SymbolKind::Struct)
        );
        if reopening {
            return;
        }
        let message = match existing {
            Some(prev) => format!(
                "Duplicate definition of '{}' (already defined as {})",
                token.text,
                prev.describe()
            ),
            None => format!("Duplicate definition of '{}'", token.text),
        };
        let location = token.location.clone();
        self.errors
            .push(Diagnostic::error(message, token.span, location)
                .with_error_code(ErrorCode::DuplicateDefinition));
    }
}
