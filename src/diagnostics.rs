//! Diagnostic reporting infrastructure.
//!
//! All recoverable pipeline errors accumulate as [`Diagnostic`]s; nothing in
//! the compiler panics on bad input. The driver renders diagnostics through
//! [`DiagnosticEmitter`] and decides the exit code from whether any
//! non-warning diagnostic remains.
//!
//! # Error Codes
//!
//! - **E0001-E0099**: lexical errors (unexpected characters, unterminated
//!   literals and comments)
//! - **E0100-E0199**: syntax errors (unexpected tokens, missing `;` / `}`)
//! - **E0200-E0299**: name errors (unknown constants, duplicate definitions)
//! - **E0300-E0399**: generation errors (unwritable output)

use crate::lexer::LexError;
use crate::span::{SourceLocation, Span};
use ariadne::{Color, Label, Report, ReportKind, Source};

/// Compiler error codes, organized by pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Lexical (E0001-E0099)
    UnexpectedCharacter = 1,
    UnterminatedComment = 2,
    UnterminatedString = 3,
    UnterminatedChar = 4,
    InvalidInteger = 5,
    InvalidFloat = 6,

    // Syntax (E0100-E0199)
    UnexpectedToken = 100,
    UnexpectedEof = 101,
    ExpectedIdentifier = 102,
    ExpectedType = 103,
    ExpectedDefinition = 104,
    ExpectedExpression = 105,
    MisplacedModifier = 106,

    // Names (E0200-E0299)
    UnknownConstant = 200,
    DuplicateDefinition = 201,
    UnresolvedReference = 202,

    // Generation (E0300-E0399)
    OutputWrite = 300,
}

impl ErrorCode {
    /// The formatted code string, e.g. `E0100`.
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// A help message suggesting how to fix the error, when one applies.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ErrorCode::UnterminatedComment => Some("add `*/` to close the block comment"),
            ErrorCode::UnterminatedString => Some("add a closing `\"` to complete the string"),
            ErrorCode::UnterminatedChar => Some("add a closing `'` to complete the character literal"),
            ErrorCode::MisplacedModifier => {
                Some("`abstract` and `local` apply to interfaces, `readonly` to attributes, `oneway` to operations")
            }
            _ => None,
        }
    }
}

/// The kind of diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// An error that fails the compilation.
    Error,
    /// A warning; never affects the exit code.
    Warning,
}

impl DiagnosticKind {
    fn report_kind(self) -> ReportKind<'static> {
        match self {
            DiagnosticKind::Error => ReportKind::Error,
            DiagnosticKind::Warning => ReportKind::Warning,
        }
    }

    fn color(self) -> Color {
        match self {
            DiagnosticKind::Error => Color::Red,
            DiagnosticKind::Warning => Color::Yellow,
        }
    }
}

/// A compiler diagnostic with its position in the scanned input (for
/// rendering) and its logical source location (for the message prefix).
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub code: Option<String>,
    pub message: String,
    pub span: Span,
    pub location: SourceLocation,
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Span, location: SourceLocation) -> Self {
        Self {
            kind: DiagnosticKind::Error,
            code: None,
            message: message.into(),
            span,
            location,
            suggestions: Vec::new(),
        }
    }

    pub fn warning(message: impl Into<String>, span: Span, location: SourceLocation) -> Self {
        Self {
            kind: DiagnosticKind::Warning,
            code: None,
            message: message.into(),
            span,
            location,
            suggestions: Vec::new(),
        }
    }

    /// Attach an error code, pulling in its help text when available.
    pub fn with_error_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code.as_str());
        if let Some(help) = code.help() {
            self.suggestions.push(help.to_string());
        }
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.kind == DiagnosticKind::Warning
    }

    /// One-line rendering: `file:line:col: error: message`.
    pub fn render_line(&self) -> String {
        let severity = match self.kind {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
        };
        match &self.code {
            Some(code) => format!("{}: {}: [{}] {}", self.location, severity, code, self.message),
            None => format!("{}: {}: {}", self.location, severity, self.message),
        }
    }
}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        Diagnostic::error(err.message, err.span, err.location)
    }
}

/// Renders diagnostics against the scanned source text via `ariadne`.
pub struct DiagnosticEmitter<'a> {
    filename: &'a str,
    source: &'a str,
}

impl<'a> DiagnosticEmitter<'a> {
    pub fn new(filename: &'a str, source: &'a str) -> Self {
        Self { filename, source }
    }

    /// Pretty-print a diagnostic to stderr.
    pub fn emit(&self, diagnostic: &Diagnostic) {
        let span = clamp_span(diagnostic.span, self.source.len());
        let mut builder = Report::build(diagnostic.kind.report_kind(), self.filename, span.start);

        let message = match &diagnostic.code {
            Some(code) => format!("[{}] {}", code, diagnostic.message),
            None => diagnostic.message.clone(),
        };
        builder = builder.with_message(&message);

        builder = builder.with_label(
            Label::new((self.filename, span.start..span.end))
                .with_color(diagnostic.kind.color())
                .with_message(&diagnostic.message),
        );

        if !diagnostic.suggestions.is_empty() {
            builder = builder.with_help(diagnostic.suggestions.join("\n"));
        }

        builder
            .finish()
            .eprint((self.filename, Source::from(self.source)))
            .expect("Failed to write diagnostic");
    }
}

fn clamp_span(span: Span, len: usize) -> Span {
    Span::new(span.start.min(len), span.end.min(len))
}
