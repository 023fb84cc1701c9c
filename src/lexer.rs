//! Lexical analysis for CORBA IDL.
//!
//! This module tokenizes preprocessed IDL text into a stream of tokens.
//! It handles all lexical elements of the IDL grammar:
//!
//! - Keywords and identifiers
//! - Integer literals (decimal, hex, octal)
//! - Float literals with optional exponent and `f`/`d` suffix
//! - String and character literals with escape sequences, including the
//!   wide forms `L"..."` and `L'...'`
//! - Operators and punctuation, including `::`, `<<` and `>>`
//! - Comments (line and block)
//! - Preprocessor residue: `#line` directives rewrite the lexer's logical
//!   position, `#pragma` lines become opaque [`TokenKind::Pragma`] tokens,
//!   any other `#` line is consumed silently
//!
//! The lexer is pull-driven: [`Lexer::next_token`] produces the next token,
//! [`Lexer::peek`] looks ahead without consuming. Errors never abort the
//! scan; they accumulate in an error list the caller drains.
//!
//! # Example
//!
//! ```rust
//! use iborb_idl::lexer::{Lexer, TokenKind};
//!
//! let mut lexer = Lexer::new("module M { };", "demo.idl");
//! assert_eq!(lexer.next_token().kind, TokenKind::KwModule);
//! assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
//! ```

use crate::span::{LineIndex, SourceLocation, Span};
use logos::{FilterResult, Logos};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors raised inside the token recognizer itself.
///
/// This is the `logos` error type: recognition failures surface as one of
/// these, and the [`Lexer`] wrapper turns them into [`LexError`]s with
/// positions attached.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    #[default]
    UnexpectedCharacter,
    UnterminatedString,
    UnterminatedChar,
    UnterminatedComment,
}

/// Token kinds for the IDL lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(error = ScanError)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // ============================================================
    // Keywords
    // ============================================================
    #[token("module")]
    KwModule,
    #[token("interface")]
    KwInterface,
    #[token("struct")]
    KwStruct,
    #[token("union")]
    KwUnion,
    #[token("switch")]
    KwSwitch,
    #[token("case")]
    KwCase,
    #[token("default")]
    KwDefault,
    #[token("enum")]
    KwEnum,
    #[token("const")]
    KwConst,
    #[token("typedef")]
    KwTypedef,
    #[token("exception")]
    KwException,
    #[token("attribute")]
    KwAttribute,
    #[token("readonly")]
    KwReadonly,
    #[token("in")]
    KwIn,
    #[token("out")]
    KwOut,
    #[token("inout")]
    KwInout,
    #[token("oneway")]
    KwOneway,
    #[token("raises")]
    KwRaises,
    #[token("context")]
    KwContext,
    #[token("sequence")]
    KwSequence,
    #[token("string")]
    KwString,
    #[token("wstring")]
    KwWstring,
    #[token("fixed")]
    KwFixed,
    #[token("abstract")]
    KwAbstract,
    #[token("local")]
    KwLocal,
    #[token("native")]
    KwNative,
    #[token("valuetype")]
    KwValuetype,
    #[token("truncatable")]
    KwTruncatable,
    #[token("supports")]
    KwSupports,
    #[token("public")]
    KwPublic,
    #[token("private")]
    KwPrivate,
    #[token("factory")]
    KwFactory,
    #[token("custom")]
    KwCustom,
    #[token("void")]
    KwVoid,
    #[token("boolean")]
    KwBoolean,
    #[token("char")]
    KwChar,
    #[token("wchar")]
    KwWchar,
    #[token("octet")]
    KwOctet,
    #[token("short")]
    KwShort,
    #[token("long")]
    KwLong,
    #[token("float")]
    KwFloat,
    #[token("double")]
    KwDouble,
    #[token("unsigned")]
    KwUnsigned,
    #[token("any")]
    KwAny,
    #[token("Object")]
    KwObject,
    // The IDL spelling is TRUE/FALSE; the lowercase forms are accepted for
    // convenience.
    #[token("TRUE")]
    #[token("true")]
    KwTrue,
    #[token("FALSE")]
    #[token("false")]
    KwFalse,

    // ============================================================
    // Literals and identifiers
    // ============================================================
    /// Integer literal: decimal, `0x` hex, or leading-zero octal.
    #[regex(r"0[xX][0-9a-fA-F]+")]
    #[regex(r"[0-9]+")]
    IntegerLiteral,

    /// Float literal: fractional dot, optional exponent, optional suffix.
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?[fFdD]?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fFdD]?")]
    #[regex(r"[0-9]+[fFdD]")]
    FloatLiteral,

    /// String literal. The callback consumes up to the closing quote.
    #[token("\"", lex_string_body)]
    StringLiteral,

    /// Wide string literal: `L"..."`.
    #[token("L\"", lex_string_body)]
    WideStringLiteral,

    /// Character literal. The callback consumes up to the closing quote.
    #[token("'", lex_char_body)]
    CharLiteral,

    /// Wide character literal: `L'...'`.
    #[token("L'", lex_char_body)]
    WideCharLiteral,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    // ============================================================
    // Operators and punctuation
    // ============================================================
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("=")]
    Equals,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Ampersand,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token(":")]
    Colon,
    #[token("::")]
    DoubleColon,
    /// `<`: comparison in constant context, opening bracket for
    /// `sequence<T>` and `string<n>`.
    #[token("<")]
    LeftAngle,
    #[token(">")]
    RightAngle,
    #[token("<<")]
    LeftShift,
    #[token(">>")]
    RightShift,

    // ============================================================
    // Preprocessor residue
    // ============================================================
    /// `#line N "file"` or the short `# N "file"` form. The wrapper parses
    /// the directive and rewrites its logical position; callers skip the
    /// token.
    #[regex(r"#line[ \t][^\n]*", priority = 10)]
    #[regex(r"#[ \t]+[0-9][^\n]*", priority = 10)]
    LineDirective,

    /// `#pragma ...`, emitted opaquely.
    #[regex(r"#pragma[^\n]*", priority = 10)]
    Pragma,

    /// Any other preprocessor line is consumed silently by the wrapper.
    #[regex(r"#[^\n]*", priority = 3)]
    OtherDirective,

    /// Block comments are skipped; an unterminated one raises an error.
    #[token("/*", lex_block_comment)]
    BlockComment,

    // ============================================================
    // Synthesized by the wrapper (never produced by logos)
    // ============================================================
    /// End of input sentinel.
    Eof,
    /// Recovery token for input the lexer could not recognize.
    Unknown,
}

/// Consume a string body after the opening quote. Stops at the closing
/// quote, or at a newline / end of input without consuming them.
fn lex_string_body(lex: &mut logos::Lexer<TokenKind>) -> Result<(), ScanError> {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                lex.bump(i + 1);
                return Ok(());
            }
            b'\n' => {
                lex.bump(i);
                return Err(ScanError::UnterminatedString);
            }
            b'\\' if i + 1 < bytes.len() => i += 2,
            _ => i += 1,
        }
    }
    lex.bump(bytes.len());
    Err(ScanError::UnterminatedString)
}

/// Consume a character literal body after the opening quote.
fn lex_char_body(lex: &mut logos::Lexer<TokenKind>) -> Result<(), ScanError> {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                lex.bump(i + 1);
                return Ok(());
            }
            b'\n' => {
                lex.bump(i);
                return Err(ScanError::UnterminatedChar);
            }
            b'\\' if i + 1 < bytes.len() => i += 2,
            _ => i += 1,
        }
    }
    lex.bump(bytes.len());
    Err(ScanError::UnterminatedChar)
}

/// Consume a block comment after the opening `/*`. Block comments do not
/// nest; the first `*/` closes the comment.
fn lex_block_comment(lex: &mut logos::Lexer<TokenKind>) -> FilterResult<(), ScanError> {
    match lex.remainder().find("*/") {
        Some(pos) => {
            lex.bump(pos + 2);
            FilterResult::Skip
        }
        None => {
            let len = lex.remainder().len();
            lex.bump(len);
            FilterResult::Error(ScanError::UnterminatedComment)
        }
    }
}

impl TokenKind {
    /// A human-readable description used in parser error messages.
    pub fn description(&self) -> &'static str {
        match self {
            TokenKind::KwModule => "`module`",
            TokenKind::KwInterface => "`interface`",
            TokenKind::KwStruct => "`struct`",
            TokenKind::KwUnion => "`union`",
            TokenKind::KwSwitch => "`switch`",
            TokenKind::KwCase => "`case`",
            TokenKind::KwDefault => "`default`",
            TokenKind::KwEnum => "`enum`",
            TokenKind::KwConst => "`const`",
            TokenKind::KwTypedef => "`typedef`",
            TokenKind::KwException => "`exception`",
            TokenKind::KwAttribute => "`attribute`",
            TokenKind::KwReadonly => "`readonly`",
            TokenKind::KwIn => "`in`",
            TokenKind::KwOut => "`out`",
            TokenKind::KwInout => "`inout`",
            TokenKind::KwOneway => "`oneway`",
            TokenKind::KwRaises => "`raises`",
            TokenKind::KwContext => "`context`",
            TokenKind::KwSequence => "`sequence`",
            TokenKind::KwString => "`string`",
            TokenKind::KwWstring => "`wstring`",
            TokenKind::KwFixed => "`fixed`",
            TokenKind::KwAbstract => "`abstract`",
            TokenKind::KwLocal => "`local`",
            TokenKind::KwNative => "`native`",
            TokenKind::KwValuetype => "`valuetype`",
            TokenKind::KwTruncatable => "`truncatable`",
            TokenKind::KwSupports => "`supports`",
            TokenKind::KwPublic => "`public`",
            TokenKind::KwPrivate => "`private`",
            TokenKind::KwFactory => "`factory`",
            TokenKind::KwCustom => "`custom`",
            TokenKind::KwVoid => "`void`",
            TokenKind::KwBoolean => "`boolean`",
            TokenKind::KwChar => "`char`",
            TokenKind::KwWchar => "`wchar`",
            TokenKind::KwOctet => "`octet`",
            TokenKind::KwShort => "`short`",
            TokenKind::KwLong => "`long`",
            TokenKind::KwFloat => "`float`",
            TokenKind::KwDouble => "`double`",
            TokenKind::KwUnsigned => "`unsigned`",
            TokenKind::KwAny => "`any`",
            TokenKind::KwObject => "`Object`",
            TokenKind::KwTrue => "`TRUE`",
            TokenKind::KwFalse => "`FALSE`",
            TokenKind::IntegerLiteral => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::WideStringLiteral => "wide string literal",
            TokenKind::CharLiteral => "character literal",
            TokenKind::WideCharLiteral => "wide character literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Semicolon => "`;`",
            TokenKind::Comma => "`,`",
            TokenKind::LeftBrace => "`{`",
            TokenKind::RightBrace => "`}`",
            TokenKind::LeftParen => "`(`",
            TokenKind::RightParen => "`)`",
            TokenKind::LeftBracket => "`[`",
            TokenKind::RightBracket => "`]`",
            TokenKind::Equals => "`=`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::Ampersand => "`&`",
            TokenKind::Pipe => "`|`",
            TokenKind::Caret => "`^`",
            TokenKind::Tilde => "`~`",
            TokenKind::Colon => "`:`",
            TokenKind::DoubleColon => "`::`",
            TokenKind::LeftAngle => "`<`",
            TokenKind::RightAngle => "`>`",
            TokenKind::LeftShift => "`<<`",
            TokenKind::RightShift => "`>>`",
            TokenKind::LineDirective => "line directive",
            TokenKind::Pragma => "`#pragma`",
            TokenKind::OtherDirective => "preprocessor directive",
            TokenKind::BlockComment => "block comment",
            TokenKind::Eof => "end of file",
            TokenKind::Unknown => "unknown token",
        }
    }

    /// True for tokens that begin a type specification.
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::KwVoid
                | TokenKind::KwBoolean
                | TokenKind::KwChar
                | TokenKind::KwWchar
                | TokenKind::KwOctet
                | TokenKind::KwShort
                | TokenKind::KwLong
                | TokenKind::KwFloat
                | TokenKind::KwDouble
                | TokenKind::KwUnsigned
                | TokenKind::KwAny
                | TokenKind::KwObject
                | TokenKind::KwString
                | TokenKind::KwWstring
                | TokenKind::KwSequence
        )
    }

    /// True for tokens that open a definition at module scope.
    pub fn is_definition_start(&self) -> bool {
        matches!(
            self,
            TokenKind::KwModule
                | TokenKind::KwInterface
                | TokenKind::KwStruct
                | TokenKind::KwUnion
                | TokenKind::KwEnum
                | TokenKind::KwTypedef
                | TokenKind::KwConst
                | TokenKind::KwException
                | TokenKind::KwAbstract
                | TokenKind::KwLocal
        )
    }
}

/// Scalar payload carried by literal tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
}

/// A token with its kind, owned text, optional scalar value, and position.
///
/// Tokens own copies of their text; nothing aliases the source buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub value: Option<TokenValue>,
    pub span: Span,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span, location: SourceLocation) -> Self {
        Self {
            kind,
            text: text.into(),
            value: None,
            span,
            location,
        }
    }

    /// A placeholder token for parser initialization.
    pub fn dummy(kind: TokenKind) -> Self {
        Self {
            kind,
            text: String::new(),
            value: None,
            span: Span::dummy(),
            location: SourceLocation::default(),
        }
    }

    pub fn int_value(&self) -> Option<i64> {
        match self.value {
            Some(TokenValue::Int(v)) => Some(v),
            _ => None,
        }
    }

    pub fn float_value(&self) -> Option<f64> {
        match self.value {
            Some(TokenValue::Float(v)) => Some(v),
            _ => None,
        }
    }

    pub fn str_value(&self) -> Option<&str> {
        match &self.value {
            Some(TokenValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn char_value(&self) -> Option<char> {
        match self.value {
            Some(TokenValue::Char(c)) => Some(c),
            _ => None,
        }
    }
}

/// A recoverable lexical error with its position.
#[derive(Debug, Clone, Error)]
#[error("{location}: {message}")]
pub struct LexError {
    pub message: String,
    pub span: Span,
    pub location: SourceLocation,
}

/// The IDL lexer.
///
/// Wraps the generated recognizer with arbitrary lookahead, literal value
/// decoding, `#line` bookkeeping, and error accumulation.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    line_index: LineIndex,
    /// Current logical filename; rewritten by `#line` directives.
    filename: String,
    /// Offset added to the physical line to obtain the logical line.
    line_adjust: i64,
    lookahead: VecDeque<Token>,
    errors: Vec<LexError>,
    exhausted: bool,
}

impl<'src> Lexer<'src> {
    /// Create a lexer over `source`, reporting positions against `filename`.
    pub fn new(source: &'src str, filename: impl Into<String>) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
            line_index: LineIndex::new(source),
            filename: filename.into(),
            line_adjust: 0,
            lookahead: VecDeque::new(),
            errors: Vec::new(),
            exhausted: false,
        }
    }

    /// Produce the next token, or the EOF sentinel once input is exhausted.
    pub fn next_token(&mut self) -> Token {
        if let Some(tok) = self.lookahead.pop_front() {
            return tok;
        }
        self.scan_token()
    }

    /// Return the n-th upcoming token (0 = the token `next_token` would
    /// return) without consuming it.
    pub fn peek(&mut self, n: usize) -> Token {
        while self.lookahead.len() <= n {
            let tok = self.scan_token();
            self.lookahead.push_back(tok);
        }
        self.lookahead[n].clone()
    }

    /// The logical filename currently in effect.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Accumulated lexical errors.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// Drain the accumulated errors.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    /// Logical source location for a byte offset.
    fn location_at(&self, offset: usize) -> SourceLocation {
        let (line, col) = self.line_index.line_col(offset);
        let logical = (line as i64 + self.line_adjust).max(1) as u32;
        SourceLocation::new(self.filename.clone(), logical, col)
    }

    fn error_at(&mut self, message: impl Into<String>, span: Span) {
        let location = self.location_at(span.start);
        self.errors.push(LexError {
            message: message.into(),
            span,
            location,
        });
    }

    fn scan_token(&mut self) -> Token {
        loop {
            if self.exhausted {
                return self.eof_token();
            }

            let step = self.inner.next();
            let raw = self.inner.span();
            let span = Span::new(raw.start, raw.end);

            match step {
                None => {
                    self.exhausted = true;
                    return self.eof_token();
                }
                Some(Ok(kind)) => {
                    if kind == TokenKind::OtherDirective {
                        continue;
                    }

                    let location = self.location_at(span.start);
                    let text = self.source[span.start..span.end].to_string();

                    if kind == TokenKind::LineDirective {
                        self.apply_line_directive(&text, span);
                        return Token::new(kind, text, span, location);
                    }

                    let value = self.decode_value(kind, &text, span);
                    let mut token = Token::new(kind, text, span, location);
                    token.value = value;
                    return token;
                }
                Some(Err(err)) => {
                    let location = self.location_at(span.start);
                    let text = self.source[span.start..span.end].to_string();
                    match err {
                        ScanError::UnexpectedCharacter => {
                            self.error_at(format!("Unexpected character: '{}'", text), span);
                            return Token::new(TokenKind::Unknown, text, span, location);
                        }
                        ScanError::UnterminatedString => {
                            self.error_at("Unterminated string literal", span);
                            // Keep the partial literal so the parser can continue.
                            let wide = text.starts_with('L');
                            let kind = if wide {
                                TokenKind::WideStringLiteral
                            } else {
                                TokenKind::StringLiteral
                            };
                            let value = Some(TokenValue::Str(decode_string_text(&text)));
                            let mut token = Token::new(kind, text, span, location);
                            token.value = value;
                            return token;
                        }
                        ScanError::UnterminatedChar => {
                            self.error_at("Unterminated character literal", span);
                            let wide = text.starts_with('L');
                            let kind = if wide {
                                TokenKind::WideCharLiteral
                            } else {
                                TokenKind::CharLiteral
                            };
                            let value = Some(TokenValue::Char(decode_char_text(&text)));
                            let mut token = Token::new(kind, text, span, location);
                            token.value = value;
                            return token;
                        }
                        ScanError::UnterminatedComment => {
                            self.error_at("Unterminated block comment", span);
                            // Nothing to emit; the comment ran to end of input.
                        }
                    }
                }
            }
        }
    }

    fn eof_token(&self) -> Token {
        let end = self.source.len();
        Token::new(TokenKind::Eof, "", Span::new(end, end), self.location_at(end))
    }

    /// Decode the scalar value carried by literal tokens.
    fn decode_value(&mut self, kind: TokenKind, text: &str, span: Span) -> Option<TokenValue> {
        match kind {
            TokenKind::IntegerLiteral => Some(TokenValue::Int(self.decode_integer(text, span))),
            TokenKind::FloatLiteral => Some(TokenValue::Float(self.decode_float(text, span))),
            TokenKind::StringLiteral | TokenKind::WideStringLiteral => {
                Some(TokenValue::Str(decode_string_text(text)))
            }
            TokenKind::CharLiteral | TokenKind::WideCharLiteral => {
                Some(TokenValue::Char(decode_char_text(text)))
            }
            _ => None,
        }
    }

    fn decode_integer(&mut self, text: &str, span: Span) -> i64 {
        let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16)
        } else if text.len() > 1
            && text.starts_with('0')
            && text.bytes().all(|b| (b'0'..=b'7').contains(&b))
        {
            i64::from_str_radix(&text[1..], 8)
        } else {
            text.parse()
        };
        match parsed {
            Ok(v) => v,
            Err(_) => {
                self.error_at(format!("Integer literal out of range: {}", text), span);
                0
            }
        }
    }

    fn decode_float(&mut self, text: &str, span: Span) -> f64 {
        let trimmed = text.trim_end_matches(['f', 'F', 'd', 'D']);
        match trimmed.parse() {
            Ok(v) => v,
            Err(_) => {
                self.error_at(format!("Invalid float literal: {}", text), span);
                0.0
            }
        }
    }

    /// Parse a `#line N "file"` (or `# N "file"`) directive and rewrite the
    /// logical position so the line *following* the directive reports as
    /// line `N` of `file`.
    fn apply_line_directive(&mut self, text: &str, span: Span) {
        let Some((line, file)) = parse_line_directive(text) else {
            return;
        };
        let (physical_line, _) = self.line_index.line_col(span.start);
        self.line_adjust = line as i64 - (physical_line as i64 + 1);
        if let Some(file) = file {
            self.filename = file;
        }
    }
}

/// Parse the body of a line directive. Accepts `#line N "file"`,
/// `#line N`, and the short `# N "file"` form emitted by most
/// preprocessors. Returns the line number and optional filename.
fn parse_line_directive(text: &str) -> Option<(u64, Option<String>)> {
    let rest = text.strip_prefix('#')?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix("line").unwrap_or(rest);
    let rest = rest.trim_start();

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let line: u64 = rest[..digits_end].parse().ok()?;

    let rest = rest[digits_end..].trim_start();
    let file = rest.strip_prefix('"').and_then(|r| {
        r.find('"').map(|end| r[..end].to_string())
    });

    Some((line, file))
}

/// Decode a string literal's escapes. `text` includes the quotes and, for
/// wide strings, the leading `L`. Tolerates a missing closing quote.
fn decode_string_text(text: &str) -> String {
    let body = text.strip_prefix('L').unwrap_or(text);
    let body = body.strip_prefix('"').unwrap_or(body);
    let body = body.strip_suffix('"').unwrap_or(body);
    decode_escapes(body)
}

/// Decode a character literal to its first character.
fn decode_char_text(text: &str) -> char {
    let body = text.strip_prefix('L').unwrap_or(text);
    let body = body.strip_prefix('\'').unwrap_or(body);
    let body = body.strip_suffix('\'').unwrap_or(body);
    decode_escapes(body).chars().next().unwrap_or('\0')
}

fn decode_escapes(body: &str) -> String {
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some('0') => result.push('\0'),
            Some('x') => {
                let mut hex = String::new();
                while hex.len() < 2 {
                    match chars.peek() {
                        Some(h) if h.is_ascii_hexdigit() => {
                            hex.push(*h);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                if let Ok(n) = u8::from_str_radix(&hex, 16) {
                    result.push(n as char);
                }
            }
            // Unknown escapes keep the escaped character verbatim.
            Some(other) => result.push(other),
            None => {}
        }
    }
    result
}
