//! Type specification, declarator and scoped name parsing.

use super::Parser;
use crate::ast::{BasicType, TypeNode};
use crate::diagnostics::ErrorCode;
use crate::lexer::{Token, TokenKind};

/// A declarator: a name plus any fixed array dimensions, e.g. `UUID[16]`.
pub(super) struct Declarator {
    pub token: Token,
    pub array_dimensions: Vec<u64>,
}

impl<'src> Parser<'src> {
    /// Parse a type specification: a template type (`sequence`, `string`,
    /// `wstring`), a basic type, or a scoped name.
    pub(super) fn parse_type_spec(&mut self) -> Option<TypeNode> {
        match self.current.kind {
            TokenKind::KwSequence => self.parse_sequence_type(),
            TokenKind::KwString => self.parse_string_type(false),
            TokenKind::KwWstring => self.parse_string_type(true),
            TokenKind::Identifier | TokenKind::DoubleColon => self.parse_scoped_name_type(),
            kind if kind.is_type_keyword() => Some(self.parse_basic_type_spec()),
            _ => {
                self.error_at_current("Expected type specification", ErrorCode::ExpectedType);
                None
            }
        }
    }

    fn parse_basic_type_spec(&mut self) -> TypeNode {
        let location = self.current.location.clone();
        let ty = self.parse_basic_type();
        TypeNode::Basic { ty, location }
    }

    fn parse_basic_type(&mut self) -> BasicType {
        if self.try_consume(TokenKind::KwVoid) {
            return BasicType::Void;
        }
        if self.try_consume(TokenKind::KwBoolean) {
            return BasicType::Boolean;
        }
        if self.try_consume(TokenKind::KwChar) {
            return BasicType::Char;
        }
        if self.try_consume(TokenKind::KwWchar) {
            return BasicType::WChar;
        }
        if self.try_consume(TokenKind::KwOctet) {
            return BasicType::Octet;
        }
        if self.try_consume(TokenKind::KwAny) {
            return BasicType::Any;
        }
        if self.try_consume(TokenKind::KwObject) {
            return BasicType::Object;
        }
        if self.try_consume(TokenKind::KwFloat) {
            return BasicType::Float;
        }
        if self.try_consume(TokenKind::KwDouble) {
            return BasicType::Double;
        }

        let is_unsigned = self.try_consume(TokenKind::KwUnsigned);

        if self.try_consume(TokenKind::KwShort) {
            return if is_unsigned {
                BasicType::UShort
            } else {
                BasicType::Short
            };
        }

        if self.try_consume(TokenKind::KwLong) {
            if self.try_consume(TokenKind::KwLong) {
                return if is_unsigned {
                    BasicType::ULongLong
                } else {
                    BasicType::LongLong
                };
            }
            if self.try_consume(TokenKind::KwDouble) {
                return BasicType::LongDouble;
            }
            return if is_unsigned {
                BasicType::ULong
            } else {
                BasicType::Long
            };
        }

        if is_unsigned {
            self.error_at_current(
                "Expected 'short' or 'long' after 'unsigned'",
                ErrorCode::UnexpectedToken,
            );
        }

        BasicType::Void
    }

    fn parse_sequence_type(&mut self) -> Option<TypeNode> {
        let location = self.current.location.clone();
        self.expect(TokenKind::KwSequence, "Expected 'sequence'");
        self.expect(TokenKind::LeftAngle, "Expected '<' after 'sequence'");

        let Some(element) = self.parse_type_spec() else {
            self.error_at_current("Expected element type in sequence", ErrorCode::ExpectedType);
            return None;
        };

        let bound = if self.try_consume(TokenKind::Comma) {
            self.parse_const_expr().as_u64()
        } else {
            None
        };

        self.expect(TokenKind::RightAngle, "Expected '>' at end of sequence type");

        Some(TypeNode::Sequence {
            element: Box::new(element),
            bound,
            location,
        })
    }

    fn parse_string_type(&mut self, wide: bool) -> Option<TypeNode> {
        let location = self.current.location.clone();
        self.advance(); // consume 'string' or 'wstring'

        let bound = if self.try_consume(TokenKind::LeftAngle) {
            let bound = self.parse_const_expr().as_u64();
            self.expect(TokenKind::RightAngle, "Expected '>' at end of string bound");
            bound
        } else {
            None
        };

        Some(TypeNode::String {
            bound,
            wide,
            location,
        })
    }

    fn parse_scoped_name_type(&mut self) -> Option<TypeNode> {
        let location = self.current.location.clone();
        let (parts, absolute) = self.parse_scoped_name_parts()?;
        Some(TypeNode::ScopedName {
            parts,
            absolute,
            location,
        })
    }

    /// Parse a `::`-separated name path, returning the parts and whether
    /// the name was rooted at the global scope.
    pub(super) fn parse_scoped_name_parts(&mut self) -> Option<(Vec<String>, bool)> {
        let absolute = self.try_consume(TokenKind::DoubleColon);

        if !self.check(TokenKind::Identifier) {
            self.error_at_current(
                "Expected identifier in scoped name",
                ErrorCode::ExpectedIdentifier,
            );
            return None;
        }

        let mut parts = vec![self.advance().text];
        while self.try_consume(TokenKind::DoubleColon) {
            if !self.check(TokenKind::Identifier) {
                self.error_at_current(
                    "Expected identifier after '::'",
                    ErrorCode::ExpectedIdentifier,
                );
                break;
            }
            parts.push(self.advance().text);
        }

        Some((parts, absolute))
    }

    /// Parse a comma-separated declarator list: `a, b[4], c[2][3]`.
    pub(super) fn parse_declarators(&mut self) -> Vec<Declarator> {
        let mut declarators = Vec::new();

        loop {
            match self.parse_declarator() {
                Some(decl) => declarators.push(decl),
                None => break,
            }
            if !self.try_consume(TokenKind::Comma) {
                break;
            }
        }

        declarators
    }

    fn parse_declarator(&mut self) -> Option<Declarator> {
        let token = self.expect_identifier("Expected identifier")?;

        let mut array_dimensions = Vec::new();
        while self.try_consume(TokenKind::LeftBracket) {
            let dim = self.parse_const_expr().as_u64().unwrap_or(0);
            if dim == 0 {
                self.error_at_current(
                    "Array dimension must be a positive integer",
                    ErrorCode::ExpectedExpression,
                );
                array_dimensions.push(1);
            } else {
                array_dimensions.push(dim);
            }
            self.expect(TokenKind::RightBracket, "Expected ']'");
        }

        Some(Declarator {
            token,
            array_dimensions,
        })
    }

    /// Parse an inheritance specification: `: Base1, ::Scoped::Base2`.
    /// Qualification is preserved textually.
    pub(super) fn parse_inheritance_spec(&mut self) -> Vec<String> {
        self.expect(TokenKind::Colon, "Expected ':' for inheritance");

        let mut bases = Vec::new();
        loop {
            match self.parse_scoped_name_parts() {
                Some((parts, absolute)) => {
                    bases.push(TypeNode::scoped_name_to_string(&parts, absolute));
                }
                None => break,
            }
            if !self.try_consume(TokenKind::Comma) {
                break;
            }
        }

        bases
    }

    /// Parse a raises clause: `raises (Exc1, ::M::Exc2)`.
    pub(super) fn parse_raises(&mut self) -> Vec<String> {
        self.expect(TokenKind::KwRaises, "Expected 'raises'");
        self.expect(TokenKind::LeftParen, "Expected '(' after 'raises'");

        let mut exceptions = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                match self.parse_scoped_name_parts() {
                    Some((parts, absolute)) => {
                        exceptions.push(TypeNode::scoped_name_to_string(&parts, absolute));
                    }
                    None => break,
                }
                if !self.try_consume(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParen, "Expected ')' after raises list");

        exceptions
    }
}
