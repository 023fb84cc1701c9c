//! Constant-expression parsing and folding.
//!
//! Expressions are folded to a single [`ConstValue`] as they are parsed.
//! Integer arithmetic is performed in wrapping signed 64-bit, floating
//! arithmetic in `f64`. Bitwise operators, shifts and modulus apply only to
//! integer operands and leave the folded value untouched otherwise, as does
//! division by zero.

use super::Parser;
use crate::ast::ConstValue;
use crate::diagnostics::ErrorCode;
use crate::lexer::TokenKind;
use crate::symbols::SymbolKind;

/// Fold an integer-only binary operator; non-integer operands are a no-op.
fn fold_int(left: ConstValue, right: ConstValue, op: impl Fn(i64, i64) -> i64) -> ConstValue {
    match (&left, &right) {
        (ConstValue::Int(a), ConstValue::Int(b)) => ConstValue::Int(op(*a, *b)),
        _ => left,
    }
}

/// Fold an arithmetic operator over matching integer or float operands.
fn fold_arith(
    left: ConstValue,
    right: ConstValue,
    int_op: impl Fn(i64, i64) -> i64,
    float_op: impl Fn(f64, f64) -> f64,
) -> ConstValue {
    match (&left, &right) {
        (ConstValue::Int(a), ConstValue::Int(b)) => ConstValue::Int(int_op(*a, *b)),
        (ConstValue::Float(a), ConstValue::Float(b)) => ConstValue::Float(float_op(*a, *b)),
        _ => left,
    }
}

impl<'src> Parser<'src> {
    /// Parse and fold a constant expression.
    pub(super) fn parse_const_expr(&mut self) -> ConstValue {
        self.parse_or_expr()
    }

    fn parse_or_expr(&mut self) -> ConstValue {
        let mut left = self.parse_xor_expr();
        while self.try_consume(TokenKind::Pipe) {
            let right = self.parse_xor_expr();
            left = fold_int(left, right, |a, b| a | b);
        }
        left
    }

    fn parse_xor_expr(&mut self) -> ConstValue {
        let mut left = self.parse_and_expr();
        while self.try_consume(TokenKind::Caret) {
            let right = self.parse_and_expr();
            left = fold_int(left, right, |a, b| a ^ b);
        }
        left
    }

    fn parse_and_expr(&mut self) -> ConstValue {
        let mut left = self.parse_shift_expr();
        while self.try_consume(TokenKind::Ampersand) {
            let right = self.parse_shift_expr();
            left = fold_int(left, right, |a, b| a & b);
        }
        left
    }

    fn parse_shift_expr(&mut self) -> ConstValue {
        let mut left = self.parse_add_expr();
        loop {
            if self.try_consume(TokenKind::LeftShift) {
                let right = self.parse_add_expr();
                left = fold_int(left, right, shl);
            } else if self.try_consume(TokenKind::RightShift) {
                let right = self.parse_add_expr();
                left = fold_int(left, right, shr);
            } else {
                break;
            }
        }
        left
    }

    fn parse_add_expr(&mut self) -> ConstValue {
        let mut left = self.parse_mul_expr();
        loop {
            if self.try_consume(TokenKind::Plus) {
                let right = self.parse_mul_expr();
                left = fold_arith(left, right, i64::wrapping_add, |a, b| a + b);
            } else if self.try_consume(TokenKind::Minus) {
                let right = self.parse_mul_expr();
                left = fold_arith(left, right, i64::wrapping_sub, |a, b| a - b);
            } else {
                break;
            }
        }
        left
    }

    fn parse_mul_expr(&mut self) -> ConstValue {
        let mut left = self.parse_unary_expr();
        loop {
            if self.try_consume(TokenKind::Star) {
                let right = self.parse_unary_expr();
                left = fold_arith(left, right, i64::wrapping_mul, |a, b| a * b);
            } else if self.try_consume(TokenKind::Slash) {
                let right = self.parse_unary_expr();
                // Division by zero is suppressed: the folded value is
                // left unchanged.
                left = match (&left, &right) {
                    (ConstValue::Int(a), ConstValue::Int(b)) if *b != 0 => {
                        ConstValue::Int(a.wrapping_div(*b))
                    }
                    (ConstValue::Float(a), ConstValue::Float(b)) => ConstValue::Float(a / b),
                    _ => left,
                };
            } else if self.try_consume(TokenKind::Percent) {
                let right = self.parse_unary_expr();
                left = match (&left, &right) {
                    (ConstValue::Int(a), ConstValue::Int(b)) if *b != 0 => {
                        ConstValue::Int(a.wrapping_rem(*b))
                    }
                    _ => left,
                };
            } else {
                break;
            }
        }
        left
    }

    fn parse_unary_expr(&mut self) -> ConstValue {
        if self.try_consume(TokenKind::Minus) {
            return match self.parse_unary_expr() {
                ConstValue::Int(v) => ConstValue::Int(v.wrapping_neg()),
                ConstValue::Float(v) => ConstValue::Float(-v),
                other => other,
            };
        }
        if self.try_consume(TokenKind::Plus) {
            return self.parse_unary_expr();
        }
        if self.try_consume(TokenKind::Tilde) {
            return match self.parse_unary_expr() {
                ConstValue::Int(v) => ConstValue::Int(!v),
                other => other,
            };
        }
        self.parse_primary_expr()
    }

    fn parse_primary_expr(&mut self) -> ConstValue {
        if self.try_consume(TokenKind::LeftParen) {
            let value = self.parse_const_expr();
            self.expect(TokenKind::RightParen, "Expected ')'");
            return value;
        }

        match self.current.kind {
            TokenKind::IntegerLiteral => {
                let value = self.current.int_value().unwrap_or(0);
                self.advance();
                ConstValue::Int(value)
            }
            TokenKind::FloatLiteral => {
                let value = self.current.float_value().unwrap_or(0.0);
                self.advance();
                ConstValue::Float(value)
            }
            TokenKind::StringLiteral | TokenKind::WideStringLiteral => {
                let value = self.current.str_value().unwrap_or("").to_string();
                self.advance();
                ConstValue::Str(value)
            }
            TokenKind::CharLiteral | TokenKind::WideCharLiteral => {
                let value = self.current.char_value().unwrap_or('\0');
                self.advance();
                ConstValue::Str(value.to_string())
            }
            TokenKind::KwTrue => {
                self.advance();
                ConstValue::Bool(true)
            }
            TokenKind::KwFalse => {
                self.advance();
                ConstValue::Bool(false)
            }
            TokenKind::Identifier | TokenKind::DoubleColon => {
                let Some((parts, absolute)) = self.parse_scoped_name_parts() else {
                    return ConstValue::Int(0);
                };

                // A prior constant substitutes its folded value; an
                // enumerator substitutes its ordinal.
                let resolved = self
                    .symbols
                    .lookup_scoped(&parts, absolute)
                    .filter(|sym| {
                        matches!(sym.kind, SymbolKind::Constant | SymbolKind::EnumValue)
                    })
                    .and_then(|sym| sym.value.clone());

                match resolved {
                    Some(value) => value,
                    None => {
                        let name = parts.last().cloned().unwrap_or_default();
                        self.warn_at_current(
                            format!("Unknown constant: {}", name),
                            ErrorCode::UnknownConstant,
                        );
                        ConstValue::Int(0)
                    }
                }
            }
            _ => {
                self.error_at_current("Expected expression", ErrorCode::ExpectedExpression);
                ConstValue::Int(0)
            }
        }
    }
}

/// Shift left; shift amounts outside `0..64` leave the value unchanged.
fn shl(a: i64, b: i64) -> i64 {
    match u32::try_from(b) {
        Ok(s) if s < 64 => a.wrapping_shl(s),
        _ => a,
    }
}

/// Shift right; shift amounts outside `0..64` leave the value unchanged.
fn shr(a: i64, b: i64) -> i64 {
    match u32::try_from(b) {
        Ok(s) if s < 64 => a.wrapping_shr(s),
        _ => a,
    }
}
