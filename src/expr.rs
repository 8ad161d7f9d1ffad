//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Integer constant-expression evaluator for #if / #elif / #eval
//
// Shunting-yard over two fixed-capacity stacks. The caller feeds tokens one
// at a time (it owns `defined(...)` handling and pushes the resulting 0/1
// as a plain value), then asks for the final result.
//

use crate::error::ErrorKind;
use crate::token::TokenType;

/// Capacity of both the value stack and the operator stack.
const STACK_CAPACITY: usize = 16;

pub(crate) struct ExprEvaluator {
    values: Vec<i64>,
    operators: Vec<TokenType>,
}

impl ExprEvaluator {
    pub fn new() -> Self {
        Self {
            values: Vec::with_capacity(STACK_CAPACITY),
            operators: Vec::with_capacity(STACK_CAPACITY),
        }
    }

    /// Push an operand.
    pub fn push_value(&mut self, value: i64) -> Result<(), ErrorKind> {
        if self.values.len() >= STACK_CAPACITY {
            return Err(ErrorKind::ExpressionTooComplex);
        }
        self.values.push(value);
        Ok(())
    }

    /// Push a numeric literal, parsed as a base-10 integer. Float shapes are
    /// lexically valid tokens but have no integer meaning here.
    pub fn push_number(&mut self, text: &str) -> Result<(), ErrorKind> {
        let value: i64 = text.parse().map_err(|_| ErrorKind::SyntaxError)?;
        self.push_value(value)
    }

    /// Push an operator or parenthesis token.
    pub fn push_operator(&mut self, typ: TokenType) -> Result<(), ErrorKind> {
        match typ {
            TokenType::ParentLeft => self.push_raw(typ),
            TokenType::ParentRight => loop {
                match self.operators.pop() {
                    Some(TokenType::ParentLeft) => return Ok(()),
                    Some(op) => self.apply(op)?,
                    None => return Err(ErrorKind::InvalidExpression),
                }
            },
            _ if typ.is_expression_operator() => {
                // A higher discriminant binds more loosely, so reduce while
                // the stacked operator binds at least as tightly as the
                // incoming one. Equal types reduce too (left-associative),
                // except for the prefix `!`, which stacks right-to-left.
                while let Some(&top) = self.operators.last() {
                    if top == TokenType::ParentLeft {
                        break;
                    }
                    if top < typ || (top == typ && typ != TokenType::LogicalNot) {
                        let op = self.operators.pop().expect("operator stack is non-empty");
                        self.apply(op)?;
                    } else {
                        break;
                    }
                }
                self.push_raw(typ)
            }
            _ => Err(ErrorKind::InvalidExpression),
        }
    }

    /// Drain pending operators and produce the result. Exactly one value
    /// must remain.
    pub fn finish(mut self) -> Result<i64, ErrorKind> {
        while let Some(op) = self.operators.pop() {
            if op == TokenType::ParentLeft {
                return Err(ErrorKind::InvalidExpression);
            }
            self.apply(op)?;
        }
        match self.values.as_slice() {
            [value] => Ok(*value),
            _ => Err(ErrorKind::InvalidExpression),
        }
    }

    fn push_raw(&mut self, typ: TokenType) -> Result<(), ErrorKind> {
        if self.operators.len() >= STACK_CAPACITY {
            return Err(ErrorKind::ExpressionTooComplex);
        }
        self.operators.push(typ);
        Ok(())
    }

    fn pop_value(&mut self) -> Result<i64, ErrorKind> {
        self.values.pop().ok_or(ErrorKind::InvalidExpression)
    }

    fn apply(&mut self, op: TokenType) -> Result<(), ErrorKind> {
        if op == TokenType::LogicalNot {
            let value = self.pop_value()?;
            self.values.push((value == 0) as i64);
            return Ok(());
        }

        let rhs = self.pop_value()?;
        let lhs = self.pop_value()?;
        let result = match op {
            TokenType::Multiply => lhs.wrapping_mul(rhs),
            TokenType::Divide => {
                if rhs == 0 {
                    return Err(ErrorKind::DivisionByZero);
                }
                lhs.wrapping_div(rhs)
            }
            TokenType::Modulo => {
                if rhs == 0 {
                    return Err(ErrorKind::DivisionByZero);
                }
                lhs.wrapping_rem(rhs)
            }
            TokenType::Add => lhs.wrapping_add(rhs),
            TokenType::Subtract => lhs.wrapping_sub(rhs),
            TokenType::Less => (lhs < rhs) as i64,
            TokenType::LessEqual => (lhs <= rhs) as i64,
            TokenType::Greater => (lhs > rhs) as i64,
            TokenType::GreaterEqual => (lhs >= rhs) as i64,
            TokenType::Equal => (lhs == rhs) as i64,
            TokenType::NotEqual => (lhs != rhs) as i64,
            TokenType::LogicalAnd => (lhs != 0 && rhs != 0) as i64,
            TokenType::LogicalOr => (lhs != 0 || rhs != 0) as i64,
            _ => return Err(ErrorKind::InvalidExpression),
        };
        self.values.push(result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::scan_lexeme;

    /// Evaluate a textual expression by lexing it token by token, treating
    /// every identifier as an undefined name (value 0).
    fn eval(expr: &str) -> Result<i64, ErrorKind> {
        let mut ev = ExprEvaluator::new();
        let mut rest = expr.trim_start();
        while !rest.is_empty() {
            let (typ, len) = scan_lexeme(rest)?;
            match typ {
                TokenType::Number => ev.push_number(&rest[..len])?,
                TokenType::Identifier => ev.push_value(0)?,
                _ => ev.push_operator(typ)?,
            }
            rest = rest[len..].trim_start();
        }
        ev.finish()
    }

    // ========================================================================
    // Arithmetic and precedence
    // ========================================================================

    #[test]
    fn test_single_value() {
        assert_eq!(eval("42"), Ok(42));
    }

    #[test]
    fn test_additive() {
        assert_eq!(eval("1 + 2 + 3"), Ok(6));
        assert_eq!(eval("10 - 4 - 3"), Ok(3));
    }

    #[test]
    fn test_multiplicative_binds_tighter() {
        assert_eq!(eval("2 + 3 * 4"), Ok(14));
        assert_eq!(eval("2 * 3 + 4"), Ok(10));
        assert_eq!(eval("20 - 10 / 2"), Ok(15));
        assert_eq!(eval("7 % 4 + 1"), Ok(4));
    }

    #[test]
    fn test_parentheses_override() {
        assert_eq!(eval("(2 + 3) * 4"), Ok(20));
        assert_eq!(eval("((1 + 1)) * ((2))"), Ok(4));
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(eval("100 / 10 / 5"), Ok(2));
        assert_eq!(eval("10 - 5 - 2"), Ok(3));
    }

    // ========================================================================
    // Comparisons and logic
    // ========================================================================

    #[test]
    fn test_relational() {
        assert_eq!(eval("1 < 2"), Ok(1));
        assert_eq!(eval("2 <= 2"), Ok(1));
        assert_eq!(eval("3 > 4"), Ok(0));
        assert_eq!(eval("4 >= 5"), Ok(0));
    }

    #[test]
    fn test_equality() {
        assert_eq!(eval("2 + 3 * 4 == 14"), Ok(1));
        assert_eq!(eval("1 != 1"), Ok(0));
    }

    #[test]
    fn test_logical_and_or() {
        assert_eq!(eval("1 && 2"), Ok(1));
        assert_eq!(eval("1 && 0"), Ok(0));
        assert_eq!(eval("0 || 3"), Ok(1));
        assert_eq!(eval("0 || 0"), Ok(0));
        // && binds tighter than ||
        assert_eq!(eval("1 || 0 && 0"), Ok(1));
    }

    #[test]
    fn test_relational_binds_tighter_than_logic() {
        assert_eq!(eval("1 < 2 && 3 < 4"), Ok(1));
        assert_eq!(eval("1 + 1 == 2 || 0"), Ok(1));
    }

    #[test]
    fn test_logical_not() {
        assert_eq!(eval("!0"), Ok(1));
        assert_eq!(eval("!5"), Ok(0));
        assert_eq!(eval("!!5"), Ok(1));
        assert_eq!(eval("!!!5"), Ok(0));
        assert_eq!(eval("!(1 - 1)"), Ok(1));
        assert_eq!(eval("!1 + 1"), Ok(1));
    }

    #[test]
    fn test_undefined_identifier_is_zero() {
        assert_eq!(eval("UNDEFINED_NAME"), Ok(0));
        assert_eq!(eval("UNDEFINED_NAME + 3"), Ok(3));
    }

    // ========================================================================
    // Faults
    // ========================================================================

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("1 / 0"), Err(ErrorKind::DivisionByZero));
        assert_eq!(eval("5 % 0"), Err(ErrorKind::DivisionByZero));
    }

    #[test]
    fn test_float_literal_rejected() {
        assert_eq!(eval("1.5"), Err(ErrorKind::SyntaxError));
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(eval("1 +"), Err(ErrorKind::InvalidExpression));
        assert_eq!(eval("* 2"), Err(ErrorKind::InvalidExpression));
    }

    #[test]
    fn test_dangling_value() {
        assert_eq!(eval("1 2"), Err(ErrorKind::InvalidExpression));
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(eval(""), Err(ErrorKind::InvalidExpression));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(eval("(1 + 2"), Err(ErrorKind::InvalidExpression));
        assert_eq!(eval("1 + 2)"), Err(ErrorKind::InvalidExpression));
    }

    #[test]
    fn test_non_expression_token_rejected() {
        assert_eq!(eval("1 ; 2"), Err(ErrorKind::InvalidExpression));
        assert_eq!(eval("{ 1 }"), Err(ErrorKind::InvalidExpression));
        assert_eq!(eval("1 = 2"), Err(ErrorKind::InvalidExpression));
    }

    #[test]
    fn test_operator_stack_overflow() {
        // 17 nested opening parentheses overflow the fixed operator stack.
        let expr = format!("{}1{}", "(".repeat(17), ")".repeat(17));
        assert_eq!(eval(&expr), Err(ErrorKind::ExpressionTooComplex));
        // 16 still fit.
        let expr = format!("{}1{}", "(".repeat(16), ")".repeat(16));
        assert_eq!(eval(&expr), Ok(1));
    }

    #[test]
    fn test_wrapping_arithmetic() {
        assert_eq!(
            eval("9223372036854775807 + 1"),
            Ok(i64::MIN)
        );
    }
}
