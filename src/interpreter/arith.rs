/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * File:      arith.rs
 * Purpose:   Operator-precedence evaluation of expression fragments that are
 *            not a plain call, literal, variable, or number. This is where
 *            `x < 5`, `2*a + 1`, and `[1 2] .* [3 4]` get their values.
 *
 * License:
 * This file is part of the MLAB project.
 *
 * MLAB is dual-licensed under the terms of:
 *   - The MIT License
 *   - The Apache License, Version 2.0
 *
 * You may choose either license to govern your use of this software.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under these licenses is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *
 * ==========================================================================
 */

use crate::error::MlabError;
use crate::interpreter::builtins;
use crate::interpreter::environment::Workspace;
use crate::interpreter::expressions;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::value::Value;

/// Evaluates an operator expression over the token stream.
///
/// Precedence, loosest to tightest: `||`, `&&`, comparisons, `+ -`,
/// `* / .* ./`, unary `- ~`, `^ .^`. Binary operators of equal precedence
/// associate left. Scalars broadcast element-wise over sequences and grids;
/// `* / ^` between two non-scalars is rejected (true matrix products belong
/// to the numeric engine, not the interpreter core).
pub fn evaluate(expr: &str, ws: &Workspace, out: &mut String) -> Result<Value, MlabError> {
    let mut parser = ExprParser {
        expr,
        chars: expr.chars().collect(),
        tokens: tokenize(expr),
        pos: 0,
        ws,
        out,
    };
    let value = parser.expression()?;
    parser.expect_exhausted()?;
    Ok(value)
}

struct ExprParser<'a> {
    expr: &'a str,
    chars: Vec<char>,
    tokens: Vec<Token>,
    pos: usize,
    ws: &'a Workspace,
    out: &'a mut String,
}

impl<'a> ExprParser<'a> {
    fn expression(&mut self) -> Result<Value, MlabError> {
        self.or_level()
    }

    fn or_level(&mut self) -> Result<Value, MlabError> {
        let mut value = self.and_level()?;
        while self.match_operator(&["||"]).is_some() {
            let rhs = self.and_level()?;
            let (a, b) = self.scalar_pair(&value, &rhs)?;
            value = Value::Scalar(bool_to_f64(a != 0.0 || b != 0.0));
        }
        Ok(value)
    }

    fn and_level(&mut self) -> Result<Value, MlabError> {
        let mut value = self.comparison()?;
        while self.match_operator(&["&&"]).is_some() {
            let rhs = self.comparison()?;
            let (a, b) = self.scalar_pair(&value, &rhs)?;
            value = Value::Scalar(bool_to_f64(a != 0.0 && b != 0.0));
        }
        Ok(value)
    }

    fn comparison(&mut self) -> Result<Value, MlabError> {
        let mut value = self.additive()?;
        while let Some(op) = self.match_operator(&["==", "~=", "<=", ">=", "<", ">"]) {
            let rhs = self.additive()?;
            let (a, b) = self.scalar_pair(&value, &rhs)?;
            let result = match op.as_str() {
                "==" => a == b,
                "~=" => a != b,
                "<=" => a <= b,
                ">=" => a >= b,
                "<" => a < b,
                ">" => a > b,
                _ => unreachable!(),
            };
            value = Value::Scalar(bool_to_f64(result));
        }
        Ok(value)
    }

    fn additive(&mut self) -> Result<Value, MlabError> {
        let mut value = self.term()?;
        while let Some(op) = self.match_operator(&["+", "-"]) {
            let rhs = self.term()?;
            value = match op.as_str() {
                "+" => value.zip_map(&rhs, |a, b| a + b)?,
                _ => value.zip_map(&rhs, |a, b| a - b)?,
            };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<Value, MlabError> {
        let mut value = self.unary()?;
        while let Some(op) = self.match_operator(&["*", "/", ".*", "./"]) {
            let rhs = self.unary()?;
            value = match op.as_str() {
                ".*" => value.zip_map(&rhs, |a, b| a * b)?,
                "./" => value.zip_map(&rhs, |a, b| a / b)?,
                "*" => {
                    self.require_scalar_side(&value, &rhs)?;
                    value.zip_map(&rhs, |a, b| a * b)?
                }
                _ => {
                    self.require_scalar_side(&value, &rhs)?;
                    value.zip_map(&rhs, |a, b| a / b)?
                }
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<Value, MlabError> {
        if self.match_operator(&["-"]).is_some() {
            return Ok(self.unary()?.map(|x| -x));
        }
        if self.match_operator(&["+"]).is_some() {
            return self.unary();
        }
        if self.match_operator(&["~"]).is_some() {
            let v = self.unary()?;
            let a = self.require_scalar(&v)?;
            return Ok(Value::Scalar(bool_to_f64(a == 0.0)));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Value, MlabError> {
        let mut value = self.primary()?;
        while let Some(op) = self.match_operator(&["^", ".^"]) {
            let rhs = self.signed_primary()?;
            value = match op.as_str() {
                ".^" => value.zip_map(&rhs, f64::powf)?,
                _ => {
                    self.require_scalar_side(&value, &rhs)?;
                    value.zip_map(&rhs, f64::powf)?
                }
            };
        }
        Ok(value)
    }

    /// Exponent operand: an optional sign, then a primary. Keeps `^` chains
    /// left-associative while still allowing `2^-3`.
    fn signed_primary(&mut self) -> Result<Value, MlabError> {
        if self.match_operator(&["-"]).is_some() {
            return Ok(self.signed_primary()?.map(|x| -x));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Value, MlabError> {
        let token = self.advance().clone();
        match token.kind {
            TokenKind::Number => token
                .lexeme
                .parse()
                .map(Value::Scalar)
                .map_err(|_| MlabError::CannotEvaluate(token.lexeme.clone())),

            TokenKind::Identifier => {
                if self.check(TokenKind::LParen) {
                    self.advance();
                    let args = self.argument_list()?;
                    self.expect(TokenKind::RParen)?;
                    builtins::call(&token.lexeme, &args, self.out)
                } else {
                    self.ws.get(&token.lexeme)
                }
            }

            TokenKind::LParen => {
                let value = self.expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(value)
            }

            TokenKind::LBracket => self.bracket_literal(&token),

            _ => Err(self.cannot_evaluate()),
        }
    }

    fn argument_list(&mut self) -> Result<Vec<Value>, MlabError> {
        let mut args = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if self.check(TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(args)
    }

    /// A `[...]` literal embedded in a larger expression. The literal
    /// grammar is the plain-number one, so the matching source span is
    /// sliced out and handed to the literal parser.
    fn bracket_literal(&mut self, open: &Token) -> Result<Value, MlabError> {
        let mut depth = 1usize;
        let close;
        loop {
            let token = self.advance().clone();
            match token.kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth -= 1;
                    if depth == 0 {
                        close = token;
                        break;
                    }
                }
                TokenKind::Eof => return Err(self.cannot_evaluate()),
                _ => {}
            }
        }

        // Fragments are single logical lines, so a column is a char index.
        if open.span.line != close.span.line {
            return Err(self.cannot_evaluate());
        }
        let interior: String = self.chars[open.span.column..close.span.column - 1]
            .iter()
            .collect();
        expressions::parse_bracket_literal(&interior)
    }

    /* ----------------------------------------------------------------------
     * Token cursor helpers
     * -------------------------------------------------------------------- */

    fn match_operator(&mut self, ops: &[&str]) -> Option<String> {
        let token = self.peek();
        if token.kind == TokenKind::Operator && ops.contains(&token.lexeme.as_str()) {
            let lexeme = token.lexeme.clone();
            self.pos += 1;
            return Some(lexeme);
        }
        None
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), MlabError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.cannot_evaluate())
        }
    }

    fn expect_exhausted(&mut self) -> Result<(), MlabError> {
        match self.peek().kind {
            TokenKind::Eof | TokenKind::Newline => Ok(()),
            _ => Err(self.cannot_evaluate()),
        }
    }

    fn peek(&self) -> &Token {
        // The token stream always ends with Eof, so the cursor is clamped
        // to it instead of running past the end.
        let idx = self.pos.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn advance(&mut self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        &self.tokens[idx]
    }

    fn cannot_evaluate(&self) -> MlabError {
        MlabError::CannotEvaluate(self.expr.to_string())
    }

    fn require_scalar(&self, v: &Value) -> Result<f64, MlabError> {
        v.as_scalar().ok_or(MlabError::DimensionMismatch)
    }

    fn scalar_pair(&self, a: &Value, b: &Value) -> Result<(f64, f64), MlabError> {
        Ok((self.require_scalar(a)?, self.require_scalar(b)?))
    }

    fn require_scalar_side(&self, a: &Value, b: &Value) -> Result<(), MlabError> {
        if a.is_scalar() || b.is_scalar() {
            Ok(())
        } else {
            Err(MlabError::DimensionMismatch)
        }
    }
}

fn bool_to_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn eval(expr: &str) -> Result<Value, MlabError> {
        let mut out = String::new();
        evaluate(expr, &Workspace::new(), &mut out)
    }

    fn eval_with(expr: &str, ws: &Workspace) -> Value {
        let mut out = String::new();
        evaluate(expr, ws, &mut out).unwrap()
    }

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(eval("1 + 2 * 3").unwrap(), Value::Scalar(7.0));
        assert_eq!(eval("(1 + 2) * 3").unwrap(), Value::Scalar(9.0));
        assert_eq!(eval("10 - 4 - 3").unwrap(), Value::Scalar(3.0));
        assert_eq!(eval("2^3^2").unwrap(), Value::Scalar(64.0)); // left-assoc
        assert_eq!(eval("-2^2").unwrap(), Value::Scalar(-4.0));
        assert_eq!(eval("2^-1").unwrap(), Value::Scalar(0.5));
    }

    #[test]
    fn comparisons_yield_zero_or_one() {
        assert_eq!(eval("3 < 5").unwrap(), Value::Scalar(1.0));
        assert_eq!(eval("3 >= 5").unwrap(), Value::Scalar(0.0));
        assert_eq!(eval("2 ~= 2").unwrap(), Value::Scalar(0.0));
        assert_eq!(eval("1 + 1 == 2").unwrap(), Value::Scalar(1.0));
    }

    #[test]
    fn logical_operators() {
        assert_eq!(eval("1 && 0").unwrap(), Value::Scalar(0.0));
        assert_eq!(eval("1 || 0").unwrap(), Value::Scalar(1.0));
        assert_eq!(eval("~0").unwrap(), Value::Scalar(1.0));
        assert_eq!(eval("~3").unwrap(), Value::Scalar(0.0));
    }

    #[test]
    fn variables_participate() {
        let mut ws = Workspace::new();
        ws.set("x", Value::Scalar(4.0));
        assert_eq!(eval_with("x + 1", &ws), Value::Scalar(5.0));
        assert_eq!(eval_with("x < 5", &ws), Value::Scalar(1.0));
        assert_eq!(eval_with("2*x - x/2", &ws), Value::Scalar(6.0));
    }

    #[test]
    fn elementwise_and_broadcast() {
        assert_eq!(
            eval("[1 2 3] * 2").unwrap(),
            Value::Sequence(vec![2.0, 4.0, 6.0])
        );
        assert_eq!(
            eval("[1 2] .* [3 4]").unwrap(),
            Value::Sequence(vec![3.0, 8.0])
        );
        assert_eq!(
            eval("[1 2; 3 4] + 10").unwrap(),
            Value::Grid(vec![vec![11.0, 12.0], vec![13.0, 14.0]])
        );
        assert_eq!(eval("[2 3] .^ 2").unwrap(), Value::Sequence(vec![4.0, 9.0]));
    }

    #[test]
    fn nonscalar_products_are_rejected() {
        assert!(matches!(
            eval("[1 2] * [3 4]"),
            Err(MlabError::DimensionMismatch)
        ));
        assert!(matches!(
            eval("[1 2] + [1 2 3]"),
            Err(MlabError::DimensionMismatch)
        ));
    }

    #[test]
    fn calls_nest_inside_expressions() {
        assert_eq!(eval("sqrt(16) + 1").unwrap(), Value::Scalar(5.0));
        assert_eq!(eval("sum([1 2 3]) * 2").unwrap(), Value::Scalar(12.0));
        // max takes exactly one argument.
        assert!(matches!(
            eval("max(abs(-3), 2)"),
            Err(MlabError::WrongArity { .. })
        ));
    }

    #[test]
    fn trailing_garbage_is_an_error() {
        assert!(matches!(eval("1 2"), Err(MlabError::CannotEvaluate(_))));
        assert!(matches!(eval("1:5"), Err(MlabError::CannotEvaluate(_))));
        assert!(matches!(eval("'str'"), Err(MlabError::CannotEvaluate(_))));
    }
}
