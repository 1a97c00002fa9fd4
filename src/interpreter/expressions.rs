/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * File:      expressions.rs
 * Purpose:   Evaluates one expression fragment against the workspace.
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
use crate::interpreter::arith;
use crate::interpreter::builtins;
use crate::interpreter::environment::{is_valid_name, Workspace};
use crate::value::Value;

/// Evaluates a source fragment to a value. Dispatch order, first match wins:
///
/// 1. whole-fragment function call `name(args)`
/// 2. whole-fragment bracketed literal `[...]`
/// 3. variable reference
/// 4. numeric literal
/// 5. operator expression (the arithmetic evaluator in `arith.rs`)
///
/// A call or literal only matches when its opening delimiter closes at the
/// very end of the fragment, so `f(1)+g(2)` and `[1 2]+[3 4]` fall through
/// to case 5 instead of being mangled.
pub fn evaluate(fragment: &str, ws: &Workspace, out: &mut String) -> Result<Value, MlabError> {
    let expr = fragment.trim();
    if expr.is_empty() {
        return Err(MlabError::CannotEvaluate(String::new()));
    }

    if let Some((name, args_str)) = split_call(expr) {
        let mut args = Vec::new();
        for arg in split_top_level(args_str) {
            args.push(evaluate(arg, ws, out)?);
        }
        return builtins::call(name, &args, out);
    }

    if let Some(interior) = bracket_interior(expr) {
        return parse_bracket_literal(interior);
    }

    if is_valid_name(expr) {
        // A bare identifier either names a binding or is an undefined
        // variable, it can't mean anything else.
        return ws.get(expr);
    }

    if let Ok(n) = expr.parse::<f64>() {
        return Ok(Value::Scalar(n));
    }

    arith::evaluate(expr, ws, out)
}

/// True for statement-shaped `disp(...)` calls, whose placeholder result
/// must be neither displayed nor bound to `ans`.
pub fn is_display_statement(expr: &str) -> bool {
    matches!(split_call(expr.trim()), Some(("disp", _)))
}

/// Matches `name(args)` spanning the whole fragment: the prefix before the
/// first `(` is a valid identifier and that paren closes at the last
/// character. Returns the name and the raw argument text.
fn split_call(expr: &str) -> Option<(&str, &str)> {
    if !expr.ends_with(')') {
        return None;
    }
    let open = expr.find('(')?;
    let name = expr[..open].trim_end();
    if !is_valid_name(name) {
        return None;
    }

    // `name` is ASCII, so the byte index of `(` is also its char index.
    let chars: Vec<char> = expr.chars().collect();
    if matching_close(&chars, open)? != chars.len() - 1 {
        return None;
    }
    Some((name, &expr[open + 1..expr.len() - 1]))
}

/// Matches a `[...]` literal spanning the whole fragment and returns the
/// interior text.
fn bracket_interior(expr: &str) -> Option<&str> {
    if !(expr.starts_with('[') && expr.ends_with(']')) {
        return None;
    }
    let chars: Vec<char> = expr.chars().collect();
    if matching_close(&chars, 0)? != chars.len() - 1 {
        return None;
    }
    Some(&expr[1..expr.len() - 1])
}

/// Index of the delimiter closing the one at `open`, honoring nested
/// parens/brackets and skipping single-quoted spans. `None` if unbalanced.
fn matching_close(chars: &[char], open: usize) -> Option<usize> {
    let close = match chars[open] {
        '(' => ')',
        '[' => ']',
        _ => return None,
    };

    let mut depth = 0usize;
    let mut in_string = false;
    for (i, &c) in chars.iter().enumerate().skip(open) {
        if in_string {
            if c == '\'' {
                in_string = false;
            }
            continue;
        }
        match c {
            '\'' => in_string = true,
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return if c == close { Some(i) } else { None };
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits argument text on top-level commas: commas nested inside
/// parens/brackets or quoted spans are not split points. Empty pieces are
/// dropped, so `f()` has zero arguments.
fn split_top_level(args: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut start = 0usize;

    for (i, c) in args.char_indices() {
        if in_string {
            if c == '\'' {
                in_string = false;
            }
            continue;
        }
        match c {
            '\'' => in_string = true,
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&args[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Parses the interior of a `[...]` literal.
///
/// A `;` makes it a grid: rows split on semicolons, elements on
/// whitespace/commas, every row the same length (`RaggedMatrix` otherwise).
/// Without a `;` it is a sequence. A 1×1 result collapses to a scalar.
pub fn parse_bracket_literal(interior: &str) -> Result<Value, MlabError> {
    if interior.contains(';') {
        let mut rows = Vec::new();
        for row_str in interior.split(';') {
            let row = parse_row(row_str)?;
            if !row.is_empty() {
                rows.push(row);
            }
        }
        return Value::grid_from_rows(rows);
    }

    Ok(Value::sequence_from(parse_row(interior)?))
}

/// One row of numbers separated by whitespace and/or commas.
fn parse_row(row: &str) -> Result<Vec<f64>, MlabError> {
    let mut elements = Vec::new();
    for piece in row.split(|c: char| c.is_whitespace() || c == ',') {
        if piece.is_empty() {
            continue;
        }
        let n: f64 = piece
            .parse()
            .map_err(|_| MlabError::CannotEvaluate(piece.to_string()))?;
        elements.push(n);
    }
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn eval(expr: &str, ws: &Workspace) -> Result<Value, MlabError> {
        let mut out = String::new();
        evaluate(expr, ws, &mut out)
    }

    fn eval_fresh(expr: &str) -> Result<Value, MlabError> {
        eval(expr, &Workspace::new())
    }

    #[test]
    fn numeric_literals() {
        assert_eq!(eval_fresh("5").unwrap(), Value::Scalar(5.0));
        assert_eq!(eval_fresh("-2.5").unwrap(), Value::Scalar(-2.5));
        assert_eq!(eval_fresh("1e3").unwrap(), Value::Scalar(1000.0));
    }

    #[test]
    fn vector_and_matrix_literals() {
        assert_eq!(
            eval_fresh("[1 2 3]").unwrap(),
            Value::Sequence(vec![1.0, 2.0, 3.0])
        );
        assert_eq!(
            eval_fresh("[1, 2, 3]").unwrap(),
            Value::Sequence(vec![1.0, 2.0, 3.0])
        );
        assert_eq!(
            eval_fresh("[1 2; 3 4]").unwrap(),
            Value::Grid(vec![vec![1.0, 2.0], vec![3.0, 4.0]])
        );
        // 1x1 collapses to a scalar.
        assert_eq!(eval_fresh("[7]").unwrap(), Value::Scalar(7.0));
        assert_eq!(eval_fresh("[]").unwrap(), Value::Sequence(vec![]));
    }

    #[test]
    fn ragged_matrix_is_rejected() {
        assert!(matches!(
            eval_fresh("[1 2; 3]"),
            Err(MlabError::RaggedMatrix)
        ));
    }

    #[test]
    fn variable_references() {
        let mut ws = Workspace::new();
        ws.set("x", Value::Scalar(9.0));
        assert_eq!(eval("x", &ws).unwrap(), Value::Scalar(9.0));
        assert!(matches!(
            eval("y", &ws),
            Err(MlabError::UndefinedVariable(_))
        ));
    }

    #[test]
    fn function_calls_evaluate_arguments_recursively() {
        assert_eq!(eval_fresh("sum([1 2 3])").unwrap(), Value::Scalar(6.0));
        assert_eq!(
            eval_fresh("size([1 2; 3 4])").unwrap(),
            Value::Sequence(vec![2.0, 2.0])
        );
        assert_eq!(eval_fresh("sqrt(sum([9 7]))").unwrap(), Value::Scalar(4.0));
        assert!(matches!(
            eval_fresh("pinv([1 2])"),
            Err(MlabError::UnknownFunction(_))
        ));
    }

    #[test]
    fn call_shape_requires_the_paren_to_close_at_the_end() {
        // Not a whole-fragment call: falls through to arithmetic.
        assert_eq!(eval_fresh("abs(-3) + abs(3)").unwrap(), Value::Scalar(6.0));
        assert_eq!(
            eval_fresh("[1 2] + [3 4]").unwrap(),
            Value::Sequence(vec![4.0, 6.0])
        );
    }

    #[test]
    fn top_level_comma_splitting_ignores_nested_commas() {
        assert_eq!(
            split_top_level("[1, 2], sin(3), 4"),
            vec!["[1, 2]", "sin(3)", "4"]
        );
        assert_eq!(split_top_level(""), Vec::<&str>::new());
    }

    #[test]
    fn garbage_cannot_be_evaluated() {
        assert!(matches!(
            eval_fresh("@@@"),
            Err(MlabError::CannotEvaluate(_))
        ));
    }
}
