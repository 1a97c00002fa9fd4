/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * File:      builtins.rs
 * Purpose:   The fixed table of built-in functions callable from scripts.
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
use crate::interpreter::display;
use crate::value::Value;

/// One registered built-in: a name, a declared arity, and a native handler.
///
/// Handlers receive the evaluated arguments and the output sink (only
/// `disp` writes to it). Registration replaces the long if/else name
/// cascade of a naive implementation; adding a builtin means adding a row.
pub struct Builtin {
    pub name: &'static str,
    pub arity: usize,
    pub handler: fn(&[Value], &mut String) -> Result<Value, MlabError>,
}

/// The complete, case-sensitive builtin table.
pub static BUILTINS: &[Builtin] = &[
    Builtin { name: "disp", arity: 1, handler: builtin_disp },
    Builtin { name: "size", arity: 1, handler: builtin_size },
    Builtin { name: "length", arity: 1, handler: builtin_length },
    Builtin { name: "sum", arity: 1, handler: builtin_sum },
    Builtin { name: "mean", arity: 1, handler: builtin_mean },
    Builtin { name: "min", arity: 1, handler: builtin_min },
    Builtin { name: "max", arity: 1, handler: builtin_max },
    Builtin { name: "sqrt", arity: 1, handler: builtin_sqrt },
    Builtin { name: "abs", arity: 1, handler: builtin_abs },
    Builtin { name: "sin", arity: 1, handler: builtin_sin },
    Builtin { name: "cos", arity: 1, handler: builtin_cos },
    Builtin { name: "tan", arity: 1, handler: builtin_tan },
    Builtin { name: "exp", arity: 1, handler: builtin_exp },
    Builtin { name: "log", arity: 1, handler: builtin_log },
    Builtin { name: "log10", arity: 1, handler: builtin_log10 },
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

pub fn is_builtin(name: &str) -> bool {
    lookup(name).is_some()
}

/// Invokes a builtin by name, checking arity first.
pub fn call(name: &str, args: &[Value], out: &mut String) -> Result<Value, MlabError> {
    let builtin = lookup(name).ok_or_else(|| MlabError::UnknownFunction(name.to_string()))?;
    if args.len() != builtin.arity {
        return Err(MlabError::WrongArity {
            func: builtin.name,
            expected: builtin.arity,
            got: args.len(),
        });
    }
    (builtin.handler)(args, out)
}

/* ==========================================================================
 * Handlers
 * ==========================================================================
 */

/// `disp(x)` prints the display form of its argument. It is statement-shaped:
/// the returned `Scalar(0)` exists only so the evaluator has a value, and the
/// session never binds or displays it.
fn builtin_disp(args: &[Value], out: &mut String) -> Result<Value, MlabError> {
    out.push_str(&display::format_value(&args[0]));
    Ok(Value::Scalar(0.0))
}

/// `size(x)` returns `[rows cols]` for any value kind.
fn builtin_size(args: &[Value], _out: &mut String) -> Result<Value, MlabError> {
    let v = &args[0];
    Ok(Value::Sequence(vec![v.rows() as f64, v.cols() as f64]))
}

/// `length(x)` is the larger of the two dimensions.
fn builtin_length(args: &[Value], _out: &mut String) -> Result<Value, MlabError> {
    let v = &args[0];
    Ok(Value::Scalar(v.rows().max(v.cols()) as f64))
}

// The reducers fold over every element regardless of value kind; empty
// input reduces to 0.

fn builtin_sum(args: &[Value], _out: &mut String) -> Result<Value, MlabError> {
    Ok(Value::Scalar(args[0].elements().iter().sum()))
}

fn builtin_mean(args: &[Value], _out: &mut String) -> Result<Value, MlabError> {
    let elements = args[0].elements();
    if elements.is_empty() {
        return Ok(Value::Scalar(0.0));
    }
    let total: f64 = elements.iter().sum();
    Ok(Value::Scalar(total / elements.len() as f64))
}

fn builtin_min(args: &[Value], _out: &mut String) -> Result<Value, MlabError> {
    let elements = args[0].elements();
    if elements.is_empty() {
        return Ok(Value::Scalar(0.0));
    }
    Ok(Value::Scalar(elements.iter().copied().fold(f64::INFINITY, f64::min)))
}

fn builtin_max(args: &[Value], _out: &mut String) -> Result<Value, MlabError> {
    let elements = args[0].elements();
    if elements.is_empty() {
        return Ok(Value::Scalar(0.0));
    }
    Ok(Value::Scalar(
        elements.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    ))
}

// The scalar-only math builtins reject sequences and grids outright rather
// than silently broadening to element-wise application.

fn require_scalar(func: &'static str, arg: &Value) -> Result<f64, MlabError> {
    arg.as_scalar()
        .ok_or(MlabError::UnsupportedArgumentKind { func })
}

fn builtin_sqrt(args: &[Value], _out: &mut String) -> Result<Value, MlabError> {
    Ok(Value::Scalar(require_scalar("sqrt", &args[0])?.sqrt()))
}

fn builtin_abs(args: &[Value], _out: &mut String) -> Result<Value, MlabError> {
    Ok(Value::Scalar(require_scalar("abs", &args[0])?.abs()))
}

fn builtin_sin(args: &[Value], _out: &mut String) -> Result<Value, MlabError> {
    Ok(Value::Scalar(require_scalar("sin", &args[0])?.sin()))
}

fn builtin_cos(args: &[Value], _out: &mut String) -> Result<Value, MlabError> {
    Ok(Value::Scalar(require_scalar("cos", &args[0])?.cos()))
}

fn builtin_tan(args: &[Value], _out: &mut String) -> Result<Value, MlabError> {
    Ok(Value::Scalar(require_scalar("tan", &args[0])?.tan()))
}

fn builtin_exp(args: &[Value], _out: &mut String) -> Result<Value, MlabError> {
    Ok(Value::Scalar(require_scalar("exp", &args[0])?.exp()))
}

fn builtin_log(args: &[Value], _out: &mut String) -> Result<Value, MlabError> {
    Ok(Value::Scalar(require_scalar("log", &args[0])?.ln()))
}

fn builtin_log10(args: &[Value], _out: &mut String) -> Result<Value, MlabError> {
    Ok(Value::Scalar(require_scalar("log10", &args[0])?.log10()))
}
