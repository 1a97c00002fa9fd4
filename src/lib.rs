/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
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

//! MLAB interprets MATLAB-compatible `.m` scripts: scalars, vectors and
//! matrices of doubles, `for`/`while`/`if` control flow, a fixed table of
//! built-in functions, and the classic workspace commands (`who`, `whos`,
//! `clear`, ...). Scripts run through [`runner::ScriptRunner`]; the
//! interactive window in [`repl`] drives the same [`interpreter::Session`].

pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod repl;
pub mod runner;
pub mod span;
pub mod value;
