/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * File:      token.rs
 * Purpose:   Defines the lexical token types produced by the MLAB lexer.
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

use crate::span::Span;
use std::fmt;

/// Represents the **category of a lexical token** in the MLAB language.
///
/// Keywords get one kind each (rather than a single `Keyword` bucket)
/// because the statement classifier and block matcher dispatch on them
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A numeric literal: `42`, `3.14`, `1.5e-3`.
    Number,
    /// A single-quoted string literal.
    String,
    /// A user-defined name: variable or function.
    Identifier,
    /// An arithmetic, comparison, or logical operator (`+`, `==`, `.*`, ...).
    Operator,
    /// The assignment `=` (as opposed to the comparison `==`).
    Assign,
    LParen,
    RParen,
    LBracket,
    RBracket,
    /// Row separator in matrix literals; output suppression at line end.
    Semicolon,
    Comma,
    /// Range separator in `for` headers: `1:2:10`.
    Colon,
    Dot,
    Newline,

    // Keywords
    If,
    Elseif,
    Else,
    End,
    For,
    While,
    Break,
    Continue,
    Function,
    Return,
    Clear,
    Clc,
    Close,

    /// A `%` line comment; the lexeme carries the text after the marker.
    Comment,
    /// A `%%` section title; the lexeme carries the text after the marker.
    SectionComment,
    Eof,
}

/// A single classified unit of source code.
///
/// The lexeme preserves the exact source text (for numbers, identifiers and
/// operators) or the payload text (for strings and comments, without their
/// delimiters). The span records where the token started.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl fmt::Display for Token {
    /// Prints only the lexeme: error messages care about what the user
    /// wrote, not the token's internal structure.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}
