/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * Lexical Analysis
 * ----------------
 * This module turns raw .m source text into typed tokens:
 *
 *  - token.rs    → TokenKind and Token definitions
 *  - keywords.rs → the reserved-word table
 *  - lexer.rs    → the character-level scanner
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

pub mod keywords;
pub mod lexer;
pub mod token;

pub use lexer::{tokenize, Lexer};
pub use token::{Token, TokenKind};
