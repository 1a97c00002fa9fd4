/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * File:      keywords.rs
 * Purpose:   Defines all reserved keywords for the MLAB language.
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

use crate::lexer::token::TokenKind;

/// Maps a reserved word to its token kind, or `None` for ordinary
/// identifiers. Used exclusively by the lexer during tokenization;
/// keyword matching is case-sensitive.
pub fn keyword_kind(word: &str) -> Option<TokenKind> {
    match word {
        "if" => Some(TokenKind::If),
        "elseif" => Some(TokenKind::Elseif),
        "else" => Some(TokenKind::Else),
        "end" => Some(TokenKind::End),
        "for" => Some(TokenKind::For),
        "while" => Some(TokenKind::While),
        "break" => Some(TokenKind::Break),
        "continue" => Some(TokenKind::Continue),
        "function" => Some(TokenKind::Function),
        "return" => Some(TokenKind::Return),
        "clear" => Some(TokenKind::Clear),
        "clc" => Some(TokenKind::Clc),
        "close" => Some(TokenKind::Close),
        _ => None,
    }
}
