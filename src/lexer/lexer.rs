/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * File:      lexer.rs
 * Purpose:   Converts raw .m source text into a stream of lexical tokens.
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

use crate::lexer::keywords::keyword_kind;
use crate::lexer::token::{Token, TokenKind};
use crate::span::Span;

/// The MLAB lexer: a character cursor over the source with 1-based
/// line/column tracking.
///
/// Tokenization never fails. Unterminated strings consume to end of line,
/// and unrecognized characters are silently skipped (see DESIGN.md), so one
/// stray byte cannot take down a whole script.
pub struct Lexer {
    chars: Vec<char>,
    current: usize,
    line: usize,
    col: usize,
    pub tokens: Vec<Token>,
}

/// Tokenizes a complete source string (a line, a joined statement, or a
/// whole file) into a token sequence terminated by `Eof`.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    lexer.scan_tokens();
    lexer.tokens
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            current: 0,
            line: 1,
            col: 1,
            tokens: Vec::new(),
        }
    }

    /// Scans the entire input, then appends the terminating `Eof` token.
    pub fn scan_tokens(&mut self) {
        while !self.is_at_end() {
            self.scan_token();
        }

        let span = Span::new(self.line, self.col);
        self.push(TokenKind::Eof, String::new(), span);
    }

    /// Scans and emits a single token (or skips whitespace / a stray byte).
    fn scan_token(&mut self) {
        let span = Span::new(self.line, self.col);
        let ch = self.advance();

        match ch {
            // Whitespace separates tokens but is never one itself.
            ' ' | '\t' | '\r' => {}

            '\n' => self.push(TokenKind::Newline, "\\n", span),

            // %% section title, % line comment. The lexeme carries the text
            // after the marker; comment text never reaches operator scanning.
            '%' => {
                if self.peek() == '%' {
                    self.advance();
                    let text = self.read_to_eol();
                    self.push(TokenKind::SectionComment, text, span);
                } else {
                    let text = self.read_to_eol();
                    self.push(TokenKind::Comment, text, span);
                }
            }

            '\'' => self.string(span),

            '0'..='9' => self.number(span),

            'a'..='z' | 'A'..='Z' | '_' => self.identifier(span),

            '.' => {
                // Line continuation `...`: the rest of the line is discarded
                // as if it were a comment. Joining with the next physical
                // line is the runner's job.
                if self.peek() == '.' && self.peek_next() == '.' {
                    self.advance();
                    self.advance();
                    self.read_to_eol();
                } else if self.peek().is_ascii_digit() {
                    self.number(span);
                } else if let Some(op) = self.match_any(&['*', '/', '^', '\'']) {
                    self.push(TokenKind::Operator, format!(".{}", op), span);
                } else {
                    self.push(TokenKind::Dot, ".", span);
                }
            }

            '=' => {
                if self.match_char('=') {
                    self.push(TokenKind::Operator, "==", span);
                } else {
                    self.push(TokenKind::Assign, "=", span);
                }
            }

            '<' | '>' | '~' => {
                if self.match_char('=') {
                    self.push(TokenKind::Operator, format!("{}=", ch), span);
                } else {
                    self.push(TokenKind::Operator, ch.to_string(), span);
                }
            }

            '&' => {
                let lex = if self.match_char('&') { "&&" } else { "&" };
                self.push(TokenKind::Operator, lex, span);
            }

            '|' => {
                let lex = if self.match_char('|') { "||" } else { "|" };
                self.push(TokenKind::Operator, lex, span);
            }

            '+' | '-' | '*' | '/' | '^' => {
                self.push(TokenKind::Operator, ch.to_string(), span);
            }

            '(' => self.push(TokenKind::LParen, "(", span),
            ')' => self.push(TokenKind::RParen, ")", span),
            '[' => self.push(TokenKind::LBracket, "[", span),
            ']' => self.push(TokenKind::RBracket, "]", span),
            ';' => self.push(TokenKind::Semicolon, ";", span),
            ',' => self.push(TokenKind::Comma, ",", span),
            ':' => self.push(TokenKind::Colon, ":", span),

            // Anything else is skipped.
            _ => {}
        }
    }

    /// Single-quoted string. No escape sequences; an unterminated string
    /// consumes to end of line.
    fn string(&mut self, span: Span) {
        let start = self.current;
        while !self.is_at_end() && self.peek() != '\'' && self.peek() != '\n' {
            self.advance();
        }

        let value: String = self.chars[start..self.current].iter().collect();
        if self.peek() == '\'' {
            self.advance(); // closing quote
        }

        self.push(TokenKind::String, value, span);
    }

    /// Numeric literal: digits, at most one decimal point, and an optional
    /// signed exponent. The first character has already been consumed.
    fn number(&mut self, span: Span) {
        let start = self.current - 1;

        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // Only a digit after '.' continues the number, so `1.*2` still
        // tokenizes as `1`, `.*`, `2`.
        if self.chars[start] != '.' && self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        } else if self.chars[start] == '.' {
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        if (self.peek() == 'e' || self.peek() == 'E') && self.exponent_follows() {
            self.advance();
            if self.peek() == '+' || self.peek() == '-' {
                self.advance();
            }
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let value: String = self.chars[start..self.current].iter().collect();
        self.push(TokenKind::Number, value, span);
    }

    /// True when the `e`/`E` at the cursor really starts an exponent
    /// (digit, or sign then digit), so `2e` stays `2` + identifier `e`.
    fn exponent_follows(&self) -> bool {
        let next = self.peek_at(1);
        if next.is_ascii_digit() {
            return true;
        }
        (next == '+' || next == '-') && self.peek_at(2).is_ascii_digit()
    }

    /// Identifier or keyword; the first character has already been consumed.
    fn identifier(&mut self, span: Span) {
        let start = self.current - 1;

        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text: String = self.chars[start..self.current].iter().collect();
        let kind = keyword_kind(&text).unwrap_or(TokenKind::Identifier);
        self.push(kind, text, span);
    }

    /// Consumes characters up to (not including) the next newline.
    fn read_to_eol(&mut self) -> String {
        let start = self.current;
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
        self.chars[start..self.current].iter().collect()
    }

    fn push(&mut self, kind: TokenKind, lexeme: impl Into<String>, span: Span) {
        self.tokens.push(Token {
            kind,
            lexeme: lexeme.into(),
            span,
        });
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.current];
        self.current += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_any(&mut self, expected: &[char]) -> Option<char> {
        let ch = self.peek();
        if expected.contains(&ch) {
            self.advance();
            Some(ch)
        } else {
            None
        }
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_next(&self) -> char {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.chars
            .get(self.current + offset)
            .copied()
            .unwrap_or('\0')
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scans_assignment_statement() {
        assert_eq!(
            kinds("x = 5;"),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_char_operators_win_over_prefixes() {
        let toks = tokenize("a <= b ~= c .* d == e");
        let ops: Vec<&str> = toks
            .iter()
            .filter(|t| t.kind == TokenKind::Operator)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(ops, vec!["<=", "~=", ".*", "=="]);
    }

    #[test]
    fn keywords_get_their_own_kinds() {
        assert_eq!(
            kinds("for while if elseif else end"),
            vec![
                TokenKind::For,
                TokenKind::While,
                TokenKind::If,
                TokenKind::Elseif,
                TokenKind::Else,
                TokenKind::End,
                TokenKind::Eof,
            ]
        );
        // Prefix matches stay identifiers.
        assert_eq!(kinds("forx"), vec![TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn numbers_with_exponents_and_leading_dot() {
        let toks = tokenize("1.5e-3 .25 2e10 7");
        let nums: Vec<&str> = toks
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(nums, vec!["1.5e-3", ".25", "2e10", "7"]);
    }

    #[test]
    fn comments_and_sections_carry_their_text() {
        let toks = tokenize("%% Setup phase");
        assert_eq!(toks[0].kind, TokenKind::SectionComment);
        assert_eq!(toks[0].lexeme, " Setup phase");

        let toks = tokenize("x = 1 % trailing note");
        let comment = toks.iter().find(|t| t.kind == TokenKind::Comment).unwrap();
        assert_eq!(comment.lexeme, " trailing note");
    }

    #[test]
    fn operators_inside_comments_are_not_tokenized() {
        let toks = tokenize("% a == b .* c");
        assert_eq!(toks.len(), 2); // Comment + Eof
        assert_eq!(toks[0].kind, TokenKind::Comment);
    }

    #[test]
    fn strings_swallow_percent_signs() {
        let toks = tokenize("'100% done'");
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].lexeme, "100% done");
    }

    #[test]
    fn unterminated_string_stops_at_line_end() {
        let toks = tokenize("'oops\nx");
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].lexeme, "oops");
        assert_eq!(toks[1].kind, TokenKind::Newline);
    }

    #[test]
    fn continuation_discards_rest_of_line() {
        let toks = tokenize("a = 1 + ... anything here\n2");
        // Nothing between the `+` and the newline token.
        let lexemes: Vec<&str> = toks.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["a", "=", "1", "+", "\\n", "2", ""]);
    }

    #[test]
    fn unrecognized_characters_are_skipped() {
        assert_eq!(
            kinds("x # 1"),
            vec![TokenKind::Identifier, TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn spans_track_line_and_column() {
        let toks = tokenize("x = 1\ny = 2");
        let y = toks.iter().find(|t| t.lexeme == "y").unwrap();
        assert_eq!(y.span, Span::new(2, 1));
    }
}
